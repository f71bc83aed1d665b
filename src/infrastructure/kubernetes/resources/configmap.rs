// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::model::{Asset, AssetPayload};
use crate::infrastructure::constants::{ANNOTATION_SYNC_WAVE, LABEL_APP};
use crate::shared::error::{BuildError, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;

/// Wraps file assets into ConfigMaps named after their digest.
///
/// The created-at label is left off on purpose so unchanged assets
/// regenerate byte-identically.
pub struct ConfigMapBuilder {
    namespace: String,
    sync_wave: Option<i64>,
}

impl ConfigMapBuilder {
    pub fn new(namespace: String, sync_wave: Option<i64>) -> Self {
        Self {
            namespace,
            sync_wave,
        }
    }

    /// Returns `None` for mount-only assets.
    pub fn build(&self, asset: &Asset) -> Result<Option<ConfigMap>> {
        let (key, payload) = match (asset.config_key(), asset.payload()) {
            (Some(key), Some(payload)) => (key, payload),
            _ => return Ok(None),
        };
        if key.is_empty() {
            return Err(BuildError::ValidationError(format!(
                "asset '{}' mounted at {} has no usable file name",
                asset.resource_name(),
                asset.mount_path()
            )));
        }

        let mut config_map = ConfigMap {
            metadata: ObjectMeta {
                name: Some(asset.resource_name()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.get_labels(asset)).filter(|l| !l.is_empty()),
                annotations: self.sync_wave.map(|wave| {
                    let mut annotations = BTreeMap::new();
                    annotations.insert(ANNOTATION_SYNC_WAVE.to_string(), wave.to_string());
                    annotations
                }),
                ..Default::default()
            },
            ..Default::default()
        };

        match payload {
            AssetPayload::Text(text) => {
                let mut data = BTreeMap::new();
                data.insert(key, text.clone());
                config_map.data = Some(data);
            }
            AssetPayload::Binary(bytes) => {
                let mut data = BTreeMap::new();
                data.insert(key, ByteString(bytes.clone()));
                config_map.binary_data = Some(data);
            }
        }

        Ok(Some(config_map))
    }

    /// Identity label of the owning app. Digest-only assets belong to no
    /// single app and carry none.
    pub fn get_labels(&self, asset: &Asset) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        if !asset.is_digest_only() {
            labels.insert(LABEL_APP.to_string(), asset.owner_app().to_string());
        }
        labels
    }
}
