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

use crate::domain::model::{Asset, AssetKind, Container};
use crate::infrastructure::constants::CONFIG_MAP_DEFAULT_MODE;
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, EmptyDirVolumeSource, NFSVolumeSource,
    PersistentVolumeClaimVolumeSource, Volume, VolumeMount,
};
use std::collections::HashSet;

pub fn build_volume(asset: &Asset) -> Volume {
    let name = asset.resource_name();
    let mut volume = Volume {
        name: name.clone(),
        ..Default::default()
    };

    match asset.kind() {
        AssetKind::File(_) => {
            volume.config_map = Some(ConfigMapVolumeSource {
                name,
                default_mode: Some(CONFIG_MAP_DEFAULT_MODE),
                ..Default::default()
            });
        }
        AssetKind::Temp => {
            volume.empty_dir = Some(EmptyDirVolumeSource::default());
        }
        AssetKind::Pvc {
            claim_name,
            read_only,
        } => {
            volume.persistent_volume_claim = Some(PersistentVolumeClaimVolumeSource {
                claim_name: claim_name.clone(),
                read_only: read_only.then_some(true),
            });
        }
        AssetKind::Nfs {
            server,
            path,
            read_only,
        } => {
            volume.nfs = Some(NFSVolumeSource {
                server: server.clone(),
                path: path.clone(),
                read_only: read_only.then_some(true),
            });
        }
    }

    volume
}

/// File assets mount their single key read-only through `subPath`.
pub fn build_volume_mount(asset: &Asset) -> VolumeMount {
    let mut mount = VolumeMount {
        name: asset.resource_name(),
        mount_path: asset.mount_path().to_string(),
        ..Default::default()
    };

    match asset.kind() {
        AssetKind::File(_) => {
            mount.read_only = Some(true);
            mount.sub_path = asset.config_key();
        }
        AssetKind::Pvc { read_only, .. } | AssetKind::Nfs { read_only, .. } => {
            mount.read_only = read_only.then_some(true);
        }
        AssetKind::Temp => {}
    }

    mount
}

/// Container assets first, then shared assets. A container asset identical
/// to a shared one yields a single mount.
pub fn build_volume_mounts(container: &Container, shared_assets: &[Asset]) -> Vec<VolumeMount> {
    let mut seen = HashSet::new();
    container
        .assets
        .iter()
        .chain(shared_assets)
        .map(build_volume_mount)
        .filter(|m| seen.insert((m.name.clone(), m.mount_path.clone())))
        .collect()
}

/// Shared assets first, then per container; the first volume of a given
/// name is kept.
pub fn build_volumes(containers: &[Container], shared_assets: &[Asset]) -> Vec<Volume> {
    let mut seen = HashSet::new();
    shared_assets
        .iter()
        .chain(containers.iter().flat_map(|c| c.assets.iter()))
        .map(build_volume)
        .filter(|v| seen.insert(v.name.clone()))
        .collect()
}
