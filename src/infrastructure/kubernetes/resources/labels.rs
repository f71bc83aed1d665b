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

use super::traits::LabeledResourceBuilder;
use crate::infrastructure::constants::{LABEL_APP, LABEL_CREATED_AT};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

const CREATED_AT_FORMAT: &str = "%Y.%m.%d_%H.%M.%S_UTC";

/// Formats the generation timestamp label value.
pub fn created_at_label(now: DateTime<Utc>) -> String {
    now.format(CREATED_AT_FORMAT).to_string()
}

/// Label set of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLabels {
    app: String,
    created_at: String,
    declared: BTreeMap<String, String>,
}

impl ResourceLabels {
    pub fn new(
        app: impl Into<String>,
        created_at: impl Into<String>,
        declared: BTreeMap<String, String>,
    ) -> Self {
        Self {
            app: app.into(),
            created_at: created_at.into(),
            declared,
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// Only `app.kubernetes.io/name`.
    pub fn identity(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_APP.to_string(), self.app.clone());
        labels
    }
}

impl LabeledResourceBuilder for ResourceLabels {
    /// Fixed labels first; declared labels overwrite them on collision.
    fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = self.identity();
        labels.insert(LABEL_CREATED_AT.to_string(), self.created_at.clone());
        for (k, v) in &self.declared {
            labels.insert(k.clone(), v.clone());
        }
        labels
    }

    fn get_selector_labels(&self) -> BTreeMap<String, String> {
        self.identity()
    }
}
