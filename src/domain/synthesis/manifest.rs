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

use crate::infrastructure::constants::*;
use crate::shared::error::{BuildError, Result};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    Workload,
    Budget,
    Asset,
    SharedAsset,
    Service,
    Ingress,
    Route,
}

impl ManifestKind {
    /// Directory relative to the target directory.
    pub fn directory(&self) -> &'static str {
        match self {
            ManifestKind::Workload | ManifestKind::Budget => OUTPUT_DIR_DEPLOYMENTS,
            ManifestKind::Asset => OUTPUT_DIR_ASSETS,
            ManifestKind::SharedAsset => OUTPUT_DIR_SHARED_ASSETS,
            ManifestKind::Service => OUTPUT_DIR_SERVICES,
            ManifestKind::Ingress | ManifestKind::Route => OUTPUT_DIR_EXTERNAL,
        }
    }

    pub fn file_suffix(&self) -> Option<&'static str> {
        match self {
            ManifestKind::Workload => Some("deployment"),
            ManifestKind::Budget => Some("budget"),
            ManifestKind::Asset | ManifestKind::SharedAsset => None,
            ManifestKind::Service => Some("service"),
            ManifestKind::Ingress => Some("ingress"),
            ManifestKind::Route => Some("route"),
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManifestKind::Workload => "workload",
            ManifestKind::Budget => "budget",
            ManifestKind::Asset => "asset",
            ManifestKind::SharedAsset => "shared asset",
            ManifestKind::Service => "service",
            ManifestKind::Ingress => "ingress",
            ManifestKind::Route => "route",
        };
        f.write_str(name)
    }
}

/// One synthesized document and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedManifest {
    pub kind: ManifestKind,
    pub name: String,
    pub document: Value,
}

impl GeneratedManifest {
    pub fn new(kind: ManifestKind, name: impl Into<String>, document: Value) -> Self {
        Self {
            kind,
            name: name.into(),
            document,
        }
    }

    pub fn from_resource<T: serde::Serialize>(
        kind: ManifestKind,
        name: impl Into<String>,
        resource: &T,
    ) -> Result<Self> {
        Ok(Self::new(kind, name, serde_json::to_value(resource)?))
    }

    /// e.g. `deployments/tsm-api-deployment.yml` or `assets/api-asset-1a2b3c4.yml`
    pub fn relative_path(&self) -> PathBuf {
        let file_name = match self.kind.file_suffix() {
            Some(suffix) => format!("{}-{}.{}", self.name, suffix, YAML_EXTENSION),
            None => format!("{}.{}", self.name, YAML_EXTENSION),
        };
        PathBuf::from(self.kind.directory()).join(file_name)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.document).map_err(|e| {
            BuildError::Serialization(format!("{} '{}': {}", self.kind, self.name, e))
        })
    }
}
