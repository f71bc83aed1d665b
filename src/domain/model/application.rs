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

use super::asset::Asset;
use super::container::Container;
use crate::domain::descriptor::{
    ApplicationDescriptor, HostAliasDescriptor, SharedAssetsDescriptor,
};
use crate::domain::environment::Environment;
use crate::domain::vars::DescriptorPipeline;
use crate::infrastructure::constants::*;
use crate::shared::error::{BuildError, Result};
use k8s_openapi::api::core::v1::Toleration;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
}

impl WorkloadKind {
    pub fn parse(value: Option<&str>) -> std::result::Result<Self, String> {
        match value {
            None => Ok(WorkloadKind::Deployment),
            Some(v) if v.eq_ignore_ascii_case(KIND_DEPLOYMENT) => Ok(WorkloadKind::Deployment),
            Some(v) if v.eq_ignore_ascii_case(KIND_STATEFUL_SET) => Ok(WorkloadKind::StatefulSet),
            Some(other) => Err(format!(
                "unsupported kind '{}', expected {} or {}",
                other, KIND_DEPLOYMENT, KIND_STATEFUL_SET
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => KIND_DEPLOYMENT,
            WorkloadKind::StatefulSet => KIND_STATEFUL_SET,
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    RollingUpdate,
    Recreate,
}

impl UpdateStrategy {
    fn parse(app: &str, value: Option<&str>) -> Self {
        match value {
            None => UpdateStrategy::RollingUpdate,
            Some(v) if v.eq_ignore_ascii_case("recreate") => UpdateStrategy::Recreate,
            Some(v) if v.eq_ignore_ascii_case("rollingupdate") => UpdateStrategy::RollingUpdate,
            Some(other) => {
                tracing::warn!(
                    "Application '{}' declares unknown strategy '{}', using {}",
                    app,
                    other,
                    STRATEGY_TYPE_ROLLING_UPDATE
                );
                UpdateStrategy::RollingUpdate
            }
        }
    }
}

/// A fully loaded application ready for overrides and synthesis.
#[derive(Debug, Clone)]
pub struct Application {
    pub name: String,
    pub kind: WorkloadKind,
    pub subdomain_name: String,
    pub replicas: Option<i32>,
    pub strategy: UpdateStrategy,
    pub min_available: Option<IntOrString>,
    pub max_unavailable: Option<IntOrString>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub pod_annotations: BTreeMap<String, String>,
    pub arch: Option<String>,
    pub node_selector: BTreeMap<String, String>,
    pub tolerations: Vec<Toleration>,
    pub registry_secrets: Vec<String>,
    pub host_aliases: Vec<HostAliasDescriptor>,
    pub disable_create_service: bool,
    pub containers: Vec<Container>,
    /// Shared assets mounted into every container, empty when disabled.
    pub shared_assets: Vec<Asset>,
    pub source: PathBuf,
}

impl Application {
    /// Runs a descriptor file through variable resolution and loads it.
    pub fn load(path: &Path, env: &Environment, shared_assets: &[Asset]) -> Result<Self> {
        let descriptor: ApplicationDescriptor =
            DescriptorPipeline::new(env.resolver()).load(path)?;
        Self::from_descriptor(descriptor, env, shared_assets, path).map_err(|e| e.in_file(path))
    }

    /// Loads every `apps/*.yml` descriptor of the environment in name order.
    pub fn load_all(env: &Environment, shared_assets: &[Asset]) -> Result<Vec<Self>> {
        env.descriptor_files()?
            .iter()
            .map(|path| Self::load(path, env, shared_assets))
            .collect()
    }

    pub fn from_descriptor(
        descriptor: ApplicationDescriptor,
        env: &Environment,
        shared_assets: &[Asset],
        source: &Path,
    ) -> Result<Self> {
        let kind = WorkloadKind::parse(descriptor.kind.as_deref())
            .map_err(BuildError::InvalidDescriptor)?;

        if let Some(wave) = descriptor.annotations.get(ANNOTATION_SYNC_WAVE) {
            if wave.trim().parse::<i64>().is_err() {
                return Err(BuildError::InvalidDescriptor(format!(
                    "annotation '{}' must be an integer, found '{}'",
                    ANNOTATION_SYNC_WAVE, wave
                )));
            }
        }

        let strategy = UpdateStrategy::parse(&descriptor.name, descriptor.strategy.as_deref());
        let name = descriptor.name;

        let containers = descriptor
            .containers
            .into_iter()
            .map(|c| Container::from_descriptor(&name, c, env))
            .collect::<Result<Vec<_>>>()?;

        let shared_assets = if descriptor.disable_shared_assets {
            Vec::new()
        } else {
            shared_assets.to_vec()
        };

        tracing::debug!(
            "Loaded application '{}' ({}) with {} container(s)",
            name,
            kind,
            containers.len()
        );

        Ok(Self {
            subdomain_name: descriptor.subdomain_name.unwrap_or_else(|| name.clone()),
            name,
            kind,
            replicas: descriptor.replicas,
            strategy,
            min_available: descriptor.min_available,
            max_unavailable: descriptor.max_unavailable,
            labels: descriptor.labels,
            annotations: descriptor.annotations,
            pod_annotations: descriptor.pod_annotations,
            arch: descriptor.arch,
            node_selector: descriptor.node_selector,
            tolerations: descriptor.tolerations,
            registry_secrets: descriptor
                .registry
                .into_iter()
                .map(|r| r.secret_name)
                .collect(),
            host_aliases: descriptor.dns,
            disable_create_service: descriptor.disable_create_service,
            containers,
            shared_assets,
            source: source.to_path_buf(),
        })
    }

    pub fn is_stateful(&self) -> bool {
        self.kind == WorkloadKind::StatefulSet
    }

    pub fn has_budget(&self) -> bool {
        self.min_available.is_some() || self.max_unavailable.is_some()
    }

    /// Declared sync wave, validated as an integer at load time.
    pub fn sync_wave(&self) -> Option<i64> {
        self.annotations
            .get(ANNOTATION_SYNC_WAVE)
            .and_then(|w| w.trim().parse().ok())
    }

    pub fn container_mut(&mut self, name: &str) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.name == name)
    }
}

/// Loads `shared.assets.yml`; a missing file means no shared assets.
pub fn load_shared_assets(env: &Environment) -> Result<Vec<Asset>> {
    let path = env.shared_assets_file();
    if !path.is_file() {
        tracing::debug!("No shared assets file at {}", path.display());
        return Ok(Vec::new());
    }

    let descriptor: SharedAssetsDescriptor = DescriptorPipeline::new(env.resolver()).load(&path)?;
    Asset::load_all(
        SHARED_ASSET_APP_NAME,
        SHARED_ASSET_APP_NAME,
        env,
        &descriptor.assets,
    )
}
