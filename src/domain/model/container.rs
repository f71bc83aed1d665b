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
use crate::domain::descriptor::{
    BoundsDescriptor, ContainerDescriptor, EnvVarDescriptor, HealthDescriptor, PortDescriptor,
    ProbeDescriptor, StartupDescriptor,
};
use crate::domain::environment::Environment;
use crate::shared::error::{BuildError, Result};
use std::collections::BTreeMap;

/// One container of an application with its assets loaded.
#[derive(Debug, Clone)]
pub struct Container {
    pub name: String,
    pub image: String,
    pub startup: Option<StartupDescriptor>,
    pub env_vars: Vec<EnvVarDescriptor>,
    pub ports: Vec<PortDescriptor>,
    pub resources: BTreeMap<String, BoundsDescriptor>,
    pub health: Option<HealthDescriptor>,
    pub probe: Option<ProbeDescriptor>,
    pub raw: Option<serde_yaml::Mapping>,
    pub assets: Vec<Asset>,
}

impl Container {
    pub fn from_descriptor(
        app_name: &str,
        descriptor: ContainerDescriptor,
        env: &Environment,
    ) -> Result<Self> {
        if descriptor.name.trim().is_empty() {
            return Err(BuildError::InvalidDescriptor(format!(
                "application '{}' has a container without a name",
                app_name
            )));
        }

        let assets = Asset::load_all(app_name, &descriptor.name, env, &descriptor.assets)?;

        Ok(Self {
            name: descriptor.name,
            image: descriptor.image,
            startup: descriptor.startup,
            env_vars: descriptor.env_vars,
            ports: descriptor.ports,
            resources: descriptor.resources,
            health: descriptor.health,
            probe: descriptor.probe,
            raw: descriptor.raw,
            assets,
        })
    }

    /// Request and limit declared for one resource dimension.
    pub fn bounds(&self, dimension: &str) -> (Option<&str>, Option<&str>) {
        match self.resources.get(dimension) {
            Some(bounds) => (bounds.from.as_deref(), bounds.to.as_deref()),
            None => (None, None),
        }
    }
}
