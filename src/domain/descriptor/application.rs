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

use super::container::ContainerDescriptor;
use super::scalar::scalar_map;
use k8s_openapi::api::core::v1::Toleration;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One `apps/*.yml` file after variable resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationDescriptor {
    pub name: String,
    pub kind: Option<String>,
    pub subdomain_name: Option<String>,
    #[serde(default)]
    pub disable_shared_assets: bool,
    #[serde(default)]
    pub disable_create_service: bool,
    pub strategy: Option<String>,
    pub replicas: Option<i32>,
    pub min_available: Option<IntOrString>,
    pub max_unavailable: Option<IntOrString>,
    #[serde(default)]
    pub registry: Vec<RegistryDescriptor>,
    #[serde(default)]
    pub dns: Vec<HostAliasDescriptor>,
    #[serde(default, deserialize_with = "scalar_map")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "scalar_map")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "scalar_map")]
    pub pod_annotations: BTreeMap<String, String>,
    pub arch: Option<String>,
    #[serde(default, deserialize_with = "scalar_map")]
    pub node_selector: BTreeMap<String, String>,
    #[serde(default)]
    pub tolerations: Vec<Toleration>,
    #[serde(default)]
    pub containers: Vec<ContainerDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDescriptor {
    pub secret_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostAliasDescriptor {
    pub ip: String,
    #[serde(default)]
    pub hostnames: Vec<String>,
}
