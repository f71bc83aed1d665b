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

//! Container environment entries
//!
//! Each descriptor entry is exactly one of a literal value, a secret key
//! reference or a resource field reference.

use crate::domain::descriptor::{EnvVarDescriptor, EnvVarSource as DescriptorSource};
use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, ResourceFieldSelector, SecretKeySelector};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

pub struct EnvironmentBuilder<'a> {
    vars: &'a [EnvVarDescriptor],
}

impl<'a> EnvironmentBuilder<'a> {
    pub fn new(vars: &'a [EnvVarDescriptor]) -> Self {
        Self { vars }
    }

    /// `None` when the container declares no variables.
    pub fn build(self) -> Option<Vec<EnvVar>> {
        if self.vars.is_empty() {
            return None;
        }
        Some(self.vars.iter().map(build_env_var).collect())
    }
}

fn build_env_var(var: &EnvVarDescriptor) -> EnvVar {
    match &var.source {
        DescriptorSource::Literal(value) => EnvVar {
            name: var.name.clone(),
            value: value.clone(),
            ..Default::default()
        },
        DescriptorSource::SecretKey { secret_name, key } => EnvVar {
            name: var.name.clone(),
            value_from: Some(EnvVarSource {
                secret_key_ref: Some(SecretKeySelector {
                    name: secret_name.clone(),
                    key: key.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
        DescriptorSource::ResourceField { resource, divisor } => EnvVar {
            name: var.name.clone(),
            value_from: Some(EnvVarSource {
                resource_field_ref: Some(ResourceFieldSelector {
                    resource: resource.clone(),
                    divisor: divisor.clone().map(Quantity),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}
