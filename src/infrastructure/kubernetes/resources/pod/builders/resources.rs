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

use crate::domain::descriptor::BoundsDescriptor;
use crate::infrastructure::constants::RESOURCE_DIMENSIONS;
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Requests from `from` bounds, limits from `to` bounds. Each dimension
/// contributes independently.
pub fn build_resources(resources: &BTreeMap<String, BoundsDescriptor>) -> ResourceRequirements {
    let mut requests = BTreeMap::new();
    let mut limits = BTreeMap::new();

    for dimension in RESOURCE_DIMENSIONS {
        if let Some(bounds) = resources.get(*dimension) {
            if let Some(from) = &bounds.from {
                requests.insert(dimension.to_string(), Quantity(from.clone()));
            }
            if let Some(to) = &bounds.to {
                limits.insert(dimension.to_string(), Quantity(to.clone()));
            }
        }
    }

    ResourceRequirements {
        requests: (!requests.is_empty()).then_some(requests),
        limits: (!limits.is_empty()).then_some(limits),
        ..Default::default()
    }
}
