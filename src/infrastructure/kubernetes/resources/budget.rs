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

use super::labels::ResourceLabels;
use super::traits::LabeledResourceBuilder;
use k8s_openapi::api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

pub struct BudgetBuilder {
    labels: ResourceLabels,
    namespace: String,
}

impl LabeledResourceBuilder for BudgetBuilder {
    fn get_labels(&self) -> BTreeMap<String, String> {
        self.labels.get_labels()
    }

    fn get_selector_labels(&self) -> BTreeMap<String, String> {
        self.labels.get_selector_labels()
    }
}

impl BudgetBuilder {
    pub fn new(labels: ResourceLabels, namespace: String) -> Self {
        Self { labels, namespace }
    }

    /// `None` without thresholds. `min_available` wins when both are set.
    pub fn build(
        &self,
        min_available: Option<&IntOrString>,
        max_unavailable: Option<&IntOrString>,
    ) -> Option<PodDisruptionBudget> {
        let (min_available, max_unavailable) = match (min_available, max_unavailable) {
            (None, None) => return None,
            (Some(min), _) => (Some(min.clone()), None),
            (None, Some(max)) => (None, Some(max.clone())),
        };

        Some(PodDisruptionBudget {
            metadata: ObjectMeta {
                name: Some(self.labels.app().to_string()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.get_labels()),
                ..Default::default()
            },
            spec: Some(PodDisruptionBudgetSpec {
                min_available,
                max_unavailable,
                selector: Some(LabelSelector {
                    match_labels: Some(self.get_selector_labels()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}
