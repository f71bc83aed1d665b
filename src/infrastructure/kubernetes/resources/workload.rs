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
use super::pod::{merge_container_raw, PodTemplateBuilder};
use super::traits::LabeledResourceBuilder;
use crate::domain::model::{Application, UpdateStrategy, WorkloadKind};
use crate::infrastructure::constants::*;
use crate::shared::error::Result;
use k8s_openapi::api::apps::v1::{
    Deployment, DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment, StatefulSet,
    StatefulSetSpec, StatefulSetUpdateStrategy,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde_json::Value;
use std::collections::BTreeMap;

/// Deployment or StatefulSet of one application.
pub struct WorkloadBuilder<'a> {
    app: &'a Application,
    labels: ResourceLabels,
    namespace: String,
}

impl LabeledResourceBuilder for WorkloadBuilder<'_> {
    fn get_labels(&self) -> BTreeMap<String, String> {
        self.labels.get_labels()
    }

    fn get_selector_labels(&self) -> BTreeMap<String, String> {
        self.labels.get_selector_labels()
    }

    fn get_annotations(&self) -> Option<BTreeMap<String, String>> {
        if self.app.annotations.is_empty() {
            None
        } else {
            Some(self.app.annotations.clone())
        }
    }
}

impl<'a> WorkloadBuilder<'a> {
    pub fn new(app: &'a Application, labels: ResourceLabels, namespace: String) -> Self {
        Self {
            app,
            labels,
            namespace,
        }
    }

    /// Rendered document with container `raw` blocks applied.
    pub fn build(&self) -> Result<Value> {
        let mut document = match self.app.kind {
            WorkloadKind::Deployment => serde_json::to_value(self.build_deployment())?,
            WorkloadKind::StatefulSet => serde_json::to_value(self.build_stateful_set())?,
        };

        let raws: Vec<_> = self.app.containers.iter().map(|c| c.raw.as_ref()).collect();
        if raws.iter().any(Option::is_some) {
            merge_container_raw(&mut document, &raws)?;
        }

        Ok(document)
    }

    fn metadata(&self) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.app.name.clone()),
            namespace: Some(self.namespace.clone()),
            labels: Some(self.get_labels()),
            annotations: self.get_annotations(),
            ..Default::default()
        }
    }

    fn selector(&self) -> LabelSelector {
        LabelSelector {
            match_labels: Some(self.get_selector_labels()),
            ..Default::default()
        }
    }

    pub fn build_deployment(&self) -> Deployment {
        let strategy = match self.app.strategy {
            UpdateStrategy::RollingUpdate => DeploymentStrategy {
                type_: Some(STRATEGY_TYPE_ROLLING_UPDATE.to_string()),
                rolling_update: Some(RollingUpdateDeployment {
                    max_surge: Some(IntOrString::String(MAX_SURGE.to_string())),
                    max_unavailable: Some(IntOrString::String(MAX_UNAVAILABLE.to_string())),
                }),
            },
            UpdateStrategy::Recreate => DeploymentStrategy {
                type_: Some(STRATEGY_TYPE_RECREATE.to_string()),
                rolling_update: None,
            },
        };

        Deployment {
            metadata: self.metadata(),
            spec: Some(DeploymentSpec {
                replicas: self.app.replicas,
                selector: self.selector(),
                strategy: Some(strategy),
                template: PodTemplateBuilder::new(self.app, self.get_selector_labels()).build(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// No `strategy`; a rolling `updateStrategy` and `serviceName` set to the
    /// subdomain for stable per-replica DNS.
    pub fn build_stateful_set(&self) -> StatefulSet {
        StatefulSet {
            metadata: self.metadata(),
            spec: Some(StatefulSetSpec {
                replicas: self.app.replicas,
                selector: self.selector(),
                service_name: self.app.subdomain_name.clone(),
                update_strategy: Some(StatefulSetUpdateStrategy {
                    type_: Some(STRATEGY_TYPE_ROLLING_UPDATE.to_string()),
                    rolling_update: None,
                }),
                template: PodTemplateBuilder::new(self.app, self.get_selector_labels()).build(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::ApplicationDescriptor;
    use crate::domain::environment::Environment;
    use std::path::Path;

    fn app(yaml: &str) -> Application {
        let env = Environment::from_parts("t", "/none", "/none/target", "ns", BTreeMap::new());
        let descriptor: ApplicationDescriptor = serde_yaml::from_str(yaml).unwrap();
        Application::from_descriptor(descriptor, &env, &[], Path::new("app.yml")).unwrap()
    }

    fn build(app: &Application) -> Value {
        let labels = ResourceLabels::new(&app.name, "2024.01.01_00.00.00_UTC", app.labels.clone());
        WorkloadBuilder::new(app, labels, "ns".to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_deployment_defaults() {
        let doc = build(&app("name: tsm-ui\nreplicas: 2\ncontainers:\n  - name: ui\n    image: ui\n"));

        assert_eq!(doc["kind"], "Deployment");
        assert_eq!(doc["apiVersion"], "apps/v1");
        assert_eq!(doc["spec"]["replicas"], 2);
        assert_eq!(doc["spec"]["strategy"]["type"], "RollingUpdate");
        assert_eq!(doc["spec"]["strategy"]["rollingUpdate"]["maxSurge"], "25%");
        assert_eq!(
            doc["spec"]["selector"]["matchLabels"][LABEL_APP],
            "tsm-ui"
        );
        assert_eq!(doc["spec"]["template"]["metadata"]["labels"][LABEL_APP], "tsm-ui");
        assert!(doc["metadata"]["labels"].get(LABEL_CREATED_AT).is_some());
    }

    #[test]
    fn test_recreate_strategy() {
        let doc = build(&app("name: db\nstrategy: recreate\ncontainers: []\n"));
        assert_eq!(doc["spec"]["strategy"]["type"], "Recreate");
        assert!(doc["spec"]["strategy"].get("rollingUpdate").is_none());
    }

    #[test]
    fn test_stateful_set_shape() {
        let doc = build(&app(
            "name: tsm-cache\nkind: StatefulSet\nsubdomain_name: cache\nstrategy: recreate\ncontainers:\n  - name: redis\n    image: redis\n",
        ));

        assert_eq!(doc["kind"], "StatefulSet");
        assert!(doc["spec"].get("strategy").is_none());
        assert_eq!(doc["spec"]["serviceName"], "cache");
        assert_eq!(doc["spec"]["updateStrategy"]["type"], "RollingUpdate");
    }

    #[test]
    fn test_raw_passthrough_wins() {
        let doc = build(&app(
            "name: api\ncontainers:\n  - name: api\n    image: api\n    raw:\n      imagePullPolicy: IfNotPresent\n      securityContext:\n        allowPrivilegeEscalation: false\n",
        ));
        let container = &doc["spec"]["template"]["spec"]["containers"][0];
        assert_eq!(container["imagePullPolicy"], "IfNotPresent");
        assert_eq!(container["securityContext"]["allowPrivilegeEscalation"], false);
    }

    #[test]
    fn test_workload_annotations() {
        let doc = build(&app(
            "name: api\nannotations:\n  argocd.argoproj.io/sync-wave: 2\ncontainers: []\n",
        ));
        assert_eq!(doc["metadata"]["annotations"][ANNOTATION_SYNC_WAVE], "2");
    }
}
