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

use super::builders::{build_volumes, ContainerBuilder};
use crate::domain::model::Application;
use crate::infrastructure::constants::LABEL_ARCH;
use k8s_openapi::api::core::v1::{HostAlias, LocalObjectReference, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Pod template of an application's workload.
pub struct PodTemplateBuilder<'a> {
    app: &'a Application,
    labels: BTreeMap<String, String>,
}

impl<'a> PodTemplateBuilder<'a> {
    pub fn new(app: &'a Application, labels: BTreeMap<String, String>) -> Self {
        Self { app, labels }
    }

    pub fn build(&self) -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(self.labels.clone()),
                annotations: if self.app.pod_annotations.is_empty() {
                    None
                } else {
                    Some(self.app.pod_annotations.clone())
                },
                ..Default::default()
            }),
            spec: Some(self.build_pod_spec()),
        }
    }

    pub fn build_pod_spec(&self) -> PodSpec {
        let app = self.app;
        let volumes = build_volumes(&app.containers, &app.shared_assets);

        PodSpec {
            node_selector: self.build_node_selector(),
            tolerations: if app.tolerations.is_empty() {
                None
            } else {
                Some(app.tolerations.clone())
            },
            containers: app
                .containers
                .iter()
                .map(|c| ContainerBuilder::new(c, &app.shared_assets).build())
                .collect(),
            image_pull_secrets: Some(
                app.registry_secrets
                    .iter()
                    .map(|name| LocalObjectReference { name: name.clone() })
                    .collect(),
            ),
            host_aliases: if app.host_aliases.is_empty() {
                None
            } else {
                Some(
                    app.host_aliases
                        .iter()
                        .map(|h| HostAlias {
                            ip: h.ip.clone(),
                            hostnames: Some(h.hostnames.clone()),
                        })
                        .collect(),
                )
            },
            volumes: Some(volumes),
            ..Default::default()
        }
    }

    /// `kubernetes.io/arch` from `arch`, then the explicit selector.
    fn build_node_selector(&self) -> Option<BTreeMap<String, String>> {
        let mut selector = BTreeMap::new();
        if let Some(arch) = &self.app.arch {
            selector.insert(LABEL_ARCH.to_string(), arch.clone());
        }
        for (k, v) in &self.app.node_selector {
            selector.insert(k.clone(), v.clone());
        }
        (!selector.is_empty()).then_some(selector)
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

    #[test]
    fn test_pod_spec_fields() {
        let app = app(
            r#"
name: tsm-api
arch: arm64
node_selector:
  pool: apps
tolerations:
  - key: dedicated
    operator: Exists
registry:
  - secret_name: tsm-docker-registry
dns:
  - ip: 10.0.0.5
    hostnames: [db.local]
pod_annotations:
  prometheus.io/scrape: "true"
containers:
  - name: api
    image: api
  - name: proxy
    image: proxy
"#,
        );

        let template = PodTemplateBuilder::new(&app, BTreeMap::new()).build();
        let metadata = template.metadata.unwrap();
        assert_eq!(
            metadata.annotations.unwrap().get("prometheus.io/scrape").map(String::as_str),
            Some("true")
        );

        let spec = template.spec.unwrap();
        let selector = spec.node_selector.unwrap();
        assert_eq!(selector.get(LABEL_ARCH).map(String::as_str), Some("arm64"));
        assert_eq!(selector.get("pool").map(String::as_str), Some("apps"));
        assert_eq!(spec.tolerations.unwrap()[0].key.as_deref(), Some("dedicated"));
        let names: Vec<_> = spec.containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["api", "proxy"]);
        assert_eq!(spec.image_pull_secrets.unwrap()[0].name, "tsm-docker-registry");
        assert_eq!(spec.host_aliases.unwrap()[0].ip, "10.0.0.5");
    }

    #[test]
    fn test_minimal_pod_spec() {
        let app = app("name: tsm-ui\ncontainers:\n  - name: ui\n    image: ui\n");
        let spec = PodTemplateBuilder::new(&app, BTreeMap::new()).build_pod_spec();

        assert!(spec.node_selector.is_none());
        assert!(spec.host_aliases.is_none());
        assert!(spec.tolerations.is_none());
        assert_eq!(spec.volumes, Some(Vec::new()));
    }
}
