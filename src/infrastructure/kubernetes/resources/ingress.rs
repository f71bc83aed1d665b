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

//! External exposure: networking/v1 Ingress or an OpenShift Route

use super::labels::ResourceLabels;
use super::service::ExposedPort;
use super::traits::LabeledResourceBuilder;
use crate::domain::descriptor::ExternalDescriptor;
use crate::infrastructure::constants::*;
use crate::shared::error::{BuildError, Result};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: RouteSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    pub host: String,
    pub port: RoutePort,
    pub to: RouteTarget,
    pub wildcard_policy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    pub target_port: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteTarget {
    pub kind: String,
    pub name: String,
}

pub struct ExternalBuilder {
    labels: ResourceLabels,
    namespace: String,
}

impl LabeledResourceBuilder for ExternalBuilder {
    fn get_labels(&self) -> BTreeMap<String, String> {
        self.labels.get_labels()
    }
}

impl ExternalBuilder {
    pub fn new(labels: ResourceLabels, namespace: String) -> Self {
        Self { labels, namespace }
    }

    fn metadata(&self, external: &ExternalDescriptor) -> ObjectMeta {
        ObjectMeta {
            name: Some(external.name.clone()),
            namespace: Some(self.namespace.clone()),
            labels: Some(self.get_labels()),
            annotations: if external.annotations.is_empty() {
                None
            } else {
                Some(external.annotations.clone())
            },
            ..Default::default()
        }
    }

    /// Rules from `http` hosts, TLS entries from `https` hosts.
    pub fn build_ingress(
        &self,
        service_host: &str,
        port: &ExposedPort,
        external: &ExternalDescriptor,
    ) -> Ingress {
        let rules: Vec<IngressRule> = external
            .http
            .iter()
            .map(|host| IngressRule {
                host: Some(host.hostname.clone()),
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        path: Some(
                            host.path
                                .clone()
                                .unwrap_or_else(|| INGRESS_DEFAULT_PATH.to_string()),
                        ),
                        path_type: INGRESS_PATH_TYPE.to_string(),
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: service_host.to_string(),
                                port: Some(ServiceBackendPort {
                                    number: Some(port.port),
                                    ..Default::default()
                                }),
                            }),
                            ..Default::default()
                        },
                    }],
                }),
            })
            .collect();

        let tls: Vec<IngressTLS> = external
            .https
            .iter()
            .map(|host| IngressTLS {
                hosts: Some(vec![host.hostname.clone()]),
                secret_name: host.secret_name.clone(),
            })
            .collect();

        Ingress {
            metadata: self.metadata(external),
            spec: Some(IngressSpec {
                rules: (!rules.is_empty()).then_some(rules),
                tls: (!tls.is_empty()).then_some(tls),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// The route host is the first `http` hostname.
    pub fn build_route(
        &self,
        service_host: &str,
        port: &ExposedPort,
        external: &ExternalDescriptor,
    ) -> Result<Route> {
        let host = external.http.first().ok_or_else(|| {
            BuildError::ValidationError(format!(
                "route '{}' needs at least one 'http' hostname",
                external.name
            ))
        })?;

        Ok(Route {
            api_version: ROUTE_API_VERSION.to_string(),
            kind: ROUTE_KIND.to_string(),
            metadata: self.metadata(external),
            spec: RouteSpec {
                host: host.hostname.clone(),
                port: RoutePort {
                    target_port: port.name.clone(),
                },
                to: RouteTarget {
                    kind: "Service".to_string(),
                    name: service_host.to_string(),
                },
                wildcard_policy: ROUTE_WILDCARD_POLICY_NONE.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exposed(external: &str) -> ExposedPort {
        ExposedPort {
            name: "http-80".to_string(),
            port: 80,
            target_port: 8080,
            external: serde_yaml::from_str(external).unwrap(),
        }
    }

    fn builder() -> ExternalBuilder {
        ExternalBuilder::new(
            ResourceLabels::new("tsm-ui", "2024.01.01_00.00.00_UTC", BTreeMap::new()),
            "ns".to_string(),
        )
    }

    #[test]
    fn test_ingress_rules_and_tls() {
        let port = exposed(
            r#"
- name: tsm-ingress
  annotations:
    nginx.ingress.kubernetes.io/proxy-body-size: 10m
  http:
    - hostname: tsm.example.com
  https:
    - hostname: tsm.example.com
      secret_name: tsm-tls
    - hostname: alt.example.com
"#,
        );
        let ingress = builder().build_ingress("tsm-ui", &port, &port.external[0]);
        let value = serde_json::to_value(&ingress).unwrap();

        assert_eq!(value["apiVersion"], "networking.k8s.io/v1");
        assert_eq!(value["spec"]["rules"][0]["http"]["paths"][0]["path"], "/");
        assert_eq!(
            value["spec"]["rules"][0]["http"]["paths"][0]["backend"]["service"]["port"]["number"],
            80
        );
        assert_eq!(value["spec"]["tls"][0]["secretName"], "tsm-tls");
        assert!(value["spec"]["tls"][1].get("secretName").is_none());
        assert_eq!(
            value["metadata"]["annotations"]["nginx.ingress.kubernetes.io/proxy-body-size"],
            "10m"
        );
    }

    #[test]
    fn test_route_shape() {
        let port = exposed("- name: tsm-route\n  as_route: true\n  http:\n    - hostname: tsm.apps.local\n");
        let route = builder()
            .build_route("tsm-ui", &port, &port.external[0])
            .unwrap();
        let value = serde_json::to_value(&route).unwrap();

        assert_eq!(value["apiVersion"], ROUTE_API_VERSION);
        assert_eq!(value["spec"]["host"], "tsm.apps.local");
        assert_eq!(value["spec"]["port"]["targetPort"], "http-80");
        assert_eq!(value["spec"]["to"]["name"], "tsm-ui");
        assert_eq!(value["spec"]["wildcardPolicy"], "None");
    }

    #[test]
    fn test_route_without_host_fails() {
        let port = exposed("- name: tsm-route\n  as_route: true\n");
        assert!(builder()
            .build_route("tsm-ui", &port, &port.external[0])
            .is_err());
    }
}
