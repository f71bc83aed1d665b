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
use crate::domain::descriptor::{ExternalDescriptor, PortDescriptor};
use crate::infrastructure::constants::PROTOCOL_TCP;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

/// One `expose_as` entry resolved against its container port.
#[derive(Debug, Clone)]
pub struct ExposedPort {
    /// `<port name>-<exposed port>`
    pub name: String,
    pub port: i32,
    pub target_port: i32,
    pub external: Vec<ExternalDescriptor>,
}

/// All exposed ports of an application that share one service hostname.
#[derive(Debug, Clone)]
pub struct ServiceGroup {
    pub host_name: String,
    pub ports: Vec<ExposedPort>,
}

/// Groups exposures by hostname, keeping first-seen hostname order. Ports of
/// different containers exposed on one hostname end up in the same group.
pub fn group_exposed_ports<'a>(
    ports: impl IntoIterator<Item = &'a PortDescriptor>,
) -> Vec<ServiceGroup> {
    let mut groups: Vec<ServiceGroup> = Vec::new();

    for port in ports {
        for expose in &port.expose_as {
            let exposed = ExposedPort {
                name: format!("{}-{}", port.name, expose.port),
                port: expose.port,
                target_port: port.port,
                external: expose.external.clone(),
            };
            match groups.iter_mut().find(|g| g.host_name == expose.hostname) {
                Some(group) => group.ports.push(exposed),
                None => groups.push(ServiceGroup {
                    host_name: expose.hostname.clone(),
                    ports: vec![exposed],
                }),
            }
        }
    }

    groups
}

pub struct ServiceBuilder {
    labels: ResourceLabels,
    namespace: String,
    /// Hostname of the StatefulSet governing service, emitted headless.
    governing_host: Option<String>,
}

impl LabeledResourceBuilder for ServiceBuilder {
    fn get_labels(&self) -> BTreeMap<String, String> {
        self.labels.get_labels()
    }

    fn get_selector_labels(&self) -> BTreeMap<String, String> {
        self.labels.get_selector_labels()
    }
}

impl ServiceBuilder {
    pub fn new(labels: ResourceLabels, namespace: String, governing_host: Option<String>) -> Self {
        Self {
            labels,
            namespace,
            governing_host,
        }
    }

    pub fn build(&self, group: &ServiceGroup) -> Service {
        let ports = group
            .ports
            .iter()
            .map(|p| self.create_service_port(p))
            .collect();

        let headless = self.governing_host.as_deref() == Some(group.host_name.as_str());

        Service {
            metadata: ObjectMeta {
                name: Some(group.host_name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.get_labels()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                cluster_ip: headless.then(|| "None".to_string()),
                ports: Some(ports),
                selector: Some(self.get_selector_labels()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn create_service_port(&self, port: &ExposedPort) -> ServicePort {
        ServicePort {
            name: Some(port.name.clone()),
            port: port.port,
            target_port: Some(IntOrString::Int(port.target_port)),
            protocol: Some(PROTOCOL_TCP.to_string()),
            ..Default::default()
        }
    }
}
