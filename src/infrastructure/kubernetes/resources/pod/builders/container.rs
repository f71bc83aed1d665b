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

use super::env::EnvironmentBuilder;
use super::probe::build_probes;
use super::resources::build_resources;
use super::volumes::build_volume_mounts;
use crate::domain::model::{Asset, Container};
use crate::infrastructure::constants::{IMAGE_PULL_POLICY_ALWAYS, PROTOCOL_TCP};
use k8s_openapi::api::core::v1::{Container as ContainerSpec, ContainerPort};

/// Typed container spec of one application container. `raw` is not applied
/// here; it is merged into the rendered document.
pub struct ContainerBuilder<'a> {
    container: &'a Container,
    shared_assets: &'a [Asset],
}

impl<'a> ContainerBuilder<'a> {
    pub fn new(container: &'a Container, shared_assets: &'a [Asset]) -> Self {
        Self {
            container,
            shared_assets,
        }
    }

    pub fn build(&self) -> ContainerSpec {
        let c = self.container;
        let probes = build_probes(c.health.as_ref(), c.probe.as_ref());
        let mounts = build_volume_mounts(c, self.shared_assets);

        ContainerSpec {
            name: c.name.clone(),
            image: Some(c.image.clone()),
            image_pull_policy: Some(IMAGE_PULL_POLICY_ALWAYS.to_string()),
            command: c.startup.as_ref().map(|s| s.command.clone()),
            args: c.startup.as_ref().map(|s| s.arguments.clone()),
            ports: self.build_ports(),
            env: EnvironmentBuilder::new(&c.env_vars).build(),
            resources: Some(build_resources(&c.resources)),
            volume_mounts: (!mounts.is_empty()).then_some(mounts),
            liveness_probe: probes.liveness,
            readiness_probe: probes.readiness,
            startup_probe: probes.startup,
            ..Default::default()
        }
    }

    fn build_ports(&self) -> Option<Vec<ContainerPort>> {
        if self.container.ports.is_empty() {
            return None;
        }
        Some(
            self.container
                .ports
                .iter()
                .map(|p| ContainerPort {
                    name: Some(p.name.clone()),
                    container_port: p.port,
                    protocol: Some(PROTOCOL_TCP.to_string()),
                    ..Default::default()
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::ContainerDescriptor;
    use crate::domain::environment::Environment;
    use std::collections::BTreeMap;

    #[test]
    fn test_container_spec() {
        let env = Environment::from_parts("t", "/none", "/none/target", "ns", BTreeMap::new());
        let descriptor: ContainerDescriptor = serde_yaml::from_str(
            r#"
name: api
image: registry/api:1.0
startup:
  command: [/bin/sh]
  arguments: [/app/start.sh, 8080]
ports:
  - name: http
    port: 8080
resources:
  cpu: { from: 100m }
health:
  http: { path: /health, port: 8080 }
"#,
        )
        .unwrap();
        let container = Container::from_descriptor("api", descriptor, &env).unwrap();

        let spec = ContainerBuilder::new(&container, &[]).build();
        assert_eq!(spec.image_pull_policy.as_deref(), Some("Always"));
        assert_eq!(spec.command, Some(vec!["/bin/sh".to_string()]));
        assert_eq!(
            spec.args,
            Some(vec!["/app/start.sh".to_string(), "8080".to_string()])
        );
        let port = &spec.ports.unwrap()[0];
        assert_eq!(port.container_port, 8080);
        assert_eq!(port.protocol.as_deref(), Some("TCP"));
        assert!(spec.env.is_none());
        assert!(spec.volume_mounts.is_none());
        assert!(spec.resources.unwrap().limits.is_none());
        assert!(spec.liveness_probe.is_some() && spec.readiness_probe.is_some());
    }
}
