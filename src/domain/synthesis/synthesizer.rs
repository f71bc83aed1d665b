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

//! Turns loaded applications into the full set of generated documents
//!
//! Synthesis is sequential: the shared asset wave depends on every
//! application, so nothing is emitted before all of them are known.

use super::manifest::{GeneratedManifest, ManifestKind};
use super::ordering::shared_asset_wave;
use crate::domain::model::{Application, Asset};
use crate::infrastructure::kubernetes::resources::{
    group_exposed_ports, BudgetBuilder, ConfigMapBuilder, ExternalBuilder, ResourceLabels,
    ServiceBuilder, WorkloadBuilder,
};
use crate::shared::error::{BuildError, Result};
use std::collections::HashMap;
use std::path::PathBuf;

pub struct ManifestSynthesizer {
    namespace: String,
    created_at: String,
}

impl ManifestSynthesizer {
    /// `created_at` is shared by every document of the run.
    pub fn new(namespace: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            created_at: created_at.into(),
        }
    }

    /// Shared assets first, then digest-only assets, then each application
    /// in order. Documents that land on the same path must be identical and
    /// are emitted once.
    pub fn synthesize(
        &self,
        apps: &[Application],
        shared_assets: &[Asset],
    ) -> Result<Vec<GeneratedManifest>> {
        let wave = shared_asset_wave(apps);
        let mut manifests = self.synthesize_shared_assets(shared_assets, wave)?;
        manifests.extend(self.synthesize_digest_only_assets(apps)?);

        for app in apps {
            manifests.extend(self.synthesize_app(app)?);
        }

        deduplicate(manifests)
    }

    pub fn synthesize_shared_assets(
        &self,
        shared_assets: &[Asset],
        wave: Option<i64>,
    ) -> Result<Vec<GeneratedManifest>> {
        tracing::info!("Build {} shared asset(s)", shared_assets.len());
        let builder = ConfigMapBuilder::new(self.namespace.clone(), wave);

        let mut manifests = Vec::new();
        for (i, asset) in shared_assets.iter().enumerate() {
            if let Some(config_map) = builder.build(asset)? {
                tracing::info!(" => asset [{}]: {}", i + 1, asset.resource_name());
                manifests.push(GeneratedManifest::from_resource(
                    ManifestKind::SharedAsset,
                    asset.resource_name(),
                    &config_map,
                )?);
            }
        }
        Ok(manifests)
    }

    /// Digest-only assets are emitted once per name, whichever applications
    /// declare them. The ConfigMap takes the earliest wave of its owners, an
    /// owner without a wave counting as 0.
    pub fn synthesize_digest_only_assets(
        &self,
        apps: &[Application],
    ) -> Result<Vec<GeneratedManifest>> {
        let mut entries: Vec<(&Asset, Option<i64>)> = Vec::new();

        for app in apps {
            let assets = app
                .containers
                .iter()
                .flat_map(|c| c.assets.iter())
                .filter(|a| a.is_digest_only());
            for asset in assets {
                let name = asset.resource_name();
                match entries.iter_mut().find(|(a, _)| a.resource_name() == name) {
                    Some((_, wave)) => *wave = earliest_wave(*wave, app.sync_wave()),
                    None => entries.push((asset, app.sync_wave())),
                }
            }
        }

        let mut manifests = Vec::with_capacity(entries.len());
        for (asset, wave) in entries {
            let builder = ConfigMapBuilder::new(self.namespace.clone(), wave);
            if let Some(config_map) = builder.build(asset)? {
                tracing::info!(" => digest-only asset: {}", asset.resource_name());
                manifests.push(GeneratedManifest::from_resource(
                    ManifestKind::Asset,
                    asset.resource_name(),
                    &config_map,
                )?);
            }
        }
        Ok(manifests)
    }

    /// Documents owned by one application. Digest-only assets are left to
    /// [`Self::synthesize_digest_only_assets`].
    pub fn synthesize_app(&self, app: &Application) -> Result<Vec<GeneratedManifest>> {
        tracing::info!(
            "Application {}, with {} container(s)",
            app.name,
            app.containers.len()
        );

        let labels = ResourceLabels::new(&app.name, &self.created_at, app.labels.clone());
        let mut manifests = Vec::new();

        manifests.extend(self.build_assets(app)?);
        if !app.disable_create_service {
            manifests.extend(self.build_services(app, &labels)?);
        }

        let workload = WorkloadBuilder::new(app, labels.clone(), self.namespace.clone()).build()?;
        manifests.push(GeneratedManifest::new(
            ManifestKind::Workload,
            app.name.clone(),
            workload,
        ));

        let budget = BudgetBuilder::new(labels, self.namespace.clone())
            .build(app.min_available.as_ref(), app.max_unavailable.as_ref());
        if let Some(budget) = budget {
            manifests.push(GeneratedManifest::from_resource(
                ManifestKind::Budget,
                app.name.clone(),
                &budget,
            )?);
        }

        Ok(manifests)
    }

    /// App-scoped asset ConfigMaps inherit the application's wave.
    fn build_assets(&self, app: &Application) -> Result<Vec<GeneratedManifest>> {
        let builder = ConfigMapBuilder::new(self.namespace.clone(), app.sync_wave());

        let mut manifests = Vec::new();
        for (i, container) in app.containers.iter().enumerate() {
            tracing::info!(
                " => container [{}] {} has {} asset(s)",
                i + 1,
                container.name,
                container.assets.len()
            );
            for (j, asset) in container.assets.iter().enumerate() {
                if asset.is_digest_only() {
                    continue;
                }
                if let Some(config_map) = builder.build(asset)? {
                    tracing::info!("   => asset [{}]: {}", j + 1, asset.resource_name());
                    manifests.push(GeneratedManifest::from_resource(
                        ManifestKind::Asset,
                        asset.resource_name(),
                        &config_map,
                    )?);
                }
            }
        }
        Ok(manifests)
    }

    /// One Service per exposed hostname across all containers, followed by
    /// the Ingress or Route of each `external` entry.
    fn build_services(
        &self,
        app: &Application,
        labels: &ResourceLabels,
    ) -> Result<Vec<GeneratedManifest>> {
        let governing_host = app.is_stateful().then(|| app.subdomain_name.clone());
        let services = ServiceBuilder::new(labels.clone(), self.namespace.clone(), governing_host);
        let externals = ExternalBuilder::new(labels.clone(), self.namespace.clone());

        let mut manifests = Vec::new();
        for group in group_exposed_ports(app.containers.iter().flat_map(|c| c.ports.iter())) {
            tracing::info!(
                " => service {}, has {} port(s)",
                group.host_name,
                group.ports.len()
            );
            manifests.push(GeneratedManifest::from_resource(
                ManifestKind::Service,
                group.host_name.clone(),
                &services.build(&group),
            )?);

            for port in &group.ports {
                for external in &port.external {
                    if external.as_route {
                        tracing::info!("   => has external (route) {}", external.name);
                        let route = externals.build_route(&group.host_name, port, external)?;
                        manifests.push(GeneratedManifest::from_resource(
                            ManifestKind::Route,
                            external.name.clone(),
                            &route,
                        )?);
                    } else {
                        tracing::info!("   => has external (ingress) {}", external.name);
                        let ingress = externals.build_ingress(&group.host_name, port, external);
                        manifests.push(GeneratedManifest::from_resource(
                            ManifestKind::Ingress,
                            external.name.clone(),
                            &ingress,
                        )?);
                    }
                }
            }
        }
        Ok(manifests)
    }
}

fn earliest_wave(current: Option<i64>, other: Option<i64>) -> Option<i64> {
    match (current, other) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).min(b.unwrap_or(0))),
    }
}

fn deduplicate(manifests: Vec<GeneratedManifest>) -> Result<Vec<GeneratedManifest>> {
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    let mut result: Vec<GeneratedManifest> = Vec::with_capacity(manifests.len());

    for manifest in manifests {
        let path = manifest.relative_path();
        match seen.get(&path) {
            Some(&index) if result[index].document == manifest.document => {
                tracing::debug!("Skipping duplicate {}", path.display());
            }
            Some(_) => {
                return Err(BuildError::ValidationError(format!(
                    "two different documents would be written to {}",
                    path.display()
                )));
            }
            None => {
                seen.insert(path, result.len());
                result.push(manifest);
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::environment::Environment;
    use crate::domain::model::load_shared_assets;
    use crate::infrastructure::constants::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;

    const CREATED_AT: &str = "2024.01.01_00.00.00_UTC";

    fn setup(dir: &Path) -> Environment {
        fs::create_dir_all(dir.join(APPS_DIR)).unwrap();
        fs::write(dir.join("logback.xml"), "<configuration/>").unwrap();
        fs::write(dir.join("app.conf"), "port=8080").unwrap();
        fs::write(
            dir.join(SHARED_ASSETS_FILE),
            "assets:\n  - file: logback.xml\n    to: /app/logback.xml\n",
        )
        .unwrap();
        Environment::from_parts("test", dir, dir.join("target"), "tsm-test", BTreeMap::new())
    }

    fn find<'a>(manifests: &'a [GeneratedManifest], kind: ManifestKind) -> Vec<&'a GeneratedManifest> {
        manifests.iter().filter(|m| m.kind == kind).collect()
    }

    #[test]
    fn test_full_application() {
        let dir = tempfile::tempdir().unwrap();
        let env = setup(dir.path());
        fs::write(
            dir.path().join(APPS_DIR).join("api.yml"),
            r#"
name: tsm-api
replicas: 2
min_available: 1
labels:
  team: core
annotations:
  argocd.argoproj.io/sync-wave: "-2"
containers:
  - name: api
    image: registry/api:1.0
    assets:
      - file: app.conf
        to: /app/app.conf
      - temp: true
        to: /tmp/work
    ports:
      - name: http
        port: 8080
        expose_as:
          - hostname: tsm-api
            port: 80
            external:
              - name: tsm-api-public
                http:
                  - hostname: api.example.com
"#,
        )
        .unwrap();

        let shared = load_shared_assets(&env).unwrap();
        let apps = Application::load_all(&env, &shared).unwrap();
        let manifests = ManifestSynthesizer::new(env.namespace(), CREATED_AT)
            .synthesize(&apps, &shared)
            .unwrap();

        assert_eq!(find(&manifests, ManifestKind::SharedAsset).len(), 1);
        assert_eq!(find(&manifests, ManifestKind::Asset).len(), 1);
        assert_eq!(find(&manifests, ManifestKind::Service).len(), 1);
        assert_eq!(find(&manifests, ManifestKind::Ingress).len(), 1);
        assert_eq!(find(&manifests, ManifestKind::Workload).len(), 1);
        assert_eq!(find(&manifests, ManifestKind::Budget).len(), 1);

        let shared_cm = &find(&manifests, ManifestKind::SharedAsset)[0].document;
        assert_eq!(shared_cm["metadata"]["annotations"][ANNOTATION_SYNC_WAVE], "-3");
        let app_cm = &find(&manifests, ManifestKind::Asset)[0].document;
        assert_eq!(app_cm["metadata"]["annotations"][ANNOTATION_SYNC_WAVE], "-2");

        let service = &find(&manifests, ManifestKind::Service)[0].document;
        assert_eq!(service["metadata"]["labels"]["team"], "core");
        assert_eq!(service["metadata"]["labels"][LABEL_CREATED_AT], CREATED_AT);

        let workload = &find(&manifests, ManifestKind::Workload)[0].document;
        let volumes = workload["spec"]["template"]["spec"]["volumes"].as_array().unwrap();
        assert_eq!(volumes.len(), 3);
        assert!(volumes[0]["name"].as_str().unwrap().starts_with("tsm-shared-asset-"));
    }

    #[test]
    fn test_disable_create_service_and_route() {
        let dir = tempfile::tempdir().unwrap();
        let env = setup(dir.path());
        let ports = r#"
    ports:
      - name: http
        port: 8080
        expose_as:
          - hostname: tsm-ui
            port: 80
            external:
              - name: tsm-ui
                as_route: true
                http:
                  - hostname: ui.apps.local
"#;
        fs::write(
            dir.path().join(APPS_DIR).join("a.yml"),
            format!("name: a\ndisable_create_service: true\ncontainers:\n  - name: ui\n    image: ui\n{}", ports),
        )
        .unwrap();
        fs::write(
            dir.path().join(APPS_DIR).join("b.yml"),
            format!("name: b\ncontainers:\n  - name: ui\n    image: ui\n{}", ports),
        )
        .unwrap();

        let apps = Application::load_all(&env, &[]).unwrap();
        let manifests = ManifestSynthesizer::new("ns", CREATED_AT)
            .synthesize(&apps, &[])
            .unwrap();

        assert_eq!(find(&manifests, ManifestKind::Service).len(), 1);
        let routes = find(&manifests, ManifestKind::Route);
        assert_eq!(routes.len(), 1);
        assert!(find(&manifests, ManifestKind::Ingress).is_empty());
        assert_eq!(routes[0].document["spec"]["to"]["name"], "tsm-ui");
    }

    #[test]
    fn test_digest_only_asset_shared_by_two_apps() {
        let dir = tempfile::tempdir().unwrap();
        let env = setup(dir.path());
        fs::write(dir.path().join("common.conf"), "level=info").unwrap();
        let app = |name: &str, wave: &str| {
            format!(
                "name: {}\n{}containers:\n  - name: {}\n    image: img\n    assets:\n      - file: common.conf\n        to: /etc/common.conf\n        digest_only: true\n",
                name, wave, name
            )
        };
        fs::write(
            dir.path().join(APPS_DIR).join("a.yml"),
            app("a", "annotations:\n  argocd.argoproj.io/sync-wave: \"2\"\n"),
        )
        .unwrap();
        fs::write(
            dir.path().join(APPS_DIR).join("b.yml"),
            app("b", "annotations:\n  argocd.argoproj.io/sync-wave: \"-1\"\n"),
        )
        .unwrap();

        let apps = Application::load_all(&env, &[]).unwrap();
        let manifests = ManifestSynthesizer::new("ns", CREATED_AT)
            .synthesize(&apps, &[])
            .unwrap();

        let assets = find(&manifests, ManifestKind::Asset);
        assert_eq!(assets.len(), 1);
        let cm = &assets[0].document;
        assert!(cm["metadata"]["name"].as_str().unwrap().starts_with("asset-"));
        assert!(cm["metadata"].get("labels").is_none());
        assert_eq!(cm["metadata"]["annotations"][ANNOTATION_SYNC_WAVE], "-1");
    }

    #[test]
    fn test_sidecar_ports_join_the_hostname_service() {
        let dir = tempfile::tempdir().unwrap();
        let env = setup(dir.path());
        fs::write(
            dir.path().join(APPS_DIR).join("a.yml"),
            r#"
name: a
containers:
  - name: web
    image: web
    ports:
      - name: http
        port: 8080
        expose_as:
          - hostname: a
            port: 80
  - name: metrics
    image: exporter
    ports:
      - name: metrics
        port: 9090
        expose_as:
          - hostname: a
            port: 9090
"#,
        )
        .unwrap();

        let apps = Application::load_all(&env, &[]).unwrap();
        let manifests = ManifestSynthesizer::new("ns", CREATED_AT)
            .synthesize(&apps, &[])
            .unwrap();

        let services = find(&manifests, ManifestKind::Service);
        assert_eq!(services.len(), 1);
        let ports = services[0].document["spec"]["ports"].as_array().unwrap();
        let names: Vec<_> = ports.iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["http-80", "metrics-9090"]);
    }

    #[test]
    fn test_earliest_wave() {
        assert_eq!(earliest_wave(None, None), None);
        assert_eq!(earliest_wave(Some(3), None), Some(0));
        assert_eq!(earliest_wave(Some(-2), Some(1)), Some(-2));
    }

    #[test]
    fn test_conflicting_paths_rejected() {
        let a = GeneratedManifest::new(ManifestKind::Service, "x", serde_json::json!({"a": 1}));
        let b = GeneratedManifest::new(ManifestKind::Service, "x", serde_json::json!({"a": 2}));
        assert!(deduplicate(vec![a.clone(), a.clone()]).unwrap().len() == 1);
        assert!(deduplicate(vec![a, b]).is_err());
    }
}
