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

use crate::domain::environment::{Environment, EnvironmentOptions};
use crate::domain::model::{load_shared_assets, Application, Asset};
use crate::domain::overrides::{
    apply_downscale, apply_release_overrides, apply_replica_profile, ReleaseManifest,
    ReplicaProfiles,
};
use crate::domain::summary::ResourceSummary;
use crate::domain::synthesis::{GeneratedManifest, ManifestSynthesizer};
use crate::infrastructure::constants::PROFILE_ENV_KEY;
use crate::infrastructure::output::{write_all, ManifestSink};
use crate::infrastructure::secrets::SecretDecryptor;
use crate::shared::error::{BuildError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything a run needs besides the process environment.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub environment: EnvironmentOptions,
    /// Explicit release manifest; must exist when given
    pub release_manifest: Option<PathBuf>,
    pub profile: Option<String>,
    /// Explicit replica profiles file; must exist when given
    pub profile_file: Option<PathBuf>,
    pub downscale: Vec<String>,
}

/// One environment with its applications loaded and overrides applied.
pub struct BuildDescriptor {
    env: Environment,
    shared_assets: Vec<Asset>,
    apps: Vec<Application>,
}

impl BuildDescriptor {
    pub fn load(
        options: &BuildOptions,
        process_env: BTreeMap<String, String>,
        decryptor: &dyn SecretDecryptor,
    ) -> Result<Self> {
        let profile_from_process = process_env.get(PROFILE_ENV_KEY).cloned();
        let env = Environment::load(&options.environment, process_env, decryptor)?;
        tracing::info!(
            "Environment '{}', namespace '{}', target {}",
            env.name(),
            env.namespace(),
            env.target_dir().display()
        );

        let shared_assets = load_shared_assets(&env)?;
        let apps = Application::load_all(&env, &shared_assets)?;

        let mut descriptor = Self {
            env,
            shared_assets,
            apps,
        };
        descriptor.apply_overrides(options, profile_from_process.as_deref())?;
        Ok(descriptor)
    }

    /// Release images, then the replica profile, then downscaling.
    fn apply_overrides(
        &mut self,
        options: &BuildOptions,
        profile_from_process: Option<&str>,
    ) -> Result<()> {
        let default_manifest = self.env.release_manifest_file();
        if let Some(manifest) = load_optional(
            options.release_manifest.as_deref(),
            &default_manifest,
            ReleaseManifest::load,
        )? {
            tracing::info!("Applying release manifest ({} image(s))", manifest.images.len());
            apply_release_overrides(&mut self.apps, &manifest);
        }

        let default_profiles = self.env.replica_profiles_file();
        match load_optional(
            options.profile_file.as_deref(),
            &default_profiles,
            ReplicaProfiles::load,
        )? {
            Some(profiles) => {
                if let Some(profile) =
                    profiles.select(options.profile.as_deref(), profile_from_process)?
                {
                    tracing::info!("Applying replica profile '{}'", profile.name);
                    apply_replica_profile(&mut self.apps, profile);
                }
            }
            None => {
                if let Some(name) = options.profile.as_deref() {
                    return Err(BuildError::config_error(
                        &default_profiles,
                        format!("Replica profile '{}' requested but no profiles file found", name),
                    ));
                }
                if let Some(name) = profile_from_process {
                    tracing::warn!(
                        "{}={} is set but there is no replica profiles file, ignoring",
                        PROFILE_ENV_KEY,
                        name
                    );
                }
            }
        }

        apply_downscale(&mut self.apps, &options.downscale);
        Ok(())
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn apps(&self) -> &[Application] {
        &self.apps
    }

    pub fn shared_assets(&self) -> &[Asset] {
        &self.shared_assets
    }

    pub fn synthesize(&self, created_at: &str) -> Result<Vec<GeneratedManifest>> {
        ManifestSynthesizer::new(self.env.namespace(), created_at)
            .synthesize(&self.apps, &self.shared_assets)
    }

    pub fn summary(&self) -> Result<ResourceSummary> {
        ResourceSummary::from_apps(&self.apps)
    }

    /// Synthesizes every document and hands them to `sink`.
    pub async fn build(&self, sink: &dyn ManifestSink, created_at: &str) -> Result<Vec<PathBuf>> {
        let manifests = self.synthesize(created_at)?;
        write_all(sink, &manifests).await
    }
}

/// An explicit path must exist; the environment default is optional.
fn load_optional<T>(
    explicit: Option<&Path>,
    default: &Path,
    load: fn(&Path) -> Result<T>,
) -> Result<Option<T>> {
    match explicit {
        Some(path) => load(path).map(Some),
        None if default.is_file() => load(default).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::constants::*;
    use crate::infrastructure::secrets::DisabledDecryptor;
    use std::fs;

    fn setup(root: &Path) -> EnvironmentOptions {
        let env_dir = root.join("qa");
        fs::create_dir_all(env_dir.join(APPS_DIR)).unwrap();
        fs::write(env_dir.join(UNSECURED_FILE_NAME), r#"{"environment": {"NAMESPACE": "tsm-qa"}}"#).unwrap();
        fs::write(
            env_dir.join(APPS_DIR).join("api.yml"),
            "name: tsm-api\nreplicas: 2\ncontainers:\n  - name: api\n    image: api:1\n",
        )
        .unwrap();
        fs::write(
            env_dir.join(APPS_DIR).join("ui.yml"),
            "name: tsm-ui\nreplicas: 2\ncontainers:\n  - name: ui\n    image: ui:1\n",
        )
        .unwrap();
        EnvironmentOptions {
            name: "qa".to_string(),
            environments_dir: Some(root.to_path_buf()),
            ..Default::default()
        }
    }

    fn replicas(descriptor: &BuildDescriptor) -> Vec<Option<i32>> {
        descriptor.apps().iter().map(|a| a.replicas).collect()
    }

    #[test]
    fn test_profile_from_process_then_downscale() {
        let dir = tempfile::tempdir().unwrap();
        let environment = setup(dir.path());
        fs::write(
            dir.path().join("qa").join(REPLICA_PROFILES_FILE),
            "profiles:\n  one:\n    all: 1\n  three:\n    all: 3\n",
        )
        .unwrap();

        let mut process_env = BTreeMap::new();
        process_env.insert(PROFILE_ENV_KEY.to_string(), "three".to_string());
        let options = BuildOptions {
            environment,
            downscale: vec!["tsm-ui".to_string()],
            ..Default::default()
        };

        let descriptor = BuildDescriptor::load(&options, process_env, &DisabledDecryptor).unwrap();
        assert_eq!(descriptor.env().namespace(), "tsm-qa");
        assert_eq!(replicas(&descriptor), vec![Some(3), Some(0)]);
    }

    #[test]
    fn test_requested_profile_without_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = BuildOptions {
            environment: setup(dir.path()),
            profile: Some("one".to_string()),
            ..Default::default()
        };

        assert!(BuildDescriptor::load(&options, BTreeMap::new(), &DisabledDecryptor).is_err());
    }

    #[test]
    fn test_explicit_release_manifest_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let options = BuildOptions {
            environment: setup(dir.path()),
            release_manifest: Some(dir.path().join("missing.yml")),
            ..Default::default()
        };

        assert!(BuildDescriptor::load(&options, BTreeMap::new(), &DisabledDecryptor).is_err());
    }

    #[test]
    fn test_default_release_manifest_applied() {
        let dir = tempfile::tempdir().unwrap();
        let options = BuildOptions {
            environment: setup(dir.path()),
            ..Default::default()
        };
        fs::write(
            dir.path().join("qa").join(RELEASE_MANIFEST_FILE),
            "images:\n  - app_name: tsm-api\n    image: reg/api\n    tag: \"9\"\n",
        )
        .unwrap();

        let descriptor = BuildDescriptor::load(&options, BTreeMap::new(), &DisabledDecryptor).unwrap();
        assert_eq!(descriptor.apps()[0].containers[0].image, "reg/api:9");
        assert_eq!(descriptor.apps()[1].containers[0].image, "ui:1");
    }
}
