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

use crate::domain::vars::VariableResolver;
use crate::infrastructure::constants::*;
use crate::infrastructure::secrets::SecretDecryptor;
use crate::shared::error::{BuildError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Inputs needed to locate and load one environment.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentOptions {
    pub name: String,
    /// Root holding one directory per environment (`ENVIRONMENTS_DIR`)
    pub environments_dir: Option<PathBuf>,
    /// Explicit output directory
    pub target_dir: Option<PathBuf>,
    /// Root for output when no explicit directory is given (`TARGET_DIR`)
    pub target_root: Option<PathBuf>,
    pub decrypt_secured: bool,
}

/// One deployment target: where its descriptors live, where output goes and
/// which values substitute into its files.
#[derive(Debug, Clone)]
pub struct Environment {
    name: String,
    environment_dir: PathBuf,
    target_dir: PathBuf,
    namespace: String,
    public_key: Option<String>,
    resolver: VariableResolver,
}

impl Environment {
    /// Builds the environment from directory conventions.
    ///
    /// `process_env` is a snapshot of the process environment; it forms the
    /// lowest-precedence layer of the variable mapping and is never written
    /// back. Secured values are only consulted when `decrypt_secured` is set.
    pub fn load(
        options: &EnvironmentOptions,
        process_env: BTreeMap<String, String>,
        decryptor: &dyn SecretDecryptor,
    ) -> Result<Self> {
        let root = options
            .environments_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(ENVIRONMENTS_DIR));
        let environment_dir = root.join(&options.name);

        let target_dir = match (&options.target_dir, &options.target_root) {
            (Some(dir), _) => dir.clone(),
            (None, Some(root)) => root.join(TARGET_DIR),
            (None, None) => environment_dir.join(TARGET_DIR),
        };

        let mut vars = process_env;
        let mut public_key = None;

        if environment_dir.is_dir() {
            let secured = environment_dir.join(SECURED_FILE_NAME);
            if options.decrypt_secured && secured.is_file() {
                let content = decryptor.decrypt_file(&secured)?;
                let values = parse_environment_json(&secured, &content)?;
                public_key = values.public_key;
                vars.extend(values.environment);
            }

            let unsecured = environment_dir.join(UNSECURED_FILE_NAME);
            if unsecured.is_file() {
                let content = std::fs::read_to_string(&unsecured)?;
                let values = parse_environment_json(&unsecured, &content)?;
                vars.extend(values.environment);
            }
        } else {
            tracing::warn!(
                "Environment directory {} does not exist",
                environment_dir.display()
            );
        }

        let namespace = match vars.get(NAMESPACE_KEY) {
            Some(ns) => ns.clone(),
            None => {
                tracing::warn!(
                    "{} is not set for environment '{}', using the environment name",
                    NAMESPACE_KEY,
                    options.name
                );
                options.name.clone()
            }
        };

        Ok(Self {
            name: options.name.clone(),
            environment_dir,
            target_dir,
            namespace,
            public_key,
            resolver: VariableResolver::new(vars),
        })
    }

    /// Environment with explicit values, bypassing the filesystem.
    pub fn from_parts(
        name: impl Into<String>,
        environment_dir: impl Into<PathBuf>,
        target_dir: impl Into<PathBuf>,
        namespace: impl Into<String>,
        vars: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            environment_dir: environment_dir.into(),
            target_dir: target_dir.into(),
            namespace: namespace.into(),
            public_key: None,
            resolver: VariableResolver::new(vars),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn resolver(&self) -> &VariableResolver {
        &self.resolver
    }

    pub fn environment_dir(&self) -> &Path {
        &self.environment_dir
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.environment_dir.join(APPS_DIR)
    }

    pub fn shared_assets_file(&self) -> PathBuf {
        self.environment_dir.join(SHARED_ASSETS_FILE)
    }

    pub fn release_manifest_file(&self) -> PathBuf {
        self.environment_dir.join(RELEASE_MANIFEST_FILE)
    }

    pub fn replica_profiles_file(&self) -> PathBuf {
        self.environment_dir.join(REPLICA_PROFILES_FILE)
    }

    /// Resolves a path declared in a descriptor relative to the environment.
    pub fn resolve_path(&self, declared: &str) -> PathBuf {
        self.environment_dir.join(declared)
    }

    /// Lists descriptor files (`apps/*.yml`) in name order.
    pub fn descriptor_files(&self) -> Result<Vec<PathBuf>> {
        let apps_dir = self.apps_dir();
        if !apps_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&apps_dir)? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(YAML_EXTENSION)
            {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

struct EnvironmentValues {
    environment: BTreeMap<String, String>,
    public_key: Option<String>,
}

fn parse_environment_json(path: &Path, content: &str) -> Result<EnvironmentValues> {
    let json: serde_json::Value =
        serde_json::from_str(content).map_err(|e| BuildError::json(path, e))?;

    let mut environment = BTreeMap::new();
    if let Some(values) = json.get("environment") {
        let map = values.as_object().ok_or_else(|| {
            BuildError::config_error(path, "'environment' must be an object")
        })?;
        for (k, v) in map {
            environment.insert(k.clone(), json_scalar_to_string(v));
        }
    }

    let public_key = json
        .get(EJSON_PUBLIC_KEY_FIELD)
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(EnvironmentValues {
        environment,
        public_key,
    })
}

fn json_scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::secrets::DisabledDecryptor;
    use std::fs;

    struct FakeDecryptor(String);

    impl SecretDecryptor for FakeDecryptor {
        fn decrypt_file(&self, _path: &Path) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn options(root: &Path, decrypt: bool) -> EnvironmentOptions {
        EnvironmentOptions {
            name: "test".to_string(),
            environments_dir: Some(root.to_path_buf()),
            decrypt_secured: decrypt,
            ..Default::default()
        }
    }

    #[test]
    fn test_value_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let env_dir = dir.path().join("test");
        fs::create_dir_all(&env_dir).unwrap();
        fs::write(
            env_dir.join(UNSECURED_FILE_NAME),
            r#"{"environment": {"NAMESPACE": "tsm-test", "PORT": 8080, "SHARED": "unsecured"}}"#,
        )
        .unwrap();
        fs::write(env_dir.join(SECURED_FILE_NAME), "encrypted").unwrap();

        let decryptor = FakeDecryptor(
            r#"{"_public_key": "abc", "environment": {"SHARED": "secured", "TOKEN": "s3cret"}}"#
                .to_string(),
        );
        let mut process = BTreeMap::new();
        process.insert("TOKEN".to_string(), "from-process".to_string());
        process.insert("HOME".to_string(), "/root".to_string());

        let env = Environment::load(&options(dir.path(), true), process, &decryptor).unwrap();

        assert_eq!(env.namespace(), "tsm-test");
        assert_eq!(env.public_key(), Some("abc"));
        assert_eq!(env.resolver().get("PORT").as_deref(), Some("8080"));
        assert_eq!(env.resolver().get("TOKEN").as_deref(), Some("s3cret"));
        assert_eq!(env.resolver().get("SHARED").as_deref(), Some("unsecured"));
        assert_eq!(env.resolver().get("HOME").as_deref(), Some("/root"));
        assert_eq!(env.target_dir(), env_dir.join("target"));
    }

    #[test]
    fn test_secured_file_ignored_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        let env_dir = dir.path().join("test");
        fs::create_dir_all(&env_dir).unwrap();
        fs::write(env_dir.join(SECURED_FILE_NAME), "encrypted").unwrap();

        let env =
            Environment::load(&options(dir.path(), false), BTreeMap::new(), &DisabledDecryptor)
                .unwrap();

        assert_eq!(env.namespace(), "test");
        assert!(env.public_key().is_none());
    }

    #[test]
    fn test_target_dir_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path(), false);
        opts.target_root = Some(PathBuf::from("/out"));
        let env = Environment::load(&opts, BTreeMap::new(), &DisabledDecryptor).unwrap();
        assert_eq!(env.target_dir(), Path::new("/out/target"));

        opts.target_dir = Some(PathBuf::from("/explicit"));
        let env = Environment::load(&opts, BTreeMap::new(), &DisabledDecryptor).unwrap();
        assert_eq!(env.target_dir(), Path::new("/explicit"));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let env_dir = dir.path().join("test");
        fs::create_dir_all(&env_dir).unwrap();
        fs::write(env_dir.join(UNSECURED_FILE_NAME), "{ not json").unwrap();

        let err = Environment::load(&options(dir.path(), false), BTreeMap::new(), &DisabledDecryptor)
            .unwrap_err();
        assert!(err.to_string().contains(UNSECURED_FILE_NAME));
    }
}
