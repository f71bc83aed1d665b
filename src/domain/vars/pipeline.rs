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

//! Two-stage descriptor resolution
//!
//! 1. environment placeholders are resolved on the raw file text;
//! 2. the text is parsed, the `vars` block is lifted out and the rest of the
//!    document is rendered back to YAML;
//! 3. declared variables are resolved over that normalized text;
//! 4. the result is parsed into the typed descriptor.
//!
//! Each stage is a separate method so ordering can be exercised in isolation.

use crate::domain::vars::resolver::{Variable, VariableResolver};
use crate::shared::error::{BuildError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

const VARS_KEY: &str = "vars";

#[derive(Debug, Deserialize)]
struct VarDeclaration {
    name: String,
    value: serde_yaml::Value,
}

/// Output of the lifting stage: normalized text without `vars` and the
/// variables that were declared in it.
#[derive(Debug, Clone)]
pub struct LiftedDescriptor {
    pub text: String,
    pub vars: Vec<Variable>,
}

pub struct DescriptorPipeline<'a> {
    resolver: &'a VariableResolver,
}

impl<'a> DescriptorPipeline<'a> {
    pub fn new(resolver: &'a VariableResolver) -> Self {
        Self { resolver }
    }

    /// Reads `path` and runs every stage over its content.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BuildError::config_error(path, format!("Failed to read descriptor: {}", e))
        })?;
        self.run(path, &raw)
    }

    pub fn run<T: DeserializeOwned>(&self, path: &Path, raw: &str) -> Result<T> {
        let text = self.resolve_environment(raw);
        let lifted = self.lift_vars(path, &text)?;
        let text = self.resolve_declared(&lifted);

        tracing::debug!(
            "Resolved {} declared variable(s) in {}",
            lifted.vars.len(),
            path.display()
        );

        serde_yaml::from_str(&text).map_err(|e| BuildError::yaml(path, e))
    }

    /// Only the `${{env: NAME}}` form; bare `{{ NAME }}` placeholders in a
    /// descriptor are left for the container to resolve at runtime.
    pub fn resolve_environment(&self, raw: &str) -> String {
        self.resolver.resolve_env_scope(raw)
    }

    pub fn lift_vars(&self, path: &Path, text: &str) -> Result<LiftedDescriptor> {
        let mut doc: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| BuildError::yaml(path, e))?;

        let declared = match doc.as_mapping_mut() {
            Some(mapping) => mapping.remove(VARS_KEY),
            None => None,
        };

        let vars = match declared {
            Some(value) if !value.is_null() => {
                let declarations: Vec<VarDeclaration> =
                    serde_yaml::from_value(value).map_err(|e| BuildError::yaml(path, e))?;
                declarations
                    .iter()
                    .map(|d| Variable::from_yaml(&d.name, &d.value).map_err(|e| e.in_file(path)))
                    .collect::<Result<Vec<_>>>()?
            }
            _ => Vec::new(),
        };

        let text = serde_yaml::to_string(&doc).map_err(|e| BuildError::yaml(path, e))?;
        Ok(LiftedDescriptor { text, vars })
    }

    pub fn resolve_declared(&self, lifted: &LiftedDescriptor) -> String {
        self.resolver
            .with_declared(&lifted.vars)
            .resolve_declared(&lifted.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vars::resolver::VarValue;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn resolver() -> VariableResolver {
        let mut env = BTreeMap::new();
        env.insert("REGISTRY".to_string(), "registry.local:8443".to_string());
        VariableResolver::new(env)
    }

    #[test]
    fn test_lift_removes_vars_block() {
        let r = resolver();
        let pipeline = DescriptorPipeline::new(&r);
        let text = "name: app\nvars:\n  - name: REPLICAS\n    value: 2\nreplicas: ${{var:REPLICAS}}\n";
        let lifted = pipeline
            .lift_vars(&PathBuf::from("app.yml"), text)
            .unwrap();

        assert!(!lifted.text.contains("vars"));
        assert_eq!(
            lifted.vars,
            vec![Variable::new("REPLICAS", VarValue::Integer(2))]
        );
    }

    #[test]
    fn test_integer_var_parses_as_number() {
        let r = resolver();
        let pipeline = DescriptorPipeline::new(&r);
        let text = "name: app\nvars:\n  - name: REPLICAS\n    value: 4\nreplicas: \"${{var:REPLICAS}}\"\n";
        let value: serde_yaml::Value = pipeline.run(&PathBuf::from("app.yml"), text).unwrap();

        assert_eq!(value["replicas"].as_i64(), Some(4));
    }

    #[test]
    fn test_env_then_var_stages() {
        let r = resolver();
        let pipeline = DescriptorPipeline::new(&r);
        let text = "name: app\nvars:\n  - name: TAG\n    value: \"1.0\"\nimage: ${{env:REGISTRY}}/app:${{var:TAG}}\n";
        let value: serde_yaml::Value = pipeline.run(&PathBuf::from("app.yml"), text).unwrap();

        assert_eq!(value["image"].as_str(), Some("registry.local:8443/app:1.0"));
    }

    #[test]
    fn test_bare_placeholder_survives_descriptor() {
        let mut env = BTreeMap::new();
        env.insert("SERVICE_NAME".to_string(), "billing".to_string());
        let r = VariableResolver::new(env);
        let pipeline = DescriptorPipeline::new(&r);
        let text = "name: app\nargs:\n  - /app/{{ SERVICE_NAME }}.json.tpl\n  - ${{env:SERVICE_NAME}}\n";
        let value: serde_yaml::Value = pipeline.run(&PathBuf::from("app.yml"), text).unwrap();

        assert_eq!(value["args"][0].as_str(), Some("/app/{{ SERVICE_NAME }}.json.tpl"));
        assert_eq!(value["args"][1].as_str(), Some("billing"));
    }

    #[test]
    fn test_malformed_yaml_names_file() {
        let r = resolver();
        let pipeline = DescriptorPipeline::new(&r);
        let err = pipeline
            .run::<serde_yaml::Value>(&PathBuf::from("broken.yml"), "name: [unterminated\n")
            .unwrap_err();

        assert!(err.to_string().contains("broken.yml"));
    }
}
