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

use super::asset::AssetDescriptor;
use super::scalar::{optional_scalar, scalar_map, scalar_to_string, scalar_vec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerDescriptor {
    pub name: String,
    pub image: String,
    pub startup: Option<StartupDescriptor>,
    #[serde(default)]
    pub env_vars: Vec<EnvVarDescriptor>,
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
    #[serde(default)]
    pub ports: Vec<PortDescriptor>,
    #[serde(default)]
    pub resources: BTreeMap<String, BoundsDescriptor>,
    pub health: Option<HealthDescriptor>,
    pub probe: Option<ProbeDescriptor>,
    pub raw: Option<serde_yaml::Mapping>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartupDescriptor {
    #[serde(default, deserialize_with = "scalar_vec")]
    pub command: Vec<String>,
    #[serde(default, deserialize_with = "scalar_vec")]
    pub arguments: Vec<String>,
}

/// One `env_vars` entry; the form is picked by which keys are present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEnvVarDescriptor")]
pub struct EnvVarDescriptor {
    pub name: String,
    pub source: EnvVarSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvVarSource {
    Literal(Option<String>),
    SecretKey {
        secret_name: String,
        key: String,
    },
    ResourceField {
        resource: String,
        divisor: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct RawEnvVarDescriptor {
    name: String,
    value: Option<serde_yaml::Value>,
    secret_name: Option<String>,
    key: Option<String>,
    resource_name: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    divisor: Option<String>,
}

impl TryFrom<RawEnvVarDescriptor> for EnvVarDescriptor {
    type Error = String;

    fn try_from(raw: RawEnvVarDescriptor) -> Result<Self, Self::Error> {
        let source = if let Some(secret_name) = raw.secret_name {
            let key = raw
                .key
                .ok_or_else(|| format!("env var '{}' names a secret but no 'key'", raw.name))?;
            EnvVarSource::SecretKey { secret_name, key }
        } else if let Some(resource) = raw.resource_name {
            EnvVarSource::ResourceField {
                resource,
                divisor: raw.divisor,
            }
        } else {
            let value = match raw.value {
                None | Some(serde_yaml::Value::Null) => None,
                Some(v) => Some(scalar_to_string(&v).ok_or_else(|| {
                    format!("env var '{}' must have a scalar value", raw.name)
                })?),
            };
            EnvVarSource::Literal(value)
        };

        Ok(Self {
            name: raw.name,
            source,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortDescriptor {
    pub name: String,
    pub port: i32,
    #[serde(default)]
    pub expose_as: Vec<ExposeDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExposeDescriptor {
    pub hostname: String,
    pub port: i32,
    #[serde(default)]
    pub external: Vec<ExternalDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalDescriptor {
    pub name: String,
    #[serde(default)]
    pub as_route: bool,
    #[serde(default)]
    pub http: Vec<HttpHostDescriptor>,
    #[serde(default)]
    pub https: Vec<HttpsHostDescriptor>,
    #[serde(default, deserialize_with = "scalar_map")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpHostDescriptor {
    pub hostname: String,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpsHostDescriptor {
    pub hostname: String,
    pub secret_name: Option<String>,
}

/// `from` becomes a request, `to` a limit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoundsDescriptor {
    #[serde(default, deserialize_with = "optional_scalar")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthDescriptor {
    pub http: Option<HttpCheckDescriptor>,
    #[serde(default, deserialize_with = "scalar_vec")]
    pub command: Vec<String>,
    pub delay: Option<i32>,
    pub period: Option<i32>,
    pub timeout: Option<i32>,
    pub success: Option<i32>,
    pub failure: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpCheckDescriptor {
    pub path: Option<HealthPath>,
    pub port: IntOrString,
}

/// Either one path for every check or a path per check type
/// (`live`, `ready`, `start`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HealthPath {
    Single(String),
    PerCheck(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeDescriptor {
    pub live: Option<HealthDescriptor>,
    pub ready: Option<HealthDescriptor>,
    pub start: Option<HealthDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_forms() {
        let vars: Vec<EnvVarDescriptor> = serde_yaml::from_str(
            r#"
- name: JAVA_ARGS
  value: -Xmx1g
- name: PORT
  value: 8080
- name: SECRET_PUBLIC_KEY
  secret_name: tsm-secrets
  key: public-key
- name: MEM_LIMIT
  resource_name: limits.memory
  divisor: 1Mi
"#,
        )
        .unwrap();

        assert_eq!(vars[0].source, EnvVarSource::Literal(Some("-Xmx1g".to_string())));
        assert_eq!(vars[1].source, EnvVarSource::Literal(Some("8080".to_string())));
        assert_eq!(
            vars[2].source,
            EnvVarSource::SecretKey {
                secret_name: "tsm-secrets".to_string(),
                key: "public-key".to_string()
            }
        );
        assert_eq!(
            vars[3].source,
            EnvVarSource::ResourceField {
                resource: "limits.memory".to_string(),
                divisor: Some("1Mi".to_string())
            }
        );
    }

    #[test]
    fn test_secret_without_key_is_rejected() {
        let result: Result<EnvVarDescriptor, _> =
            serde_yaml::from_str("name: X\nsecret_name: s\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_health_path_forms() {
        let single: HealthDescriptor =
            serde_yaml::from_str("http:\n  path: /health\n  port: 8067\n").unwrap();
        assert_eq!(
            single.http.unwrap().path,
            Some(HealthPath::Single("/health".to_string()))
        );

        let per_check: HealthDescriptor = serde_yaml::from_str(
            "http:\n  path:\n    live: /live\n    ready: /ready\n  port: http\n",
        )
        .unwrap();
        let http = per_check.http.unwrap();
        assert!(matches!(http.path, Some(HealthPath::PerCheck(ref m)) if m.len() == 2));
        assert_eq!(http.port, IntOrString::String("http".to_string()));
    }

    #[test]
    fn test_numeric_bounds_become_strings() {
        let bounds: BoundsDescriptor = serde_yaml::from_str("from: 1\nto: 2.5\n").unwrap();
        assert_eq!(bounds.from.as_deref(), Some("1"));
        assert_eq!(bounds.to.as_deref(), Some("2.5"));
    }
}
