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

use crate::shared::error::{BuildError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A profile is either `{all?, apps?}` or a flat `app: replicas` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum ProfileDefinition {
    Structured(StructuredProfile),
    Flat(BTreeMap<String, i32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct StructuredProfile {
    all: Option<i32>,
    #[serde(default)]
    apps: BTreeMap<String, i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProfileDefaults {
    profile: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProfilesDocument {
    #[serde(default)]
    profiles: BTreeMap<String, ProfileDefinition>,
    #[serde(default)]
    defaults: ProfileDefaults,
}

/// A selected profile, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaProfile {
    pub name: String,
    pub all: Option<i32>,
    pub apps: BTreeMap<String, i32>,
}

impl ReplicaProfile {
    /// Per-app values beat the blanket `all`.
    pub fn replicas_for(&self, app: &str) -> Option<i32> {
        self.apps.get(app).copied().or(self.all)
    }
}

/// Content of a replica profiles file.
#[derive(Debug, Clone)]
pub struct ReplicaProfiles {
    path: PathBuf,
    profiles: BTreeMap<String, ReplicaProfile>,
    default_profile: Option<String>,
}

impl ReplicaProfiles {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildError::config_error(path, format!("Failed to read replica profiles: {}", e))
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let document: ProfilesDocument = if content.trim().is_empty() {
            ProfilesDocument::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| BuildError::yaml(path, e))?
        };

        let profiles = document
            .profiles
            .into_iter()
            .map(|(name, definition)| {
                let profile = match definition {
                    ProfileDefinition::Structured(s) => ReplicaProfile {
                        name: name.clone(),
                        all: s.all,
                        apps: s.apps,
                    },
                    ProfileDefinition::Flat(apps) => ReplicaProfile {
                        name: name.clone(),
                        all: None,
                        apps,
                    },
                };
                (name, profile)
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            profiles,
            default_profile: document.defaults.profile,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&ReplicaProfile> {
        self.profiles.get(name)
    }

    /// Picks the active profile: command line, then the process
    /// environment value, then `defaults.profile`. Naming a profile that does
    /// not exist is an error; having no selection at all is not.
    pub fn select(
        &self,
        requested: Option<&str>,
        from_process: Option<&str>,
    ) -> Result<Option<&ReplicaProfile>> {
        let chosen = [requested, from_process, self.default_profile.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty());

        match chosen {
            None => Ok(None),
            Some(name) => self.profiles.get(name).map(Some).ok_or_else(|| {
                BuildError::config_error(
                    &self.path,
                    format!(
                        "Unknown replica profile '{}', available: [{}]",
                        name,
                        self.names().collect::<Vec<_>>().join(", ")
                    ),
                )
            }),
        }
    }
}
