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

use std::path::{Path, PathBuf};
use thiserror::Error;
pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Configuration error in '{}': {message}", path.display())]
    ConfigError { path: PathBuf, message: String },

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Asset file not found: '{}' (declared by {owner})", path.display())]
    AssetNotFound { path: PathBuf, owner: String },

    #[error("YAML parse error in '{}': {source}", path.display())]
    YamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("JSON parse error in '{}': {source}", path.display())]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("External command failed: `{command}`: {message}")]
    ExternalTool { command: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::Serialization(err.to_string())
    }
}

impl BuildError {
    pub fn config_error(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::ConfigError {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    pub fn yaml(path: impl AsRef<Path>, source: serde_yaml::Error) -> Self {
        Self::YamlParse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn asset_not_found(path: impl AsRef<Path>, owner: impl Into<String>) -> Self {
        Self::AssetNotFound {
            path: path.as_ref().to_path_buf(),
            owner: owner.into(),
        }
    }

    pub fn external_tool(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Attaches a file path to a descriptor-level error raised while the
    /// file name was not yet known.
    pub fn in_file(self, path: impl AsRef<Path>) -> Self {
        match self {
            BuildError::InvalidDescriptor(message) => Self::config_error(path, message),
            other => other,
        }
    }
}
