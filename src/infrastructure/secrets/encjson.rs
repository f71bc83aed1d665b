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

//! Decryption of `env.secured.json` through the external `encjson` binary

use crate::infrastructure::constants::{ENCJSON_BIN, ENCJSON_KEYDIR};
use crate::shared::error::{BuildError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Turns an encrypted JSON document into its decrypted JSON text.
pub trait SecretDecryptor {
    fn decrypt_file(&self, path: &Path) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct EncjsonConfig {
    pub bin: String,
    pub key_dir: PathBuf,
}

impl EncjsonConfig {
    /// `bin` and `key_dir` fall back to `encjson` and `$HOME/.encjson`.
    pub fn new(bin: Option<String>, key_dir: Option<PathBuf>, home: Option<&str>) -> Self {
        let key_dir = key_dir.unwrap_or_else(|| {
            Path::new(home.unwrap_or(".")).join(ENCJSON_KEYDIR)
        });
        Self {
            bin: bin.unwrap_or_else(|| ENCJSON_BIN.to_string()),
            key_dir,
        }
    }
}

pub struct EncjsonDecryptor {
    config: EncjsonConfig,
}

impl EncjsonDecryptor {
    pub fn new(config: EncjsonConfig) -> Self {
        Self { config }
    }

    fn command_line(&self, path: &Path) -> String {
        format!(
            "{} decrypt -k {} -f {}",
            self.config.bin,
            self.config.key_dir.display(),
            path.display()
        )
    }
}

impl SecretDecryptor for EncjsonDecryptor {
    fn decrypt_file(&self, path: &Path) -> Result<String> {
        let command_line = self.command_line(path);
        tracing::info!("Decrypting {}", path.display());

        let output = Command::new(&self.config.bin)
            .arg("decrypt")
            .arg("-k")
            .arg(&self.config.key_dir)
            .arg("-f")
            .arg(path)
            .output()
            .map_err(|e| BuildError::external_tool(&command_line, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildError::external_tool(
                command_line,
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| BuildError::external_tool(command_line, format!("non UTF-8 output: {}", e)))
    }
}

/// Used when secured values were not requested; any call is a bug in the
/// caller, so it reports the file instead of silently returning nothing.
pub struct DisabledDecryptor;

impl SecretDecryptor for DisabledDecryptor {
    fn decrypt_file(&self, path: &Path) -> Result<String> {
        Err(BuildError::external_tool(
            format!("decrypt {}", path.display()),
            "secret decryption is disabled (pass --decrypt)",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EncjsonConfig::new(None, None, Some("/home/ops"));
        assert_eq!(config.bin, "encjson");
        assert_eq!(config.key_dir, PathBuf::from("/home/ops/.encjson"));
    }

    #[test]
    fn test_missing_binary_reports_command() {
        let decryptor = EncjsonDecryptor::new(EncjsonConfig::new(
            Some("/nonexistent/encjson-bin".to_string()),
            Some(PathBuf::from("/tmp/keys")),
            None,
        ));
        let err = decryptor
            .decrypt_file(Path::new("env.secured.json"))
            .unwrap_err();

        match err {
            BuildError::ExternalTool { command, .. } => {
                assert_eq!(
                    command,
                    "/nonexistent/encjson-bin decrypt -k /tmp/keys -f env.secured.json"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
