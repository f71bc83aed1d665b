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

use crate::domain::synthesis::GeneratedManifest;
use crate::shared::error::{BuildError, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::path::{Path, PathBuf};

/// Destination of rendered documents.
#[async_trait]
pub trait ManifestSink: Send + Sync {
    /// Stores `content` at `relative_path`, replacing anything already there.
    async fn write(&self, relative_path: &Path, content: String) -> Result<PathBuf>;
}

/// Writes documents below a target directory, creating parents as needed.
#[derive(Debug, Clone)]
pub struct FsManifestSink {
    root: PathBuf,
}

impl FsManifestSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ManifestSink for FsManifestSink {
    async fn write(&self, relative_path: &Path, content: String) -> Result<PathBuf> {
        let path = self.root.join(relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await.map_err(|e| {
            BuildError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {}", path.display(), e),
            ))
        })?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Renders every manifest to YAML first, then writes them concurrently.
/// Paths are unique after synthesis so the writes never overlap.
pub async fn write_all(
    sink: &dyn ManifestSink,
    manifests: &[GeneratedManifest],
) -> Result<Vec<PathBuf>> {
    let rendered = manifests
        .iter()
        .map(|m| Ok((m.relative_path(), m.to_yaml()?)))
        .collect::<Result<Vec<_>>>()?;

    let written = try_join_all(
        rendered
            .into_iter()
            .map(|(path, content)| async move { sink.write(&path, content).await }),
    )
    .await?;

    tracing::info!("Wrote {} manifest(s)", written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::synthesis::ManifestKind;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySink {
        files: Mutex<Vec<(PathBuf, String)>>,
    }

    #[async_trait]
    impl ManifestSink for MemorySink {
        async fn write(&self, relative_path: &Path, content: String) -> Result<PathBuf> {
            self.files
                .lock()
                .unwrap()
                .push((relative_path.to_path_buf(), content));
            Ok(relative_path.to_path_buf())
        }
    }

    fn manifests() -> Vec<GeneratedManifest> {
        vec![
            GeneratedManifest::new(ManifestKind::Service, "tsm-api", json!({"kind": "Service"})),
            GeneratedManifest::new(ManifestKind::Workload, "tsm-api", json!({"kind": "Deployment"})),
        ]
    }

    #[tokio::test]
    async fn test_write_all_to_sink() {
        let sink = MemorySink::default();
        let written = write_all(&sink, &manifests()).await.unwrap();
        assert_eq!(written.len(), 2);

        let files = sink.files.lock().unwrap();
        assert!(files
            .iter()
            .any(|(p, c)| p == Path::new("services/tsm-api-service.yml") && c.contains("Service")));
    }

    #[tokio::test]
    async fn test_fs_sink_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsManifestSink::new(dir.path().join("target"));
        write_all(&sink, &manifests()).await.unwrap();

        let content =
            std::fs::read_to_string(dir.path().join("target/deployments/tsm-api-deployment.yml"))
                .unwrap();
        assert_eq!(content.trim(), "kind: Deployment");
    }
}
