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
use std::path::Path;

/// One `images` entry of a release manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseEntry {
    pub app_name: String,
    pub container_name: Option<String>,
    pub image: Option<String>,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ReleaseEntry {
    fn is_app_wide(&self) -> bool {
        blank_to_none(self.container_name.as_deref()).is_none()
    }

    /// `image@digest`, else `image:tag`, else `image` as written.
    pub fn image_reference(&self) -> Option<String> {
        let image = blank_to_none(self.image.as_deref())?;
        if let Some(digest) = blank_to_none(self.digest.as_deref()) {
            Some(format!("{}@{}", image, digest))
        } else if let Some(tag) = blank_to_none(self.tag.as_deref()) {
            Some(format!("{}:{}", image, tag))
        } else {
            Some(image.to_string())
        }
    }
}

/// Image pins produced by a release pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseManifest {
    #[serde(default)]
    pub images: Vec<ReleaseEntry>,
}

impl ReleaseManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildError::config_error(path, format!("Failed to read release manifest: {}", e))
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| BuildError::yaml(path, e))
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// An exact (app, container) entry wins over an app-wide one.
    pub fn entry_for(&self, app: &str, container: &str) -> Option<&ReleaseEntry> {
        self.images
            .iter()
            .find(|e| e.app_name == app && e.container_name.as_deref() == Some(container))
            .or_else(|| {
                self.images
                    .iter()
                    .find(|e| e.app_name == app && e.is_app_wide())
            })
    }

    pub fn image_for(&self, app: &str, container: &str) -> Option<String> {
        self.entry_for(app, container)
            .and_then(ReleaseEntry::image_reference)
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn manifest(content: &str) -> ReleaseManifest {
        ReleaseManifest::parse(&PathBuf::from("release.manifest.yml"), content).unwrap()
    }

    #[test]
    fn test_image_composition() {
        let m = manifest(
            r#"
images:
  - app_name: tag-only
    image: registry/app
    tag: "1.2.3"
  - app_name: digest-wins
    image: registry/app
    tag: "1.2.3"
    digest: sha256:abc
  - app_name: bare
    image: registry/app
    tag: "  "
"#,
        );

        assert_eq!(m.image_for("tag-only", "web").as_deref(), Some("registry/app:1.2.3"));
        assert_eq!(
            m.image_for("digest-wins", "web").as_deref(),
            Some("registry/app@sha256:abc")
        );
        assert_eq!(m.image_for("bare", "web").as_deref(), Some("registry/app"));
        assert_eq!(m.image_for("unknown", "web"), None);
    }

    #[test]
    fn test_exact_container_beats_app_wide() {
        let m = manifest(
            r#"
images:
  - app_name: api
    image: registry/api
    tag: "2.0"
  - app_name: api
    container_name: sidecar
    image: registry/proxy
    tag: "0.9"
"#,
        );

        assert_eq!(m.image_for("api", "sidecar").as_deref(), Some("registry/proxy:0.9"));
        assert_eq!(m.image_for("api", "main").as_deref(), Some("registry/api:2.0"));
    }

    #[test]
    fn test_empty_manifest() {
        assert!(manifest("").is_empty());
        assert!(manifest("images: []\n").is_empty());
    }
}
