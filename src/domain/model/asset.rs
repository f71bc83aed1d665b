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

//! Mountable content units and their content-addressed names
//!
//! The digest is SHA-256 over the declared source path, the mount target and
//! the resolved content. Resource names embed its first seven hex characters,
//! so regenerating unchanged input reuses the same names and any content
//! change yields a new one.

use crate::domain::descriptor::AssetDescriptor;
use crate::domain::environment::Environment;
use crate::infrastructure::constants::{
    ASSET_ROLE_FILE, ASSET_ROLE_NFS, ASSET_ROLE_PVC, ASSET_ROLE_TEMP, DIGEST_NAME_LEN,
};
use crate::shared::error::{BuildError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// What ends up in the generated ConfigMap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetPayload {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAsset {
    pub declared: String,
    pub source: PathBuf,
    pub payload: AssetPayload,
    pub transform: bool,
    pub digest_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    File(FileAsset),
    Temp,
    Pvc { claim_name: String, read_only: bool },
    Nfs { server: String, path: String, read_only: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    owner_app: String,
    owner_container: String,
    mount_path: String,
    kind: AssetKind,
    digest: String,
}

impl Asset {
    /// Loads the asset eagerly. File assets read their content here; a
    /// missing file fails the whole run.
    pub fn load(
        owner_app: &str,
        owner_container: &str,
        env: &Environment,
        descriptor: &AssetDescriptor,
    ) -> Result<Self> {
        let mount_path = descriptor.mount_path().to_string();

        let (declared, resolved, kind): (String, Vec<u8>, AssetKind) = match descriptor {
            AssetDescriptor::File {
                file,
                binary,
                transform,
                digest_only,
                ..
            } => {
                let source = env.resolve_path(file);
                if !source.is_file() {
                    return Err(BuildError::asset_not_found(
                        &source,
                        format!("{}/{}", owner_app, owner_container),
                    ));
                }

                let (resolved, payload) = if *binary {
                    let bytes = std::fs::read(&source)?;
                    (bytes.clone(), AssetPayload::Binary(bytes))
                } else {
                    let text = std::fs::read_to_string(&source).map_err(|e| {
                        BuildError::config_error(
                            &source,
                            format!("cannot read asset as text ({}), mark it 'binary: true'", e),
                        )
                    })?;
                    let substituted = env.resolver().resolve_environment(&text);
                    let payload = if *transform {
                        AssetPayload::Text(substituted.clone())
                    } else {
                        AssetPayload::Text(text)
                    };
                    (substituted.into_bytes(), payload)
                };

                (
                    file.clone(),
                    resolved,
                    AssetKind::File(FileAsset {
                        declared: file.clone(),
                        source,
                        payload,
                        transform: *transform,
                        digest_only: *digest_only,
                    }),
                )
            }
            AssetDescriptor::Temp { to } => (
                String::new(),
                env.resolver().resolve_environment(to).into_bytes(),
                AssetKind::Temp,
            ),
            AssetDescriptor::Pvc {
                claim_name,
                read_only,
                ..
            } => (
                String::new(),
                claim_name.clone().into_bytes(),
                AssetKind::Pvc {
                    claim_name: claim_name.clone(),
                    read_only: *read_only,
                },
            ),
            AssetDescriptor::Nfs {
                server,
                path,
                read_only,
                ..
            } => (
                String::new(),
                format!("{}{}", server, path).into_bytes(),
                AssetKind::Nfs {
                    server: server.clone(),
                    path: path.clone(),
                    read_only: *read_only,
                },
            ),
        };

        let digest = compute_digest(&declared, &mount_path, &resolved);

        Ok(Self {
            owner_app: owner_app.to_string(),
            owner_container: owner_container.to_string(),
            mount_path,
            kind,
            digest,
        })
    }

    pub fn load_all(
        owner_app: &str,
        owner_container: &str,
        env: &Environment,
        descriptors: &[AssetDescriptor],
    ) -> Result<Vec<Self>> {
        descriptors
            .iter()
            .map(|d| Self::load(owner_app, owner_container, env, d))
            .collect()
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn short_digest(&self) -> &str {
        &self.digest[..DIGEST_NAME_LEN.min(self.digest.len())]
    }

    /// Name of the generated ConfigMap / volume.
    pub fn resource_name(&self) -> String {
        let d = self.short_digest();
        match &self.kind {
            AssetKind::File(file) if file.digest_only => format!("{}-{}", ASSET_ROLE_FILE, d),
            AssetKind::File(_) => format!("{}-{}-{}", self.owner_container, ASSET_ROLE_FILE, d),
            AssetKind::Temp => format!("{}-{}-{}", self.owner_app, ASSET_ROLE_TEMP, d),
            AssetKind::Pvc { .. } => format!("{}-{}-{}", self.owner_container, ASSET_ROLE_PVC, d),
            AssetKind::Nfs { .. } => format!("{}-{}-{}", self.owner_container, ASSET_ROLE_NFS, d),
        }
    }

    /// Digest-only file assets are named by content alone and may be shared
    /// by several applications.
    pub fn is_digest_only(&self) -> bool {
        matches!(&self.kind, AssetKind::File(file) if file.digest_only)
    }

    /// Temp, PVC and NFS assets are volume declarations only.
    pub fn is_mount_only(&self) -> bool {
        !matches!(self.kind, AssetKind::File(_))
    }

    /// ConfigMap key (and mount subPath) of a file asset. Transformed assets
    /// drop their last extension, e.g. `app.json.tpl` becomes `app.json`.
    pub fn config_key(&self) -> Option<String> {
        match &self.kind {
            AssetKind::File(file) => {
                let path = Path::new(&file.declared);
                let key = if file.transform {
                    path.file_stem()
                } else {
                    path.file_name()
                };
                key.map(|k| k.to_string_lossy().into_owned())
            }
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&AssetPayload> {
        match &self.kind {
            AssetKind::File(file) => Some(&file.payload),
            _ => None,
        }
    }

    pub fn kind(&self) -> &AssetKind {
        &self.kind
    }

    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    pub fn owner_app(&self) -> &str {
        &self.owner_app
    }

    pub fn owner_container(&self) -> &str {
        &self.owner_container
    }
}

fn compute_digest(declared: &str, mount_path: &str, content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(declared.as_bytes());
    hasher.update(mount_path.as_bytes());
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;

    fn env_in(dir: &Path) -> Environment {
        let mut vars = BTreeMap::new();
        vars.insert("DB_HOST".to_string(), "db.internal".to_string());
        Environment::from_parts("test", dir, dir.join("target"), "tsm-test", vars)
    }

    fn file_descriptor(file: &str, to: &str, transform: bool) -> AssetDescriptor {
        AssetDescriptor::File {
            file: file.to_string(),
            to: to.to_string(),
            binary: false,
            transform,
            digest_only: false,
        }
    }

    #[test]
    fn test_digest_matches_sha256_of_inputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.conf"), "host={{ DB_HOST }}").unwrap();
        let env = env_in(dir.path());

        let asset = Asset::load("app", "web", &env, &file_descriptor("a.conf", "/etc/a.conf", false))
            .unwrap();

        let expected = hex::encode(Sha256::digest(b"a.conf/etc/a.confhost=db.internal"));
        assert_eq!(asset.digest(), expected);
        assert_eq!(asset.resource_name(), format!("web-asset-{}", &expected[..7]));
    }

    #[test]
    fn test_transform_persists_substituted_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.json.tpl"), "{\"db\": \"{{DB_HOST}}\"}").unwrap();
        let env = env_in(dir.path());

        let plain = Asset::load("app", "web", &env, &file_descriptor("app.json.tpl", "/app/a", false))
            .unwrap();
        let transformed =
            Asset::load("app", "web", &env, &file_descriptor("app.json.tpl", "/app/a", true))
                .unwrap();

        assert_eq!(
            plain.payload(),
            Some(&AssetPayload::Text("{\"db\": \"{{DB_HOST}}\"}".to_string()))
        );
        assert_eq!(
            transformed.payload(),
            Some(&AssetPayload::Text("{\"db\": \"db.internal\"}".to_string()))
        );
        assert_eq!(plain.config_key().as_deref(), Some("app.json.tpl"));
        assert_eq!(transformed.config_key().as_deref(), Some("app.json"));
        assert_eq!(plain.digest(), transformed.digest());
    }

    #[test]
    fn test_missing_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_in(dir.path());
        let err = Asset::load("app", "web", &env, &file_descriptor("missing.txt", "/x", false))
            .unwrap_err();
        assert!(matches!(err, BuildError::AssetNotFound { .. }));
    }

    #[test]
    fn test_binary_asset_skips_substitution() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("key.jks"), [0u8, 159, 146, 150, b'{', b'{']).unwrap();
        let env = env_in(dir.path());
        let descriptor = AssetDescriptor::File {
            file: "key.jks".to_string(),
            to: "/app/key.jks".to_string(),
            binary: true,
            transform: false,
            digest_only: false,
        };

        let asset = Asset::load("app", "web", &env, &descriptor).unwrap();
        assert_eq!(
            asset.payload(),
            Some(&AssetPayload::Binary(vec![0u8, 159, 146, 150, b'{', b'{']))
        );
    }

    #[test]
    fn test_mount_only_names_carry_role() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_in(dir.path());

        let temp = Asset::load("app", "web", &env, &AssetDescriptor::Temp { to: "/tmp/work".into() })
            .unwrap();
        let pvc = Asset::load(
            "app",
            "web",
            &env,
            &AssetDescriptor::Pvc {
                claim_name: "data".into(),
                to: "/data".into(),
                read_only: false,
            },
        )
        .unwrap();
        let nfs = Asset::load(
            "app",
            "web",
            &env,
            &AssetDescriptor::Nfs {
                server: "nfs.local".into(),
                path: "/exports".into(),
                to: "/mnt".into(),
                read_only: true,
            },
        )
        .unwrap();

        assert!(temp.is_mount_only() && pvc.is_mount_only() && nfs.is_mount_only());
        assert!(temp.resource_name().starts_with("app-temp-"));
        assert!(pvc.resource_name().starts_with("web-pvc-"));
        assert!(nfs.resource_name().starts_with("web-nfs-"));
        assert!(temp.config_key().is_none());
    }

    #[test]
    fn test_digest_only_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("shared.txt"), "x").unwrap();
        let env = env_in(dir.path());
        let descriptor = AssetDescriptor::File {
            file: "shared.txt".to_string(),
            to: "/shared.txt".to_string(),
            binary: false,
            transform: false,
            digest_only: true,
        };

        let asset = Asset::load("app", "web", &env, &descriptor).unwrap();
        assert_eq!(asset.resource_name(), format!("asset-{}", asset.short_digest()));
    }
}
