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

use serde::Deserialize;

/// Asset entry as written in a descriptor, validated into one variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawAssetDescriptor")]
pub enum AssetDescriptor {
    File {
        file: String,
        to: String,
        binary: bool,
        transform: bool,
        digest_only: bool,
    },
    Temp {
        to: String,
    },
    Pvc {
        claim_name: String,
        to: String,
        read_only: bool,
    },
    Nfs {
        server: String,
        path: String,
        to: String,
        read_only: bool,
    },
}

impl AssetDescriptor {
    pub fn mount_path(&self) -> &str {
        match self {
            AssetDescriptor::File { to, .. }
            | AssetDescriptor::Temp { to }
            | AssetDescriptor::Pvc { to, .. }
            | AssetDescriptor::Nfs { to, .. } => to,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAssetDescriptor {
    #[serde(alias = "from")]
    file: Option<String>,
    to: Option<String>,
    #[serde(default)]
    binary: bool,
    #[serde(default)]
    transform: bool,
    #[serde(default)]
    digest_only: bool,
    #[serde(default)]
    temp: bool,
    #[serde(default)]
    pvc: bool,
    claim_name: Option<String>,
    #[serde(default)]
    nfs: bool,
    server: Option<String>,
    path: Option<String>,
    #[serde(default)]
    read_only: bool,
}

impl TryFrom<RawAssetDescriptor> for AssetDescriptor {
    type Error = String;

    fn try_from(raw: RawAssetDescriptor) -> Result<Self, Self::Error> {
        let to = raw
            .to
            .ok_or_else(|| "asset is missing its 'to' mount path".to_string())?;

        let variants = [raw.file.is_some(), raw.temp, raw.pvc, raw.nfs]
            .iter()
            .filter(|set| **set)
            .count();
        if variants != 1 {
            return Err(format!(
                "asset '{}' must declare exactly one of 'file', 'temp', 'pvc' or 'nfs'",
                to
            ));
        }

        if let Some(file) = raw.file {
            return Ok(AssetDescriptor::File {
                file,
                to,
                binary: raw.binary,
                transform: raw.transform,
                digest_only: raw.digest_only,
            });
        }

        if raw.temp {
            return Ok(AssetDescriptor::Temp { to });
        }

        if raw.pvc {
            let claim_name = raw
                .claim_name
                .ok_or_else(|| format!("pvc asset '{}' is missing 'claim_name'", to))?;
            return Ok(AssetDescriptor::Pvc {
                claim_name,
                to,
                read_only: raw.read_only,
            });
        }

        let server = raw
            .server
            .ok_or_else(|| format!("nfs asset '{}' is missing 'server'", to))?;
        let path = raw
            .path
            .ok_or_else(|| format!("nfs asset '{}' is missing 'path'", to))?;
        Ok(AssetDescriptor::Nfs {
            server,
            path,
            to,
            read_only: raw.read_only,
        })
    }
}

/// Content of `shared.assets.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SharedAssetsDescriptor {
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
}
