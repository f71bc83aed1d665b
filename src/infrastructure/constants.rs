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

/// Environment directory layout
pub const ENVIRONMENTS_DIR: &str = "environments";
pub const TARGET_DIR: &str = "target";
pub const APPS_DIR: &str = "apps";
pub const SECURED_FILE_NAME: &str = "env.secured.json";
pub const UNSECURED_FILE_NAME: &str = "env.unsecured.json";
pub const SHARED_ASSETS_FILE: &str = "shared.assets.yml";
pub const RELEASE_MANIFEST_FILE: &str = "release.manifest.yml";
pub const REPLICA_PROFILES_FILE: &str = "replica.profiles.yml";
pub const YAML_EXTENSION: &str = "yml";

/// Well-known variable names
pub const NAMESPACE_KEY: &str = "NAMESPACE";
pub const EJSON_PUBLIC_KEY_FIELD: &str = "_public_key";
pub const PROFILE_ENV_KEY: &str = "REPLICA_PROFILE";

/// Shared assets are owned by a pseudo application
pub const SHARED_ASSET_APP_NAME: &str = "tsm-shared";

/// Resource labels
pub const LABEL_APP: &str = "app.kubernetes.io/name";
pub const LABEL_CREATED_AT: &str = "app.kubernetes.io/created-at";
pub const LABEL_ARCH: &str = "kubernetes.io/arch";

/// Progressive rollout ordering
pub const ANNOTATION_SYNC_WAVE: &str = "argocd.argoproj.io/sync-wave";

/// Workload kinds
pub const KIND_DEPLOYMENT: &str = "Deployment";
pub const KIND_STATEFUL_SET: &str = "StatefulSet";

/// Deployment strategy
pub const STRATEGY_TYPE_ROLLING_UPDATE: &str = "RollingUpdate";
pub const STRATEGY_TYPE_RECREATE: &str = "Recreate";
pub const MAX_UNAVAILABLE: &str = "25%";
pub const MAX_SURGE: &str = "25%";

/// Container defaults
pub const IMAGE_PULL_POLICY_ALWAYS: &str = "Always";
pub const PROTOCOL_TCP: &str = "TCP";
pub const CONFIG_MAP_DEFAULT_MODE: i32 = 420;

/// Resource dimensions derived from `resources`
pub const RESOURCE_DIMENSIONS: &[&str] = &["cpu", "memory", "ephemeral-storage"];

/// Asset name role prefixes
pub const ASSET_ROLE_FILE: &str = "asset";
pub const ASSET_ROLE_TEMP: &str = "temp";
pub const ASSET_ROLE_PVC: &str = "pvc";
pub const ASSET_ROLE_NFS: &str = "nfs";
pub const DIGEST_NAME_LEN: usize = 7;

/// Ingress / Route
pub const INGRESS_PATH_TYPE: &str = "ImplementationSpecific";
pub const INGRESS_DEFAULT_PATH: &str = "/";
pub const ROUTE_API_VERSION: &str = "route.openshift.io/v1";
pub const ROUTE_KIND: &str = "Route";
pub const ROUTE_WILDCARD_POLICY_NONE: &str = "None";

/// Output directories under the target directory
pub const OUTPUT_DIR_DEPLOYMENTS: &str = "deployments";
pub const OUTPUT_DIR_ASSETS: &str = "assets";
pub const OUTPUT_DIR_SHARED_ASSETS: &str = "assets/shared";
pub const OUTPUT_DIR_SERVICES: &str = "services";
pub const OUTPUT_DIR_EXTERNAL: &str = "services/external";

/// Secret decryption
pub const ENCJSON_BIN: &str = "encjson";
pub const ENCJSON_KEYDIR: &str = ".encjson";
