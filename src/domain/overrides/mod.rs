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

//! Post-load overrides: release images, replica profiles and downscaling
//!
//! The stages run in that order and are idempotent. References to
//! applications or containers that do not exist are logged and skipped.

pub mod profile;
pub mod release;

pub use self::profile::{ReplicaProfile, ReplicaProfiles};
pub use self::release::{ReleaseEntry, ReleaseManifest};

use crate::domain::model::Application;

pub fn apply_release_overrides(apps: &mut [Application], manifest: &ReleaseManifest) {
    for entry in &manifest.images {
        match apps.iter().find(|a| a.name == entry.app_name) {
            None => tracing::warn!(
                "Release manifest references unknown application '{}', skipping",
                entry.app_name
            ),
            Some(app) => {
                if let Some(container) = entry.container_name.as_deref().map(str::trim) {
                    if !container.is_empty() && !app.containers.iter().any(|c| c.name == container)
                    {
                        tracing::warn!(
                            "Release manifest references unknown container '{}/{}', skipping",
                            entry.app_name,
                            container
                        );
                    }
                }
            }
        }
    }

    for app in apps.iter_mut() {
        for container in app.containers.iter_mut() {
            if let Some(image) = manifest.image_for(&app.name, &container.name) {
                if image != container.image {
                    tracing::info!(
                        "Image of {}/{}: {} -> {}",
                        app.name,
                        container.name,
                        container.image,
                        image
                    );
                }
                container.image = image;
            }
        }
    }
}

pub fn apply_replica_profile(apps: &mut [Application], profile: &ReplicaProfile) {
    for name in profile.apps.keys() {
        if !apps.iter().any(|a| &a.name == name) {
            tracing::warn!(
                "Replica profile '{}' references unknown application '{}', skipping",
                profile.name,
                name
            );
        }
    }

    for app in apps.iter_mut() {
        if let Some(replicas) = profile.replicas_for(&app.name) {
            tracing::debug!(
                "Profile '{}' sets {} replicas to {}",
                profile.name,
                app.name,
                replicas
            );
            app.replicas = Some(replicas);
        }
    }
}

/// Forces the named applications to zero replicas. Runs after profiles.
pub fn apply_downscale(apps: &mut [Application], names: &[String]) {
    for name in names {
        match apps.iter_mut().find(|a| &a.name == name) {
            Some(app) => {
                tracing::info!("Downscaling {} to 0 replicas", app.name);
                app.replicas = Some(0);
            }
            None => tracing::warn!("Cannot downscale unknown application '{}', skipping", name),
        }
    }
}
