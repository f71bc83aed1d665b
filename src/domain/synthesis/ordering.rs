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

//! Sync-wave ordering across applications

use crate::domain::model::Application;

/// Wave for shared asset ConfigMaps: one below the earliest declared wave
/// and never later than -1. `None` when no application declares a wave.
pub fn shared_asset_wave(apps: &[Application]) -> Option<i64> {
    apps.iter()
        .filter_map(Application::sync_wave)
        .min()
        .map(|earliest| earliest.min(0) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::ApplicationDescriptor;
    use crate::domain::environment::Environment;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn app(name: &str, wave: Option<i64>) -> Application {
        let env = Environment::from_parts("t", "/none", "/none/target", "ns", BTreeMap::new());
        let yaml = match wave {
            Some(w) => format!(
                "name: {}\nannotations:\n  argocd.argoproj.io/sync-wave: \"{}\"\ncontainers: []\n",
                name, w
            ),
            None => format!("name: {}\ncontainers: []\n", name),
        };
        let descriptor: ApplicationDescriptor = serde_yaml::from_str(&yaml).unwrap();
        Application::from_descriptor(descriptor, &env, &[], Path::new("app.yml")).unwrap()
    }

    #[test]
    fn test_no_waves() {
        assert_eq!(shared_asset_wave(&[app("a", None), app("b", None)]), None);
    }

    #[test]
    fn test_positive_waves() {
        assert_eq!(shared_asset_wave(&[app("a", Some(3)), app("b", None)]), Some(-1));
    }

    #[test]
    fn test_negative_waves() {
        assert_eq!(
            shared_asset_wave(&[app("a", Some(-2)), app("b", Some(5)), app("c", None)]),
            Some(-3)
        );
    }
}
