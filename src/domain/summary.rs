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

//! CPU and memory totals over the declared container resources

use crate::domain::model::Application;
use crate::shared::error::{BuildError, Result};

const MIB: f64 = 1024.0 * 1024.0;
const MB: f64 = 1000.0 * 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerUsage {
    pub app: String,
    pub container: String,
    /// cores
    pub cpu_request: f64,
    pub cpu_limit: f64,
    /// bytes
    pub memory_request: f64,
    pub memory_limit: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSummary {
    pub rows: Vec<ContainerUsage>,
    pub cpu_request: f64,
    pub cpu_limit: f64,
    pub memory_request: f64,
    pub memory_limit: f64,
}

impl ResourceSummary {
    pub fn from_apps(apps: &[Application]) -> Result<Self> {
        let mut summary = ResourceSummary::default();

        for app in apps {
            for container in &app.containers {
                let (cpu_from, cpu_to) = container.bounds("cpu");
                let (mem_from, mem_to) = container.bounds("memory");
                let owner = format!("{}/{}", app.name, container.name);

                let usage = ContainerUsage {
                    app: app.name.clone(),
                    container: container.name.clone(),
                    cpu_request: optional(cpu_from, parse_cpu, &owner)?,
                    cpu_limit: optional(cpu_to, parse_cpu, &owner)?,
                    memory_request: optional(mem_from, parse_memory, &owner)?,
                    memory_limit: optional(mem_to, parse_memory, &owner)?,
                };

                summary.cpu_request += usage.cpu_request;
                summary.cpu_limit += usage.cpu_limit;
                summary.memory_request += usage.memory_request;
                summary.memory_limit += usage.memory_limit;
                summary.rows.push(usage);
            }
        }

        Ok(summary)
    }
}

pub fn to_mib(bytes: f64) -> f64 {
    bytes / MIB
}

pub fn to_mb(bytes: f64) -> f64 {
    bytes / MB
}

fn optional(
    value: Option<&str>,
    parse: fn(&str) -> Option<f64>,
    owner: &str,
) -> Result<f64> {
    match value {
        None => Ok(0.0),
        Some(v) => parse(v).ok_or_else(|| {
            BuildError::ValidationError(format!("{}: cannot interpret resource value '{}'", owner, v))
        }),
    }
}

/// `250m` is a quarter core, `1.5` one and a half.
pub fn parse_cpu(value: &str) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();
    match v.strip_suffix('m') {
        Some(milli) => milli.trim().parse::<f64>().ok().map(|m| m / 1000.0),
        None => v.parse().ok(),
    }
}

/// Parses a Kubernetes memory quantity into bytes. Binary suffixes (`Ki`,
/// `Mi`, ...) use powers of 1024, decimal ones (`k`, `M`, ...) powers of 1000.
pub fn parse_memory(value: &str) -> Option<f64> {
    let v = value.trim().to_ascii_lowercase();
    let split = v
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(v.len());
    let (number, unit) = v.split_at(split);
    let number: f64 = number.parse().ok()?;

    let factor = match unit.trim().trim_end_matches('b') {
        "" => 1.0,
        "k" => 1e3,
        "m" => 1e6,
        "g" => 1e9,
        "t" => 1e12,
        "ki" => 1024.0,
        "mi" => MIB,
        "gi" => MIB * 1024.0,
        "ti" => MIB * 1024.0 * 1024.0,
        _ => return None,
    };
    Some(number * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::ApplicationDescriptor;
    use crate::domain::environment::Environment;
    use std::collections::BTreeMap;
    use std::path::Path;

    #[test]
    fn test_parse_cpu() {
        assert_eq!(parse_cpu("250m"), Some(0.25));
        assert_eq!(parse_cpu("2"), Some(2.0));
        assert_eq!(parse_cpu(" 1.5 "), Some(1.5));
        assert_eq!(parse_cpu("lots"), None);
    }

    #[test]
    fn test_parse_memory() {
        assert_eq!(parse_memory("512Mi"), Some(512.0 * MIB));
        assert_eq!(parse_memory("1G"), Some(1e9));
        assert_eq!(parse_memory("1024"), Some(1024.0));
        assert_eq!(to_mib(parse_memory("2Gi").unwrap()), 2048.0);
        assert_eq!(parse_memory("12Qi"), None);
    }

    #[test]
    fn test_totals() {
        let env = Environment::from_parts("t", "/x", "/x/target", "ns", BTreeMap::new());
        let descriptor: ApplicationDescriptor = serde_yaml::from_str(
            r#"
name: api
containers:
  - name: a
    image: a
    resources:
      cpu: { from: 100m, to: 1 }
      memory: { from: 256Mi, to: 512Mi }
  - name: b
    image: b
    resources:
      cpu: { from: 400m }
"#,
        )
        .unwrap();
        let app = Application::from_descriptor(descriptor, &env, &[], Path::new("api.yml")).unwrap();

        let summary = ResourceSummary::from_apps(&[app]).unwrap();
        assert_eq!(summary.rows.len(), 2);
        assert!((summary.cpu_request - 0.5).abs() < 1e-9);
        assert!((summary.cpu_limit - 1.0).abs() < 1e-9);
        assert_eq!(to_mib(summary.memory_request), 256.0);
        assert_eq!(to_mib(summary.memory_limit), 512.0);
    }
}
