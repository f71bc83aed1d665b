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

//! Operator-declared `raw` keys merged over generated container specs

use crate::shared::error::{BuildError, Result};
use serde_json::Value;

/// Top-level keys of `raw` replace the generated keys of the same name.
pub fn merge_raw(target: &mut Value, raw: &serde_yaml::Mapping) -> Result<()> {
    let target = target.as_object_mut().ok_or_else(|| {
        BuildError::Serialization("raw passthrough target is not a mapping".to_string())
    })?;

    for (key, value) in raw {
        let key = key.as_str().ok_or_else(|| {
            BuildError::ValidationError(format!("raw key {:?} must be a string", key))
        })?;
        let value = serde_json::to_value(value)?;
        target.insert(key.to_string(), value);
    }

    Ok(())
}

/// Applies each container's `raw` block to `spec.template.spec.containers[i]`
/// of a rendered workload document.
pub fn merge_container_raw(
    workload: &mut Value,
    raws: &[Option<&serde_yaml::Mapping>],
) -> Result<()> {
    let containers = workload
        .pointer_mut("/spec/template/spec/containers")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            BuildError::Serialization("workload document has no containers".to_string())
        })?;

    for (container, raw) in containers.iter_mut().zip(raws) {
        if let Some(raw) = raw {
            merge_raw(container, raw)?;
        }
    }

    Ok(())
}
