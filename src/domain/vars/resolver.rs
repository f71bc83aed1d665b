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

//! Placeholder substitution over raw text
//!
//! Three placeholder forms are recognised:
//!
//! - `${{env: NAME}}` resolves against the environment scope (process
//!   snapshot, then secured and unsecured JSON values);
//! - `${{var: NAME}}` resolves against variables declared in a descriptor;
//! - `{{ NAME }}` resolves against the environment scope and is the form
//!   used inside asset files.
//!
//! Placeholders without a binding are left untouched so that resolution can be
//! staged across scopes.

use crate::shared::error::{BuildError, Result};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

fn env_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{\{\s*(?i:env)\s*:\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}")
            .expect("env placeholder pattern is valid")
    })
}

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(["']?)\$\{\{\s*(?i:var)\s*:\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}(["']?)"#)
            .expect("var placeholder pattern is valid")
    })
}

fn bare_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}")
            .expect("bare placeholder pattern is valid")
    })
}

/// Value of a descriptor-declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl VarValue {
    pub fn is_string(&self) -> bool {
        matches!(self, VarValue::String(_))
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::String(s) => f.write_str(s),
            VarValue::Integer(i) => write!(f, "{}", i),
            VarValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: VarValue,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: VarValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Builds a variable from a YAML scalar, rejecting anything that is not a
    /// string, an integer or a boolean.
    pub fn from_yaml(name: &str, value: &serde_yaml::Value) -> Result<Self> {
        let value = match value {
            serde_yaml::Value::String(s) => VarValue::String(s.clone()),
            serde_yaml::Value::Bool(b) => VarValue::Boolean(*b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => VarValue::Integer(i),
                None => {
                    return Err(BuildError::InvalidDescriptor(format!(
                        "variable '{}' must be a string, integer or boolean (got {})",
                        name, n
                    )))
                }
            },
            other => {
                return Err(BuildError::InvalidDescriptor(format!(
                    "variable '{}' must be a string, integer or boolean (got {:?})",
                    name, other
                )))
            }
        };
        Ok(Self::new(name, value))
    }
}

#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    environment: BTreeMap<String, String>,
    declared: BTreeMap<String, VarValue>,
}

impl VariableResolver {
    pub fn new(environment: BTreeMap<String, String>) -> Self {
        Self {
            environment,
            declared: BTreeMap::new(),
        }
    }

    /// Returns a resolver that additionally knows the given descriptor
    /// variables. Later declarations with the same name win.
    pub fn with_declared(&self, vars: &[Variable]) -> Self {
        let mut resolver = self.clone();
        for var in vars {
            resolver
                .declared
                .insert(var.name.clone(), var.value.clone());
        }
        resolver
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Looks a name up with descriptor variables taking precedence over the
    /// environment scope.
    pub fn get(&self, name: &str) -> Option<String> {
        self.declared
            .get(name)
            .map(|v| v.to_string())
            .or_else(|| self.environment.get(name).cloned())
    }

    /// Applies every placeholder form this resolver has bindings for.
    pub fn resolve(&self, text: &str) -> String {
        let text = self.resolve_environment(text);
        self.resolve_declared(&text)
    }

    /// Replaces `${{env: NAME}}` and `{{ NAME }}` placeholders. Asset content
    /// only; descriptors go through [`Self::resolve_env_scope`].
    pub fn resolve_environment(&self, text: &str) -> String {
        let text = self.resolve_env_scope(text);
        self.resolve_templates(&text)
    }

    /// Replaces `${{env: NAME}}` placeholders and nothing else.
    pub fn resolve_env_scope(&self, text: &str) -> String {
        env_pattern()
            .replace_all(text, |caps: &Captures| {
                match self.environment.get(&caps[1]) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Replaces bare `{{ NAME }}` placeholders.
    pub fn resolve_templates(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in bare_pattern().captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&text[last..whole.start()]);
            // `${{ ... }}` belongs to the scoped syntax, never to the bare one
            let scoped = text[..whole.start()].ends_with('$');
            match self.environment.get(&caps[1]) {
                Some(value) if !scoped => out.push_str(value),
                _ => out.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        out.push_str(&text[last..]);
        out
    }

    /// Replaces `${{var: NAME}}` placeholders. Integer and boolean values
    /// swallow a surrounding pair of matching quotes so the YAML scalar keeps
    /// its native type.
    pub fn resolve_declared(&self, text: &str) -> String {
        if self.declared.is_empty() {
            return text.to_string();
        }

        var_pattern()
            .replace_all(text, |caps: &Captures| {
                let open = &caps[1];
                let close = &caps[3];
                match self.declared.get(&caps[2]) {
                    Some(value) if !value.is_string() && !open.is_empty() && open == close => {
                        value.to_string()
                    }
                    Some(value) => format!("{}{}{}", open, value, close),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
