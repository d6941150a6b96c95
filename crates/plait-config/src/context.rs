//! Build mode and environment context resolution.
//!
//! A [`BuildContext`] is created once per build invocation from the raw
//! process environment and never mutated afterwards. Only allow-listed
//! variables are projected into the context; everything else in the raw
//! environment is ignored.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Environment variables visible to the build.
///
/// Anything outside this list never reaches the pipeline, so a stray
/// server-side secret in the environment cannot leak into client output.
pub const ENV_ALLOW_LIST: [&str; 4] = ["NODE_ENV", "API_HOST", "API_PORT", "API_GRAPHQL_PATH"];

/// Build mode selecting which profile fragments apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    /// Parse a mode string as passed by the host/CLI.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMode`] for anything other than
    /// `"development"` or `"production"`.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Mode::Development),
            "production" => Ok(Mode::Production),
            other => Err(ConfigError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable per-invocation context: the validated mode plus the
/// allow-listed slice of the environment.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use plait_config::{BuildContext, Mode};
///
/// let mut raw = HashMap::new();
/// raw.insert("NODE_ENV".to_string(), "development".to_string());
/// raw.insert("HOME".to_string(), "/home/me".to_string());
///
/// let context = BuildContext::resolve(&raw, "development").unwrap();
/// assert_eq!(context.mode(), Mode::Development);
/// assert_eq!(context.var("NODE_ENV"), Some("development"));
/// // Not allow-listed, never projected:
/// assert_eq!(context.var("HOME"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildContext {
    mode: Mode,
    variables: IndexMap<String, Option<String>>,
}

impl BuildContext {
    /// Validate `mode` and project `raw_env` onto the allow-list.
    ///
    /// Every allow-listed name is present in the result; names absent from
    /// `raw_env` are recorded as unset rather than defaulted, so consumers
    /// can distinguish "not set" from "empty string".
    pub fn resolve(raw_env: &HashMap<String, String>, mode: &str) -> Result<Self> {
        let mode = Mode::parse(mode)?;

        let mut variables = IndexMap::with_capacity(ENV_ALLOW_LIST.len());
        for name in ENV_ALLOW_LIST {
            variables.insert(name.to_string(), raw_env.get(name).cloned());
        }

        tracing::debug!(
            "resolved build context: mode={}, {} of {} variables set",
            mode,
            variables.values().filter(|v| v.is_some()).count(),
            ENV_ALLOW_LIST.len()
        );

        Ok(Self { mode, variables })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Value of an allow-listed variable, or `None` when unset or not
    /// allow-listed.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.variables.get(name).and_then(|v| v.as_deref())
    }

    /// Whether an allow-listed variable was present in the raw environment
    /// (an empty string counts as set).
    pub fn is_set(&self, name: &str) -> bool {
        matches!(self.variables.get(name), Some(Some(_)))
    }

    /// All allow-listed variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.variables
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}
