//! File-based fragment discovery for CLI use.
//!
//! Finds and loads a `plait.toml` from a project root and turns its
//! `[profile.*]` tables into a populated [`ProfileRegistry`]. Library users
//! composing fragments programmatically can skip this module entirely.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::context::Mode;
use crate::error::{ConfigError, Result};
use crate::profile::{ProfileFragment, ProfileRegistry};

const CONFIG_FILE: &str = "plait.toml";

#[derive(Debug, Default, Deserialize)]
struct FragmentFile {
    #[serde(default)]
    profile: IndexMap<String, ProfileFragment>,
}

/// File-based fragment discovery.
///
/// # Example
///
/// ```no_run
/// use plait_config::{FragmentDiscovery, Mode};
///
/// let registry = FragmentDiscovery::new(".").load().unwrap();
/// let profile = registry.resolve(Mode::Development).unwrap();
/// ```
pub struct FragmentDiscovery {
    root: PathBuf,
}

impl FragmentDiscovery {
    /// Create a new discovery rooted at a project directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find the fragment file in the root directory, if present.
    pub fn find(&self) -> Option<PathBuf> {
        let path = self.root.join(CONFIG_FILE);
        path.exists().then_some(path)
    }

    /// Load fragments from the discovered file into a fresh registry.
    ///
    /// The `[profile.base]` table registers as a base fragment; every other
    /// `[profile.<name>]` table must name a known mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no fragment file exists,
    /// [`ConfigError::InvalidValue`] on malformed TOML, and
    /// [`ConfigError::InvalidMode`] for an unrecognized profile table name.
    pub fn load(&self) -> Result<ProfileRegistry> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        tracing::debug!("loading profile fragments from {}", path.display());
        self.load_from(&path)
    }

    fn load_from(&self, path: &Path) -> Result<ProfileRegistry> {
        let content = fs::read_to_string(path)?;

        let toml_val: toml::Value =
            toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "toml".to_string(),
                hint: Some(format!("Invalid TOML syntax: {}", e)),
            })?;

        let value = serde_json::to_value(toml_val).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("TOML to JSON conversion failed: {}", e)),
        })?;

        let file: FragmentFile =
            serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
                field: "profile".to_string(),
                hint: Some(e.to_string()),
            })?;

        let mut registry = ProfileRegistry::new();
        for (name, fragment) in file.profile {
            if name == "base" {
                registry.register_base(fragment);
            } else {
                registry.register(Mode::parse(&name)?, fragment);
            }
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        let discovery = FragmentDiscovery::new(dir.path());
        assert!(discovery.find().is_none());
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let result = FragmentDiscovery::new(dir.path()).load();
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound));
    }

    #[test]
    fn load_parses_fragment_tables() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("plait.toml"),
            r#"
[profile.base.entries]
app = "./src/index.bs.js"

[profile.development]
devtool = "cheap-module-eval-source-map"

[profile.development.output_naming]
entry_pattern = "[name].js"
chunk_pattern = "[id].js"
css_pattern = "[name].css"
"#,
        )
        .unwrap();

        let registry = FragmentDiscovery::new(dir.path()).load().unwrap();
        let profile = registry.resolve(Mode::Development).unwrap();
        assert_eq!(profile.entries["app"], "./src/index.bs.js");
        assert_eq!(profile.output_naming.entry_pattern, "[name].js");
    }

    #[test]
    fn load_rejects_unknown_profile_table() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("plait.toml"),
            r#"
[profile.staging]
devtool = "none"
"#,
        )
        .unwrap();

        let result = FragmentDiscovery::new(dir.path()).load();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidMode { .. }
        ));
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("plait.toml"), "not [ valid toml").unwrap();

        let result = FragmentDiscovery::new(dir.path()).load();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue { .. }
        ));
    }
}
