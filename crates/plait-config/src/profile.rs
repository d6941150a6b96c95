//! Profile fragments and the registry that merges them.
//!
//! A build profile is assembled from partial [`ProfileFragment`]s: shared
//! base fragments first, then mode-specific fragments, rightmost winner per
//! field. The merge walks an explicit field list so the result never depends
//! on container iteration order, and [`ProfileRegistry::resolve`] returns a
//! fresh, fully-concrete [`ResolvedProfile`] on every call.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::Mode;
use crate::error::{ConfigError, Result};

/// Source-map strategy handed to the bundler runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevtoolStrategy {
    /// Source maps disabled.
    #[serde(rename = "none")]
    None,
    /// Fast eval-based maps for development rebuilds.
    #[serde(rename = "cheap-module-eval-source-map")]
    Eval,
    /// Full maps inlined into the bundle.
    #[serde(rename = "inline-source-map")]
    Inline,
    /// Full maps emitted as external `.map` files.
    #[serde(rename = "source-map")]
    External,
}

impl DevtoolStrategy {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DevtoolStrategy::None)
    }
}

/// Output file-naming templates. `[name]`, `[id]` and `[hash]` placeholders
/// are substituted by the bundler runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNaming {
    pub entry_pattern: String,
    pub chunk_pattern: String,
    pub css_pattern: String,
}

impl OutputNaming {
    /// Whether any template carries a content-hash placeholder.
    pub fn is_hashed(&self) -> bool {
        self.entry_pattern.contains("[hash]")
            || self.chunk_pattern.contains("[hash]")
            || self.css_pattern.contains("[hash]")
    }
}

/// Dev-server options, only consumed when the mode is Development.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerOptions {
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,

    #[serde(default = "default_true")]
    pub history_api_fallback: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            history_api_fallback: true,
        }
    }
}

/// A named, partial contribution to a build profile.
///
/// Every field is optional: absence means "inherit from earlier fragments",
/// never "disable". Disabling a plugin requires an explicit `false` entry in
/// `plugin_toggles`, which is distinct from the name being absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFragment {
    /// Entry points (bundle name -> module path). Merged key-wise.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub entries: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtool: Option<DevtoolStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_naming: Option<OutputNaming>,

    /// Stage name -> JSON options object. Merged key-wise; option objects
    /// for the same stage deep-merge with the later fragment winning.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub transform_overrides: IndexMap<String, Value>,

    /// Plugin name -> enabled. Merged key-wise.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub plugin_toggles: IndexMap<String, bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_template: Option<String>,
}

/// A fully merged profile: every field the pipeline needs is concrete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProfile {
    pub mode: Mode,
    pub entries: IndexMap<String, String>,
    pub output_dir: PathBuf,
    pub public_path: String,
    pub devtool: DevtoolStrategy,
    pub output_naming: OutputNaming,
    pub transform_overrides: IndexMap<String, Value>,
    pub plugin_toggles: IndexMap<String, bool>,
    pub server: ServerOptions,
    pub html_template: String,
}

/// Holds registered fragments and merges them into resolved profiles.
///
/// Populated once at startup by configuration-loading code, read-only during
/// any single build invocation.
///
/// # Example
///
/// ```
/// use plait_config::{Mode, ProfileRegistry};
///
/// let registry = ProfileRegistry::with_defaults();
/// let profile = registry.resolve(Mode::Production).unwrap();
///
/// assert!(profile.output_naming.is_hashed());
/// assert!(!profile.devtool.is_enabled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    base: Vec<ProfileFragment>,
    modes: IndexMap<Mode, Vec<ProfileFragment>>,
}

impl ProfileRegistry {
    /// An empty registry with no fragments.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the canonical base, development, and
    /// production fragments for a single-page application build: one `app`
    /// entry, stable names and eval source maps in development, hashed names
    /// and no source maps in production.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let mut base = ProfileFragment::default();
        base.entries
            .insert("app".to_string(), "./src/index.bs.js".to_string());
        base.output_dir = Some(PathBuf::from("build"));
        base.public_path = Some("/".to_string());
        base.html_template = Some("src/index.html".to_string());
        base.server = Some(ServerOptions::default());
        registry.register_base(base);

        registry.register(
            Mode::Development,
            ProfileFragment {
                devtool: Some(DevtoolStrategy::Eval),
                output_naming: Some(OutputNaming {
                    entry_pattern: "[name].js".to_string(),
                    chunk_pattern: "[id].js".to_string(),
                    css_pattern: "[name].css".to_string(),
                }),
                ..ProfileFragment::default()
            },
        );

        registry.register(
            Mode::Production,
            ProfileFragment {
                devtool: Some(DevtoolStrategy::None),
                output_naming: Some(OutputNaming {
                    entry_pattern: "[name].[hash].js".to_string(),
                    chunk_pattern: "[id].[hash].js".to_string(),
                    css_pattern: "[name].[hash].css".to_string(),
                }),
                ..ProfileFragment::default()
            },
        );

        registry
    }

    /// Register a fragment shared by every mode. Base fragments merge ahead
    /// of mode-specific ones, in registration order.
    pub fn register_base(&mut self, fragment: ProfileFragment) {
        self.base.push(fragment);
    }

    /// Register a mode-specific fragment. Mode fragments merge last, so
    /// their fields win over base fragments.
    pub fn register(&mut self, mode: Mode, fragment: ProfileFragment) {
        self.modes.entry(mode).or_default().push(fragment);
    }

    /// Merge all fragments for `mode` into a concrete profile.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IncompleteProfile`] when no fragment supplies a
    /// required field (`entries`, `output_naming`, `devtool`).
    pub fn resolve(&self, mode: Mode) -> Result<ResolvedProfile> {
        let mut merged = ProfileFragment::default();
        for fragment in self.fragments_for(mode) {
            merge_fragment(&mut merged, fragment);
        }

        tracing::debug!(
            "resolved profile for mode={}: {} entries, {} overrides, {} toggles",
            mode,
            merged.entries.len(),
            merged.transform_overrides.len(),
            merged.plugin_toggles.len()
        );

        if merged.entries.is_empty() {
            return Err(ConfigError::IncompleteProfile { field: "entries" });
        }
        let output_naming = merged
            .output_naming
            .ok_or(ConfigError::IncompleteProfile {
                field: "output_naming",
            })?;
        let devtool = merged.devtool.ok_or(ConfigError::IncompleteProfile {
            field: "devtool",
        })?;

        Ok(ResolvedProfile {
            mode,
            entries: merged.entries,
            output_dir: merged.output_dir.unwrap_or_else(|| PathBuf::from("build")),
            public_path: merged.public_path.unwrap_or_else(|| "/".to_string()),
            devtool,
            output_naming,
            transform_overrides: merged.transform_overrides,
            plugin_toggles: merged.plugin_toggles,
            server: merged.server.unwrap_or_default(),
            html_template: merged
                .html_template
                .unwrap_or_else(|| "src/index.html".to_string()),
        })
    }

    fn fragments_for(&self, mode: Mode) -> impl Iterator<Item = &ProfileFragment> {
        self.base
            .iter()
            .chain(self.modes.get(&mode).into_iter().flatten())
    }
}

/// Fold `over` into `target`, rightmost winner per field.
///
/// Walks the fragment fields explicitly; scalar and struct fields replace
/// wholesale, map fields merge key-wise with right bias.
fn merge_fragment(target: &mut ProfileFragment, over: &ProfileFragment) {
    for (name, path) in &over.entries {
        target.entries.insert(name.clone(), path.clone());
    }
    if let Some(dir) = &over.output_dir {
        target.output_dir = Some(dir.clone());
    }
    if let Some(path) = &over.public_path {
        target.public_path = Some(path.clone());
    }
    if let Some(devtool) = over.devtool {
        target.devtool = Some(devtool);
    }
    if let Some(naming) = &over.output_naming {
        target.output_naming = Some(naming.clone());
    }
    for (stage, options) in &over.transform_overrides {
        match target.transform_overrides.get_mut(stage) {
            Some(existing) => merge_values(existing, options),
            None => {
                target
                    .transform_overrides
                    .insert(stage.clone(), options.clone());
            }
        }
    }
    for (plugin, enabled) in &over.plugin_toggles {
        target.plugin_toggles.insert(plugin.clone(), *enabled);
    }
    if let Some(server) = &over.server {
        target.server = Some(server.clone());
    }
    if let Some(template) = &over.html_template {
        target.html_template = Some(template.clone());
    }
}

/// Deep-merge `update` into `target`: objects merge key-wise, everything
/// else (arrays included) replaces.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

fn default_content_root() -> PathBuf {
    PathBuf::from("./")
}

fn default_true() -> bool {
    true
}
