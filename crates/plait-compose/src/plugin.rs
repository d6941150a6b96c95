//! Plugin selection: mode-intrinsic defaults adjusted by profile toggles.

use plait_config::{BuildContext, ConfigError, Mode, ResolvedProfile, Result};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// When a plugin runs relative to the compile step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginBucket {
    PreCompile,
    PostCompile,
}

/// A selected plugin with its computed options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub bucket: PluginBucket,
    pub options: Value,
}

struct KnownPlugin {
    name: &'static str,
    bucket: PluginBucket,
    enabled_by_default: fn(Mode) -> bool,
}

fn always(_: Mode) -> bool {
    true
}

fn production_only(mode: Mode) -> bool {
    mode == Mode::Production
}

/// The known plugin set in its fixed, reproducible order. Pre-compile
/// plugins first, then post-compile; the plan's plugin order is exactly
/// this order filtered by selection.
const KNOWN_PLUGINS: [KnownPlugin; 6] = [
    KnownPlugin {
        name: "env-inject",
        bucket: PluginBucket::PreCompile,
        enabled_by_default: always,
    },
    KnownPlugin {
        name: "clean-output",
        bucket: PluginBucket::PreCompile,
        enabled_by_default: always,
    },
    KnownPlugin {
        name: "html-inject",
        bucket: PluginBucket::PostCompile,
        enabled_by_default: always,
    },
    KnownPlugin {
        name: "css-extract",
        bucket: PluginBucket::PostCompile,
        enabled_by_default: production_only,
    },
    KnownPlugin {
        name: "css-minify",
        bucket: PluginBucket::PostCompile,
        enabled_by_default: production_only,
    },
    KnownPlugin {
        name: "compress",
        bucket: PluginBucket::PostCompile,
        enabled_by_default: production_only,
    },
];

/// Derive the ordered plugin list for a profile and context.
///
/// Selection starts from the mode-intrinsic defaults (cleanup, env
/// injection, and HTML generation always run; extraction, CSS minification,
/// and compression only in production) and applies the profile's explicit
/// toggles on top.
///
/// # Errors
///
/// [`ConfigError::UnknownStage`] when a toggle names a plugin outside the
/// known set.
pub fn compose_plugins(
    profile: &ResolvedProfile,
    context: &BuildContext,
) -> Result<Vec<PluginDescriptor>> {
    for name in profile.plugin_toggles.keys() {
        if !KNOWN_PLUGINS.iter().any(|p| p.name == name) {
            return Err(ConfigError::UnknownStage { name: name.clone() });
        }
    }

    let mut plugins = Vec::new();
    for known in &KNOWN_PLUGINS {
        let enabled = profile
            .plugin_toggles
            .get(known.name)
            .copied()
            .unwrap_or_else(|| (known.enabled_by_default)(profile.mode));
        if !enabled {
            continue;
        }
        plugins.push(PluginDescriptor {
            name: known.name.to_string(),
            bucket: known.bucket,
            options: plugin_options(known.name, profile, context),
        });
    }

    tracing::debug!(
        "selected {} plugins for mode={}",
        plugins.len(),
        profile.mode
    );
    Ok(plugins)
}

fn plugin_options(name: &str, profile: &ResolvedProfile, context: &BuildContext) -> Value {
    match name {
        "env-inject" => {
            let mut variables = Map::new();
            for (key, value) in context.variables() {
                let projected = value.map_or(Value::Null, |v| Value::String(v.to_string()));
                variables.insert(key.to_string(), projected);
            }
            json!({ "variables": variables })
        }
        "clean-output" => json!({
            "directory": profile.output_dir,
            "clean_stale_assets": false,
        }),
        "html-inject" => json!({ "template": profile.html_template }),
        "css-extract" => json!({ "filename": profile.output_naming.css_pattern }),
        "css-minify" => json!({ "processor": "cssnano" }),
        "compress" => json!({ "delete_original_assets": false }),
        _ => Value::Null,
    }
}
