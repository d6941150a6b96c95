//! The stage registry: the fixed set of content transformers a rule may
//! reference, bucketed by phase.
//!
//! Stages are registered in an explicit registry value handed to the
//! composer; there is no global registration table.

use indexmap::IndexMap;
use plait_config::Mode;
use serde::Serialize;
use serde_json::{json, Value};

/// Where a stage sits in the order-sensitive pipeline.
///
/// Representation stages change what the asset *is* (language lowering),
/// packaging stages change where its output *lives* (extraction, injection),
/// encoding stages change its physical bytes (minification). Reversing this
/// order produces broken output, so the composer sorts by phase instead of
/// trusting configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StagePhase {
    Representation,
    Packaging,
    Encoding,
}

/// Asset class a stage applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Script,
    Stylesheet,
}

impl AssetClass {
    /// File pattern matched against assets; first matching rule wins.
    pub fn pattern(&self) -> &'static str {
        match self {
            AssetClass::Script => "*.js",
            AssetClass::Stylesheet => "*.css",
        }
    }
}

/// A known stage: its name, the asset class it applies to, and its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub name: &'static str,
    pub class: AssetClass,
    pub phase: StagePhase,
}

/// One stage occurrence inside a rule, with its resolved options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageInvocation {
    pub name: String,
    pub options: Value,
}

/// Registry of stages the composer may reference.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: IndexMap<&'static str, StageSpec>,
}

impl StageRegistry {
    /// The built-in stage set for a single-page application build.
    pub fn builtin() -> Self {
        let mut stages = IndexMap::new();
        for spec in [
            StageSpec {
                name: "babel",
                class: AssetClass::Script,
                phase: StagePhase::Representation,
            },
            StageSpec {
                name: "linaria",
                class: AssetClass::Script,
                phase: StagePhase::Representation,
            },
            StageSpec {
                name: "minify",
                class: AssetClass::Script,
                phase: StagePhase::Encoding,
            },
            StageSpec {
                name: "css",
                class: AssetClass::Stylesheet,
                phase: StagePhase::Representation,
            },
            StageSpec {
                name: "style-inject",
                class: AssetClass::Stylesheet,
                phase: StagePhase::Packaging,
            },
            StageSpec {
                name: "css-extract",
                class: AssetClass::Stylesheet,
                phase: StagePhase::Packaging,
            },
        ] {
            stages.insert(spec.name, spec);
        }
        Self { stages }
    }

    pub fn get(&self, name: &str) -> Option<&StageSpec> {
        self.stages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The class-default stage chain for a mode, used when a profile carries no
/// override for a stage.
pub(crate) fn default_chain(class: AssetClass, mode: Mode) -> Vec<StageInvocation> {
    match (class, mode) {
        (AssetClass::Script, Mode::Development) => vec![
            StageInvocation {
                name: "babel".to_string(),
                options: json!({}),
            },
            StageInvocation {
                name: "linaria".to_string(),
                options: json!({"display_name": true, "source_map": true}),
            },
        ],
        (AssetClass::Script, Mode::Production) => vec![
            StageInvocation {
                name: "babel".to_string(),
                options: json!({"compact": true}),
            },
            StageInvocation {
                name: "linaria".to_string(),
                options: json!({"display_name": false, "source_map": false}),
            },
            StageInvocation {
                name: "minify".to_string(),
                options: json!({}),
            },
        ],
        (AssetClass::Stylesheet, Mode::Development) => vec![
            StageInvocation {
                name: "css".to_string(),
                options: json!({"modules": "global"}),
            },
            StageInvocation {
                name: "style-inject".to_string(),
                options: json!({}),
            },
        ],
        (AssetClass::Stylesheet, Mode::Production) => vec![
            StageInvocation {
                name: "css".to_string(),
                options: json!({"modules": "global"}),
            },
            StageInvocation {
                name: "css-extract".to_string(),
                options: json!({}),
            },
        ],
    }
}
