//! The final build plan and the end-to-end composition entry points.

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use plait_config::{
    BuildContext, DevtoolStrategy, Mode, OutputNaming, ProfileRegistry, ResolvedProfile, Result,
    ServerOptions,
};
use serde::Serialize;

use crate::plugin::{compose_plugins, PluginDescriptor};
use crate::rules::{compose_rules, TransformRule};
use crate::stage::StageRegistry;

/// The complete, immutable description of a build, consumed by the bundler
/// runtime. Constructed once per invocation; every field is concrete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPlan {
    pub mode: Mode,
    pub entries: IndexMap<String, String>,
    pub output_dir: PathBuf,
    pub public_path: String,
    pub naming: OutputNaming,
    pub rules: Vec<TransformRule>,
    pub plugins: Vec<PluginDescriptor>,
    pub devtool: DevtoolStrategy,
    /// Present only when `mode` is Development.
    pub server: Option<ServerOptions>,
}

impl BuildPlan {
    /// Canonical JSON form, usable as a determinism fingerprint: composing
    /// the same inputs twice yields byte-identical output.
    pub fn to_canonical_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| plait_config::ConfigError::InvalidValue {
            field: "plan".to_string(),
            hint: Some(e.to_string()),
        })
    }
}

/// Build the ordered rule and plugin lists for a resolved profile.
///
/// All-or-nothing: any unknown stage or plugin name fails the whole
/// composition.
pub fn compose(
    profile: &ResolvedProfile,
    context: &BuildContext,
    stages: &StageRegistry,
) -> Result<(Vec<TransformRule>, Vec<PluginDescriptor>)> {
    let rules = compose_rules(profile, stages)?;
    let plugins = compose_plugins(profile, context)?;
    Ok((rules, plugins))
}

/// Run the full composition flow: environment resolution, profile merge,
/// pipeline composition, and output planning.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use plait_compose::{compose_plan, StageRegistry};
/// use plait_config::ProfileRegistry;
///
/// let registry = ProfileRegistry::with_defaults();
/// let plan = compose_plan(
///     &registry,
///     &HashMap::new(),
///     "production",
///     &StageRegistry::builtin(),
/// )
/// .unwrap();
///
/// assert_eq!(plan.naming.entry_pattern, "[name].[hash].js");
/// ```
pub fn compose_plan(
    registry: &ProfileRegistry,
    raw_env: &HashMap<String, String>,
    mode: &str,
    stages: &StageRegistry,
) -> Result<BuildPlan> {
    let context = BuildContext::resolve(raw_env, mode)?;
    let profile = registry.resolve(context.mode())?;
    let (rules, plugins) = compose(&profile, &context, stages)?;
    crate::planner::plan(&profile, rules, plugins, &context)
}
