//! Output planning: cross-checks the composed rules and plugins and
//! assembles the final immutable plan.

use plait_config::{BuildContext, ConfigError, Mode, ResolvedProfile, Result};

use crate::plan::BuildPlan;
use crate::plugin::PluginDescriptor;
use crate::rules::TransformRule;

/// Finalize a build plan from a resolved profile and its composed pipeline.
///
/// Dev-server options are carried only in Development. Production naming is
/// whatever the profile resolved to; the default registry supplies
/// `[hash]`-qualified templates there so emitted names bust caches.
///
/// # Errors
///
/// [`ConfigError::InconsistentPlan`] when rules and plugins reference each
/// other in an unsatisfiable way, for example an extraction stage without
/// the extraction plugin.
pub fn plan(
    profile: &ResolvedProfile,
    rules: Vec<TransformRule>,
    plugins: Vec<PluginDescriptor>,
    context: &BuildContext,
) -> Result<BuildPlan> {
    if profile.mode != context.mode() {
        return Err(ConfigError::InconsistentPlan {
            message: format!(
                "profile resolved for {} but context is {}",
                profile.mode,
                context.mode()
            ),
        });
    }

    validate_extraction(&rules, &plugins)?;

    let server = (context.mode() == Mode::Development).then(|| profile.server.clone());

    tracing::debug!(
        "planned {} build: {} rules, {} plugins, devtool={:?}",
        profile.mode,
        rules.len(),
        plugins.len(),
        profile.devtool
    );

    Ok(BuildPlan {
        mode: profile.mode,
        entries: profile.entries.clone(),
        output_dir: profile.output_dir.clone(),
        public_path: profile.public_path.clone(),
        naming: profile.output_naming.clone(),
        rules,
        plugins,
        devtool: profile.devtool,
        server,
    })
}

fn validate_extraction(rules: &[TransformRule], plugins: &[PluginDescriptor]) -> Result<()> {
    let rule_has = |stage: &str| {
        rules
            .iter()
            .any(|rule| rule.stages.iter().any(|s| s.name == stage))
    };
    let plugin_present = plugins.iter().any(|p| p.name == "css-extract");

    if rule_has("css-extract") && !plugin_present {
        return Err(ConfigError::InconsistentPlan {
            message: "css-extract stage used without the css-extract plugin".to_string(),
        });
    }
    if plugin_present && !rule_has("css-extract") {
        return Err(ConfigError::InconsistentPlan {
            message: "css-extract plugin enabled but no rule extracts stylesheets".to_string(),
        });
    }
    if plugin_present && rule_has("style-inject") {
        return Err(ConfigError::InconsistentPlan {
            message: "style-inject stage conflicts with the css-extract plugin".to_string(),
        });
    }
    Ok(())
}
