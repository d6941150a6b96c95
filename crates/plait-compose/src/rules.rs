//! Transform rule composition: default chains plus profile overrides,
//! phase-sorted.

use plait_config::{merge_values, ConfigError, ResolvedProfile, Result};
use serde::Serialize;

use crate::stage::{default_chain, AssetClass, StageInvocation, StageRegistry};

/// A file pattern bound to an ordered stage chain. The first rule whose
/// pattern matches an asset wins; stage order within the rule is
/// significant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformRule {
    pub pattern: String,
    pub stages: Vec<StageInvocation>,
}

/// Build the ordered rule list for a resolved profile.
///
/// For each asset class the mode's default chain is taken, profile overrides
/// are deep-merged into matching stages (or appended when the stage is known
/// but not in the default chain), and the result is stable-sorted into
/// representation/packaging/encoding phase buckets.
///
/// # Errors
///
/// [`ConfigError::UnknownStage`] when an override names a stage outside the
/// registry. No partial rule list is returned.
pub fn compose_rules(
    profile: &ResolvedProfile,
    registry: &StageRegistry,
) -> Result<Vec<TransformRule>> {
    for name in profile.transform_overrides.keys() {
        if !registry.contains(name) {
            return Err(ConfigError::UnknownStage { name: name.clone() });
        }
    }

    let mut rules = Vec::with_capacity(2);
    for class in [AssetClass::Script, AssetClass::Stylesheet] {
        let mut chain = default_chain(class, profile.mode);

        for (name, options) in &profile.transform_overrides {
            let Some(spec) = registry.get(name) else {
                // Checked above.
                continue;
            };
            if spec.class != class {
                continue;
            }
            match chain.iter_mut().find(|inv| inv.name == *name) {
                Some(invocation) => merge_values(&mut invocation.options, options),
                None => chain.push(StageInvocation {
                    name: name.clone(),
                    options: options.clone(),
                }),
            }
        }

        // Stable sort: phase order is structural, ties keep chain order.
        let mut ranked: Vec<(usize, StageInvocation)> = chain
            .into_iter()
            .filter_map(|inv| registry.get(&inv.name).map(|spec| (spec.phase as usize, inv)))
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);

        let stages: Vec<StageInvocation> = ranked.into_iter().map(|(_, inv)| inv).collect();
        tracing::trace!(
            "composed {} rule with {} stages",
            class.pattern(),
            stages.len()
        );
        rules.push(TransformRule {
            pattern: class.pattern().to_string(),
            stages,
        });
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plait_config::{Mode, ProfileFragment, ProfileRegistry};
    use serde_json::json;

    fn resolved(mode: Mode, overrides: &[(&str, serde_json::Value)]) -> ResolvedProfile {
        let mut registry = ProfileRegistry::with_defaults();
        if !overrides.is_empty() {
            let mut fragment = ProfileFragment::default();
            for (name, options) in overrides {
                fragment
                    .transform_overrides
                    .insert(name.to_string(), options.clone());
            }
            registry.register(mode, fragment);
        }
        registry.resolve(mode).unwrap()
    }

    fn stage_names(rule: &TransformRule) -> Vec<&str> {
        rule.stages.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn development_defaults_have_no_minify_stage() {
        let rules = compose_rules(
            &resolved(Mode::Development, &[]),
            &StageRegistry::builtin(),
        )
        .unwrap();
        assert_eq!(stage_names(&rules[0]), vec!["babel", "linaria"]);
        assert_eq!(stage_names(&rules[1]), vec!["css", "style-inject"]);
    }

    #[test]
    fn production_defaults_include_minify_and_extract() {
        let rules =
            compose_rules(&resolved(Mode::Production, &[]), &StageRegistry::builtin()).unwrap();
        assert_eq!(stage_names(&rules[0]), vec!["babel", "linaria", "minify"]);
        assert_eq!(stage_names(&rules[1]), vec!["css", "css-extract"]);
    }

    #[test]
    fn override_merges_into_default_stage_options() {
        let rules = compose_rules(
            &resolved(Mode::Development, &[("linaria", json!({"source_map": false}))]),
            &StageRegistry::builtin(),
        )
        .unwrap();

        let linaria = rules[0]
            .stages
            .iter()
            .find(|s| s.name == "linaria")
            .unwrap();
        assert_eq!(
            linaria.options,
            json!({"display_name": true, "source_map": false})
        );
    }

    #[test]
    fn appended_stage_is_phase_sorted_not_appended_last() {
        // css-extract is a packaging stage; adding it to a development
        // profile must still place it before any encoding stage and after
        // the representation stages, regardless of override order.
        let rules = compose_rules(
            &resolved(Mode::Development, &[("css-extract", json!({}))]),
            &StageRegistry::builtin(),
        )
        .unwrap();

        let css_rule = &rules[1];
        let names = stage_names(css_rule);
        let css_pos = names.iter().position(|n| *n == "css").unwrap();
        let extract_pos = names.iter().position(|n| *n == "css-extract").unwrap();
        assert!(css_pos < extract_pos);
    }

    #[test]
    fn unknown_stage_override_fails() {
        let err = compose_rules(
            &resolved(Mode::Development, &[("coffeescript", json!({}))]),
            &StageRegistry::builtin(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStage { name } if name == "coffeescript"));
    }

    #[test]
    fn script_rule_precedes_stylesheet_rule() {
        let rules =
            compose_rules(&resolved(Mode::Production, &[]), &StageRegistry::builtin()).unwrap();
        assert_eq!(rules[0].pattern, "*.js");
        assert_eq!(rules[1].pattern, "*.css");
    }
}
