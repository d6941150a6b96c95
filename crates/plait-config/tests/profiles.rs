//! Tests for profile fragment merging across base and mode fragments.

use std::fs;

use plait_config::{
    ConfigError, DevtoolStrategy, FragmentDiscovery, Mode, OutputNaming, ProfileFragment,
    ProfileRegistry,
};
use serde_json::json;
use tempfile::TempDir;

fn base_fragment() -> ProfileFragment {
    let mut fragment = ProfileFragment::default();
    fragment
        .entries
        .insert("app".to_string(), "./src/index.bs.js".to_string());
    fragment.devtool = Some(DevtoolStrategy::Inline);
    fragment.output_naming = Some(OutputNaming {
        entry_pattern: "[name].bundle.js".to_string(),
        chunk_pattern: "[id].js".to_string(),
        css_pattern: "[name].css".to_string(),
    });
    fragment
}

#[test]
fn mode_fragment_output_naming_wins() {
    let mut registry = ProfileRegistry::new();
    registry.register_base(base_fragment());
    registry.register(
        Mode::Production,
        ProfileFragment {
            output_naming: Some(OutputNaming {
                entry_pattern: "[name].[hash].js".to_string(),
                chunk_pattern: "[id].[hash].js".to_string(),
                css_pattern: "[name].[hash].css".to_string(),
            }),
            ..ProfileFragment::default()
        },
    );

    let profile = registry.resolve(Mode::Production).unwrap();
    assert_eq!(profile.output_naming.entry_pattern, "[name].[hash].js");
    assert!(profile.output_naming.is_hashed());
    // Untouched fields inherit from the base.
    assert_eq!(profile.devtool, DevtoolStrategy::Inline);
}

#[test]
fn later_base_fragments_override_earlier_ones() {
    let mut registry = ProfileRegistry::new();
    registry.register_base(base_fragment());

    let mut second = ProfileFragment::default();
    second.devtool = Some(DevtoolStrategy::External);
    registry.register_base(second);

    let profile = registry.resolve(Mode::Development).unwrap();
    assert_eq!(profile.devtool, DevtoolStrategy::External);
}

#[test]
fn resolving_both_modes_from_one_registry() {
    let registry = ProfileRegistry::with_defaults();

    let dev = registry.resolve(Mode::Development).unwrap();
    let prod = registry.resolve(Mode::Production).unwrap();

    assert!(!dev.output_naming.is_hashed());
    assert!(prod.output_naming.is_hashed());
    assert_eq!(dev.entries, prod.entries);
    assert_eq!(dev.output_dir, prod.output_dir);
}

#[test]
fn fragment_without_required_fields_fails_to_resolve() {
    let mut registry = ProfileRegistry::new();
    let mut fragment = ProfileFragment::default();
    fragment
        .entries
        .insert("app".to_string(), "./src/index.js".to_string());
    registry.register(Mode::Development, fragment);

    let err = registry.resolve(Mode::Development).unwrap_err();
    assert!(matches!(err, ConfigError::IncompleteProfile { .. }));
}

#[test]
fn discovered_fragments_merge_like_programmatic_ones() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("plait.toml"),
        r#"
[profile.base]
devtool = "inline-source-map"

[profile.base.entries]
app = "./src/index.bs.js"

[profile.base.output_naming]
entry_pattern = "[name].js"
chunk_pattern = "[id].js"
css_pattern = "[name].css"

[profile.production]
devtool = "none"

[profile.production.transform_overrides.babel]
compact = true
"#,
    )
    .expect("write config");

    let registry = FragmentDiscovery::new(dir.path()).load().expect("load");
    let profile = registry.resolve(Mode::Production).expect("resolve");

    assert_eq!(profile.devtool, DevtoolStrategy::None);
    assert_eq!(profile.transform_overrides["babel"], json!({"compact": true}));

    // Development only sees the base fragment.
    let dev = registry.resolve(Mode::Development).expect("resolve dev");
    assert_eq!(dev.devtool, DevtoolStrategy::Inline);
    assert!(dev.transform_overrides.is_empty());
}
