// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading and layering configuration files.

use std::fs;
use tables_config::{
    ClassifierConfig, ConfigError, ConfigWarning, merge_configs, parse_toml, validate_config,
};
use tables_naming::Backend;

#[test]
fn site_file_then_project_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let site = dir.path().join("site.toml");
    let project = dir.path().join("project.toml");
    fs::write(&site, "error_code_header = \"x-ms-error-code\"\nlog_level = \"warn\"\n").unwrap();
    fs::write(&project, "backends = [\"cosmos\"]\n").unwrap();

    let base = parse_toml(&fs::read_to_string(&site).unwrap()).unwrap();
    let overlay = parse_toml(&fs::read_to_string(&project).unwrap()).unwrap();
    let merged = merge_configs(base, overlay);

    assert_eq!(merged.log_level(), "warn");
    assert_eq!(merged.backends(), &[Backend::Cosmos]);
    assert!(validate_config(&merged).unwrap().is_empty());
}

#[test]
fn default_overlay_does_not_clobber_base_header() {
    let base = ClassifierConfig {
        error_code_header: Some("x-gateway-code".into()),
        ..ClassifierConfig::default()
    };
    let merged = merge_configs(base, ClassifierConfig::default());
    assert_eq!(merged.error_code_header(), "x-gateway-code");
}

#[test]
fn disabled_validation_with_no_backends_is_quiet() {
    let cfg = parse_toml("validate_names = false\nbackends = []\n").unwrap();
    assert!(validate_config(&cfg).unwrap().is_empty());
}

#[test]
fn enabled_validation_with_no_backends_warns() {
    let cfg = parse_toml("backends = []\n").unwrap();
    assert_eq!(validate_config(&cfg).unwrap(), vec![ConfigWarning::NoBackends]);
}

#[test]
fn header_with_colon_is_a_hard_error() {
    let cfg = parse_toml("error_code_header = \"x-ms-error-code:\"\n").unwrap();
    match validate_config(&cfg).unwrap_err() {
        ConfigError::ValidationError { reasons } => {
            assert_eq!(reasons.len(), 1);
            assert!(reasons[0].contains("':'"));
        }
        other => panic!("expected ValidationError, got {other:?}"),
    }
}

#[test]
fn config_serializes_to_json_without_unset_fields() {
    let cfg = ClassifierConfig {
        log_level: None,
        backends: Some(vec![Backend::Storage]),
        ..ClassifierConfig::default()
    };
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json, serde_json::json!({ "backends": ["storage"] }));
}
