// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tables_naming::Backend;

/// Default header carrying the service error code.
pub const DEFAULT_ERROR_CODE_HEADER: &str = "x-ms-error-code";

/// Recognised log levels.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// An environment override held a value of the wrong shape.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvValue {
        /// Variable name.
        var: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Name validation is on but no backend's rules are consulted.
    NoBackends,
    /// A backend is listed more than once.
    DuplicateBackend {
        /// The repeated backend.
        backend: Backend,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::NoBackends => {
                write!(f, "validate_names is on but backends is empty; no name will ever be checked")
            }
            ConfigWarning::DuplicateBackend { backend } => {
                write!(f, "backend '{backend}' is listed more than once")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config type
// ---------------------------------------------------------------------------

/// Settings for decoding and classifying table-service errors.
///
/// Unset fields fall back to defaults through the accessor methods, so an
/// overlay only overrides what it actually sets.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Response header that seeds the error code (default `x-ms-error-code`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code_header: Option<String>,

    /// Re-validate table names when an error looks naming-related (default `true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_names: Option<bool>,

    /// Backends whose naming rules are consulted (default: all).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backends: Option<Vec<Backend>>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl ClassifierConfig {
    /// Effective error-code header.
    pub fn error_code_header(&self) -> &str {
        self.error_code_header
            .as_deref()
            .unwrap_or(DEFAULT_ERROR_CODE_HEADER)
    }

    /// Whether the name validator runs.
    pub fn validate_names(&self) -> bool {
        self.validate_names.unwrap_or(true)
    }

    /// Effective backend list.
    pub fn backends(&self) -> &[Backend] {
        self.backends.as_deref().unwrap_or(Backend::all())
    }

    /// Effective log level.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`ClassifierConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`ClassifierConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<ClassifierConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => ClassifierConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into a [`ClassifierConfig`].
pub fn parse_toml(content: &str) -> Result<ClassifierConfig, ConfigError> {
    toml::from_str::<ClassifierConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `TABLES_ERROR_CODE_HEADER`
/// - `TABLES_VALIDATE_NAMES` (`true`/`false`/`1`/`0`)
/// - `TABLES_BACKENDS` (comma-separated, e.g. `storage,cosmos`; empty for none)
/// - `TABLES_LOG_LEVEL`
pub fn apply_env_overrides(config: &mut ClassifierConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Apply overrides read through `lookup` instead of the process environment.
pub fn apply_overrides_from(
    config: &mut ClassifierConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(val) = lookup("TABLES_ERROR_CODE_HEADER") {
        config.error_code_header = Some(val);
    }
    if let Some(val) = lookup("TABLES_VALIDATE_NAMES") {
        config.validate_names = Some(parse_bool(&val).ok_or_else(|| ConfigError::InvalidEnvValue {
            var: "TABLES_VALIDATE_NAMES".into(),
            reason: format!("expected a boolean, got '{val}'"),
        })?);
    }
    if let Some(val) = lookup("TABLES_BACKENDS") {
        let backends = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Backend>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| ConfigError::InvalidEnvValue {
                var: "TABLES_BACKENDS".into(),
                reason,
            })?;
        config.backends = Some(backends);
    }
    if let Some(val) = lookup("TABLES_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (a malformed header name, an unknown log level) are returned
/// as a [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &ClassifierConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref header) = config.error_code_header {
        if header.is_empty() {
            errors.push("error_code_header must not be empty".into());
        } else if header.chars().any(|c| c.is_whitespace() || c == ':') {
            errors.push(format!(
                "error_code_header '{header}' must not contain whitespace or ':'"
            ));
        }
    }

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    if config.validate_names() && config.backends().is_empty() {
        warnings.push(ConfigWarning::NoBackends);
    }

    let backends = config.backends();
    for (i, backend) in backends.iter().enumerate() {
        // Report each repeated backend once, at its second occurrence.
        if backends[..i].iter().filter(|b| *b == backend).count() == 1 {
            warnings.push(ConfigWarning::DuplicateBackend { backend: *backend });
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations. Values set in `overlay` take precedence over `base`.
pub fn merge_configs(base: ClassifierConfig, overlay: ClassifierConfig) -> ClassifierConfig {
    ClassifierConfig {
        error_code_header: overlay.error_code_header.or(base.error_code_header),
        validate_names: overlay.validate_names.or(base.validate_names),
        backends: overlay.backends.or(base.backends),
        log_level: overlay.log_level.or(base.log_level),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn default_config_is_valid_without_warnings() {
        let warnings = validate_config(&ClassifierConfig::default()).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn defaults_resolve_through_accessors() {
        let cfg = ClassifierConfig::default();
        assert_eq!(cfg.error_code_header(), "x-ms-error-code");
        assert!(cfg.validate_names());
        assert_eq!(cfg.backends(), Backend::all());
        assert_eq!(cfg.log_level(), "info");
    }

    #[test]
    fn parse_valid_toml_string() {
        let cfg = parse_toml(
            r#"
            error_code_header = "x-custom-code"
            validate_names = false
            backends = ["cosmos"]
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.error_code_header(), "x-custom-code");
        assert!(!cfg.validate_names());
        assert_eq!(cfg.backends(), &[Backend::Cosmos]);
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn empty_toml_leaves_every_field_unset() {
        let cfg = parse_toml("").unwrap();
        assert_eq!(cfg.log_level, None);
        assert_eq!(cfg.log_level(), "info");
        assert_eq!(cfg.backends(), Backend::all());
    }

    #[test]
    fn parse_invalid_toml_gives_parse_error() {
        let err = parse_toml("this is [not valid toml =").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn parse_wrong_types_gives_parse_error() {
        assert!(matches!(
            parse_toml("validate_names = \"yes\"").unwrap_err(),
            ConfigError::ParseError { .. }
        ));
        assert!(matches!(
            parse_toml("backends = [\"blob\"]").unwrap_err(),
            ConfigError::ParseError { .. }
        ));
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(matches!(
            parse_toml("retries = 3").unwrap_err(),
            ConfigError::ParseError { .. }
        ));
    }

    #[test]
    fn validation_catches_invalid_log_level() {
        let cfg = ClassifierConfig {
            log_level: Some("verbose".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&cfg).unwrap_err(),
            ConfigError::ValidationError { .. }
        ));
    }

    #[test]
    fn validation_catches_bad_header_names() {
        for bad in ["", "x ms", "x-ms:code", "x\tcode"] {
            let cfg = ClassifierConfig {
                error_code_header: Some(bad.into()),
                ..Default::default()
            };
            let err = validate_config(&cfg).unwrap_err();
            match err {
                ConfigError::ValidationError { reasons } => {
                    assert!(reasons[0].contains("error_code_header"), "{reasons:?}");
                }
                other => panic!("expected ValidationError, got {other:?}"),
            }
        }
    }

    #[test]
    fn validation_collects_every_error() {
        let cfg = ClassifierConfig {
            error_code_header: Some(String::new()),
            log_level: Some("loud".into()),
            ..Default::default()
        };
        match validate_config(&cfg).unwrap_err() {
            ConfigError::ValidationError { reasons } => assert_eq!(reasons.len(), 2),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn empty_backends_warns_only_when_validating() {
        let cfg = ClassifierConfig {
            backends: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(validate_config(&cfg).unwrap(), vec![ConfigWarning::NoBackends]);

        let cfg = ClassifierConfig {
            validate_names: Some(false),
            ..cfg
        };
        assert!(validate_config(&cfg).unwrap().is_empty());
    }

    #[test]
    fn duplicate_backend_warns_once() {
        let cfg = ClassifierConfig {
            backends: Some(vec![Backend::Storage, Backend::Storage, Backend::Storage]),
            ..Default::default()
        };
        assert_eq!(
            validate_config(&cfg).unwrap(),
            vec![ConfigWarning::DuplicateBackend {
                backend: Backend::Storage
            }]
        );
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = ClassifierConfig::default();
        apply_overrides_from(
            &mut cfg,
            env(&[
                ("TABLES_ERROR_CODE_HEADER", "x-alt"),
                ("TABLES_VALIDATE_NAMES", "0"),
                ("TABLES_BACKENDS", " cosmos , storage "),
                ("TABLES_LOG_LEVEL", "trace"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.error_code_header(), "x-alt");
        assert!(!cfg.validate_names());
        assert_eq!(cfg.backends(), &[Backend::Cosmos, Backend::Storage]);
        assert_eq!(cfg.log_level(), "trace");
    }

    #[test]
    fn empty_backends_env_means_none() {
        let mut cfg = ClassifierConfig::default();
        apply_overrides_from(&mut cfg, env(&[("TABLES_BACKENDS", "")])).unwrap();
        assert!(cfg.backends().is_empty());
    }

    #[test]
    fn unparseable_env_values_are_errors() {
        let mut cfg = ClassifierConfig::default();
        let err = apply_overrides_from(&mut cfg, env(&[("TABLES_VALIDATE_NAMES", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvValue { ref var, .. } if var == "TABLES_VALIDATE_NAMES"));

        let err = apply_overrides_from(&mut cfg, env(&[("TABLES_BACKENDS", "storage,blob")])).unwrap_err();
        assert!(err.to_string().contains("TABLES_BACKENDS"));
    }

    #[test]
    fn no_env_leaves_config_untouched() {
        let mut cfg = ClassifierConfig::default();
        apply_overrides_from(&mut cfg, env(&[])).unwrap();
        assert_eq!(cfg, ClassifierConfig::default());
    }

    #[test]
    fn merge_overlay_overrides_base() {
        let base = ClassifierConfig {
            error_code_header: Some("x-base".into()),
            validate_names: Some(true),
            backends: Some(vec![Backend::Storage]),
            log_level: Some("info".into()),
        };
        let overlay = ClassifierConfig {
            validate_names: Some(false),
            log_level: None,
            ..Default::default()
        };
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.error_code_header(), "x-base");
        assert!(!merged.validate_names());
        assert_eq!(merged.backends(), &[Backend::Storage]);
        assert_eq!(merged.log_level(), "info");
    }

    #[test]
    fn merging_a_default_overlay_keeps_base_log_level() {
        let base = ClassifierConfig {
            log_level: Some("debug".into()),
            ..Default::default()
        };
        let merged = merge_configs(base, ClassifierConfig::default());
        assert_eq!(merged.log_level(), "debug");
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "backends = [\"storage\"]").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        if std::env::var_os("TABLES_BACKENDS").is_none() {
            assert_eq!(cfg.backends(), &[Backend::Storage]);
        }
    }

    #[test]
    fn load_missing_file_gives_file_not_found() {
        let err = load_config(Some(Path::new("/nonexistent/tables.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = ClassifierConfig {
            error_code_header: Some("x-ms-error-code".into()),
            validate_names: Some(true),
            backends: Some(vec![Backend::Cosmos]),
            log_level: Some("warn".into()),
        };
        let text = toml::to_string(&cfg).unwrap();
        assert_eq!(parse_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn config_warning_display() {
        assert!(ConfigWarning::NoBackends.to_string().contains("backends is empty"));
        let w = ConfigWarning::DuplicateBackend {
            backend: Backend::Cosmos,
        };
        assert_eq!(w.to_string(), "backend 'Cosmos' is listed more than once");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound {
            path: "/a.toml".into(),
        };
        assert_eq!(err.to_string(), "config file not found: /a.toml");
    }
}
