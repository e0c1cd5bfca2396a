// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the sync-layer configuration system.

use plaza_config::diagnostic::{suggest_key, ConfigError};
use plaza_config::model::PlazaConfig;
use plaza_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_plaza_config() {
    let toml = r#"
[client]
log_level = "debug"

[collection]
page_limit = 50

[poll]
interval_ms = 2000
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.client.log_level, "debug");
    assert_eq!(config.collection.page_limit, 50);
    assert_eq!(config.poll.interval_ms, 2000);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.client.log_level, "info");
    assert_eq!(config.collection.page_limit, 25);
    assert_eq!(config.poll.interval_ms, 1000);
}

/// Unknown field in [poll] section produces an error mentioning the bad key.
#[test]
fn unknown_field_in_poll_produces_error() {
    let toml = r#"
[poll]
intervall_ms = 500
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("intervall_ms"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// `load_and_validate_str` converts unknown keys into diagnostics with a
/// fuzzy-match suggestion.
#[test]
fn unknown_key_diagnostic_carries_suggestion() {
    let toml = r#"
[collection]
page_limt = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce diagnostics");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey { key, suggestion, .. } => Some((key, suggestion)),
            _ => None,
        })
        .expect("should contain an UnknownKey diagnostic");

    assert_eq!(unknown.0, "page_limt");
    assert_eq!(unknown.1.as_deref(), Some("page_limit"));
}

/// Out-of-range values pass deserialization but fail validation.
#[test]
fn out_of_range_values_fail_validation() {
    let toml = r#"
[poll]
interval_ms = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("interval_ms"))));
}

/// Wrong value types are reported as type errors, not panics.
#[test]
fn wrong_type_reported_as_error() {
    let toml = r#"
[collection]
page_limit = "many"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// The suggestion helper is usable directly for app-side tooling.
#[test]
fn suggest_key_exposed_for_tooling() {
    assert_eq!(
        suggest_key("log_lvl", &["log_level"]),
        Some("log_level".to_string())
    );
}

/// Defaults round-trip through serialization, so `Serialized::defaults` and
/// `toml::from_str` agree on the same baseline.
#[test]
fn defaults_round_trip_through_toml() {
    let serialized = toml::to_string(&PlazaConfig::default()).expect("should serialize");
    let parsed: PlazaConfig = toml::from_str(&serialized).expect("should parse back");
    assert_eq!(parsed.collection.page_limit, 25);
    assert_eq!(parsed.poll.interval_ms, 1000);
}
