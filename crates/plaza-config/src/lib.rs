// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Plaza client sync layer.
//!
//! The embedding application owns file discovery and I/O; this crate takes a
//! TOML document as a string, layers `PLAZA_*` environment overrides on top,
//! and validates the result.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

pub mod diagnostic;
pub mod model;
pub mod validation;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::debug;

use crate::diagnostic::ConfigError;
use crate::model::PlazaConfig;

pub use crate::validation::validate_config;

/// Load configuration from a TOML document only (no environment overrides).
///
/// Used for testing and for hosts that resolve overrides themselves.
pub fn load_config_from_str(toml_content: &str) -> Result<PlazaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlazaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a TOML document with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. The provided TOML document
/// 3. `PLAZA_*` environment variables
pub fn load_config_with_env(toml_content: &str) -> Result<PlazaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlazaConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(env_provider())
        .extract()
}

/// Load and validate in one step, converting every failure into
/// [`ConfigError`] diagnostics.
pub fn load_and_validate_str(toml_content: &str) -> Result<PlazaConfig, Vec<ConfigError>> {
    let config = load_config_from_str(toml_content).map_err(|err| {
        diagnostic::figment_to_config_errors(err, "plaza.toml", toml_content)
    })?;

    validate_config(&config)?;

    debug!(
        page_limit = config.collection.page_limit,
        poll_interval_ms = config.poll.interval_ms,
        "sync configuration loaded"
    );
    Ok(config)
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PLAZA_COLLECTION_PAGE_LIMIT` must map to
/// `collection.page_limit`, not `collection.page.limit`.
fn env_provider() -> Env {
    Env::prefixed("PLAZA_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("client_", "client.", 1)
            .replacen("collection_", "collection.", 1)
            .replacen("poll_", "poll.", 1);
        mapped.into()
    })
}
