// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the sync layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, producing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level sync-layer configuration.
///
/// The embedding application hands this library a TOML document (plus
/// `PLAZA_*` environment overrides); all sections are optional and default
/// to the values the shipped client uses.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlazaConfig {
    /// Client-wide settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Paginated collection settings.
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Live-surface polling settings.
    #[serde(default)]
    pub poll: PollConfig,
}

/// Client-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Paginated collection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// Maximum items requested per page.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
        }
    }
}

fn default_page_limit() -> usize {
    25
}

/// Live-surface polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    /// Fixed interval between poll ticks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}
