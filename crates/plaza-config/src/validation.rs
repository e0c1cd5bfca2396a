// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: value ranges, known log levels.

use crate::diagnostic::ConfigError;
use crate::model::PlazaConfig;

/// Smallest poll interval the client will schedule. Anything shorter turns
/// the poller into a load amplifier during outages.
const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Largest page size the server accepts.
const MAX_PAGE_LIMIT: usize = 100;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected validation errors rather than failing fast.
pub fn validate_config(config: &PlazaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.client.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "client.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.client.log_level
            ),
        });
    }

    if config.collection.page_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "collection.page_limit must be at least 1".to_string(),
        });
    }

    if config.collection.page_limit > MAX_PAGE_LIMIT {
        errors.push(ConfigError::Validation {
            message: format!(
                "collection.page_limit must be at most {MAX_PAGE_LIMIT}, got {}",
                config.collection.page_limit
            ),
        });
    }

    if config.poll.interval_ms < MIN_POLL_INTERVAL_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "poll.interval_ms must be at least {MIN_POLL_INTERVAL_MS}, got {}",
                config.poll.interval_ms
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
