// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Plaza client sync layer.

use thiserror::Error;

use crate::types::{EntityId, MutationClass};

/// The primary error type used across the sync collaborator traits and
/// store operations.
///
/// Remote-call failures are converted into these variants at the component
/// boundary; nothing in this layer panics toward the rendering layer, and
/// nothing retries automatically.
#[derive(Debug, Error)]
pub enum PlazaError {
    /// Configuration errors (invalid TOML, out-of-range tunables).
    #[error("configuration error: {0}")]
    Config(String),

    /// Page or snapshot fetch failure (network/server error).
    #[error("fetch error: {message}")]
    Fetch {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote mutation failure. Optimistic local state has been reverted by
    /// the time this surfaces.
    #[error("mutation error: {message}")]
    Mutation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A mutation for the same (target, class) slot is already pending.
    /// The duplicate request was rejected, not queued.
    #[error("mutation already in progress for {target}/{class}")]
    MutationInFlight {
        target: EntityId,
        class: MutationClass,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlazaError {
    /// Fetch failure without an underlying source error.
    pub fn fetch(message: impl Into<String>) -> Self {
        PlazaError::Fetch {
            message: message.into(),
            source: None,
        }
    }

    /// Mutation failure without an underlying source error.
    pub fn mutation(message: impl Into<String>) -> Self {
        PlazaError::Mutation {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_error_names_target_and_class() {
        let err = PlazaError::MutationInFlight {
            target: EntityId::from("p1"),
            class: MutationClass::Reaction,
        };
        assert_eq!(
            err.to_string(),
            "mutation already in progress for p1/reaction"
        );
    }

    #[test]
    fn fetch_helper_builds_sourceless_variant() {
        let err = PlazaError::fetch("connection reset");
        assert_eq!(err.to_string(), "fetch error: connection reset");
        match err {
            PlazaError::Fetch { source, .. } => assert!(source.is_none()),
            _ => panic!("expected fetch variant"),
        }
    }

    #[test]
    fn fetch_variant_carries_source() {
        let err = PlazaError::Fetch {
            message: "timeout".to_string(),
            source: Some(Box::new(std::io::Error::other("socket closed"))),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
