// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optimistic mutation coordination for the Plaza client sync layer.
//!
//! Makes toggles feel instantaneous while staying eventually consistent
//! with the server, and prevents duplicate concurrent mutation of the same
//! target.

pub mod coordinator;

pub use coordinator::{ApplyOutcome, MutationCoordinator};
