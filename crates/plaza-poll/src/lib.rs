// SPDX-FileCopyrightText: 2026 Plaza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling synchronizer for the Plaza client sync layer.
//!
//! Keeps live surfaces (direct-message threads, group chat) approximately
//! current without a push channel: a best-effort, eventually-consistent
//! background refresh that never blocks user-initiated sends.

pub mod synchronizer;

pub use synchronizer::{PollHandle, PollSession};
