// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output and
//! [`StructuredLog`] to emit itself at its documented level with the same
//! values attached as structured fields.
//!
//! # Organization
//!
//! * `engine` - Flow execution lifecycle and limiter configuration
//! * `stage` - Stage task lifecycle and boundary relay events
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_pipewood::observability::messages::StructuredLog;
//! use the_pipewood::observability::messages::engine::FlowExecutionStarted;
//!
//! let msg = FlowExecutionStarted {
//!     handler_count: 3,
//!     limiter_capacity: Some(8),
//! };
//!
//! tracing::info!("{}", msg);
//! msg.log();
//! ```

use tracing::Span;

pub mod engine;
pub mod stage;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a tracing event.
    fn log(&self);

    /// A span carrying the message's fields, for instrumenting work it describes.
    fn span(&self, name: &str) -> Span;
}
