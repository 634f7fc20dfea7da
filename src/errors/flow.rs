// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced by a flow execution.
//!
//! Exactly one `FlowError` is returned per execution: whichever of context
//! cancellation, a stage failure or a relay failure is observed first.

use thiserror::Error;

/// Error type produced by a [`Handler`](crate::traits::Handler).
///
/// The engine never inspects it; it is carried inside [`FlowError::Stage`].
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum FlowError {
    /// The execution context was cancelled.
    #[error("flow execution cancelled")]
    Cancelled,

    /// The execution context's deadline passed.
    #[error("flow execution deadline exceeded")]
    DeadlineExceeded,

    /// A handler reported failure.
    #[error("stage {index} ({handler}) failed: {source}")]
    Stage {
        index: usize,
        handler: String,
        #[source]
        source: HandlerError,
    },

    /// Copying bytes across a pipeline boundary failed.
    #[error("relay failed: {0}")]
    Relay(#[source] std::io::Error),

    /// A stage task ended without running to completion (panic or abort).
    #[error("stage {index} aborted: {reason}")]
    StageAborted { index: usize, reason: String },

    /// Typed input could not be encoded, or output bytes could not be decoded.
    #[error("conversion failed: {0}")]
    Conversion(String),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl FlowError {
    /// True for both flavours of context cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, FlowError::Cancelled | FlowError::DeadlineExceeded)
    }
}
