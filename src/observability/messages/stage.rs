// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for stage task lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Admission of a stage task (granted or refused on cancellation)
//! * Handler execution lifecycle (start, completion, failure)
//! * Relaying the external input source into the first stage

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Stage admitted and handler about to run.
///
/// # Log Level
/// `debug!` - Per-stage detail
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::stage::StageStarted;
///
/// let msg = StageStarted { index: 1, handler: "ReverseText" };
///
/// assert_eq!(msg.to_string(), "Stage 1 (ReverseText) started");
/// ```
pub struct StageStarted<'a> {
    pub index: usize,
    pub handler: &'a str,
}

impl Display for StageStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage {} ({}) started", self.index, self.handler)
    }
}

impl StructuredLog for StageStarted<'_> {
    fn log(&self) {
        tracing::debug!(index = self.index, handler = self.handler, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage",
            span_name = name,
            index = self.index,
            handler = self.handler,
        )
    }
}

/// Handler returned successfully.
///
/// # Log Level
/// `debug!` - Per-stage detail
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::stage::StageCompleted;
/// use std::time::Duration;
///
/// let msg = StageCompleted {
///     index: 0,
///     handler: "ChangeTextCase",
///     duration: Duration::from_millis(3),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct StageCompleted<'a> {
    pub index: usize,
    pub handler: &'a str,
    pub duration: std::time::Duration,
}

impl Display for StageCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {} ({}) completed in {:?}",
            self.index, self.handler, self.duration
        )
    }
}

impl StructuredLog for StageCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            index = self.index,
            handler = self.handler,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage_completed",
            span_name = name,
            index = self.index,
            handler = self.handler,
            duration = ?self.duration,
        )
    }
}

/// Handler returned an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::stage::StageFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = StageFailed {
///     index: 2,
///     handler: "RemoteCall",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct StageFailed<'a> {
    pub index: usize,
    pub handler: &'a str,
    pub error: &'a (dyn std::error::Error + Send + Sync),
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {} ({}) failed: {}",
            self.index, self.handler, self.error
        )
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::error!(
            index = self.index,
            handler = self.handler,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "stage_failed",
            span_name = name,
            index = self.index,
            handler = self.handler,
            error = %self.error,
        )
    }
}

/// Stage gave up before its handler ran because the context was done.
///
/// # Log Level
/// `warn!` - Expected during cancellation
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::stage::StageAdmissionDenied;
/// use the_pipewood::FlowError;
///
/// let msg = StageAdmissionDenied {
///     index: 0,
///     handler: "Slow",
///     reason: &FlowError::Cancelled,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct StageAdmissionDenied<'a> {
    pub index: usize,
    pub handler: &'a str,
    pub reason: &'a dyn std::error::Error,
}

impl Display for StageAdmissionDenied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {} ({}) not admitted: {}",
            self.index, self.handler, self.reason
        )
    }
}

impl StructuredLog for StageAdmissionDenied<'_> {
    fn log(&self) {
        tracing::warn!(
            index = self.index,
            handler = self.handler,
            reason = %self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "stage_admission_denied",
            span_name = name,
            index = self.index,
            handler = self.handler,
            reason = %self.reason,
        )
    }
}

/// Reading the external input source failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::stage::InputRelayFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated upload");
/// let msg = InputRelayFailed { bytes_relayed: 4096, error: &error };
///
/// tracing::error!("{}", msg);
/// ```
pub struct InputRelayFailed<'a> {
    pub bytes_relayed: u64,
    pub error: &'a std::io::Error,
}

impl Display for InputRelayFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Input relay failed after {} bytes: {}",
            self.bytes_relayed, self.error
        )
    }
}

impl StructuredLog for InputRelayFailed<'_> {
    fn log(&self) {
        tracing::error!(
            bytes_relayed = self.bytes_relayed,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "input_relay_failed",
            span_name = name,
            bytes_relayed = self.bytes_relayed,
            error = %self.error,
        )
    }
}

/// Writing pipeline output to the caller's sink failed.
pub struct OutputRelayFailed<'a> {
    pub error: &'a std::io::Error,
}

impl Display for OutputRelayFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Output relay failed: {}", self.error)
    }
}

impl StructuredLog for OutputRelayFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("output_relay_failed", span_name = name, error = %self.error)
    }
}
