// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for flow execution lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Admission limiter configuration
//! * Flow execution lifecycle (start, completion, failure, cancellation)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

fn describe_capacity(capacity: Option<usize>) -> String {
    match capacity {
        Some(capacity) => capacity.to_string(),
        None => "unlimited".to_string(),
    }
}

/// Admission limiter created.
///
/// # Log Level
/// `debug!` - Configuration detail
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::engine::LimiterConfigured;
///
/// let msg = LimiterConfigured { capacity: Some(200) };
///
/// assert_eq!(msg.to_string(), "Admission limiter configured: capacity=200");
/// ```
pub struct LimiterConfigured {
    pub capacity: Option<usize>,
}

impl Display for LimiterConfigured {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Admission limiter configured: capacity={}",
            describe_capacity(self.capacity)
        )
    }
}

impl StructuredLog for LimiterConfigured {
    fn log(&self) {
        tracing::debug!(capacity = ?self.capacity, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("limiter", span_name = name, capacity = ?self.capacity)
    }
}

/// Flow execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::engine::FlowExecutionStarted;
///
/// let msg = FlowExecutionStarted {
///     handler_count: 3,
///     limiter_capacity: None,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct FlowExecutionStarted {
    pub handler_count: usize,
    pub limiter_capacity: Option<usize>,
}

impl Display for FlowExecutionStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting flow execution: {} handlers, limiter_capacity={}",
            self.handler_count,
            describe_capacity(self.limiter_capacity)
        )
    }
}

impl StructuredLog for FlowExecutionStarted {
    fn log(&self) {
        tracing::info!(
            handler_count = self.handler_count,
            limiter_capacity = ?self.limiter_capacity,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "flow",
            span_name = name,
            handler_count = self.handler_count,
            limiter_capacity = ?self.limiter_capacity,
        )
    }
}

/// Flow execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::engine::FlowExecutionCompleted;
/// use std::time::Duration;
///
/// let msg = FlowExecutionCompleted {
///     handler_count: 3,
///     duration: Duration::from_millis(12),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct FlowExecutionCompleted {
    pub handler_count: usize,
    pub duration: std::time::Duration,
}

impl Display for FlowExecutionCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flow execution completed: {} handlers in {:?}",
            self.handler_count, self.duration
        )
    }
}

impl StructuredLog for FlowExecutionCompleted {
    fn log(&self) {
        tracing::info!(
            handler_count = self.handler_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "flow_completed",
            span_name = name,
            handler_count = self.handler_count,
            duration = ?self.duration,
        )
    }
}

/// Flow execution failed; `error` is the single error returned to the caller.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::engine::FlowExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = FlowExecutionFailed {
///     handler_count: 2,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct FlowExecutionFailed<'a> {
    pub handler_count: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for FlowExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flow execution failed ({} handlers): {}",
            self.handler_count, self.error
        )
    }
}

impl StructuredLog for FlowExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            handler_count = self.handler_count,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "flow_failed",
            span_name = name,
            handler_count = self.handler_count,
            error = %self.error,
        )
    }
}

/// Flow execution abandoned because its context was cancelled or timed out.
///
/// # Log Level
/// `warn!` - Caller-initiated, not a fault of the pipeline
///
/// # Example
/// ```
/// use the_pipewood::observability::messages::engine::FlowExecutionCancelled;
/// use the_pipewood::FlowError;
///
/// let msg = FlowExecutionCancelled {
///     handler_count: 2,
///     reason: &FlowError::Cancelled,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct FlowExecutionCancelled<'a> {
    pub handler_count: usize,
    pub reason: &'a dyn std::error::Error,
}

impl Display for FlowExecutionCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flow execution cancelled ({} handlers): {}",
            self.handler_count, self.reason
        )
    }
}

impl StructuredLog for FlowExecutionCancelled<'_> {
    fn log(&self) {
        tracing::warn!(
            handler_count = self.handler_count,
            reason = %self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "flow_cancelled",
            span_name = name,
            handler_count = self.handler_count,
            reason = %self.reason,
        )
    }
}
