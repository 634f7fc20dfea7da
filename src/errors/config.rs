// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Errors that can occur during pipeline configuration validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two handler entries at the same nesting level share an ID
    DuplicateHandlerId {
        /// The duplicate handler ID
        handler_id: String,
    },
    /// A handler entry names an implementation that does not exist
    UnknownHandler {
        /// The handler entry ID
        handler_id: String,
        /// The implementation name that couldn't be resolved
        implementation: String,
    },
    /// A handler entry has neither `handler` nor nested `handlers`
    MissingImplementation {
        handler_id: String,
    },
    /// A handler entry has both `handler` and nested `handlers`
    AmbiguousImplementation {
        handler_id: String,
    },
    /// The channel capacity must be at least one byte
    InvalidChannelCapacity,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateHandlerId { handler_id } => {
                write!(f, "Duplicate handler ID: '{}'", handler_id)
            }
            ValidationError::UnknownHandler {
                handler_id,
                implementation,
            } => {
                write!(
                    f,
                    "Handler '{}' uses '{}' which does not exist",
                    handler_id, implementation
                )
            }
            ValidationError::MissingImplementation { handler_id } => {
                write!(
                    f,
                    "Handler '{}' must set either 'handler' or nested 'handlers'",
                    handler_id
                )
            }
            ValidationError::AmbiguousImplementation { handler_id } => {
                write!(
                    f,
                    "Handler '{}' sets both 'handler' and nested 'handlers'",
                    handler_id
                )
            }
            ValidationError::InvalidChannelCapacity => {
                write!(f, "channel_capacity must be greater than zero")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a pipeline configuration and building a runtime from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation failed:\n{}", join_lines(.0))]
    Validation(Vec<ValidationError>),

    #[error("Failed to create handler '{id}': {reason}")]
    HandlerCreation { id: String, reason: String },
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
