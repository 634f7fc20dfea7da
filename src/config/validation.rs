// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline configuration validation.
//!
//! Checks run over every nesting level and accumulate, so a user sees all
//! problems at once rather than fixing them one by one:
//!
//! 1. **Channel capacity**: when set, it must be at least one byte
//! 2. **Uniqueness**: handler IDs are unique among their siblings
//! 3. **Shape**: every entry sets exactly one of `handler` or nested `handlers`
//! 4. **Resolution**: every `handler` names a built-in implementation
//!
//! # Example
//! ```rust
//! use the_pipewood::config::{validate_pipeline, PipelineConfig};
//!
//! let config: PipelineConfig = serde_yaml::from_str(r#"
//! handlers:
//!   - id: shout
//!     handler: change_text_case
//!   - id: nested
//!     handlers:
//!       - id: flip
//!         handler: reverse_text
//! "#).unwrap();
//!
//! assert!(validate_pipeline(&config).is_ok());
//! ```

use std::collections::HashSet;

use crate::backends::local::LocalHandlerFactory;
use crate::config::{HandlerConfig, PipelineConfig};
use crate::errors::ValidationError;

/// Validate a pipeline configuration, returning every problem found.
pub fn validate_pipeline(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.channel_capacity == Some(0) {
        errors.push(ValidationError::InvalidChannelCapacity);
    }
    validate_handlers(&config.handlers, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_handlers(handlers: &[HandlerConfig], errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();

    for entry in handlers {
        if !seen.insert(entry.id.as_str()) {
            errors.push(ValidationError::DuplicateHandlerId {
                handler_id: entry.id.clone(),
            });
        }

        match (&entry.handler, entry.handlers.is_empty()) {
            (Some(_), false) => errors.push(ValidationError::AmbiguousImplementation {
                handler_id: entry.id.clone(),
            }),
            (None, true) => errors.push(ValidationError::MissingImplementation {
                handler_id: entry.id.clone(),
            }),
            (Some(implementation), true) => {
                if !LocalHandlerFactory::is_implementation_available(implementation) {
                    errors.push(ValidationError::UnknownHandler {
                        handler_id: entry.id.clone(),
                        implementation: implementation.clone(),
                    });
                }
            }
            (None, false) => validate_handlers(&entry.handlers, errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> PipelineConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_nested_pipeline() {
        let config = parse(
            r#"
handlers:
  - id: shout
    handler: change_text_case
  - id: inner
    handlers:
      - id: shout
        handler: prefix_suffix_adder
"#,
        );
        // Sibling scope only: the nested "shout" does not clash.
        assert!(validate_pipeline(&config).is_ok());
    }

    #[test]
    fn test_empty_pipeline_is_valid() {
        assert!(validate_pipeline(&parse("handlers: []")).is_ok());
    }

    #[test]
    fn test_zero_channel_capacity() {
        let errors = validate_pipeline(&parse("channel_capacity: 0\nhandlers: []")).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidChannelCapacity]);
    }

    #[test]
    fn test_shape_errors() {
        let config = parse(
            r#"
handlers:
  - id: neither
  - id: both
    handler: reverse_text
    handlers:
      - id: inner
        handler: reverse_text
"#,
        );
        let errors = validate_pipeline(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingImplementation {
                    handler_id: "neither".into()
                },
                ValidationError::AmbiguousImplementation {
                    handler_id: "both".into()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_handler_inside_nested_pipeline() {
        let config = parse(
            r#"
handlers:
  - id: outer
    handlers:
      - id: mystery
        handler: teleporter
"#,
        );
        let errors = validate_pipeline(&config).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "Handler 'mystery' uses 'teleporter' which does not exist"
        );
    }
}
