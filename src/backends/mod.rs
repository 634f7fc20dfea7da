// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Handler implementations shipped with the crate.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process streaming text handlers, resolvable by name from configuration:
//! - **Case conversion**: `change_text_case` (upper / lower)
//! - **Decoration**: `prefix_suffix_adder`
//! - **Reversal**: `reverse_text`
//!
//! ## Stub Backend (Test-Only)
//! Handlers with controlled behavior for engine tests:
//! - **EchoHandler**: copies input to output
//! - **FailingHandler**: fails immediately
//! - **SleepingHandler**: holds its slot for a while and records peak concurrency
//! - **RecordingHandler**: records whether it ran and what it saw
//! - **Note**: NOT available in production builds
//!
//! # Example
//! ```rust
//! use the_pipewood::backends::local::LocalHandlerFactory;
//! use the_pipewood::config::HandlerConfig;
//! use the_pipewood::Handler;
//! use std::collections::HashMap;
//!
//! let config = HandlerConfig {
//!     id: "flip".to_string(),
//!     handler: Some("reverse_text".to_string()),
//!     options: HashMap::new(),
//!     handlers: vec![],
//! };
//!
//! let handler = LocalHandlerFactory::create_handler(&config)?;
//! assert_eq!(handler.name(), "reverse_text");
//! # Ok::<(), String>(())
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
