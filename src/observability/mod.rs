// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the flow engine. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between human-readable text and structured fields
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - Flow execution lifecycle and admission limiter events
//! * `messages::stage` - Stage task lifecycle and boundary relay events
//!
//! # Usage
//!
//! ```rust
//! use the_pipewood::observability::messages::StructuredLog;
//! use the_pipewood::observability::messages::stage::StageStarted;
//!
//! let msg = StageStarted {
//!     index: 0,
//!     handler: "ChangeTextCase",
//! };
//!
//! msg.log();
//! ```

pub mod messages;
