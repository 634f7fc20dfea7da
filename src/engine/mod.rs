// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Streaming execution engine.
//!
//! - [`channel`]: bounded in-memory byte pipes joining adjacent stages
//! - [`context`]: cancellation and deadline propagation
//! - [`limiter`]: admission control shared across executions
//! - [`flow`]: the pipeline itself

pub mod channel;
pub mod context;
pub mod flow;
pub mod limiter;
mod stage;


pub use channel::{byte_channel, ByteReader, ByteWriter};
pub use context::Context;
pub use flow::Flow;
pub use limiter::{AdmissionLimiter, AdmissionPermit};
