// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // built-in handlers
pub mod config;     // config + runtime builder
pub mod convert;    // typed input/output boundary
pub mod engine;     // streaming flow engine
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // unified abstractions

pub use engine::{AdmissionLimiter, ByteReader, ByteWriter, Context, Flow};
pub use errors::FlowError;
pub use traits::{handler_fn, Handler, HandlerError, Request, Response};
