// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod concurrency;
mod loader;
mod runtime;
mod validation;

pub mod consts;

pub use concurrency::{host_parallelism, ConcurrencyMode, FlowConfig};
pub use loader::{
    load_and_validate_config, load_config, ConcurrencyKeyword, HandlerConfig, MaxConcurrent,
    PipelineConfig,
};
pub use runtime::RuntimeBuilder;
pub use validation::validate_pipeline;
