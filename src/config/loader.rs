// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::concurrency::{ConcurrencyMode, FlowConfig};
use crate::config::consts::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_CPU_MULTIPLIER};
use crate::errors::ConfigError;

/// Pipeline configuration, typically loaded from a YAML file.
///
/// # Fields
/// * `max_concurrent` - Admission limit shared by the stages of this pipeline;
///   each nested flow gets its own limiter built from the same settings
///   (defaults to `unlimited`)
/// * `cpu_multiplier` - Slots per CPU when `max_concurrent` is `auto`
/// * `channel_capacity` - In-flight byte bound between stages (optional)
/// * `handlers` - Ordered handler entries; an entry may itself be a nested pipeline
///
/// # Example
/// ```yaml
/// max_concurrent: auto
/// cpu_multiplier: 75
/// handlers:
///   - id: shout
///     handler: change_text_case
///     options:
///       case: upper
///   - id: decorate
///     handlers:
///       - id: bang
///         handler: prefix_suffix_adder
///         options:
///           suffix: "!"
/// ```
#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub max_concurrent: MaxConcurrent,
    pub cpu_multiplier: Option<usize>,
    pub channel_capacity: Option<usize>,
    pub handlers: Vec<HandlerConfig>,
}

/// `unlimited`, `auto`, or an explicit slot count.
#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(untagged)]
pub enum MaxConcurrent {
    Keyword(ConcurrencyKeyword),
    Limit(usize),
}

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyKeyword {
    Unlimited,
    Auto,
}

impl Default for MaxConcurrent {
    fn default() -> Self {
        MaxConcurrent::Keyword(ConcurrencyKeyword::Unlimited)
    }
}

/// One entry of the handler chain.
///
/// Exactly one of `handler` (a built-in implementation name) or `handlers`
/// (a nested pipeline run as a single stage) must be set.
#[derive(Debug, Deserialize)]
pub struct HandlerConfig {
    pub id: String,
    pub handler: Option<String>,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>, // handler-specific options
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,
}

impl HandlerConfig {
    /// String option lookup; non-string values are ignored.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|value| value.as_str())
    }
}

impl PipelineConfig {
    pub fn concurrency_mode(&self) -> ConcurrencyMode {
        match self.max_concurrent {
            MaxConcurrent::Keyword(ConcurrencyKeyword::Unlimited) => ConcurrencyMode::Unlimited,
            MaxConcurrent::Keyword(ConcurrencyKeyword::Auto) => ConcurrencyMode::Auto {
                multiplier: self.cpu_multiplier.unwrap_or(DEFAULT_CPU_MULTIPLIER),
            },
            MaxConcurrent::Limit(limit) => ConcurrencyMode::Fixed(limit),
        }
    }

    pub fn flow_config(&self) -> FlowConfig {
        FlowConfig {
            concurrency: self.concurrency_mode(),
            channel_capacity: self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY),
        }
    }
}

/// Load a pipeline config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: PipelineConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a pipeline config and check it can be built.
///
/// All validation problems are reported together.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_pipeline(&cfg).map_err(ConfigError::Validation)?;
    Ok(cfg)
}
