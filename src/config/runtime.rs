// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::local::LocalHandlerFactory;
use crate::config::{FlowConfig, HandlerConfig, PipelineConfig};
use crate::engine::Flow;
use crate::errors::ConfigError;
use crate::traits::Handler;

/// Pipeline runtime builder: turns a [`PipelineConfig`] into a ready [`Flow`].
///
/// Every flow, nested ones included, gets its own [`AdmissionLimiter`](crate::engine::AdmissionLimiter) built
/// from the same `max_concurrent` settings. A nested flow occupies one slot of
/// its parent while it runs, so a single limiter spanning both levels could
/// leave the inner stages waiting on a slot their own parent holds.
///
/// # Examples
///
/// ```
/// use the_pipewood::config::{PipelineConfig, RuntimeBuilder};
///
/// let config: PipelineConfig = serde_yaml::from_str(r#"
/// max_concurrent: 4
/// handlers:
///   - id: flip
///     handler: reverse_text
/// "#).unwrap();
///
/// let flow = RuntimeBuilder::from_config(&config).unwrap();
/// assert_eq!(flow.len(), 1);
/// assert_eq!(flow.limiter().capacity(), Some(4));
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the flow described by `cfg`.
    ///
    /// The configuration is expected to have passed
    /// [`validate_pipeline`](crate::config::validate_pipeline); an entry that
    /// cannot be built is still reported as [`ConfigError::HandlerCreation`].
    pub fn from_config(cfg: &PipelineConfig) -> Result<Flow, ConfigError> {
        Self::build_flow(&cfg.handlers, cfg.flow_config())
    }

    fn build_flow(entries: &[HandlerConfig], config: FlowConfig) -> Result<Flow, ConfigError> {
        entries.iter().try_fold(
            Flow::with_config(config),
            |flow, entry| {
                let handler: Arc<dyn Handler> = if entry.handlers.is_empty() {
                    LocalHandlerFactory::create_handler(entry).map_err(|reason| {
                        ConfigError::HandlerCreation {
                            id: entry.id.clone(),
                            reason,
                        }
                    })?
                } else {
                    Arc::new(Self::build_flow(&entry.handlers, config)?)
                };
                Ok(flow.append_arc(handler))
            },
        )
    }
}
