// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_CPU_MULTIPLIER, FALLBACK_PARALLELISM};

/// How many stage tasks may hold an admission slot at once.
///
/// # Variants
/// * `Unlimited` - No gating; every stage starts as soon as it is spawned
/// * `Auto` - `host_parallelism() * multiplier` slots. A multiplier of 0 falls
///   back to [`DEFAULT_CPU_MULTIPLIER`]. Raise it for I/O-bound handlers
///   (remote calls), lower it for CPU-bound ones.
/// * `Fixed` - Explicit cap. `Fixed(0)` is the same as `Unlimited`.
///
/// # Examples
///
/// ```
/// use the_pipewood::config::ConcurrencyMode;
///
/// assert_eq!(ConcurrencyMode::Unlimited.capacity(), None);
/// assert_eq!(ConcurrencyMode::Fixed(0).capacity(), None);
/// assert_eq!(ConcurrencyMode::Fixed(8).capacity(), Some(8));
/// assert!(ConcurrencyMode::auto().capacity().unwrap() >= 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    #[default]
    Unlimited,
    Auto { multiplier: usize },
    Fixed(usize),
}

impl ConcurrencyMode {
    /// `Auto` with the default multiplier.
    pub fn auto() -> Self {
        ConcurrencyMode::Auto {
            multiplier: DEFAULT_CPU_MULTIPLIER,
        }
    }

    /// Resolved slot count, or `None` when limiting is disabled.
    pub fn capacity(&self) -> Option<usize> {
        match *self {
            ConcurrencyMode::Unlimited | ConcurrencyMode::Fixed(0) => None,
            ConcurrencyMode::Fixed(limit) => Some(limit),
            ConcurrencyMode::Auto { multiplier } => {
                let multiplier = if multiplier == 0 {
                    DEFAULT_CPU_MULTIPLIER
                } else {
                    multiplier
                };
                Some(host_parallelism().saturating_mul(multiplier))
            }
        }
    }
}

/// Number of threads the host can run in parallel, falling back to 4 if detection fails.
pub fn host_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_PARALLELISM)
}

/// Programmatic configuration for a [`Flow`](crate::engine::Flow).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    pub concurrency: ConcurrencyMode,
    /// In-flight byte bound for every channel between stages.
    pub channel_capacity: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            concurrency: ConcurrencyMode::Unlimited,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl FlowConfig {
    pub fn with_concurrency(concurrency: ConcurrencyMode) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_scales_with_host_parallelism() {
        let parallelism = host_parallelism();
        assert_eq!(
            ConcurrencyMode::Auto { multiplier: 10 }.capacity(),
            Some(parallelism * 10)
        );
    }

    #[test]
    fn test_auto_zero_multiplier_uses_default() {
        assert_eq!(
            ConcurrencyMode::Auto { multiplier: 0 }.capacity(),
            ConcurrencyMode::auto().capacity()
        );
    }

    #[test]
    fn test_flow_config_defaults() {
        let config = FlowConfig::default();
        assert_eq!(config.concurrency, ConcurrencyMode::Unlimited);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }
}
