// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Counting gate bounding how many stage tasks run at once.
//!
//! The limiter is a thin wrapper around [`tokio::sync::Semaphore`]. Cloning an
//! `AdmissionLimiter` shares the underlying counter, so the bound holds across
//! every execution (and every [`Flow`](crate::engine::Flow)) holding a clone.
//! Acquisition order is not a queue contract: unrelated executions get no
//! fairness guarantee from each other.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ConcurrencyMode;
use crate::engine::context::Context;
use crate::errors::FlowError;
use crate::observability::messages::engine::LimiterConfigured;
use crate::observability::messages::StructuredLog;

#[derive(Debug, Clone)]
pub struct AdmissionLimiter {
    /// `None` when limiting is disabled.
    semaphore: Option<Arc<Semaphore>>,
    capacity: usize,
}

/// A held admission slot. The slot is returned when the permit is dropped.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionPermit {
    /// Return the slot now rather than at end of scope.
    pub fn release(self) {}
}

impl AdmissionLimiter {
    pub fn new(mode: ConcurrencyMode) -> Self {
        let limiter = match mode.capacity() {
            Some(capacity) => {
                let capacity = capacity.min(Semaphore::MAX_PERMITS);
                Self {
                    semaphore: Some(Arc::new(Semaphore::new(capacity))),
                    capacity,
                }
            }
            None => Self {
                semaphore: None,
                capacity: 0,
            },
        };
        LimiterConfigured {
            capacity: limiter.capacity(),
        }
        .log();
        limiter
    }

    pub fn unlimited() -> Self {
        Self::new(ConcurrencyMode::Unlimited)
    }

    /// Explicit cap; `fixed(0)` disables limiting.
    pub fn fixed(capacity: usize) -> Self {
        Self::new(ConcurrencyMode::Fixed(capacity))
    }

    pub fn auto(multiplier: usize) -> Self {
        Self::new(ConcurrencyMode::Auto { multiplier })
    }

    pub fn is_enabled(&self) -> bool {
        self.semaphore.is_some()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|_| self.capacity)
    }

    /// Free slots right now, or `None` when limiting is disabled.
    pub fn available(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|s| s.available_permits())
    }

    /// Wait for a slot.
    ///
    /// Returns `Ok(None)` immediately when limiting is disabled. When the
    /// context is done before a slot frees up (or at the same moment), the
    /// context's error is returned and no slot is held.
    pub async fn acquire(&self, ctx: &Context) -> Result<Option<AdmissionPermit>, FlowError> {
        let semaphore = match &self.semaphore {
            Some(semaphore) => semaphore.clone(),
            None => return Ok(None),
        };

        tokio::select! {
            biased;
            _ = ctx.done() => Err(ctx.err().unwrap_or(FlowError::Cancelled)),
            permit = semaphore.acquire_owned() => permit
                .map(|permit| Some(AdmissionPermit { _permit: permit }))
                .map_err(|e| FlowError::Internal {
                    message: format!("admission limiter closed: {}", e),
                }),
        }
    }
}

impl Default for AdmissionLimiter {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_unlimited_acquire_is_a_no_op() {
        let limiter = AdmissionLimiter::unlimited();
        assert!(!limiter.is_enabled());
        assert_eq!(limiter.capacity(), None);

        let permit = limiter.acquire(&Context::new()).await.unwrap();
        assert!(permit.is_none());
    }

    #[tokio::test]
    async fn test_fixed_zero_disables_limiting() {
        let limiter = AdmissionLimiter::fixed(0);
        assert!(!limiter.is_enabled());
    }

    #[tokio::test]
    async fn test_permits_are_returned_on_drop() {
        let limiter = AdmissionLimiter::fixed(2);
        let ctx = Context::new();

        let first = limiter.acquire(&ctx).await.unwrap();
        let second = limiter.acquire(&ctx).await.unwrap();
        assert!(first.is_some() && second.is_some());
        assert_eq!(limiter.available(), Some(0));

        drop(first);
        assert_eq!(limiter.available(), Some(1));
        second.unwrap().release();
        assert_eq!(limiter.available(), Some(2));
    }

    #[tokio::test]
    async fn test_clones_share_one_counter() {
        let limiter = AdmissionLimiter::fixed(1);
        let shared = limiter.clone();

        let _held = limiter.acquire(&Context::new()).await.unwrap();
        assert_eq!(shared.available(), Some(0));
    }

    #[tokio::test]
    async fn test_cancellation_while_waiting_grants_nothing() {
        let limiter = AdmissionLimiter::fixed(1);
        let _held = limiter.acquire(&Context::new()).await.unwrap();

        let ctx = Context::new();
        let waiter = {
            let limiter = limiter.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { limiter.acquire(&ctx).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.cancel();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(FlowError::Cancelled)));
        assert_eq!(limiter.available(), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_while_waiting() {
        let limiter = AdmissionLimiter::fixed(1);
        let _held = limiter.acquire(&Context::new()).await.unwrap();

        let ctx = Context::new().with_timeout(Duration::from_millis(100));
        let result = limiter.acquire(&ctx).await;

        assert!(matches!(result, Err(FlowError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_cancelled_context_wins_over_free_slot() {
        let limiter = AdmissionLimiter::fixed(4);
        let ctx = Context::new();
        ctx.cancel();

        let result = limiter.acquire(&ctx).await;
        assert!(matches!(result, Err(FlowError::Cancelled)));
        assert_eq!(limiter.available(), Some(4));
    }
}
