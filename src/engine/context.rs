// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cancellation context threaded through every flow execution.
//!
//! A `Context` is a [`CancellationToken`] plus an optional deadline. Children
//! created with [`Context::with_cancel`] or [`Context::with_timeout`] are
//! cancelled whenever their parent is, but cancelling a child never affects
//! the parent.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::errors::FlowError;

#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A root context that is never done until cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. one owned by a server's shutdown logic.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Child context that can be cancelled on its own.
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Child context that is done once `timeout` elapses (or earlier, if the
    /// parent's deadline is sooner). A timeout too large to represent adds no
    /// deadline of its own.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(existing), Some(requested)) => Some(existing.min(requested)),
            (existing, None) => existing,
            (None, requested) => requested,
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline_passed()
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<FlowError> {
        if self.token.is_cancelled() {
            Some(FlowError::Cancelled)
        } else if self.deadline_passed() {
            Some(FlowError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// `Err` with the cancellation reason if the context is already done.
    pub fn check(&self) -> Result<(), FlowError> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Guard that cancels this context when dropped.
    pub(crate) fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    fn deadline_passed(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_context_is_live() {
        let ctx = Context::new();
        assert!(!ctx.is_done());
        assert!(ctx.err().is_none());
        assert!(ctx.check().is_ok());
    }

    #[tokio::test]
    async fn test_cancel_propagates_to_children_only() {
        let parent = Context::new();
        let child = parent.with_cancel();
        let sibling = parent.with_cancel();

        child.cancel();
        assert!(child.is_done());
        assert!(!parent.is_done());
        assert!(!sibling.is_done());

        parent.cancel();
        assert!(sibling.is_done());
        assert!(matches!(sibling.err(), Some(FlowError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_deadline_exceeded() {
        let ctx = Context::new().with_timeout(Duration::from_millis(50));
        assert!(!ctx.is_done());

        ctx.done().await;

        assert!(ctx.is_done());
        assert!(matches!(ctx.check(), Err(FlowError::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_timeout_never_extends_parent_deadline() {
        let parent = Context::new().with_timeout(Duration::from_millis(10));
        let child = parent.with_timeout(Duration::from_secs(60));

        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_adds_no_deadline() {
        let root = Context::new().with_timeout(Duration::MAX);
        assert!(root.deadline().is_none());
        assert!(!root.is_done());

        let parent = Context::new().with_timeout(Duration::from_secs(30));
        let child = parent.with_timeout(Duration::MAX);
        assert_eq!(child.deadline(), parent.deadline());

        parent.cancel();
        assert!(matches!(child.err(), Some(FlowError::Cancelled)));
    }

    #[tokio::test]
    async fn test_drop_guard_cancels() {
        let ctx = Context::new().with_cancel();
        {
            let _guard = ctx.cancel_on_drop();
        }
        assert!(matches!(ctx.err(), Some(FlowError::Cancelled)));
    }
}
