// ABOUTME: Cancellable execution scope passed through every call boundary
// ABOUTME: Wraps a cancellation token and an optional deadline inherited by derived scopes

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::error::ExecutionError;

/// Cancellation scope for one execution subtree.
///
/// Derived scopes observe their parent's cancellation and deadline, never the
/// other way around. Cloning shares the same scope.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    /// A root scope that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a scope that can be cancelled independently of its parent.
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a scope that expires after `timeout`, or at the parent's
    /// deadline if that comes first.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, candidate) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, own) => parent.or(own),
        };

        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this scope and every scope derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels this scope when the returned guard is dropped.
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Why the scope is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ExecutionError> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(ExecutionError::DeadlineExceeded);
            }
        }

        if self.token.is_cancelled() {
            Some(ExecutionError::Cancelled)
        } else {
            None
        }
    }

    /// Resolves once the scope is cancelled or its deadline passes.
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
}
