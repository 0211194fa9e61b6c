//! Cancellation and deadlines for store operations.

use crate::error::{CaskError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call context: a cancellation token and an optional deadline.
///
/// Cloning shares the token, so cancelling any clone cancels every
/// operation bound to it.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

enum Limit {
    Deadline,
    Timeout(Duration),
}

impl OpContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `operation` until it finishes, the context is cancelled, or the
    /// earlier of the context deadline and `timeout` passes.
    ///
    /// Nothing is polled when the context is already cancelled or expired.
    pub async fn run<F, T>(&self, timeout: Option<Duration>, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(CaskError::Cancelled);
        }

        let now = Instant::now();
        if self.deadline.is_some_and(|deadline| deadline <= now) {
            return Err(CaskError::DeadlineExceeded);
        }

        let timeout = timeout
            .filter(|timeout| !timeout.is_zero())
            .map(|timeout| (now + timeout, Limit::Timeout(timeout)));
        let deadline = self.deadline.map(|deadline| (deadline, Limit::Deadline));
        let limit = match (deadline, timeout) {
            (Some(deadline), Some(timeout)) => {
                if timeout.0 < deadline.0 {
                    Some(timeout)
                } else {
                    Some(deadline)
                }
            }
            (deadline, timeout) => deadline.or(timeout),
        };

        let bounded = async move {
            match limit {
                Some((at, limit)) => tokio::time::timeout_at(at, operation)
                    .await
                    .unwrap_or_else(|_| {
                        Err(match limit {
                            Limit::Deadline => CaskError::DeadlineExceeded,
                            Limit::Timeout(timeout) => CaskError::Timeout(timeout),
                        })
                    }),
                None => operation.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CaskError::Cancelled),
            result = bounded => result,
        }
    }
}
