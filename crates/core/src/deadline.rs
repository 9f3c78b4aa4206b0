//! Caller-supplied deadline and cancellation for workflow I/O steps.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// An absolute expiry instant plus an optional cancellation token.
///
/// Workflows wrap every backend call in [`Deadline::run`], so a slow database
/// or stream backend surfaces as [`CoreError::Timeout`] instead of hanging the
/// request.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
    cancel: Option<CancellationToken>,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
            cancel: None,
        }
    }

    /// Also abort when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Time left before expiry (zero once expired).
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Drive `fut` to completion unless the deadline expires or the token fires
    /// first. On expiry the future is dropped.
    pub async fn run<T, E, F>(&self, operation: &'static str, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<CoreError>,
    {
        let timed = tokio::time::timeout_at(self.at, fut);

        let outcome = match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => return Err(CoreError::Cancelled { operation }),
                    outcome = timed => outcome,
                }
            }
            None => timed.await,
        };

        match outcome {
            Ok(result) => result.map_err(Into::into),
            Err(_elapsed) => Err(CoreError::Timeout {
                operation,
                after: self.budget,
            }),
        }
    }
}
