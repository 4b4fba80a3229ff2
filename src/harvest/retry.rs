//! Quota-aware retry around a [`RequestExecutor`]
//!
//! | Failure | Action |
//! |---------|--------|
//! | `dailyLimitExceeded` / `quotaExceeded` | Sleep for the configured wait, retry the same request, forever |
//! | `commentsDisabled` | Return immediately |
//! | Anything else | Return immediately |
//!
//! The wait is interrupted by the cancellation token, in which case
//! [`ApiError::Cancelled`] is returned.

use crate::api::{ApiError, RawPage, RequestDescriptor, RequestExecutor};
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Wraps an executor with the quota backoff-and-retry policy
pub struct RetryingExecutor<E> {
    inner: E,
    wait: Duration,
    cancel: CancellationToken,
}

impl<E: RequestExecutor> RetryingExecutor<E> {
    /// Creates a retrying executor that sleeps `wait` after each quota failure
    pub fn new(inner: E, wait: Duration) -> Self {
        Self {
            inner,
            wait,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to abort quota waits
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

#[async_trait]
impl<E: RequestExecutor> RequestExecutor for RetryingExecutor<E> {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawPage, ApiError> {
        let mut attempt: u32 = 1;

        loop {
            match self.inner.execute(request).await {
                Ok(page) => return Ok(page),

                Err(ApiError::RateLimited { reason }) => {
                    tracing::warn!(
                        "Daily limit exceeded ({}), sleeping for {:?} before retrying {} (attempt {})",
                        reason,
                        self.wait,
                        request.endpoint(),
                        attempt
                    );

                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => {
                            tracing::warn!("Quota wait cancelled");
                            return Err(ApiError::Cancelled);
                        }
                        _ = tokio::time::sleep(self.wait) => {}
                    }

                    attempt += 1;
                }

                Err(ApiError::CommentsDisabled) => {
                    tracing::info!(
                        "Comments disabled for video {}",
                        request.get("videoId").unwrap_or("?")
                    );
                    return Err(ApiError::CommentsDisabled);
                }

                Err(e) => {
                    tracing::error!("Unknown failure: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
