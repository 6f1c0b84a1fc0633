// Cycle retry engine: bounded retry with fixed or linear spacing, applied to
// the whole fetch+validate sequence of one polling cycle.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::FeedError;

/// Spacing of delays between attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetrySpacing {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Delay grows linearly with the retry number.
    Linear,
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries (not counting the initial attempt).
    pub max_retries: u32,
    /// Base delay between attempts.
    pub delay: Duration,
    /// How the delay scales across retries.
    pub spacing: RetrySpacing,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
            spacing: RetrySpacing::Fixed,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration, spacing: RetrySpacing) -> Self {
        Self {
            max_retries,
            delay,
            spacing,
        }
    }

    /// Compute the delay before retry `attempt` (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self.spacing {
            RetrySpacing::Fixed => self.delay,
            RetrySpacing::Linear => self.delay.saturating_mul(attempt.max(1)),
        }
    }
}

/// Result of a single attempt, used by the caller to signal retryability.
pub enum RetryAction<T> {
    /// Operation succeeded.
    Success(T),
    /// Operation failed transiently; another attempt may succeed.
    Retry(FeedError),
    /// Operation failed permanently (auth loss, invalid state).
    Fail(FeedError),
}

/// Execute an async operation with bounded retry.
///
/// The `operation` closure receives the current attempt number (0-indexed)
/// and returns a [`RetryAction`]. Before every sleep, `on_retry` is invoked
/// with the 1-based retry number, the computed delay, and the causing error,
/// so callers can surface progress to observers. Sleeps race against the
/// cancellation token; cancellation yields [`FeedError::Cancelled`].
pub async fn retry_with_policy<F, Fut, T, N>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    mut on_retry: N,
    operation: F,
) -> Result<T, FeedError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = RetryAction<T>>,
    N: FnMut(u32, Duration, &FeedError),
{
    let mut attempt = 0u32;
    loop {
        if token.is_cancelled() {
            return Err(FeedError::Cancelled);
        }

        match operation(attempt).await {
            RetryAction::Success(value) => return Ok(value),
            RetryAction::Fail(err) => return Err(err),
            RetryAction::Retry(err) => {
                if attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    max = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying after transient error"
                );
                on_retry(attempt, delay, &err);
                tokio::select! {
                    _ = token.cancelled() => {
                        return Err(FeedError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
