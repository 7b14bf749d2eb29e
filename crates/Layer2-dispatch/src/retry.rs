//! Retry logic with exponential backoff
//!
//! 대기 시간은 순수 함수 `RetryPolicy::delay`로 계산하고, 실제 대기는
//! 주입 가능한 `Sleeper`를 통해 수행한다 (테스트에서 실제 대기 없이 검증).

use async_trait::async_trait;
use seedbridge_foundation::RetryConfig;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded exponential backoff policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub base_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Delay after failed attempt `attempt` (1-indexed), i.e. before attempt
    /// `attempt + 1`: `base * 2^(attempt - 1)`, capped at `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        2u32.checked_pow(exponent)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Error classification for retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClassification {
    /// Should retry (transient error)
    Retry,

    /// Should not retry (permanent error)
    NoRetry,

    /// Rate limited or unavailable - use the server-provided delay if any
    RateLimited { retry_after: Option<Duration> },
}

/// Trait for errors that can be classified for retry
pub trait RetryableError {
    fn classify(&self) -> RetryClassification;
}

/// Suspends the current task between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Per-call retry bookkeeping, owned by one retry loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Current attempt, starting at 1
    pub attempt: u32,

    /// Delay scheduled before the next attempt; the floor for the one after
    pub next_delay: Option<Duration>,

    /// Message of the most recent failure
    pub last_error: Option<String>,
}

/// Terminal failure of a retry loop
#[derive(Debug, Clone)]
pub struct RetryError<E> {
    pub error: E,

    /// Attempts made, including the failing one
    pub attempts: u32,

    /// True when the error was retryable but attempts ran out
    pub exhausted: bool,
}

/// Execute an async operation with retry logic
///
/// The operation receives the 1-indexed attempt number. On success returns
/// the value with the number of attempts it took.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    operation_name: &str,
    mut operation: F,
) -> Result<(T, u32), RetryError<E>>
where
    E: RetryableError + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut state = RetryState::default();

    loop {
        state.attempt += 1;
        debug!("{}: attempt {}/{}", operation_name, state.attempt, policy.max_attempts);

        match operation(state.attempt).await {
            Ok(result) => return Ok((result, state.attempt)),
            Err(e) => {
                let classification = e.classify();
                state.last_error = Some(e.to_string());

                match classification {
                    RetryClassification::NoRetry => {
                        debug!(
                            "{}: non-retryable error on attempt {}: {}",
                            operation_name, state.attempt, e
                        );
                        return Err(RetryError {
                            error: e,
                            attempts: state.attempt,
                            exhausted: false,
                        });
                    }
                    RetryClassification::Retry | RetryClassification::RateLimited { .. } => {
                        if state.attempt >= policy.max_attempts {
                            warn!(
                                "{}: max attempts ({}) exceeded: {}",
                                operation_name, policy.max_attempts, e
                            );
                            return Err(RetryError {
                                error: e,
                                attempts: state.attempt,
                                exhausted: true,
                            });
                        }

                        // Never shorter than the previous delay; a server hint
                        // can only lengthen the wait.
                        let mut delay = policy.delay(state.attempt);
                        if let RetryClassification::RateLimited {
                            retry_after: Some(after),
                        } = classification
                        {
                            delay = delay.max(after);
                        }
                        if let Some(previous) = state.next_delay {
                            delay = delay.max(previous);
                        }
                        let delay = delay.min(policy.max_delay);
                        state.next_delay = Some(delay);

                        warn!(
                            "{}: attempt {} failed, retrying in {:?}: {}",
                            operation_name,
                            state.attempt,
                            delay,
                            state.last_error.as_deref().unwrap_or_default()
                        );

                        sleeper.sleep(delay).await;
                    }
                }
            }
        }
    }
}
