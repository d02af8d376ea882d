//! Bounded exponential-backoff retry around a single webhook attempt.
//!
//! Attempts run strictly one after another. After a failed attempt `i`
//! (1-indexed) with `i <= max_retries`, the orchestrator sleeps
//! `min(initial * multiplier^(i-1), max_delay)` and tries again. Every failure
//! code is retried; callers that care about specific codes inspect the final
//! error.

use async_trait::async_trait;
use nerbixa_core::{WebhookError, WebhookResult};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub const RETRY_LABEL: &str = "Retry attempt";
pub const UPLOAD_RETRY_LABEL: &str = "File upload retry attempt";
pub const DESCRIPTION_RETRY_LABEL: &str = "Description request retry attempt";

/// Suspends the calling task between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Backoff schedule
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay after failed attempt `attempt` (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = (attempt - 1).min(i32::MAX as u32) as i32;
        let delay = self
            .initial_delay
            .as_secs_f64()
            * self.multiplier.powi(exponent);

        if !delay.is_finite() || delay >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(delay)
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { delay: Duration },
    GiveUp,
}

/// Attempt counter and last observed error for one retried call.
#[derive(Debug)]
pub struct RetryState {
    max_retries: u32,
    attempt: u32,
    last_error: Option<WebhookError>,
}

impl RetryState {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            attempt: 0,
            last_error: None,
        }
    }

    /// Marks the start of the next attempt and returns its 1-indexed number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn last_error(&self) -> Option<&WebhookError> {
        self.last_error.as_ref()
    }

    pub fn record_failure(&mut self, error: WebhookError, policy: &RetryPolicy) -> RetryDecision {
        self.last_error = Some(error);
        if self.attempt <= self.max_retries {
            RetryDecision::Retry {
                delay: policy.delay_for_attempt(self.attempt),
            }
        } else {
            RetryDecision::GiveUp
        }
    }

    /// Final error: the last one seen, or a synthetic `MAX_RETRIES_EXCEEDED`.
    pub fn into_error(self) -> WebhookError {
        let attempts = self.attempt;
        self.last_error
            .unwrap_or_else(|| WebhookError::max_retries_exceeded(attempts))
    }
}

/// Runs attempts under a [`RetryPolicy`], sleeping through a [`Sleeper`].
#[derive(Clone)]
pub struct RetryOrchestrator {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for RetryOrchestrator {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), Arc::new(TokioSleeper))
    }
}

impl std::fmt::Debug for RetryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryOrchestrator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryOrchestrator {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invokes `attempt_fn` up to `max_retries + 1` times, stopping at the
    /// first success.
    pub async fn run<F, Fut>(&self, label: &str, max_retries: u32, mut attempt_fn: F) -> WebhookResult
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = WebhookResult>,
    {
        let mut state = RetryState::new(max_retries);

        while state.attempts() <= max_retries {
            let attempt = state.begin_attempt();

            let error = match attempt_fn().await {
                Ok(response) => {
                    if attempt > 1 {
                        info!(attempt, "Request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(error) => error,
            };

            warn!(attempt, error_code = %error.code, "Attempt failed");

            match state.record_failure(error, &self.policy) {
                RetryDecision::Retry { delay } => {
                    let delay_ms = delay.as_millis() as u64;
                    info!(
                        attempt,
                        max_retries,
                        delay_ms,
                        "{} {}/{} after {}ms delay",
                        label,
                        attempt,
                        max_retries,
                        delay_ms
                    );
                    self.sleeper.sleep(delay).await;
                }
                RetryDecision::GiveUp => break,
            }
        }

        let attempts = state.attempts();
        let final_error = state.into_error();
        error!(
            attempts,
            error_code = %final_error.code,
            error = %final_error.message,
            "All retry attempts failed"
        );
        Err(final_error)
    }
}
