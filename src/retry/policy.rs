//! Retry Mechanism Module
//!
//! Bounded retries for blocking API calls. A policy with `max_retries = n`
//! makes at most `n + 1` attempts; the error of the last attempt is what the
//! caller sees.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::LlmError;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    #[serde(with = "crate::config::duration_millis_serde")]
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    #[serde(with = "crate::config::duration_millis_serde")]
    pub max_delay: Duration,
    /// Backoff multiplier (for exponential backoff)
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays
    pub use_jitter: bool,
    /// Maximum jitter percentage (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 2.0,
            use_jitter: true,
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry immediately, `max_retries` times.
    pub fn immediate(max_retries: u32) -> Self {
        Self::default()
            .with_max_retries(max_retries)
            .with_initial_delay(Duration::ZERO)
            .with_jitter(false)
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::immediate(0)
    }

    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub const fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    pub const fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Reject settings that cannot produce a delay, such as a jitter factor
    /// outside `0.0..=1.0` loaded from a config file.
    pub fn validate(&self) -> Result<(), LlmError> {
        if !self.jitter_factor.is_finite() || !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(LlmError::validation(format!(
                "Retry jitter_factor must be within 0.0..=1.0, got {}",
                self.jitter_factor
            )));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 0.0 {
            return Err(LlmError::validation(format!(
                "Retry backoff_multiplier must be a non-negative number, got {}",
                self.backoff_multiplier
            )));
        }
        Ok(())
    }

    /// Total attempts this policy allows.
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn should_retry(&self, error: &LlmError) -> bool {
        error.is_retryable()
    }

    /// Delay before retry number `retry` (0-based).
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }
        let base_delay =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(retry as i32);

        let delay = Duration::from_millis(base_delay as u64).min(self.max_delay);

        if self.use_jitter {
            self.add_jitter(delay)
        } else {
            delay
        }
    }

    fn add_jitter(&self, delay: Duration) -> Duration {
        let mut rng = rand::thread_rng();
        let factor = if self.jitter_factor.is_finite() {
            self.jitter_factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let jitter_range = delay.as_millis() as f64 * factor;
        let jitter = rng.gen_range(-jitter_range..=jitter_range);

        let new_delay = delay.as_millis() as f64 + jitter;
        Duration::from_millis(new_delay.max(0.0) as u64)
    }
}

/// Retry executor that handles the actual retry logic
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent. The closure receives the 1-based
    /// attempt number.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = Result<T, LlmError>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            let error = match operation(attempt).await {
                Ok(result) => return Ok(result),
                Err(error) => error,
            };

            if !self.policy.should_retry(&error) {
                debug!(attempt, error = %error, "not retrying");
                return Err(error);
            }

            if attempt >= max_attempts {
                debug!(attempt, error = %error, "retry budget exhausted");
                return Err(error);
            }

            let delay = self.policy.calculate_delay(attempt - 1);
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "request failed, retrying"
            );
            if !delay.is_zero() {
                sleep(delay).await;
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> LlmError {
        LlmError::provider_error(500, "Server error")
    }

    #[tokio::test]
    async fn test_retry_success_on_second_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(RetryPolicy::immediate(3));

        let result = executor
            .execute(|_| {
                let counter = counter.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    if count == 0 {
                        Err(server_error())
                    } else {
                        Ok("success")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_makes_max_retries_plus_one_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(RetryPolicy::immediate(3));

        let result: Result<(), LlmError> = executor
            .execute(|attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(LlmError::provider_error(503, format!("attempt {attempt}")))
                }
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 4);
        assert_eq!(
            result.unwrap_err(),
            LlmError::provider_error(503, "attempt 4")
        );
    }

    #[tokio::test]
    async fn test_validation_error_is_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(RetryPolicy::immediate(5));

        let result: Result<(), LlmError> = executor
            .execute(|_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(LlmError::validation("bad"))
                }
            })
            .await;

        assert!(matches!(result, Err(LlmError::ValidationError(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let executor = RetryExecutor::new(RetryPolicy::none());

        let _: Result<(), LlmError> = executor
            .execute(|_| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(server_error())
                }
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_out_of_range_jitter_from_config_is_rejected_and_never_panics() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"max_retries":1,"initial_delay":1,"jitter_factor":-0.5}"#)
                .unwrap();
        assert!(matches!(policy.validate(), Err(LlmError::ValidationError(_))));

        for retry in 0..4 {
            assert!(policy.calculate_delay(retry) <= Duration::from_millis(8));
        }
    }

    #[test]
    fn test_negative_backoff_multiplier_is_rejected() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"backoff_multiplier":-2.0}"#).unwrap();
        assert!(policy.validate().is_err());
        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_delay_calculation() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_backoff_multiplier(2.0)
            .with_jitter(false);

        assert_eq!(policy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(400));
        assert_eq!(policy.calculate_delay(10), Duration::from_secs(8));
    }

    #[test]
    fn test_jitter_stays_within_factor() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(1000))
            .with_jitter_factor(0.1);
        for _ in 0..50 {
            let delay = policy.calculate_delay(0).as_millis();
            assert!((900..=1100).contains(&delay), "delay {delay} out of range");
        }
    }
}
