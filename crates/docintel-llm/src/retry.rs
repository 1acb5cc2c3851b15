//! Retry with exponential backoff for provider HTTP calls

use crate::LlmError;
use std::time::Duration;
use tracing::debug;

/// Default number of attempts per call
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles on every further attempt
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// How many times, and how patiently, a provider retries a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts (a value of 0 still makes one attempt)
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

/// Outcome of one failed attempt
pub(crate) enum Attempt {
    /// Worth trying again
    Retry(LlmError),
    /// Give up immediately
    Fatal(LlmError),
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails fatally or attempts run out
    pub(crate) fn run<T>(&self, mut op: impl FnMut() -> Result<T, Attempt>) -> Result<T, LlmError> {
        let attempts = self.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(e)) => {
                    debug!("Attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                // Exponential backoff: base, 2*base, 4*base, ...
                let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt - 1));
                std::thread::sleep(delay);
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(0),
        }
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = fast(3).run(|| {
            calls += 1;
            if calls < 3 {
                Err(Attempt::Retry(LlmError::Communication("flaky".into())))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_fatal_stops_immediately() {
        let mut calls = 0;
        let result: Result<(), _> = fast(5).run(|| {
            calls += 1;
            Err(Attempt::Fatal(LlmError::ModelNotAvailable("m".into())))
        });
        assert!(matches!(result, Err(LlmError::ModelNotAvailable(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_returns_last_error_when_exhausted() {
        let mut calls = 0;
        let result: Result<(), _> = fast(2).run(|| {
            calls += 1;
            Err(Attempt::Retry(LlmError::RateLimitExceeded))
        });
        assert!(matches!(result, Err(LlmError::RateLimitExceeded)));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_zero_retries_still_attempts_once() {
        let mut calls = 0;
        let _ = fast(0).run(|| {
            calls += 1;
            Ok::<_, Attempt>(())
        });
        assert_eq!(calls, 1);
    }
}
