//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Retry configuration. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt. 0 means try once, never sleep.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap applied to each individual wait.
    pub max_delay: Duration,
    /// Factor the nominal delay grows by after every wait. Must be >= 1.
    pub backoff_multiplier: f64,
    /// Emit a diagnostic event per failed attempt.
    pub debug_trace: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 8,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            debug_trace: false,
        }
    }
}

/// Failure of a whole retry run.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed; carries exactly the last attempt's error.
    #[error("all attempts failed: {0}")]
    Exhausted(E),
    /// Cancelled while waiting between attempts.
    #[error("cancelled while waiting to retry")]
    Cancelled,
}

/// Executes an operation up to `max_retries + 1` times with exponential
/// backoff between attempts.
///
/// Attempts are strictly sequential; the next one starts only after the
/// previous failure and its full wait. The wait before retry `k`
/// (1-indexed) is `min(initial_delay * multiplier^(k-1), max_delay)`, with
/// no jitter. The nominal delay keeps compounding past the cap; only the
/// applied sleep is capped.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Creates an executor with the given policy.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The configured policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `op` until it succeeds or the budget is exhausted.
    ///
    /// Returns the first success; on exhaustion the error is exactly the
    /// last attempt's error, intermediate failures are discarded. Cancelling
    /// `token` during a wait aborts immediately with
    /// [`RetryError::Cancelled`]; an in-flight attempt is never interrupted.
    pub async fn run<T, E, F, Fut>(
        &self,
        token: &CancellationToken,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut delay = self.policy.initial_delay;

        for attempt in 0..=self.policy.max_retries {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt == self.policy.max_retries {
                        return Err(RetryError::Exhausted(err));
                    }

                    if self.policy.debug_trace {
                        debug!(
                            attempt = attempt + 1,
                            remaining = self.policy.max_retries - attempt,
                            error = %err,
                            "Attempt failed, backing off"
                        );
                    }

                    let wait = delay.min(self.policy.max_delay);
                    tokio::select! {
                        () = token.cancelled() => return Err(RetryError::Cancelled),
                        () = sleep(wait) => {}
                    }

                    // Compounding can overflow Duration for long budgets;
                    // saturate instead of panicking.
                    delay = Duration::try_from_secs_f64(
                        delay.as_secs_f64() * self.policy.backoff_multiplier,
                    )
                    .unwrap_or(Duration::MAX);
                }
            }
        }

        unreachable!("loop returns on final attempt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn quick_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            backoff_multiplier: 2.0,
            debug_trace: true,
        }
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let calls = AtomicU32::new(0);
        let executor = RetryExecutor::new(quick_policy(5));
        let token = CancellationToken::new();

        let result: Result<u32, RetryError<String>> = executor
            .run(&token, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 1 {
                        Ok(n)
                    } else {
                        Err(format!("fail-{n}"))
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 1);
        // Never called again after success.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_error() {
        let calls = AtomicU32::new(0);
        let executor = RetryExecutor::new(quick_policy(2));
        let token = CancellationToken::new();

        let result: Result<(), RetryError<String>> = executor
            .run(&token, || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("err-{n}")) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(RetryError::Exhausted(last)) => assert_eq!(last, "err-2"),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_retries_fails_immediately_without_sleeping() {
        let executor = RetryExecutor::new(RetryPolicy {
            max_retries: 0,
            initial_delay: Duration::from_secs(60),
            ..quick_policy(0)
        });
        let token = CancellationToken::new();
        let started = Instant::now();

        let result: Result<(), RetryError<&str>> =
            executor.run(&token, || async { Err("boom") }).await;

        assert!(matches!(result, Err(RetryError::Exhausted("boom"))));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_backoff_grows_and_caps() {
        // Waits: 10ms, 20ms, 40ms, then capped at 40ms.
        let executor = RetryExecutor::new(quick_policy(4));
        let token = CancellationToken::new();
        let started = Instant::now();

        let result: Result<(), RetryError<&str>> =
            executor.run(&token, || async { Err("always") }).await;

        assert!(matches!(result, Err(RetryError::Exhausted(_))));
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(110),
            "expected at least 10+20+40+40 ms of waiting, got {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_nominal_delay_saturates_past_duration_range() {
        // The nominal delay compounds uncapped; with a huge initial delay it
        // exceeds Duration's range after a couple of doublings. Only the
        // capped wait is ever slept, so the run must still exhaust cleanly.
        let executor = RetryExecutor::new(RetryPolicy {
            max_retries: 4,
            initial_delay: Duration::from_secs(u64::MAX / 2),
            max_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            debug_trace: false,
        });
        let token = CancellationToken::new();

        let result: Result<(), RetryError<&str>> =
            executor.run(&token, || async { Err("unreachable node") }).await;

        assert!(matches!(
            result,
            Err(RetryError::Exhausted("unreachable node"))
        ));
    }

    #[tokio::test]
    async fn test_cancellation_during_wait() {
        let executor = RetryExecutor::new(RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            debug_trace: false,
        });
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let result: Result<(), RetryError<&str>> =
            executor.run(&token, || async { Err("still failing") }).await;

        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert!(
            started.elapsed() < Duration::from_secs(5),
            "cancellation must not wait out the delay"
        );
    }
}
