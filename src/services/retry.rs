use crate::config::Config;
use crate::models::error::AppError;
use crate::services::clock::Clock;
use crate::services::rate_limit::RateLimiter;
use std::future::Future;

/// How often, and how patiently, a rate-limited request is re-issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
        }
    }

    /// A single attempt, 429 surfaced immediately.
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    /// Delay before retry number `attempt + 1` (`attempt` counts from 0).
    pub fn delay_for(&self, attempt: u32) -> u64 {
        2u64.checked_pow(attempt)
            .and_then(|factor| self.base_delay_ms.checked_mul(factor))
            .unwrap_or(u64::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Config::MAX_RETRY_ATTEMPTS, Config::RETRY_BASE_DELAY_MS)
    }
}

/// Retries an async operation with exponential backoff for rate-limited requests.
///
/// # Arguments
///
/// * `operation` - A closure that returns a Future resolving to `Result<T, AppError>`
/// * `policy` - Retry count and base delay
/// * `limiter` - Pacing applied before every attempt
/// * `clock` - Source of the backoff delay
///
/// # Returns
///
/// The successful result, or the last error encountered
///
/// # Behavior
///
/// - Backoff: `base_delay_ms * 2^attempt` (2000ms → 4000ms → 8000ms by default)
/// - Only retries on `AppError::RateLimited`
/// - All other errors immediately propagate
/// - At most `max_retries + 1` calls; a 429 on the last one is returned
pub async fn retry_with_backoff<F, Fut, T>(
    mut operation: F,
    policy: RetryPolicy,
    limiter: &RateLimiter,
    clock: &dyn Clock,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0;

    loop {
        limiter.acquire().await;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(AppError::RateLimited { retry_after_secs }) if attempt < policy.max_retries => {
                let delay_ms = policy.delay_for(attempt);
                tracing::warn!(
                    delay_ms,
                    retry_after_secs = ?retry_after_secs,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    "Rate limited, retrying"
                );
                clock.sleep(delay_ms).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn rate_limited() -> AppError {
        AppError::RateLimited {
            retry_after_secs: None,
        }
    }

    fn setup() -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::new(0));
        // No pacing so only backoff shows up in the recorded sleeps.
        let limiter = RateLimiter::new(clock.clone(), 0);
        (clock, limiter)
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(3, 2_000);
        assert_eq!(policy.delay_for(0), 2_000);
        assert_eq!(policy.delay_for(1), 4_000);
        assert_eq!(policy.delay_for(2), 8_000);
        assert_eq!(policy.delay_for(80), u64::MAX);
    }

    #[tokio::test]
    async fn test_success_after_rate_limits() {
        let (clock, limiter) = setup();
        let calls = &AtomicU32::new(0);

        let result = retry_with_backoff(
            move || async move {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                if call < 2 { Err(rate_limited()) } else { Ok("payload") }
            },
            RetryPolicy::new(3, 100),
            &limiter,
            clock.as_ref(),
        )
        .await;

        assert_eq!(result, Ok("payload"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(clock.sleeps(), vec![100, 200]);
        assert!(clock.now_ms() >= 300);
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_after_exhaustion() {
        let (clock, limiter) = setup();
        let calls = &AtomicU32::new(0);

        let result: Result<(), AppError> = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited())
            },
            RetryPolicy::new(3, 100),
            &limiter,
            clock.as_ref(),
        )
        .await;

        assert!(matches!(result, Err(AppError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(clock.sleeps(), vec![100, 200, 400]);
    }

    #[tokio::test]
    async fn test_other_errors_propagate_immediately() {
        let (clock, limiter) = setup();
        let calls = &AtomicU32::new(0);

        let result: Result<(), AppError> = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::ServerError {
                    status: 500,
                    message: None,
                })
            },
            RetryPolicy::default(),
            &limiter,
            clock.as_ref(),
        )
        .await;

        assert!(matches!(result, Err(AppError::ServerError { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_policy_none_makes_one_attempt() {
        let (clock, limiter) = setup();
        let calls = &AtomicU32::new(0);

        let result: Result<(), AppError> = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited())
            },
            RetryPolicy::none(),
            &limiter,
            clock.as_ref(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_attempt_is_paced() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RateLimiter::new(clock.clone(), 1_000);
        let calls = &AtomicU32::new(0);

        let _ = retry_with_backoff(
            move || async move {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                if call == 0 { Err(rate_limited()) } else { Ok(()) }
            },
            RetryPolicy::new(3, 200),
            &limiter,
            clock.as_ref(),
        )
        .await;

        // 200ms backoff, then the limiter waits out the rest of its 1s spacing.
        assert_eq!(clock.sleeps(), vec![200, 800]);
    }
}
