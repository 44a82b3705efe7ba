use crate::config::Config;
use crate::services::clock::Clock;
use parking_lot::Mutex;
use std::sync::Arc;

/// Client-side pacing: keeps at least `min_delay_ms` between the start of
/// any two requests issued through the same limiter.
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    min_delay_ms: u64,
    notice_cooldown_ms: u64,
    state: Mutex<PacingState>,
}

#[derive(Debug, Default)]
struct PacingState {
    /// Start time granted to the most recent caller.
    last_request_ms: Option<u64>,
    /// While `now` is before this, throttling notices stay quiet.
    notice_until_ms: Option<u64>,
}

/// Outcome of reserving a request slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reservation {
    wait_ms: u64,
    notify: bool,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>, min_delay_ms: u64) -> Self {
        Self {
            clock,
            min_delay_ms,
            notice_cooldown_ms: Config::THROTTLE_NOTICE_COOLDOWN_MS,
            state: Mutex::new(PacingState::default()),
        }
    }

    /// Waits until this caller may start its request and returns how long it
    /// waited. Never fails.
    pub async fn acquire(&self) -> u64 {
        let reservation = self.reserve();

        if reservation.notify {
            tracing::info!(
                min_delay_ms = self.min_delay_ms,
                "Pacing outgoing requests to avoid HTTP 429"
            );
        }

        if reservation.wait_ms > 0 {
            self.clock.sleep(reservation.wait_ms).await;
        }

        reservation.wait_ms
    }

    /// Claims the next slot under the lock. The slot is recorded before the
    /// caller sleeps, so concurrent callers queue up `min_delay_ms` apart.
    fn reserve(&self) -> Reservation {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        let slot = state
            .last_request_ms
            .map_or(now, |last| now.max(last.saturating_add(self.min_delay_ms)));
        state.last_request_ms = Some(slot);

        let wait_ms = slot - now;
        let notify = wait_ms > 0 && state.notice_until_ms.is_none_or(|until| now >= until);
        if notify {
            state.notice_until_ms = Some(now.saturating_add(self.notice_cooldown_ms));
        }

        Reservation { wait_ms, notify }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("min_delay_ms", &self.min_delay_ms)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;

    fn limiter(clock: &Arc<ManualClock>) -> RateLimiter {
        RateLimiter::new(clock.clone(), 1_000)
    }

    #[tokio::test]
    async fn test_first_request_is_not_delayed() {
        let clock = Arc::new(ManualClock::new(10_000));
        let limiter = limiter(&clock);

        assert_eq!(limiter.acquire().await, 0);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_back_to_back_requests_are_spaced() {
        let clock = Arc::new(ManualClock::new(10_000));
        let limiter = limiter(&clock);

        let mut starts = Vec::new();
        for _ in 0..5 {
            limiter.acquire().await;
            starts.push(clock.now_ms());
        }

        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= 1_000, "gap too small: {pair:?}");
        }
        assert_eq!(clock.now_ms() - 10_000, 4_000);
    }

    #[tokio::test]
    async fn test_only_remaining_gap_is_waited() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock);

        limiter.acquire().await;
        clock.advance(400);
        assert_eq!(limiter.acquire().await, 600);
    }

    #[tokio::test]
    async fn test_no_wait_after_idle_period() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock);

        limiter.acquire().await;
        clock.advance(5_000);
        assert_eq!(limiter.acquire().await, 0);
    }

    #[test]
    fn test_reservations_queue_concurrent_callers() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock);

        // Three callers reserving at the same instant get consecutive slots.
        let waits: Vec<u64> = (0..3).map(|_| limiter.reserve().wait_ms).collect();
        assert_eq!(waits, vec![0, 1_000, 2_000]);
    }

    #[test]
    fn test_notice_is_suppressed_during_cooldown() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock);

        assert!(!limiter.reserve().notify); // no throttling yet
        assert!(limiter.reserve().notify);
        assert!(!limiter.reserve().notify);

        clock.advance(31_000);
        limiter.reserve();
        assert!(limiter.reserve().notify);
    }
}
