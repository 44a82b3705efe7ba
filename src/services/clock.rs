use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of wall-clock time and delays for pacing and backoff.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Suspends the caller for `ms` milliseconds.
    async fn sleep(&self, ms: u64);
}

/// Real time: `chrono` for the timestamp, the platform timer for delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn sleep(&self, ms: u64) {
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }

    #[cfg(target_arch = "wasm32")]
    async fn sleep(&self, ms: u64) {
        gloo_timers::future::TimeoutFuture::new(u32::try_from(ms).unwrap_or(u32::MAX)).await;
    }
}

/// Virtual time for tests: `sleep` returns at once and moves the clock forward.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
    sleeps: Mutex<Vec<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Moves time forward without recording a sleep.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Every delay requested so far, in order.
    pub fn sleeps(&self) -> Vec<u64> {
        self.sleeps.lock().clone()
    }

    pub fn total_slept(&self) -> u64 {
        self.sleeps.lock().iter().sum()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    async fn sleep(&self, ms: u64) {
        self.sleeps.lock().push(ms);
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_clock_sleep_advances_time() {
        let clock = ManualClock::new(1_000);
        clock.sleep(250).await;
        clock.sleep(50).await;

        assert_eq!(clock.now_ms(), 1_300);
        assert_eq!(clock.sleeps(), vec![250, 50]);
        assert_eq!(clock.total_slept(), 300);
    }

    #[test]
    fn test_manual_clock_advance_is_not_a_sleep() {
        let clock = ManualClock::new(0);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 500);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_system_clock_sleeps() {
        let clock = SystemClock;
        let before = clock.now_ms();
        clock.sleep(20).await;
        assert!(clock.now_ms() >= before + 19);
    }
}
