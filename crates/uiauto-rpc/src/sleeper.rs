//! Pauses between retries and polls.
//!
//! Retry backoff and the wait loop both pause through [`Sleeper`], so tests
//! can swap in [`MockSleeper`] and assert on the requested pauses without
//! waiting on the wall clock.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use uiauto_common::mutex_lock_or_recover;

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Records requested pauses and returns immediately.
#[derive(Debug, Default)]
pub struct MockSleeper {
    call_count: AtomicU64,
    total_ms: AtomicU64,
    durations: Mutex<Vec<Duration>>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.total_ms.load(Ordering::SeqCst))
    }

    /// Every requested pause, in call order.
    pub fn durations(&self) -> Vec<Duration> {
        mutex_lock_or_recover(&self.durations).clone()
    }

    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.total_ms.store(0, Ordering::SeqCst);
        mutex_lock_or_recover(&self.durations).clear();
    }
}

impl Sleeper for MockSleeper {
    fn sleep(&self, duration: Duration) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        mutex_lock_or_recover(&self.durations).push(duration);
    }
}
