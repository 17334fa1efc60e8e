use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use time::OffsetDateTime;

/// Time source of the id generator.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// Block the current thread, used while waiting for the clock to move forward.
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Wall clock.
#[derive(Default, Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        u64::try_from(millis).unwrap_or_default()
    }
}

/// Clock moved only explicitly, sleeping advances it by the requested duration.
#[derive(Default, Debug)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new(millis: u64) -> Self {
        Self {
            micros: AtomicU64::new(millis.saturating_mul(1000)),
        }
    }
    pub fn set(&self, millis: u64) {
        self.micros
            .store(millis.saturating_mul(1000), Ordering::SeqCst);
    }
    pub fn advance(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_add(micros.max(1), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.micros.load(Ordering::SeqCst) / 1000
    }
    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
