use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use time::OffsetDateTime;

/// Wall-clock source for deriving league views.
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> u64 {
        OffsetDateTime::now_utc().unix_timestamp().max(0) as u64
    }
}

/// Clock that only moves when told to.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now_seconds: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now_seconds)),
        }
    }

    pub fn set(&self, now_seconds: u64) {
        self.now.store(now_seconds, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
