//! Time source for collection stamps.

use std::time::Instant;

use cluster_api::now_ms;

/// Источник текущего времени для поля `stamp_ms`.
pub trait Clock: Send {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time that never goes backwards.
///
/// Wall time is read once at construction; later reads add the monotonic
/// `Instant` delta, so NTP adjustments cannot reorder stamps.
#[derive(Debug, Clone)]
pub struct SystemClock {
    anchor_ms: i64,
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            anchor_ms: now_ms(),
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        self.anchor_ms + self.origin.elapsed().as_millis() as i64
    }
}

impl<F> Clock for F
where
    F: Fn() -> i64 + Send,
{
    fn now_ms(&self) -> i64 {
        self()
    }
}
