//! Time sources for draw-gated frame advancement.
//!
//! Frame stepping is coupled to the cadence of `draw` calls, not to a
//! background timer; the sprite only ever *samples* time. The source of
//! those samples is abstracted behind [`Clock`] so tests can feed a
//! hand-advanced timeline instead of the OS clock.

use std::time::Instant;

/// Monotonic time source, in milliseconds.
pub trait Clock {
    /// Milliseconds elapsed since some fixed origin. Must never decrease.
    fn now_ms(&self) -> f64;
}

/// Default clock backed by [`std::time::Instant`], anchored at creation.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}
