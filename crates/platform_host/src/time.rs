//! Time helpers shared across host contracts and adapters.

use std::{cell::Cell, rc::Rc, time::Duration};

use futures::future::LocalBoxFuture;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Wall-clock source in unix milliseconds.
pub trait Clock {
    /// Returns the current time in unix milliseconds.
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
/// Clock backed by the host wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        unix_time_ms_now()
    }
}

#[derive(Debug, Clone, Default)]
/// Manually advanced clock for deterministic tests.
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a clock starting at `start_ms`.
    pub fn starting_at(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Moves the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Sets the absolute clock value.
    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Host timer used for bounded waits.
pub trait Sleeper {
    /// Returns a future that resolves after `duration`.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Sleeper that resolves immediately.
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(futures::future::ready(()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Sleeper that never resolves.
pub struct PendingSleeper;

impl Sleeper for PendingSleeper {
    fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(futures::future::pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_and_saturates() {
        let clock = ManualClock::starting_at(1_000);
        clock.advance(250);
        assert_eq!(clock.now_ms(), 1_250);
        clock.set(u64::MAX - 1);
        clock.advance(10);
        assert_eq!(clock.now_ms(), u64::MAX);
    }

    #[test]
    fn system_clock_is_past_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
