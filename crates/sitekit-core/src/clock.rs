#![forbid(unsafe_code)]

//! Monotonic time sources.
//!
//! Controllers never read the clock themselves; callers pass `now` in. The
//! browser layer uses [`SystemClock`], tests use [`ManualClock`].

use core::time::Duration;
use std::cell::Cell;

use web_time::Instant;

/// Source of monotonic time, measured from an arbitrary origin.
pub trait MonoClock {
    /// Current monotonic time.
    fn now_mono(&self) -> Duration;
}

/// Clock moved by hand, for replaying timer-driven page flows without waiting.
///
/// The browser layer keeps one `setTimeout` armed at the earliest deadline the
/// controllers report; [`ManualClock::run_until`] plays that role in tests.
/// Time only moves forward.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    /// Start at `ms` milliseconds after the origin.
    #[must_use]
    pub const fn at_ms(ms: u64) -> Self {
        Self {
            now: Cell::new(Duration::from_millis(ms)),
        }
    }

    /// Let `ms` milliseconds pass and return the new time.
    pub fn sleep_ms(&self, ms: u64) -> Duration {
        let now = self.now.get().saturating_add(Duration::from_millis(ms));
        self.now.set(now);
        now
    }

    /// Jump to a pending timer deadline, as the armed `setTimeout` would.
    ///
    /// `None` or a deadline already in the past leaves the clock where it is.
    pub fn run_until(&self, deadline: Option<Duration>) -> Duration {
        if let Some(deadline) = deadline {
            self.now.set(self.now.get().max(deadline));
        }
        self.now.get()
    }
}

impl MonoClock for ManualClock {
    fn now_mono(&self) -> Duration {
        self.now.get()
    }
}

/// Wall clock backed by `performance.now()` on wasm and `Instant` natively.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock whose origin is the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonoClock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_sleeps_and_saturates() {
        let clock = ManualClock::default();
        assert_eq!(clock.now_mono(), Duration::ZERO);
        assert_eq!(clock.sleep_ms(250), Duration::from_millis(250));
        let far = ManualClock::at_ms(u64::MAX);
        far.sleep_ms(u64::MAX);
        assert!(far.now_mono() >= Duration::from_millis(u64::MAX));
    }

    #[test]
    fn run_until_only_moves_forward() {
        let ms = Duration::from_millis;
        let clock = ManualClock::at_ms(100);
        assert_eq!(clock.run_until(None), ms(100));
        assert_eq!(clock.run_until(Some(ms(40))), ms(100));
        assert_eq!(clock.run_until(Some(ms(1000))), ms(1000));
        assert_eq!(clock.now_mono(), ms(1000));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_mono();
        let b = clock.now_mono();
        assert!(b >= a);
    }
}
