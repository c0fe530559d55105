#![forbid(unsafe_code)]

//! Rate limiting for high-frequency browser events (scroll, resize).
//!
//! Two gates, each a tiny state machine over host-supplied time:
//!
//! - [`Throttle`]: leading edge. The first call in a quiet window passes and
//!   opens a window of `interval`; calls inside the window are dropped, never
//!   queued. The first call at or after the window end passes again.
//! - [`Debounce`]: trailing edge. Every call pushes a single deadline out to
//!   `now + delay`; [`Debounce::poll`] reports the deadline once, after the
//!   burst has ended.
//!
//! [`throttle`] and [`debounce`] wrap an action closure around the gates so the
//! call sites read like the page scripts they replace.
//!
//! ```text
//! calls:     x  x x   x          x
//! throttle:  ✓  · ·   ·          ✓        (interval = 100ms)
//!            |---100ms---|
//! debounce:                 ✓            (fires delay after the last x)
//! ```

use core::time::Duration;

// ---------------------------------------------------------------------------
// Throttle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    interval: Duration,
    window_end: Option<Duration>,
}

impl Throttle {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_end: None,
        }
    }

    /// Whether a call at `now` would be admitted.
    #[must_use]
    pub fn is_open(&self, now: Duration) -> bool {
        self.window_end.is_none_or(|end| now >= end)
    }

    /// Admit or drop a call at `now`. Admission restarts the window.
    pub fn admit(&mut self, now: Duration) -> bool {
        if !self.is_open(now) {
            return false;
        }
        self.window_end = Some(now.saturating_add(self.interval));
        true
    }
}

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debounce {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Register a call at `now`, superseding any pending deadline.
    ///
    /// Returns the new deadline so hosts can arm a real timer for it.
    pub fn trigger(&mut self, now: Duration) -> Duration {
        let deadline = now.saturating_add(self.delay);
        self.deadline = Some(deadline);
        deadline
    }

    /// Report `true` exactly once when the pending deadline has passed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

// ---------------------------------------------------------------------------
// Wrapped callables
// ---------------------------------------------------------------------------

/// An action guarded by a [`Throttle`].
pub struct Throttled<F> {
    gate: Throttle,
    action: F,
}

/// Wrap `action` so it runs at most once per `interval`.
pub fn throttle<F>(action: F, interval: Duration) -> Throttled<F> {
    Throttled {
        gate: Throttle::new(interval),
        action,
    }
}

impl<F> Throttled<F> {
    /// Invoke the action with `arg` if the gate admits `now`.
    ///
    /// Returns whether the action ran.
    pub fn call<A>(&mut self, now: Duration, arg: A) -> bool
    where
        F: FnMut(A),
    {
        if !self.gate.admit(now) {
            tracing::trace!(?now, "throttled call dropped");
            return false;
        }
        (self.action)(arg);
        true
    }
}

/// An action deferred by a [`Debounce`], remembering the latest argument.
pub struct Debounced<A, F> {
    gate: Debounce,
    pending: Option<A>,
    action: F,
}

/// Wrap `action` so it runs once, `delay` after the last call of a burst.
pub fn debounce<A, F>(action: F, delay: Duration) -> Debounced<A, F>
where
    F: FnMut(A),
{
    Debounced {
        gate: Debounce::new(delay),
        pending: None,
        action,
    }
}

impl<A, F> Debounced<A, F>
where
    F: FnMut(A),
{
    /// Record a call; the action is deferred. Returns the new deadline.
    pub fn call(&mut self, now: Duration, arg: A) -> Duration {
        self.pending = Some(arg);
        self.gate.trigger(now)
    }

    /// Run the action if the burst has settled. Returns whether it ran.
    pub fn poll(&mut self, now: Duration) -> bool {
        if !self.gate.poll(now) {
            return false;
        }
        match self.pending.take() {
            Some(arg) => {
                (self.action)(arg);
                true
            }
            None => false,
        }
    }
}
