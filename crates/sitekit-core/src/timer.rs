#![forbid(unsafe_code)]

//! One-shot timer queue driven by host time.
//!
//! Stands in for `setTimeout` inside the core: callers schedule a payload at a
//! deadline and later pop whatever is due. Entries with equal deadlines fire in
//! scheduling order.

use core::time::Duration;
use std::collections::BTreeMap;

/// Handle returned by [`TimerQueue::schedule`], used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    entries: BTreeMap<(Duration, u64), E>,
    next_seq: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `event` to fire at the absolute monotonic time `at`.
    pub fn schedule(&mut self, at: Duration, event: E) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert((at, seq), event);
        TimerId(seq)
    }

    /// Schedule `event` to fire `delay` after `now`.
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, event: E) -> TimerId {
        self.schedule(now.saturating_add(delay), event)
    }

    /// Cancel a pending timer, returning its payload if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        let key = self.entries.keys().find(|(_, seq)| *seq == id.0).copied()?;
        self.entries.remove(&key)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(at, _)| *at)
    }

    /// Pop the earliest entry due at `now`, with the deadline it was scheduled for.
    ///
    /// Timers scheduled while draining (relative to the returned deadline) are
    /// picked up by the next call if they are due as well.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let entry = self.entries.first_entry()?;
        if entry.key().0 > now {
            return None;
        }
        let at = entry.key().0;
        Some((at, entry.remove()))
    }

}
