#![forbid(unsafe_code)]

//! Transient toast notifications.
//!
//! # Lifecycle
//!
//! ```text
//! push ──▶ Shown ──(display 5000ms | close click)──▶ Leaving ──(exit 150ms)──▶ removed
//! ```
//!
//! The shared container is requested lazily on the first push. Every toast is
//! independent: dismissing one never touches another's timers.

use core::time::Duration;
use std::collections::BTreeMap;

use crate::config::SiteConfig;
use crate::timer::{TimerId, TimerQueue};

/// Id of the shared toast container, reused when already in the page.
pub const CONTAINER_ID: &str = "toast-container";
/// Label for the toast close button.
pub const CLOSE_LABEL: &str = "Zavrieť";

/// Visual level, mapped onto the `alert-*` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl NotifyLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Parse a level name as used in `alert-*` classes.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "info" => Some(Self::Info),
            "success" => Some(Self::Success),
            "warning" => Some(Self::Warning),
            "danger" => Some(Self::Danger),
            _ => None,
        }
    }

    /// Class list for a freshly inserted toast.
    #[must_use]
    pub fn class_name(self) -> String {
        format!("alert alert-{} alert-dismissible fade show", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

/// DOM work requested by the toast center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastEffect {
    /// Find or create the shared container.
    EnsureContainer,
    /// Append a new toast to the container.
    Insert {
        id: ToastId,
        message: String,
        level: NotifyLevel,
    },
    /// Start the exit animation (drop the `show` class).
    Hide { id: ToastId },
    /// Detach the toast element.
    Remove { id: ToastId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastPhase {
    Shown { auto_dismiss: TimerId },
    Leaving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastTimer {
    AutoDismiss(ToastId),
    Remove(ToastId),
}

#[derive(Debug, Clone)]
pub struct ToastCenter {
    container_ready: bool,
    toasts: BTreeMap<ToastId, ToastPhase>,
    timers: TimerQueue<ToastTimer>,
    display: Duration,
    exit: Duration,
    next_id: u64,
}

impl ToastCenter {
    #[must_use]
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            container_ready: false,
            toasts: BTreeMap::new(),
            timers: TimerQueue::new(),
            display: config.toast_display(),
            exit: config.toast_exit(),
            next_id: 1,
        }
    }

    /// Show `message`; it auto-dismisses after the display period.
    pub fn push(
        &mut self,
        now: Duration,
        message: impl Into<String>,
        level: NotifyLevel,
    ) -> (ToastId, Vec<ToastEffect>) {
        let mut effects = Vec::with_capacity(2);
        if !self.container_ready {
            self.container_ready = true;
            effects.push(ToastEffect::EnsureContainer);
        }
        let id = ToastId(self.next_id);
        self.next_id += 1;
        let auto_dismiss = self
            .timers
            .schedule_after(now, self.display, ToastTimer::AutoDismiss(id));
        self.toasts.insert(id, ToastPhase::Shown { auto_dismiss });
        let message = message.into();
        tracing::debug!(id = id.0, level = level.as_str(), %message, "toast shown");
        effects.push(ToastEffect::Insert { id, message, level });
        (id, effects)
    }

    /// Close click. Ignored for toasts already leaving or gone.
    pub fn dismiss(&mut self, now: Duration, id: ToastId) -> Vec<ToastEffect> {
        match self.toasts.get(&id).copied() {
            Some(ToastPhase::Shown { auto_dismiss }) => {
                self.timers.cancel(auto_dismiss);
                self.begin_exit(now, id)
            }
            _ => Vec::new(),
        }
    }

    /// Fire every due timer.
    pub fn poll(&mut self, now: Duration) -> Vec<ToastEffect> {
        let mut effects = Vec::new();
        while let Some((at, timer)) = self.timers.pop_due(now) {
            match timer {
                ToastTimer::AutoDismiss(id) => {
                    if matches!(self.toasts.get(&id), Some(ToastPhase::Shown { .. })) {
                        effects.extend(self.begin_exit(at, id));
                    }
                }
                ToastTimer::Remove(id) => {
                    if self.toasts.remove(&id).is_some() {
                        tracing::debug!(id = id.0, "toast removed");
                        effects.push(ToastEffect::Remove { id });
                    }
                }
            }
        }
        effects
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Toasts currently attached to the document (shown or leaving).
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.toasts.len()
    }

    #[must_use]
    pub fn is_live(&self, id: ToastId) -> bool {
        self.toasts.contains_key(&id)
    }

    fn begin_exit(&mut self, now: Duration, id: ToastId) -> Vec<ToastEffect> {
        self.toasts.insert(id, ToastPhase::Leaving);
        self.timers
            .schedule_after(now, self.exit, ToastTimer::Remove(id));
        vec![ToastEffect::Hide { id }]
    }
}
