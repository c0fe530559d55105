#![forbid(unsafe_code)]

//! Collapsible navigation menus.
//!
//! Two flavours share one controller:
//! - the burger menu (`.navbar-toggler` / `.navbar-collapse`): closes on
//!   Escape, outside clicks, nav-link clicks, and when a debounced resize lands
//!   at desktop width; locks body scroll while open.
//! - the drawer nav (`.dr-nav-toggle` / `#dr-nav-menu`): a plain toggle that
//!   closes when a link inside the panel is clicked.

use core::time::Duration;

use crate::config::SiteConfig;
use crate::rate_limit::Debounce;

/// Static description of how one menu flavour reacts and renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuBehavior {
    /// Class toggled on the panel (and on the toggle when `mark_toggle`).
    pub open_class: &'static str,
    pub mark_toggle: bool,
    /// Body class applied while open.
    pub body_lock_class: Option<&'static str>,
    pub close_on_escape: bool,
    pub close_on_outside_click: bool,
    /// Close once a settled resize reaches at least this width.
    pub close_at_width: Option<f64>,
}

impl MenuBehavior {
    #[must_use]
    pub fn burger(config: &SiteConfig) -> Self {
        Self {
            open_class: "show",
            mark_toggle: false,
            body_lock_class: Some("u-no-scroll"),
            close_on_escape: true,
            close_on_outside_click: true,
            close_at_width: Some(config.desktop_breakpoint_px),
        }
    }

    #[must_use]
    pub const fn drawer() -> Self {
        Self {
            open_class: "dr-is-open",
            mark_toggle: true,
            body_lock_class: None,
            close_on_escape: false,
            close_on_outside_click: false,
            close_at_width: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    ToggleClick,
    Escape,
    /// A document click outside both the panel and the toggle.
    OutsideClick,
    /// A click on a link inside the panel.
    LinkClick,
}

/// Transition the host must render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEffect {
    Opened,
    Closed,
}

impl MenuEffect {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Opened)
    }

    /// Value for the toggle's `aria-expanded`.
    #[must_use]
    pub const fn aria_expanded(self) -> &'static str {
        if self.is_open() { "true" } else { "false" }
    }
}

#[derive(Debug, Clone)]
pub struct MenuController {
    behavior: MenuBehavior,
    open: bool,
    resize: Debounce,
    last_width: f64,
}

impl MenuController {
    #[must_use]
    pub fn new(behavior: MenuBehavior, config: &SiteConfig) -> Self {
        Self {
            behavior,
            open: false,
            resize: Debounce::new(config.resize_debounce()),
            last_width: 0.0,
        }
    }

    #[must_use]
    pub const fn behavior(&self) -> &MenuBehavior {
        &self.behavior
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub fn handle(&mut self, event: MenuEvent) -> Option<MenuEffect> {
        match event {
            MenuEvent::ToggleClick => Some(self.set_open(!self.open)),
            MenuEvent::Escape if self.behavior.close_on_escape => self.close(),
            MenuEvent::OutsideClick if self.behavior.close_on_outside_click => self.close(),
            MenuEvent::LinkClick => self.close(),
            MenuEvent::Escape | MenuEvent::OutsideClick => None,
        }
    }

    /// Window resize at `now`. Returns the debounce deadline to arm, if any.
    pub fn on_resize(&mut self, now: Duration, width: f64) -> Option<Duration> {
        self.behavior.close_at_width?;
        self.last_width = width;
        Some(self.resize.trigger(now))
    }

    /// Settle a pending resize.
    pub fn poll(&mut self, now: Duration) -> Option<MenuEffect> {
        if !self.resize.poll(now) {
            return None;
        }
        let breakpoint = self.behavior.close_at_width?;
        if self.last_width >= breakpoint {
            self.close()
        } else {
            None
        }
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.resize.deadline()
    }

    fn close(&mut self) -> Option<MenuEffect> {
        self.open.then(|| self.set_open(false))
    }

    fn set_open(&mut self, open: bool) -> MenuEffect {
        self.open = open;
        tracing::debug!(class = self.behavior.open_class, open, "menu toggled");
        if open {
            MenuEffect::Opened
        } else {
            MenuEffect::Closed
        }
    }
}
