#![forbid(unsafe_code)]

//! Scroll-threshold toggles: the scroll-to-top button and the header style.
//!
//! Both are throttled and rewrite their state on every admitted tick.

use core::time::Duration;

use crate::config::SiteConfig;
use crate::rate_limit::Throttle;

/// Accessible label of the scroll-to-top button.
pub const SCROLL_TOP_LABEL: &str = "Späť na začiatok";
pub const SCROLL_TOP_GLYPH: &str = "↑";
/// Inline style of the scroll-to-top button, hidden until the first tick shows it.
pub const SCROLL_TOP_STYLE: &str = "position: fixed; bottom: 2rem; right: 2rem; z-index: 1000; \
     width: 48px; height: 48px; border-radius: 50%; display: none; padding: 0;";

/// A boolean derived from "scrolled further than `threshold`".
#[derive(Debug, Clone, Copy)]
pub struct ScrollThreshold {
    throttle: Throttle,
    threshold: f64,
    active: bool,
}

impl ScrollThreshold {
    #[must_use]
    pub const fn new(threshold: f64, interval: Duration) -> Self {
        Self {
            throttle: Throttle::new(interval),
            threshold,
            active: false,
        }
    }

    /// Scroll-to-top button: visible past 300px.
    #[must_use]
    pub fn scroll_to_top(config: &SiteConfig) -> Self {
        Self::new(config.scroll_top_threshold_px, config.scroll_throttle())
    }

    /// Header `is-scrolled` class: set past 50px.
    #[must_use]
    pub fn header(config: &SiteConfig) -> Self {
        Self::new(config.header_scrolled_threshold_px, config.scroll_throttle())
    }

    /// Unthrottled evaluation, used at setup.
    pub fn evaluate(&mut self, scroll_y: f64) -> bool {
        self.active = scroll_y > self.threshold;
        self.active
    }

    /// Throttled scroll tick; `Some(state)` when admitted.
    pub fn on_scroll(&mut self, now: Duration, scroll_y: f64) -> Option<bool> {
        self.throttle
            .admit(now)
            .then(|| self.evaluate(scroll_y))
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn threshold_is_strict() {
        let mut top = ScrollThreshold::scroll_to_top(&SiteConfig::default());
        assert!(!top.evaluate(300.0));
        assert!(top.evaluate(300.5));
        let mut header = ScrollThreshold::header(&SiteConfig::default());
        assert!(!header.evaluate(50.0));
        assert!(header.evaluate(51.0));
    }

    #[test]
    fn ticks_are_throttled() {
        let mut top = ScrollThreshold::scroll_to_top(&SiteConfig::default());
        assert_eq!(top.on_scroll(ms(0), 500.0), Some(true));
        assert_eq!(top.on_scroll(ms(50), 0.0), None);
        assert!(top.is_active());
        assert_eq!(top.on_scroll(ms(100), 0.0), Some(false));
    }
}
