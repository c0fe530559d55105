#![forbid(unsafe_code)]

//! Site-wide timing and threshold configuration.
//!
//! # Defaults
//!
//! | Setting | Default | Range | Description |
//! |---------|---------|-------|-------------|
//! | `scroll_throttle_ms` | 100 | 1-1000 | Scroll handler throttle window |
//! | `resize_debounce_ms` | 250 | 1-2000 | Menu resize-close debounce |
//! | `spy_lookahead_px` | 50 | 0-1000 | Section tracker early bias |
//! | `header_fallback_px` | 72 | 0-1000 | Header height when none is found |
//! | `desktop_breakpoint_px` | 1024 | 0-10000 | Width at which the menu auto-closes |
//! | `scroll_top_threshold_px` | 300 | 0-100000 | Scroll-to-top visibility |
//! | `header_scrolled_threshold_px` | 50 | 0-100000 | Header `is-scrolled` toggle |
//! | `submit_delay_ms` | 1000 | 0-10000 | Simulated submission latency |
//! | `redirect_delay_ms` | 1500 | 0-10000 | Delay before the confirmation page |
//! | `toast_display_ms` | 5000 | 500-60000 | Toast auto-dismiss |
//! | `toast_exit_ms` | 150 | 0-2000 | Toast exit animation |
//!
//! The browser layer reads overrides from an inline
//! `<script type="application/json" id="sitekit-config">` element.

use core::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SiteError};

pub const DEFAULT_SCROLL_THROTTLE_MS: u64 = 100;
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 250;
pub const DEFAULT_SPY_LOOKAHEAD_PX: f64 = 50.0;
pub const DEFAULT_HEADER_FALLBACK_PX: f64 = 72.0;
pub const DEFAULT_DESKTOP_BREAKPOINT_PX: f64 = 1024.0;
pub const DEFAULT_SCROLL_TOP_THRESHOLD_PX: f64 = 300.0;
pub const DEFAULT_HEADER_SCROLLED_THRESHOLD_PX: f64 = 50.0;
pub const DEFAULT_SUBMIT_DELAY_MS: u64 = 1000;
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 1500;
pub const DEFAULT_TOAST_DISPLAY_MS: u64 = 5000;
pub const DEFAULT_TOAST_EXIT_MS: u64 = 150;
pub const DEFAULT_CONFIRMATION_URL: &str = "thank_you.html";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub scroll_throttle_ms: u64,
    pub resize_debounce_ms: u64,
    pub spy_lookahead_px: f64,
    pub header_fallback_px: f64,
    pub desktop_breakpoint_px: f64,
    pub scroll_top_threshold_px: f64,
    pub header_scrolled_threshold_px: f64,
    pub submit_delay_ms: u64,
    pub redirect_delay_ms: u64,
    pub toast_display_ms: u64,
    pub toast_exit_ms: u64,
    /// Destination after a successful contact-form submission.
    pub confirmation_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            scroll_throttle_ms: DEFAULT_SCROLL_THROTTLE_MS,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            spy_lookahead_px: DEFAULT_SPY_LOOKAHEAD_PX,
            header_fallback_px: DEFAULT_HEADER_FALLBACK_PX,
            desktop_breakpoint_px: DEFAULT_DESKTOP_BREAKPOINT_PX,
            scroll_top_threshold_px: DEFAULT_SCROLL_TOP_THRESHOLD_PX,
            header_scrolled_threshold_px: DEFAULT_HEADER_SCROLLED_THRESHOLD_PX,
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            redirect_delay_ms: DEFAULT_REDIRECT_DELAY_MS,
            toast_display_ms: DEFAULT_TOAST_DISPLAY_MS,
            toast_exit_ms: DEFAULT_TOAST_EXIT_MS,
            confirmation_url: DEFAULT_CONFIRMATION_URL.to_owned(),
        }
    }
}

impl SiteConfig {
    /// Parse a JSON override document. Missing keys keep their defaults.
    ///
    /// Numeric values are clamped (see [`validated`](Self::validated)); an
    /// empty confirmation URL is rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.confirmation_url.trim().is_empty() {
            return Err(SiteError::InvalidConfig(
                "confirmation_url must not be empty".to_owned(),
            ));
        }
        Ok(config.validated())
    }

    /// Clamp every value into its safe range.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.scroll_throttle_ms = self.scroll_throttle_ms.clamp(1, 1000);
        self.resize_debounce_ms = self.resize_debounce_ms.clamp(1, 2000);
        self.spy_lookahead_px = clamp_px(self.spy_lookahead_px, 1000.0);
        self.header_fallback_px = clamp_px(self.header_fallback_px, 1000.0);
        self.desktop_breakpoint_px = clamp_px(self.desktop_breakpoint_px, 10_000.0);
        self.scroll_top_threshold_px = clamp_px(self.scroll_top_threshold_px, 100_000.0);
        self.header_scrolled_threshold_px =
            clamp_px(self.header_scrolled_threshold_px, 100_000.0);
        self.submit_delay_ms = self.submit_delay_ms.min(10_000);
        self.redirect_delay_ms = self.redirect_delay_ms.min(10_000);
        self.toast_display_ms = self.toast_display_ms.clamp(500, 60_000);
        self.toast_exit_ms = self.toast_exit_ms.min(2000);
        self
    }

    /// Check if values are within valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        *self == self.clone().validated() && !self.confirmation_url.trim().is_empty()
    }

    #[must_use]
    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    #[must_use]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    #[must_use]
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    #[must_use]
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    #[must_use]
    pub fn toast_display(&self) -> Duration {
        Duration::from_millis(self.toast_display_ms)
    }

    #[must_use]
    pub fn toast_exit(&self) -> Duration {
        Duration::from_millis(self.toast_exit_ms)
    }
}

fn clamp_px(value: f64, max: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, max) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_constants() {
        let config = SiteConfig::default();
        assert_eq!(config.scroll_throttle(), Duration::from_millis(100));
        assert_eq!(config.submit_delay(), Duration::from_millis(1000));
        assert_eq!(config.redirect_delay(), Duration::from_millis(1500));
        assert_eq!(config.toast_display(), Duration::from_millis(5000));
        assert_eq!(config.toast_exit(), Duration::from_millis(150));
        assert_eq!(config.confirmation_url, "thank_you.html");
        assert!(config.is_valid());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SiteConfig::from_json(r#"{"submit_delay_ms": 400}"#).expect("valid json");
        assert_eq!(config.submit_delay_ms, 400);
        assert_eq!(config.redirect_delay_ms, DEFAULT_REDIRECT_DELAY_MS);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config =
            SiteConfig::from_json(r#"{"scroll_throttle_ms": 0, "toast_display_ms": 1}"#)
                .expect("valid json");
        assert_eq!(config.scroll_throttle_ms, 1);
        assert_eq!(config.toast_display_ms, 500);
    }

    #[test]
    fn unknown_keys_and_empty_url_are_rejected() {
        assert!(matches!(
            SiteConfig::from_json(r#"{"nope": 1}"#),
            Err(SiteError::Config(_))
        ));
        assert!(matches!(
            SiteConfig::from_json(r#"{"confirmation_url": "  "}"#),
            Err(SiteError::InvalidConfig(_))
        ));
    }

    #[test]
    fn nan_pixels_clamp_to_zero() {
        let config = SiteConfig {
            spy_lookahead_px: f64::NAN,
            ..SiteConfig::default()
        }
        .validated();
        assert_eq!(config.spy_lookahead_px, 0.0);
    }
}
