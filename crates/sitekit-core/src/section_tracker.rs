#![forbid(unsafe_code)]

//! Scroll-position section tracking ("scroll spy").
//!
//! Given the page sections in document order and the nav links that point at
//! them by fragment, keep each link's active state consistent with the scroll
//! position:
//!
//! ```text
//! probe = scrollY + headerHeight + lookahead(50px)
//!
//!   top 0     ┌ #hero ─────┐
//!   top 600   ├ #about ────┤ ◀── last section with top <= probe → active
//!   probe ─ ─ ┼ ─ ─ ─ ─ ─ ─┤
//!   top 1400  ├ #contact ──┤
//! ```
//!
//! Sections and links are fixed when the tracker is built; section offsets are
//! read live through a [`LayoutProbe`] on every admitted tick, and the link set
//! is recomputed in full each time (never patched).

use core::time::Duration;

use crate::config::SiteConfig;
use crate::rate_limit::Throttle;

/// Live layout reads needed by the tracker.
///
/// Only consulted on admitted ticks, so the reads stay bounded by the throttle.
pub trait LayoutProbe {
    /// Vertical scroll offset of the viewport.
    fn scroll_y(&self) -> f64;
    /// Current header height, or `None` when the page has no header element.
    fn header_height(&self) -> Option<f64>;
    /// Offset of the `index`-th tracked section from the document top.
    fn section_top(&self, index: usize) -> f64;
}

/// A navigation link referencing a section by fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    target_section_id: Option<String>,
    is_active: bool,
}

impl NavLink {
    /// Build from an `href`; the target is everything after the first `#`.
    pub fn from_href(href: &str) -> Self {
        Self {
            target_section_id: fragment_target(href).map(str::to_owned),
            is_active: false,
        }
    }

    #[must_use]
    pub fn target_section_id(&self) -> Option<&str> {
        self.target_section_id.as_deref()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Text after the first `#` of `href`, if it has one.
#[must_use]
pub fn fragment_target(href: &str) -> Option<&str> {
    href.find('#').map(|idx| &href[idx + 1..])
}

/// The scroll probe line: `scroll_y + header (or fallback) + lookahead`.
#[must_use]
pub fn probe_position(
    scroll_y: f64,
    header_height: Option<f64>,
    header_fallback: f64,
    lookahead: f64,
) -> f64 {
    scroll_y + header_height.unwrap_or(header_fallback) + lookahead
}

/// Index of the last section (document order) whose top is at or above `position`.
///
/// Scans in reverse; O(sections) per call.
pub fn active_section_index(
    count: usize,
    top_of: impl Fn(usize) -> f64,
    position: f64,
) -> Option<usize> {
    (0..count).rev().find(|&idx| top_of(idx) <= position)
}

#[derive(Debug, Clone)]
pub struct SectionTracker {
    section_ids: Vec<String>,
    links: Vec<NavLink>,
    throttle: Throttle,
    lookahead: f64,
    header_fallback: f64,
    active: Option<usize>,
}

impl SectionTracker {
    /// Build a tracker, or `None` when there is nothing to track.
    pub fn new<S, L>(section_ids: S, link_hrefs: L, config: &SiteConfig) -> Option<Self>
    where
        S: IntoIterator,
        S::Item: Into<String>,
        L: IntoIterator,
        L::Item: AsRef<str>,
    {
        let section_ids: Vec<String> = section_ids.into_iter().map(Into::into).collect();
        let links: Vec<NavLink> = link_hrefs
            .into_iter()
            .map(|href| NavLink::from_href(href.as_ref()))
            .collect();
        if section_ids.is_empty() || links.is_empty() {
            tracing::debug!(
                sections = section_ids.len(),
                links = links.len(),
                "section tracker has nothing to track"
            );
            return None;
        }
        Some(Self {
            section_ids,
            links,
            throttle: Throttle::new(config.scroll_throttle()),
            lookahead: config.spy_lookahead_px,
            header_fallback: config.header_fallback_px,
            active: None,
        })
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.section_ids.len()
    }

    /// Id of the section currently considered in view.
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|idx| self.section_ids[idx].as_str())
    }

    /// Recompute unconditionally (used once at setup, before any scroll).
    pub fn refresh(&mut self, probe: &impl LayoutProbe) -> &[NavLink] {
        let position = probe_position(
            probe.scroll_y(),
            probe.header_height(),
            self.header_fallback,
            self.lookahead,
        );
        self.active =
            active_section_index(self.section_ids.len(), |idx| probe.section_top(idx), position);
        let active_id = self.active.map(|idx| self.section_ids[idx].as_str());
        for link in &mut self.links {
            link.is_active = active_id.is_some() && link.target_section_id.as_deref() == active_id;
        }
        tracing::trace!(position, active = ?active_id, "section tracker recomputed");
        &self.links
    }

    /// Scroll tick at `now`; recomputes only if the throttle admits it.
    pub fn on_scroll(&mut self, now: Duration, probe: &impl LayoutProbe) -> Option<&[NavLink]> {
        if !self.throttle.admit(now) {
            return None;
        }
        Some(self.refresh(probe))
    }
}
