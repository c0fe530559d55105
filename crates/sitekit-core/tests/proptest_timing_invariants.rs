//! Property-based invariant tests for scroll tracking and rate limiting.
//!
//! 1. The tracker marks exactly the section with the greatest top at or above
//!    the probe line (or none), and only links targeting it.
//! 2. A burst of calls inside one throttle window runs once; the first call
//!    after the window runs once more.
//! 3. A debounced burst runs once, `delay` after its last call.

use std::cell::Cell;
use std::time::Duration;

use proptest::prelude::*;
use sitekit_core::SiteConfig;
use sitekit_core::rate_limit::{debounce, throttle};
use sitekit_core::section_tracker::{LayoutProbe, SectionTracker};

// ── Strategies ──────────────────────────────────────────────────────────

struct Page {
    tops: Vec<f64>,
    scroll_y: f64,
    header: Option<f64>,
}

impl LayoutProbe for Page {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn header_height(&self) -> Option<f64> {
        self.header
    }

    fn section_top(&self, index: usize) -> f64 {
        self.tops[index]
    }
}

/// Section tops in document order (non-decreasing).
fn tops_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0u32..800, 1..12).prop_map(|gaps| {
        gaps.iter()
            .scan(0.0, |top, gap| {
                *top += f64::from(*gap);
                Some(*top)
            })
            .collect()
    })
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Tracker picks the last section above the probe line
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tracker_marks_greatest_top_below_probe(
        tops in tops_strategy(),
        scroll_y in 0u32..10_000,
        header in prop::option::of(0u32..200),
        extra_links in 0usize..3,
    ) {
        let config = SiteConfig::default();
        let ids: Vec<String> = (0..tops.len()).map(|i| format!("s{i}")).collect();
        let mut hrefs: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
        hrefs.extend((0..extra_links).map(|i| format!("/other.html#x{i}")));
        let mut tracker = SectionTracker::new(ids.clone(), &hrefs, &config)
            .expect("non-empty sections and links");

        let page = Page {
            tops: tops.clone(),
            scroll_y: f64::from(scroll_y),
            header: header.map(f64::from),
        };
        let position = page.scroll_y
            + page.header.unwrap_or(config.header_fallback_px)
            + config.spy_lookahead_px;
        let expected = tops
            .iter()
            .enumerate()
            .filter(|&(_, &top)| top <= position)
            .map(|(idx, _)| idx)
            .next_back();

        let links = tracker.refresh(&page).to_vec();
        let active: Vec<usize> = links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.is_active())
            .map(|(idx, _)| idx)
            .collect();
        match expected {
            Some(idx) => {
                prop_assert_eq!(active, vec![idx]);
                prop_assert_eq!(tracker.active_id(), Some(ids[idx].as_str()));
            }
            None => {
                prop_assert!(active.is_empty());
                prop_assert_eq!(tracker.active_id(), None);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Throttle: one run per window, no trailing catch-up
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn throttle_runs_once_per_window(
        interval in 1u64..500,
        offsets in prop::collection::vec(0u64..1_000, 1..40),
        late in 0u64..1_000,
    ) {
        let runs = Cell::new(0u32);
        let mut gated = throttle(|()| runs.set(runs.get() + 1), ms(interval));
        let start = 10_000;
        gated.call(ms(start), ());
        for offset in &offsets {
            gated.call(ms(start + offset % interval), ());
        }
        prop_assert_eq!(runs.get(), 1);

        prop_assert!(gated.call(ms(start + interval + late), ()));
        prop_assert_eq!(runs.get(), 2);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Debounce: exactly one run, `delay` after the last call
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn debounce_runs_once_after_burst(
        delay in 1u64..1_000,
        gaps in prop::collection::vec(0u64..1_000, 1..30),
    ) {
        let last_arg = Cell::new(None);
        let mut gated = debounce(|arg: usize| last_arg.set(Some(arg)), ms(delay));

        let mut now = 0;
        for (idx, gap) in gaps.iter().enumerate() {
            // Each call lands strictly within `delay` of the previous one.
            now += gap % delay;
            prop_assert!(!gated.poll(ms(now)));
            prop_assert_eq!(gated.call(ms(now), idx), ms(now + delay));
        }

        prop_assert!(!gated.poll(ms(now + delay - 1)));
        prop_assert_eq!(last_arg.get(), None);
        prop_assert!(gated.poll(ms(now + delay)));
        prop_assert_eq!(last_arg.get(), Some(gaps.len() - 1));
        prop_assert!(!gated.poll(ms(now + 10 * delay)));
    }
}
