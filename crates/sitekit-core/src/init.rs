#![forbid(unsafe_code)]

//! Once-per-page initialization flags.
//!
//! Each feature claims its flag before binding; a second claim is refused so
//! re-running setup never double-registers handlers. Flags are write-once:
//! nothing clears them for the lifetime of the page.

use bitflags::bitflags;

bitflags! {
    /// Set of features that have already been initialized.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InitFlags: u16 {
        const BURGER_MENU    = 1 << 0;
        const DRAWER_NAV     = 1 << 1;
        const SMOOTH_SCROLL  = 1 << 2;
        const SECTION_SPY    = 1 << 3;
        const ACTIVE_MENU    = 1 << 4;
        const IMAGES         = 1 << 5;
        const FORMS          = 1 << 6;
        const ACCORDION      = 1 << 7;
        const SCROLL_TO_TOP  = 1 << 8;
        const HEADER_SCROLL  = 1 << 9;
    }
}

/// One independently initialized page feature, in setup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    BurgerMenu,
    DrawerNav,
    SmoothScroll,
    SectionSpy,
    ActiveMenu,
    Images,
    Forms,
    Accordion,
    ScrollToTop,
    HeaderScroll,
}

impl Feature {
    pub const ALL: [Self; 10] = [
        Self::BurgerMenu,
        Self::DrawerNav,
        Self::SmoothScroll,
        Self::SectionSpy,
        Self::ActiveMenu,
        Self::Images,
        Self::Forms,
        Self::Accordion,
        Self::ScrollToTop,
        Self::HeaderScroll,
    ];

    #[must_use]
    pub const fn flag(self) -> InitFlags {
        match self {
            Self::BurgerMenu => InitFlags::BURGER_MENU,
            Self::DrawerNav => InitFlags::DRAWER_NAV,
            Self::SmoothScroll => InitFlags::SMOOTH_SCROLL,
            Self::SectionSpy => InitFlags::SECTION_SPY,
            Self::ActiveMenu => InitFlags::ACTIVE_MENU,
            Self::Images => InitFlags::IMAGES,
            Self::Forms => InitFlags::FORMS,
            Self::Accordion => InitFlags::ACCORDION,
            Self::ScrollToTop => InitFlags::SCROLL_TO_TOP,
            Self::HeaderScroll => InitFlags::HEADER_SCROLL,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BurgerMenu => "burger_menu",
            Self::DrawerNav => "drawer_nav",
            Self::SmoothScroll => "smooth_scroll",
            Self::SectionSpy => "section_spy",
            Self::ActiveMenu => "active_menu",
            Self::Images => "images",
            Self::Forms => "forms",
            Self::Accordion => "accordion",
            Self::ScrollToTop => "scroll_to_top",
            Self::HeaderScroll => "header_scroll",
        }
    }
}

/// Initialization state held by the composition root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitState {
    flags: InitFlags,
}

impl InitState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            flags: InitFlags::empty(),
        }
    }

    /// Claim `feature`. Returns `true` only for the first claim.
    ///
    /// The flag is set even when the feature later finds no markup to bind,
    /// so a page without a widget never retries its lookup.
    pub fn claim(&mut self, feature: Feature) -> bool {
        if self.flags.contains(feature.flag()) {
            tracing::debug!(feature = feature.label(), "already initialized");
            return false;
        }
        self.flags.insert(feature.flag());
        true
    }

    #[must_use]
    pub const fn is_initialized(&self, feature: Feature) -> bool {
        self.flags.contains(feature.flag())
    }

    #[must_use]
    pub const fn flags(&self) -> InitFlags {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_write_once() {
        let mut state = InitState::new();
        assert!(state.claim(Feature::Forms));
        assert!(!state.claim(Feature::Forms));
        assert!(state.is_initialized(Feature::Forms));
        assert!(!state.is_initialized(Feature::Accordion));
    }

    #[test]
    fn every_feature_has_a_distinct_flag() {
        let mut state = InitState::new();
        for feature in Feature::ALL {
            assert!(state.claim(feature), "{}", feature.label());
        }
        assert_eq!(state.flags(), InitFlags::all());
    }
}
