#![forbid(unsafe_code)]

//! Platform-independent composition root for the page runtime.
//!
//! The binding layer feeds [`SiteCore`] events stamped with the current
//! monotonic time and applies the returned [`SiteCommand`]s in order. After
//! every call it re-arms its single host timer at [`SiteCore::next_deadline`]
//! and, when that fires, calls [`SiteCore::advance`].
//!
//! Form notifications never leave the core as form effects: they are routed
//! into the shared [`ToastCenter`] and surface as toast commands.

use core::time::Duration;

use sitekit_core::form::{FormController, FormEffect, FormKind};
use sitekit_core::menu::{MenuBehavior, MenuController, MenuEffect, MenuEvent};
use sitekit_core::notify::{NotifyLevel, ToastCenter, ToastEffect, ToastId};
use sitekit_core::scroll_ui::ScrollThreshold;
use sitekit_core::section_tracker::{LayoutProbe, SectionTracker};
use sitekit_core::validation::FieldValue;
use sitekit_core::{Feature, InitState, SiteConfig};

/// Which navigation menu an event or command concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKind {
    Burger,
    Drawer,
}

/// DOM work for the binding layer, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteCommand {
    Menu { kind: MenuKind, effect: MenuEffect },
    /// Active flag for every tracked nav link, in registration order.
    SpyLinks(Vec<bool>),
    ScrollTopVisible(bool),
    HeaderScrolled(bool),
    Form { kind: FormKind, effect: FormEffect },
    Toast(ToastEffect),
}

#[derive(Debug)]
pub struct SiteCore {
    config: SiteConfig,
    init: InitState,
    burger: Option<MenuController>,
    drawer: Option<MenuController>,
    tracker: Option<SectionTracker>,
    forms: Vec<FormController>,
    toasts: ToastCenter,
    scroll_top: Option<ScrollThreshold>,
    header: Option<ScrollThreshold>,
}

impl SiteCore {
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        let toasts = ToastCenter::new(&config);
        Self {
            config,
            init: InitState::new(),
            burger: None,
            drawer: None,
            tracker: None,
            forms: Vec::with_capacity(FormKind::ALL.len()),
            toasts,
            scroll_top: None,
            header: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Claim a feature's setup slot. `false` means it already ran this page load.
    pub fn claim(&mut self, feature: Feature) -> bool {
        self.init.claim(feature)
    }

    #[must_use]
    pub const fn is_initialized(&self, feature: Feature) -> bool {
        self.init.is_initialized(feature)
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    pub fn attach_menu(&mut self, kind: MenuKind) {
        let behavior = match kind {
            MenuKind::Burger => MenuBehavior::burger(&self.config),
            MenuKind::Drawer => MenuBehavior::drawer(),
        };
        *self.menu_slot(kind) = Some(MenuController::new(behavior, &self.config));
        tracing::debug!(?kind, "menu attached");
    }

    #[must_use]
    pub fn menu_behavior(&self, kind: MenuKind) -> Option<&MenuBehavior> {
        self.menu(kind).map(MenuController::behavior)
    }

    #[must_use]
    pub fn is_menu_open(&self, kind: MenuKind) -> bool {
        self.menu(kind).is_some_and(MenuController::is_open)
    }

    /// Install the section tracker and compute the initial link state.
    pub fn attach_tracker(
        &mut self,
        now: Duration,
        tracker: SectionTracker,
        probe: &impl LayoutProbe,
    ) -> Vec<SiteCommand> {
        tracing::debug!(sections = tracker.section_count(), "section tracker attached");
        let tracker = self.tracker.insert(tracker);
        tracker
            .on_scroll(now, probe)
            .map(spy_command)
            .into_iter()
            .collect()
    }

    pub fn attach_form(&mut self, kind: FormKind) {
        if self.forms.iter().any(|form| form.spec().kind == kind) {
            return;
        }
        self.forms.push(FormController::new(kind, &self.config));
        tracing::debug!(form = kind.spec().form_id, "form attached");
    }

    pub fn attach_scroll_top(&mut self) {
        self.scroll_top = Some(ScrollThreshold::scroll_to_top(&self.config));
    }

    /// Install the header style toggle and evaluate it once.
    pub fn attach_header(&mut self, now: Duration, scroll_y: f64) -> Vec<SiteCommand> {
        let header = self.header.insert(ScrollThreshold::header(&self.config));
        header
            .on_scroll(now, scroll_y)
            .map(SiteCommand::HeaderScrolled)
            .into_iter()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Window scroll. Each subscriber applies its own throttle.
    pub fn on_scroll(&mut self, now: Duration, probe: &impl LayoutProbe) -> Vec<SiteCommand> {
        let mut commands = Vec::new();
        if let Some(links) = self.tracker.as_mut().and_then(|t| t.on_scroll(now, probe)) {
            commands.push(spy_command(links));
        }
        let scroll_y = probe.scroll_y();
        if let Some(visible) = self.scroll_top.as_mut().and_then(|t| t.on_scroll(now, scroll_y)) {
            commands.push(SiteCommand::ScrollTopVisible(visible));
        }
        if let Some(scrolled) = self.header.as_mut().and_then(|h| h.on_scroll(now, scroll_y)) {
            commands.push(SiteCommand::HeaderScrolled(scrolled));
        }
        commands
    }

    pub fn on_menu_event(&mut self, kind: MenuKind, event: MenuEvent) -> Vec<SiteCommand> {
        self.menu_slot(kind)
            .as_mut()
            .and_then(|menu| menu.handle(event))
            .map(|effect| SiteCommand::Menu { kind, effect })
            .into_iter()
            .collect()
    }

    /// Window resize; only the burger menu listens.
    pub fn on_resize(&mut self, now: Duration, width: f64) {
        if let Some(menu) = self.burger.as_mut() {
            menu.on_resize(now, width);
        }
    }

    /// Submit event for `kind` with a snapshot of its field values.
    pub fn on_submit(
        &mut self,
        now: Duration,
        kind: FormKind,
        values: &[FieldValue],
        has_submit_control: bool,
    ) -> Vec<SiteCommand> {
        let Some(form) = self.forms.iter_mut().find(|f| f.spec().kind == kind) else {
            tracing::debug!(?kind, "submit for unattached form ignored");
            return Vec::new();
        };
        let effects = form.submit(now, values, has_submit_control);
        self.route_form_effects(now, kind, effects)
    }

    /// Show a toast outside of any form flow.
    pub fn notify(
        &mut self,
        now: Duration,
        message: impl Into<String>,
        level: NotifyLevel,
    ) -> Vec<SiteCommand> {
        let (_, effects) = self.toasts.push(now, message, level);
        effects.into_iter().map(SiteCommand::Toast).collect()
    }

    /// Close-button click on a toast.
    pub fn dismiss_toast(&mut self, now: Duration, id: ToastId) -> Vec<SiteCommand> {
        self.toasts
            .dismiss(now, id)
            .into_iter()
            .map(SiteCommand::Toast)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Fire everything due at `now`.
    pub fn advance(&mut self, now: Duration) -> Vec<SiteCommand> {
        let mut commands = Vec::new();
        for kind in [MenuKind::Burger, MenuKind::Drawer] {
            if let Some(effect) = self.menu_slot(kind).as_mut().and_then(|m| m.poll(now)) {
                commands.push(SiteCommand::Menu { kind, effect });
            }
        }
        let mut form_effects = Vec::new();
        for form in &mut self.forms {
            let effects = form.poll(now);
            if !effects.is_empty() {
                form_effects.push((form.spec().kind, effects));
            }
        }
        for (kind, effects) in form_effects {
            commands.extend(self.route_form_effects(now, kind, effects));
        }
        commands.extend(self.toasts.poll(now).into_iter().map(SiteCommand::Toast));
        commands
    }

    /// Earliest pending deadline across every controller.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        let menus = [&self.burger, &self.drawer]
            .into_iter()
            .flatten()
            .filter_map(MenuController::next_deadline);
        let forms = self.forms.iter().filter_map(FormController::next_deadline);
        menus
            .chain(forms)
            .chain(self.toasts.next_deadline())
            .min()
    }

    #[must_use]
    pub fn live_toasts(&self) -> usize {
        self.toasts.live_count()
    }

    fn route_form_effects(
        &mut self,
        now: Duration,
        kind: FormKind,
        effects: Vec<FormEffect>,
    ) -> Vec<SiteCommand> {
        let mut commands = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                FormEffect::Notify { message, level } => {
                    let (_, toast) = self.toasts.push(now, message, level);
                    commands.extend(toast.into_iter().map(SiteCommand::Toast));
                }
                effect => commands.push(SiteCommand::Form { kind, effect }),
            }
        }
        commands
    }

    fn menu(&self, kind: MenuKind) -> Option<&MenuController> {
        match kind {
            MenuKind::Burger => self.burger.as_ref(),
            MenuKind::Drawer => self.drawer.as_ref(),
        }
    }

    fn menu_slot(&mut self, kind: MenuKind) -> &mut Option<MenuController> {
        match kind {
            MenuKind::Burger => &mut self.burger,
            MenuKind::Drawer => &mut self.drawer,
        }
    }
}

fn spy_command(links: &[sitekit_core::section_tracker::NavLink]) -> SiteCommand {
    SiteCommand::SpyLinks(links.iter().map(|link| link.is_active()).collect())
}
