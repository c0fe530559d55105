#![forbid(unsafe_code)]

//! `wasm-bindgen` entry points and DOM wiring.
//!
//! Every feature resolves its elements once at setup, registers listeners that
//! forward into [`SiteCore`], and applies the returned commands. Missing
//! elements skip the feature; JS exceptions are logged and never cross into
//! another feature. Only compiled on `wasm32` targets.

use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlFormElement, HtmlImageElement,
    HtmlInputElement, HtmlTextAreaElement, KeyboardEvent, Node, ScrollBehavior, ScrollToOptions,
    Window,
};

use sitekit_core::form::{FeedbackSlot, FieldSpec, FormEffect, FormKind, SUBMITTING_LABEL};
use sitekit_core::menu::{MenuEffect, MenuEvent};
use sitekit_core::notify::{CLOSE_LABEL, CONTAINER_ID, NotifyLevel, ToastEffect, ToastId};
use sitekit_core::scroll_ui::{SCROLL_TOP_GLYPH, SCROLL_TOP_LABEL, SCROLL_TOP_STYLE};
use sitekit_core::section_tracker::{LayoutProbe, SectionTracker};
use sitekit_core::validation::{FieldRule, FieldValue};
use sitekit_core::{
    Feature, MonoClock, SiteConfig, SystemClock, accordion, active_menu, anchor, images,
};

use crate::site_core::{MenuKind, SiteCommand, SiteCore};

const CONFIG_ELEMENT_ID: &str = "sitekit-config";
const HEADER_SELECTOR: &str = ".l-header, .navbar";
const SUBMIT_SELECTOR: &str = "[type=\"submit\"]";
const SPINNER_HTML: &str = concat!(
    r#"<span class="spinner-border spinner-border-sm me-2" "#,
    r#"role="status" aria-hidden="true"></span>"#,
);

// ---------------------------------------------------------------------------
// Failure reporting
// ---------------------------------------------------------------------------

/// `console.error(prefix, detail)`, when the global has a console.
///
/// The page installs no `tracing` subscriber, so setup failures and panics are
/// mirrored here with the original JS value attached.
fn report(prefix: &str, detail: &JsValue) {
    let console = Reflect::get(&js_sys::global(), &"console".into()).ok();
    let error = console
        .as_ref()
        .and_then(|console| Reflect::get(console, &"error".into()).ok())
        .and_then(|error| error.dyn_into::<js_sys::Function>().ok());
    if let (Some(console), Some(error)) = (console, error) {
        let _ = error.call2(&console, &JsValue::from_str(prefix), detail);
    }
}

fn panic_message(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    match info.location() {
        Some(loc) => format!("{payload} ({}:{})", loc.file(), loc.line()),
        None => payload.to_owned(),
    }
}

fn install_panic_hook() {
    static HOOK: std::sync::Once = std::sync::Once::new();
    HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            report("sitekit panicked:", &JsValue::from_str(&panic_message(info)));
        }));
    });
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

thread_local! {
    static RUNTIME: OnceCell<Rc<Runtime>> = const { OnceCell::new() };
}

/// Module start: run setup now, or once the document has been parsed.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    install_panic_hook();
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    if document.ready_state() != "loading" {
        return init();
    }
    let on_ready = Closure::<dyn FnMut()>::wrap(Box::new(|| {
        if let Err(err) = init() {
            report("sitekit init failed:", &err);
        }
    }));
    document
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.as_ref().unchecked_ref())?;
    on_ready.forget();
    Ok(())
}

/// Run every feature's setup. Features that already ran are skipped.
#[wasm_bindgen]
pub fn init() -> Result<(), JsValue> {
    runtime()?.setup();
    Ok(())
}

/// Show a toast. `level` is one of `info`, `success`, `warning`, `danger`
/// and defaults to `info`.
#[wasm_bindgen]
pub fn notify(message: &str, level: Option<String>) -> Result<(), JsValue> {
    let runtime = runtime()?;
    let level = level
        .as_deref()
        .and_then(NotifyLevel::from_name)
        .unwrap_or(NotifyLevel::Info);
    let commands = runtime
        .core
        .borrow_mut()
        .notify(runtime.now(), message, level);
    runtime.dispatch(commands);
    Ok(())
}

fn runtime() -> Result<Rc<Runtime>, JsValue> {
    RUNTIME.with(|cell| {
        if let Some(runtime) = cell.get() {
            return Ok(Rc::clone(runtime));
        }
        let runtime = Runtime::new()?;
        Ok(Rc::clone(cell.get_or_init(|| runtime)))
    })
}

fn read_config(document: &Document) -> SiteConfig {
    let Some(text) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return SiteConfig::default();
    };
    match SiteConfig::from_json(&text) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "invalid inline config, using defaults");
            SiteConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn listen(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn set_class(element: &Element, class: &str, on: bool) -> Result<(), JsValue> {
    element.class_list().toggle_with_force(class, on).map(drop)
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn header_element(document: &Document) -> Option<HtmlElement> {
    document
        .query_selector(HEADER_SELECTOR)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn smooth_scroll_to(window: &Window, top: f64) {
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

fn feedback_element(field: &Element, slot: FeedbackSlot) -> Result<Option<Element>, JsValue> {
    match slot {
        FeedbackSlot::NextSibling => Ok(field
            .next_element_sibling()
            .filter(|sibling| sibling.class_list().contains("invalid-feedback"))),
        FeedbackSlot::ParentQuery => match field.parent_element() {
            Some(parent) => parent.query_selector(".invalid-feedback"),
            None => Ok(None),
        },
    }
}

/// Live layout reads for the section tracker.
struct DomLayout<'a> {
    window: &'a Window,
    document: &'a Document,
    sections: &'a [HtmlElement],
}

impl LayoutProbe for DomLayout<'_> {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn header_height(&self) -> Option<f64> {
        header_element(self.document).map(|header| f64::from(header.offset_height()))
    }

    fn section_top(&self, index: usize) -> f64 {
        self.sections
            .get(index)
            .map_or(f64::INFINITY, |section| f64::from(section.offset_top()))
    }
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

struct MenuElements {
    toggle: Element,
    panel: Element,
}

struct SubmitControl {
    element: Element,
    label: String,
}

/// Elements the command applier writes to.
#[derive(Default)]
struct View {
    menus: HashMap<MenuKind, MenuElements>,
    sections: Vec<HtmlElement>,
    spy_links: Vec<Element>,
    scroll_top: Option<HtmlElement>,
    header: Option<Element>,
    toast_container: Option<Element>,
    toasts: HashMap<ToastId, Element>,
    submitting: HashMap<FormKind, SubmitControl>,
}

struct Runtime {
    window: Window,
    document: Document,
    clock: SystemClock,
    core: RefCell<SiteCore>,
    view: RefCell<View>,
    scroll_bound: Cell<bool>,
    timer: Cell<Option<i32>>,
    on_timer: OnceCell<Closure<dyn FnMut()>>,
}

impl Runtime {
    fn new() -> Result<Rc<Self>, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let config = read_config(&document);
        tracing::debug!(?config, "runtime created");
        Ok(Rc::new(Self {
            window,
            document,
            clock: SystemClock::new(),
            core: RefCell::new(SiteCore::new(config)),
            view: RefCell::new(View::default()),
            scroll_bound: Cell::new(false),
            timer: Cell::new(None),
            on_timer: OnceCell::new(),
        }))
    }

    fn now(&self) -> core::time::Duration {
        self.clock.now_mono()
    }

    fn config(&self) -> SiteConfig {
        self.core.borrow().config().clone()
    }

    fn body(&self) -> Result<HtmlElement, JsValue> {
        self.document.body().ok_or_else(|| "no body".into())
    }

    fn query_all<T: JsCast>(&self, selector: &str) -> Result<Vec<T>, JsValue> {
        let list = self.document.query_selector_all(selector)?;
        Ok((0..list.length())
            .filter_map(|idx| list.get(idx))
            .filter_map(|node| node.dyn_into::<T>().ok())
            .collect())
    }

    fn setup(self: &Rc<Self>) {
        for feature in Feature::ALL {
            if !self.core.borrow_mut().claim(feature) {
                continue;
            }
            let result = match feature {
                Feature::BurgerMenu => self.bind_burger(),
                Feature::DrawerNav => self.bind_drawer(),
                Feature::SmoothScroll => self.bind_smooth_scroll(),
                Feature::SectionSpy => self.bind_section_spy(),
                Feature::ActiveMenu => self.bind_active_menu(),
                Feature::Images => self.bind_images(),
                Feature::Forms => self.bind_forms(),
                Feature::Accordion => self.bind_accordion(),
                Feature::ScrollToTop => self.bind_scroll_to_top(),
                Feature::HeaderScroll => self.bind_header(),
            };
            if let Err(err) = result {
                tracing::warn!(feature = feature.label(), error = ?err, "feature setup failed");
                report(&format!("sitekit {} setup failed:", feature.label()), &err);
            }
        }
    }

    fn skip(feature: Feature) -> Result<(), JsValue> {
        tracing::debug!(feature = feature.label(), "elements missing, feature skipped");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Menus
    // -----------------------------------------------------------------------

    fn bind_burger(self: &Rc<Self>) -> Result<(), JsValue> {
        let toggle = self.document.query_selector(".navbar-toggler")?;
        let panel = self.document.query_selector(".navbar-collapse")?;
        let (Some(toggle), Some(panel)) = (toggle, panel) else {
            return Self::skip(Feature::BurgerMenu);
        };
        self.bind_menu(MenuKind::Burger, toggle, panel, ".nav-link")
    }

    fn bind_drawer(self: &Rc<Self>) -> Result<(), JsValue> {
        let Some(header) = self.document.query_selector(".dr-header")? else {
            return Self::skip(Feature::DrawerNav);
        };
        let toggle = header.query_selector(".dr-nav-toggle")?;
        let panel = header.query_selector("#dr-nav-menu")?;
        let (Some(toggle), Some(panel)) = (toggle, panel) else {
            return Self::skip(Feature::DrawerNav);
        };
        self.bind_menu(MenuKind::Drawer, toggle, panel, "a")
    }

    fn bind_menu(
        self: &Rc<Self>,
        kind: MenuKind,
        toggle: Element,
        panel: Element,
        link_selector: &'static str,
    ) -> Result<(), JsValue> {
        let behavior = {
            let mut core = self.core.borrow_mut();
            core.attach_menu(kind);
            core.menu_behavior(kind).copied()
        };
        let Some(behavior) = behavior else {
            return Ok(());
        };
        self.view.borrow_mut().menus.insert(
            kind,
            MenuElements {
                toggle: toggle.clone(),
                panel: panel.clone(),
            },
        );

        let rt = Rc::clone(self);
        listen(&toggle, "click", move |event| {
            if kind == MenuKind::Burger {
                event.prevent_default();
            }
            rt.menu_event(kind, MenuEvent::ToggleClick);
        })?;

        let rt = Rc::clone(self);
        let inner = panel.clone();
        listen(&panel, "click", move |event| {
            let link = event_element(&event)
                .and_then(|el| el.closest(link_selector).ok().flatten());
            if link.is_some_and(|link| inner.contains(Some(link.as_ref()))) {
                rt.menu_event(kind, MenuEvent::LinkClick);
            }
        })?;

        if behavior.close_on_escape {
            let rt = Rc::clone(self);
            listen(&self.document, "keydown", move |event| {
                let is_escape = event
                    .dyn_ref::<KeyboardEvent>()
                    .is_some_and(|key| key.key() == "Escape");
                if is_escape {
                    rt.menu_event(kind, MenuEvent::Escape);
                }
            })?;
        }

        if behavior.close_on_outside_click {
            let rt = Rc::clone(self);
            listen(&self.document, "click", move |event| {
                let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
                if !panel.contains(target.as_ref()) && !toggle.contains(target.as_ref()) {
                    rt.menu_event(kind, MenuEvent::OutsideClick);
                }
            })?;
        }

        if behavior.close_at_width.is_some() {
            let rt = Rc::clone(self);
            listen(&self.window, "resize", move |_| {
                let width = rt
                    .window
                    .inner_width()
                    .ok()
                    .and_then(|w| w.as_f64())
                    .unwrap_or(0.0);
                rt.core.borrow_mut().on_resize(rt.now(), width);
                rt.rearm();
            })?;
        }
        Ok(())
    }

    fn menu_event(self: &Rc<Self>, kind: MenuKind, event: MenuEvent) {
        let commands = self.core.borrow_mut().on_menu_event(kind, event);
        self.dispatch(commands);
    }

    fn apply_menu(&self, kind: MenuKind, effect: MenuEffect) -> Result<(), JsValue> {
        let Some(behavior) = self.core.borrow().menu_behavior(kind).copied() else {
            return Ok(());
        };
        let view = self.view.borrow();
        let Some(menu) = view.menus.get(&kind) else {
            return Ok(());
        };
        let open = effect.is_open();
        set_class(&menu.panel, behavior.open_class, open)?;
        if behavior.mark_toggle {
            set_class(&menu.toggle, behavior.open_class, open)?;
        }
        menu.toggle
            .set_attribute("aria-expanded", effect.aria_expanded())?;
        if let Some(lock) = behavior.body_lock_class {
            set_class(&self.body()?, lock, open)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    fn bind_smooth_scroll(self: &Rc<Self>) -> Result<(), JsValue> {
        let rt = Rc::clone(self);
        listen(&self.document, "click", move |event| {
            if let Err(err) = rt.on_anchor_click(&event) {
                tracing::warn!(error = ?err, "anchor navigation failed");
            }
        })
    }

    fn on_anchor_click(&self, event: &Event) -> Result<(), JsValue> {
        let Some(link) = event_element(event).and_then(|el| el.closest("a").ok().flatten()) else {
            return Ok(());
        };
        let Some(href) = link.get_attribute("href") else {
            return Ok(());
        };
        let path = self.window.location().pathname()?;
        let Some(jump) = anchor::resolve(&href, &path) else {
            return Ok(());
        };
        let Some(target) = self.document.get_element_by_id(jump.target_id) else {
            return Ok(());
        };
        event.prevent_default();
        let header = header_element(&self.document)
            .map_or(self.config().header_fallback_px, |h| f64::from(h.offset_height()));
        let top = anchor::scroll_offset(
            target.get_bounding_client_rect().top(),
            self.window.scroll_y()?,
            header,
        );
        tracing::debug!(target = jump.target_id, top, "smooth scroll");
        smooth_scroll_to(&self.window, top);
        self.window
            .history()?
            .push_state_with_url(&JsValue::NULL, "", Some(jump.hash))
    }

    fn bind_section_spy(self: &Rc<Self>) -> Result<(), JsValue> {
        let sections = self.query_all::<HtmlElement>("section[id]")?;
        let links = self.query_all::<Element>(".nav-link[href*=\"#\"]")?;
        let hrefs: Vec<String> = links
            .iter()
            .map(|link| link.get_attribute("href").unwrap_or_default())
            .collect();
        let ids: Vec<String> = sections.iter().map(|section| section.id()).collect();
        let Some(tracker) = SectionTracker::new(ids, &hrefs, &self.config()) else {
            return Self::skip(Feature::SectionSpy);
        };
        {
            let mut view = self.view.borrow_mut();
            view.sections = sections;
            view.spy_links = links;
        }
        let commands = {
            let view = self.view.borrow();
            let probe = DomLayout {
                window: &self.window,
                document: &self.document,
                sections: &view.sections,
            };
            self.core
                .borrow_mut()
                .attach_tracker(self.now(), tracker, &probe)
        };
        self.dispatch(commands);
        self.ensure_scroll_listener()
    }

    fn bind_active_menu(&self) -> Result<(), JsValue> {
        let path = self.window.location().pathname()?;
        for link in self.query_all::<Element>(".nav-link")? {
            let href = link.get_attribute("href").unwrap_or_default();
            if active_menu::link_matches_path(&href, &path) {
                link.set_attribute("aria-current", "page")?;
                link.class_list().add_1("is-active")?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Scroll-driven toggles
    // -----------------------------------------------------------------------

    fn ensure_scroll_listener(self: &Rc<Self>) -> Result<(), JsValue> {
        if self.scroll_bound.replace(true) {
            return Ok(());
        }
        let rt = Rc::clone(self);
        listen(&self.window, "scroll", move |_| rt.on_scroll())
    }

    fn on_scroll(self: &Rc<Self>) {
        let commands = {
            let view = self.view.borrow();
            let probe = DomLayout {
                window: &self.window,
                document: &self.document,
                sections: &view.sections,
            };
            self.core.borrow_mut().on_scroll(self.now(), &probe)
        };
        if !commands.is_empty() {
            self.dispatch(commands);
        }
    }

    fn bind_scroll_to_top(self: &Rc<Self>) -> Result<(), JsValue> {
        let button = self
            .document
            .create_element("button")?
            .dyn_into::<HtmlElement>()?;
        button.set_class_name("btn btn-primary");
        button.set_attribute("aria-label", SCROLL_TOP_LABEL)?;
        button.set_text_content(Some(SCROLL_TOP_GLYPH));
        button.style().set_css_text(SCROLL_TOP_STYLE);
        self.body()?.append_child(&button)?;

        let window = self.window.clone();
        listen(&button, "click", move |_| smooth_scroll_to(&window, 0.0))?;

        self.view.borrow_mut().scroll_top = Some(button);
        self.core.borrow_mut().attach_scroll_top();
        self.ensure_scroll_listener()
    }

    fn bind_header(self: &Rc<Self>) -> Result<(), JsValue> {
        let Some(header) = self.document.query_selector(HEADER_SELECTOR)? else {
            return Self::skip(Feature::HeaderScroll);
        };
        self.view.borrow_mut().header = Some(header);
        let scroll_y = self.window.scroll_y()?;
        let commands = self.core.borrow_mut().attach_header(self.now(), scroll_y);
        self.dispatch(commands);
        self.ensure_scroll_listener()
    }

    // -----------------------------------------------------------------------
    // Content widgets
    // -----------------------------------------------------------------------

    fn bind_images(&self) -> Result<(), JsValue> {
        let placeholder = Rc::new(images::placeholder_data_uri());
        for image in self.query_all::<HtmlImageElement>("img")? {
            let is_logo = image.closest(".navbar-brand")?.is_some();
            if images::should_lazy_load(
                image.has_attribute("loading"),
                is_logo,
                image.has_attribute("data-critical"),
            ) {
                image.set_attribute("loading", "lazy")?;
            }
            let placeholder = Rc::clone(&placeholder);
            let target = image.clone();
            listen(&image, "error", move |_| target.set_src(&placeholder))?;
        }
        Ok(())
    }

    fn bind_accordion(self: &Rc<Self>) -> Result<(), JsValue> {
        for button in self.query_all::<Element>(".accordion-button")? {
            let rt = Rc::clone(self);
            let target = button.clone();
            listen(&button, "click", move |event| {
                event.prevent_default();
                if let Err(err) = rt.toggle_accordion(&target) {
                    tracing::warn!(error = ?err, "accordion toggle failed");
                }
            })?;
        }
        Ok(())
    }

    fn toggle_accordion(&self, button: &Element) -> Result<(), JsValue> {
        let target = button.get_attribute("data-bs-target");
        let expanded = button.get_attribute("aria-expanded");
        let Some(toggle) = accordion::on_click(target.as_deref(), expanded.as_deref()) else {
            return Ok(());
        };
        let Some(panel) = self.document.query_selector(toggle.target)? else {
            return Ok(());
        };
        button.set_attribute("aria-expanded", toggle.aria_expanded())?;
        set_class(button, "collapsed", !toggle.expand)?;
        set_class(&panel, "show", toggle.expand)
    }

    // -----------------------------------------------------------------------
    // Forms
    // -----------------------------------------------------------------------

    fn bind_forms(self: &Rc<Self>) -> Result<(), JsValue> {
        for kind in FormKind::ALL {
            let Some(form) = self.document.get_element_by_id(kind.spec().form_id) else {
                continue;
            };
            self.core.borrow_mut().attach_form(kind);
            let rt = Rc::clone(self);
            listen(&form, "submit", move |event| {
                event.prevent_default();
                event.stop_propagation();
                if let Err(err) = rt.submit(kind) {
                    tracing::warn!(?kind, error = ?err, "form submit failed");
                }
            })?;
        }
        Ok(())
    }

    fn field_value(&self, field: &FieldSpec) -> FieldValue {
        let Some(element) = self.document.get_element_by_id(field.element_id) else {
            return FieldValue::Missing;
        };
        if field.rule == FieldRule::Consent {
            return element
                .dyn_ref::<HtmlInputElement>()
                .map_or(FieldValue::Missing, |input| FieldValue::Checked(input.checked()));
        }
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            FieldValue::Text(input.value())
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            FieldValue::Text(area.value())
        } else {
            FieldValue::Missing
        }
    }

    fn submit(self: &Rc<Self>, kind: FormKind) -> Result<(), JsValue> {
        let spec = kind.spec();
        let Some(form) = self.document.get_element_by_id(spec.form_id) else {
            return Ok(());
        };
        let values: Vec<FieldValue> = spec.fields.iter().map(|f| self.field_value(f)).collect();
        let has_submit_control = form.query_selector(SUBMIT_SELECTOR)?.is_some();
        let commands =
            self.core
                .borrow_mut()
                .on_submit(self.now(), kind, &values, has_submit_control);
        self.dispatch(commands);
        Ok(())
    }

    fn apply_form(&self, kind: FormKind, effect: FormEffect) -> Result<(), JsValue> {
        let spec = kind.spec();
        let Some(form) = self.document.get_element_by_id(spec.form_id) else {
            return Ok(());
        };
        let field_element = |idx: usize| {
            spec.fields
                .get(idx)
                .and_then(|field| self.document.get_element_by_id(field.element_id))
        };
        match effect {
            FormEffect::MarkInvalid {
                field,
                feedback,
                slot,
            } => {
                let Some(element) = field_element(field) else {
                    return Ok(());
                };
                element.class_list().add_1("is-invalid")?;
                if let Some(text) = feedback
                    && let Some(target) = feedback_element(&element, slot)?
                {
                    target.set_text_content(Some(text));
                }
            }
            FormEffect::ClearInvalid { field } => {
                if let Some(element) = field_element(field) {
                    element.class_list().remove_1("is-invalid")?;
                }
            }
            FormEffect::MarkValidated => form.class_list().add_1("was-validated")?,
            FormEffect::BeginSubmitting => {
                if let Some(control) = form.query_selector(SUBMIT_SELECTOR)? {
                    let label = control.inner_html();
                    control.set_attribute("disabled", "")?;
                    control.set_inner_html(&format!("{SPINNER_HTML}{SUBMITTING_LABEL}"));
                    self.view.borrow_mut().submitting.insert(
                        kind,
                        SubmitControl {
                            element: control,
                            label,
                        },
                    );
                }
            }
            FormEffect::EndSubmitting => {
                let control = self.view.borrow_mut().submitting.remove(&kind);
                if let Some(control) = control {
                    control.element.remove_attribute("disabled")?;
                    control.element.set_inner_html(&control.label);
                }
            }
            FormEffect::Reset => {
                if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
                    form.reset();
                }
                form.class_list().remove_1("was-validated")?;
            }
            FormEffect::Navigate { url } => self.window.location().set_href(&url)?,
            // Routed into toasts by `SiteCore`.
            FormEffect::Notify { .. } => {}
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Toasts
    // -----------------------------------------------------------------------

    fn dismiss_toast(self: &Rc<Self>, id: ToastId) {
        let commands = self.core.borrow_mut().dismiss_toast(self.now(), id);
        self.dispatch(commands);
    }

    fn toast_container(&self) -> Result<Element, JsValue> {
        if let Some(container) = self.view.borrow().toast_container.clone() {
            return Ok(container);
        }
        let container = match self.document.get_element_by_id(CONTAINER_ID) {
            Some(existing) => existing,
            None => {
                let container = self.document.create_element("div")?;
                container.set_id(CONTAINER_ID);
                container.set_attribute("role", "region")?;
                container.set_attribute("aria-live", "polite")?;
                container.set_attribute("aria-atomic", "true")?;
                self.body()?.append_child(&container)?;
                container
            }
        };
        self.view.borrow_mut().toast_container = Some(container.clone());
        Ok(container)
    }

    fn apply_toast(self: &Rc<Self>, effect: ToastEffect) -> Result<(), JsValue> {
        match effect {
            ToastEffect::EnsureContainer => {
                self.toast_container()?;
            }
            ToastEffect::Insert { id, message, level } => {
                let toast = self.document.create_element("div")?;
                toast.set_class_name(&level.class_name());
                toast.set_attribute("role", "alert")?;
                toast.set_text_content(Some(&message));

                let close = self.document.create_element("button")?;
                close.set_attribute("type", "button")?;
                close.set_class_name("btn-close");
                close.set_attribute("aria-label", CLOSE_LABEL)?;
                toast.append_child(&close)?;
                self.toast_container()?.append_child(&toast)?;

                let rt = Rc::clone(self);
                listen(&close, "click", move |_| rt.dismiss_toast(id))?;
                self.view.borrow_mut().toasts.insert(id, toast);
            }
            ToastEffect::Hide { id } => {
                if let Some(toast) = self.view.borrow().toasts.get(&id) {
                    toast.class_list().remove_1("show")?;
                }
            }
            ToastEffect::Remove { id } => {
                let toast = self.view.borrow_mut().toasts.remove(&id);
                if let Some(toast) = toast {
                    toast.remove();
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Command application + timer
    // -----------------------------------------------------------------------

    fn dispatch(self: &Rc<Self>, commands: Vec<SiteCommand>) {
        for command in commands {
            if let Err(err) = self.apply(command) {
                tracing::warn!(error = ?err, "command failed");
            }
        }
        self.rearm();
    }

    fn apply(self: &Rc<Self>, command: SiteCommand) -> Result<(), JsValue> {
        match command {
            SiteCommand::Menu { kind, effect } => self.apply_menu(kind, effect),
            SiteCommand::SpyLinks(active) => {
                let view = self.view.borrow();
                for (link, active) in view.spy_links.iter().zip(active) {
                    set_class(link, "is-active", active)?;
                    if active {
                        link.set_attribute("aria-current", "page")?;
                    } else {
                        link.remove_attribute("aria-current")?;
                    }
                }
                Ok(())
            }
            SiteCommand::ScrollTopVisible(visible) => {
                if let Some(button) = self.view.borrow().scroll_top.as_ref() {
                    let display = if visible { "flex" } else { "none" };
                    button.style().set_property("display", display)?;
                }
                Ok(())
            }
            SiteCommand::HeaderScrolled(scrolled) => match self.view.borrow().header.as_ref() {
                Some(header) => set_class(header, "is-scrolled", scrolled),
                None => Ok(()),
            },
            SiteCommand::Form { kind, effect } => self.apply_form(kind, effect),
            SiteCommand::Toast(effect) => self.apply_toast(effect),
        }
    }

    /// Keep exactly one `setTimeout` armed at the core's earliest deadline.
    fn rearm(self: &Rc<Self>) {
        if let Some(handle) = self.timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let Some(deadline) = self.core.borrow().next_deadline() else {
            return;
        };
        let delay = deadline.saturating_sub(self.now());
        let delay_ms = i32::try_from(delay.as_micros().div_ceil(1000)).unwrap_or(i32::MAX);
        let callback = self.on_timer.get_or_init(|| {
            let rt = Rc::clone(self);
            Closure::<dyn FnMut()>::wrap(Box::new(move || rt.on_timer()))
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms,
            ) {
            Ok(handle) => self.timer.set(Some(handle)),
            Err(err) => tracing::warn!(error = ?err, "failed to arm timer"),
        }
    }

    fn on_timer(self: &Rc<Self>) {
        self.timer.set(None);
        let commands = self.core.borrow_mut().advance(self.now());
        self.dispatch(commands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    wasm_bindgen_test_configure!(run_in_browser);

    /// Mount `html` at the top of the body and bind a fresh runtime to it.
    ///
    /// Each runtime owns its own init flags, so the page-wide runtime (and the
    /// other tests) never claim the fixture's features first.
    fn mount(html: &str) -> (Rc<Runtime>, Element) {
        let runtime = Runtime::new().expect("runtime");
        let host = runtime.document.create_element("div").expect("host");
        host.set_inner_html(html);
        let body = runtime.body().expect("body");
        body.insert_before(&host, body.first_child().as_ref()).expect("mounted");
        runtime.setup();
        (runtime, host)
    }

    fn by_id(runtime: &Runtime, id: &str) -> Element {
        runtime.document.get_element_by_id(id).expect("fixture element")
    }

    fn submit(form: &Element) {
        let event = Event::new("submit").expect("event");
        form.dispatch_event(&event).expect("dispatched");
    }

    const CONTACT_FIXTURE: &str = r#"
        <form id="contactForm" novalidate>
          <input id="firstName" value="Jana"><div class="invalid-feedback"></div>
          <input id="lastName" value="N"><small id="lastNameHint">hint</small>
          <input id="email" value="jana@firma.sk"><div class="invalid-feedback"></div>
          <input id="phone" value="+421 900 123 456"><div class="invalid-feedback"></div>
          <textarea id="message">krátka</textarea><div class="invalid-feedback"></div>
          <div class="form-check">
            <input type="checkbox" id="privacyConsent">
            <label for="privacyConsent">Súhlas</label>
            <div class="invalid-feedback" id="consentFeedback"></div>
          </div>
          <button type="submit" id="contactSubmit">Odoslať</button>
        </form>
    "#;

    #[wasm_bindgen_test]
    fn invalid_contact_submit_marks_fields_in_the_page() {
        let (runtime, host) = mount(CONTACT_FIXTURE);
        submit(&by_id(&runtime, "contactForm"));

        let message = by_id(&runtime, "message");
        assert!(message.class_list().contains("is-invalid"));
        let feedback = message.next_element_sibling().expect("feedback sibling");
        assert_eq!(
            feedback.text_content().as_deref(),
            Some("Správa musí obsahovať aspoň 10 znakov.")
        );

        // Checkbox feedback is looked up through the parent.
        assert!(by_id(&runtime, "privacyConsent").class_list().contains("is-invalid"));
        assert_eq!(
            by_id(&runtime, "consentFeedback").text_content().as_deref(),
            Some("Musíte súhlasiť so spracovaním údajov.")
        );

        // A sibling without `invalid-feedback` is left alone.
        assert!(by_id(&runtime, "lastName").class_list().contains("is-invalid"));
        assert_eq!(by_id(&runtime, "lastNameHint").text_content().as_deref(), Some("hint"));

        assert!(!by_id(&runtime, "firstName").class_list().contains("is-invalid"));
        assert!(by_id(&runtime, "contactForm").class_list().contains("was-validated"));
        assert!(!by_id(&runtime, "contactSubmit").has_attribute("disabled"));
        host.remove();
    }

    #[wasm_bindgen_test]
    fn valid_newsletter_submit_disables_control_until_done() {
        let (runtime, host) = mount(
            r#"
            <form id="newsletter-form">
              <input id="newsletter-email" value="jana@firma.sk">
              <div><input type="checkbox" id="newsletter-consent" checked></div>
              <button type="submit" id="newsletterSubmit">Prihlásiť</button>
            </form>
            "#,
        );
        let form = by_id(&runtime, "newsletter-form");
        submit(&form);

        let control = by_id(&runtime, "newsletterSubmit");
        assert!(control.has_attribute("disabled"));
        assert!(control.inner_html().contains("spinner-border"));
        assert!(control.inner_html().ends_with(SUBMITTING_LABEL));
        assert!(form.class_list().contains("was-validated"));

        runtime.dispatch(vec![
            SiteCommand::Form {
                kind: FormKind::Newsletter,
                effect: FormEffect::EndSubmitting,
            },
            SiteCommand::Form {
                kind: FormKind::Newsletter,
                effect: FormEffect::Reset,
            },
        ]);
        assert!(!control.has_attribute("disabled"));
        assert_eq!(control.inner_html(), "Prihlásiť");
        assert!(!form.class_list().contains("was-validated"));
        host.remove();
    }

    #[wasm_bindgen_test]
    fn section_spy_marks_link_of_section_in_view() {
        let (runtime, host) = mount(
            r##"
            <nav>
              <a class="nav-link" id="spyFirstLink" href="#spy-first">Prvá</a>
              <a class="nav-link" id="spySecondLink" href="#spy-second">Druhá</a>
            </nav>
            <section id="spy-first" style="height: 10px"></section>
            <section id="spy-second" style="margin-top: 20000px; height: 10px"></section>
            "##,
        );

        let first = by_id(&runtime, "spyFirstLink");
        let second = by_id(&runtime, "spySecondLink");
        assert_eq!(first.get_attribute("aria-current").as_deref(), Some("page"));
        assert!(first.class_list().contains("is-active"));
        assert_eq!(second.get_attribute("aria-current"), None);
        assert!(!second.class_list().contains("is-active"));

        runtime.dispatch(vec![SiteCommand::SpyLinks(vec![false, true])]);
        assert_eq!(first.get_attribute("aria-current"), None);
        assert_eq!(second.get_attribute("aria-current").as_deref(), Some("page"));
        host.remove();
    }
}
