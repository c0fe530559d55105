#![forbid(unsafe_code)]

//! Core: deterministic interaction logic for the sitekit brochure-site runtime.
//!
//! # Role in sitekit
//! `sitekit-core` owns every decision the page scripts make: when a scroll
//! tick is admitted, which section is in view, whether a form field is valid,
//! when a toast disappears. It never touches the DOM. Controllers take the
//! current monotonic time explicitly and hand back small effect values that the
//! binding layer (`sitekit-web`) applies to real elements.
//!
//! # Design goals
//! - **Host-driven time**: every time-dependent call receives `now` as a
//!   [`Duration`](core::time::Duration) from a [`clock::MonoClock`].
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//! - **Full recompute**: derived state (active link, validity markup) is
//!   recomputed from a fresh snapshot on every admitted event.
//! - **One submission per form**: a form whose simulated submission is still
//!   pending ignores further submits. The binding layer also disables the
//!   submit control, but the core does not rely on that.
//!
//! # Modules
//! - [`rate_limit`]: leading-edge throttle and trailing debounce.
//! - [`timer`]: ordered one-shot timer queue used by the delayed flows.
//! - [`section_tracker`]: scroll-position section tracking for nav links.
//! - [`validation`] / [`form`]: field rules and the simulated submission flow.
//! - [`notify`]: transient toast lifecycle.
//! - [`menu`], [`accordion`], [`scroll_ui`], [`anchor`], [`active_menu`],
//!   [`images`]: the small widget policies.
//! - [`init`], [`config`], [`error`]: once-only setup flags, tunables, errors.

pub mod accordion;
pub mod active_menu;
pub mod anchor;
pub mod clock;
pub mod config;
pub mod error;
pub mod form;
pub mod images;
pub mod init;
pub mod menu;
pub mod notify;
pub mod rate_limit;
pub mod scroll_ui;
pub mod section_tracker;
pub mod timer;
pub mod validation;

pub use clock::{ManualClock, MonoClock, SystemClock};
pub use config::SiteConfig;
pub use error::{Result, SiteError};
pub use init::{Feature, InitState};
