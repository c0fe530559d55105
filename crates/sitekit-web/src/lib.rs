#![forbid(unsafe_code)]

//! Browser bindings for sitekit.
//!
//! [`SiteCore`] is the composition root: it owns the once-only init flags and
//! every controller from `sitekit-core`, turns page events into
//! [`SiteCommand`]s and merges all pending timers into a single deadline. It is
//! plain Rust and tested natively.
//!
//! On `wasm32` the `wasm` module resolves elements with `web-sys`, registers
//! listeners, applies commands to the DOM and keeps one `setTimeout` armed at
//! [`SiteCore::next_deadline`]. The entry point runs automatically on module
//! start; [`init`] re-runs setup, which the init flags make idempotent.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{init, notify};

pub mod site_core;

pub use site_core::{MenuKind, SiteCommand, SiteCore};
