#![forbid(unsafe_code)]

//! In-page anchor navigation.
//!
//! A link click is intercepted only when its fragment points into the page the
//! user is already on. The host then checks the target exists, scrolls to
//! [`scroll_offset`] and pushes [`AnchorJump::hash`] onto history.

/// A same-page jump resolved from an `href`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorJump<'a> {
    /// Fragment including the leading `#`, as pushed to history.
    pub hash: &'a str,
    /// Element id to scroll to.
    pub target_id: &'a str,
}

/// Resolve `href` against `current_path` (the document's `location.pathname`).
///
/// Returns `None` when the link has no fragment, an empty (`#`) or hash-bang
/// (`#!`) fragment, or points at another page.
#[must_use]
pub fn resolve<'a>(href: &'a str, current_path: &str) -> Option<AnchorJump<'a>> {
    let hash_at = href.find('#')?;
    let (path, hash) = href.split_at(hash_at);
    if hash == "#" || hash == "#!" {
        return None;
    }
    if !is_current_page(path, current_path) {
        return None;
    }
    Some(AnchorJump {
        hash,
        target_id: &hash[1..],
    })
}

/// Whether the path part of a link refers to the current document.
#[must_use]
pub fn is_current_page(path: &str, current_path: &str) -> bool {
    path.is_empty()
        || current_path.ends_with(path)
        || (path == "/" && (current_path == "/" || current_path.ends_with("index.html")))
}

/// Document-relative scroll target for an element whose bounding-box top is
/// `element_top` in viewport coordinates.
#[must_use]
pub fn scroll_offset(element_top: f64, scroll_y: f64, header_height: f64) -> f64 {
    element_top + scroll_y - header_height
}
