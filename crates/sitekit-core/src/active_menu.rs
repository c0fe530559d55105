#![forbid(unsafe_code)]

//! Marking the navigation link of the current page.

/// Whether a page path looks like a site index.
#[must_use]
pub fn is_index_like(path: &str) -> bool {
    path == "/" || path == "/index.html" || path.ends_with("/index.html")
}

/// Whether a nav link `href` denotes `current_path`.
///
/// Empty and fragment-only hrefs never match; those belong to the section
/// tracker.
#[must_use]
pub fn link_matches_path(href: &str, current_path: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return false;
    }
    if is_index_like(href) {
        return is_index_like(current_path);
    }
    if href.starts_with('/') {
        current_path == href
    } else {
        current_path
            .strip_suffix(href)
            .is_some_and(|head| head.ends_with('/'))
    }
}
