#![forbid(unsafe_code)]

//! Image loading hints and the broken-image placeholder.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Grey 100x100 tile labelled "Image".
pub const PLACEHOLDER_SVG: &str = concat!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100">"##,
    r##"<rect fill="#e9ecef" width="100" height="100"/>"##,
    r##"<text x="50" y="50" font-family="Arial" font-size="14" fill="#6c757d" "##,
    r##"text-anchor="middle" dy=".3em">Image</text></svg>"##,
);

/// Whether an `img` should be given `loading="lazy"`.
///
/// Images with an explicit `loading` attribute, the brand logo and images
/// flagged `data-critical` are left alone.
#[must_use]
pub const fn should_lazy_load(has_loading_attr: bool, is_logo: bool, is_critical: bool) -> bool {
    !has_loading_attr && !is_logo && !is_critical
}

/// `src` swapped in when an image fails to load.
#[must_use]
pub fn placeholder_data_uri() -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(PLACEHOLDER_SVG))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_loading_skips_logo_critical_and_explicit() {
        assert!(should_lazy_load(false, false, false));
        assert!(!should_lazy_load(true, false, false));
        assert!(!should_lazy_load(false, true, false));
        assert!(!should_lazy_load(false, false, true));
    }

    #[test]
    fn placeholder_decodes_to_svg() {
        let uri = placeholder_data_uri();
        let payload = uri
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("data uri prefix");
        let decoded = STANDARD.decode(payload).expect("valid base64");
        let svg = String::from_utf8(decoded).expect("utf8");
        assert_eq!(svg, PLACEHOLDER_SVG);
        assert!(svg.contains(">Image</text>"));
    }
}
