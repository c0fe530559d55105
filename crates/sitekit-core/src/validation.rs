#![forbid(unsafe_code)]

//! Field validation rules for the site forms.
//!
//! Every text rule trims the value first; an empty trimmed value always fails.
//! "Whitespace" is the browser's `\s` set (Unicode spaces, line terminators and
//! U+FEFF), and lengths are counted in UTF-16 code units as page scripts see
//! them.
//!
//! | Rule | Accepts |
//! |------|---------|
//! | [`FieldRule::PersonName`] | 2-50 letters (incl. Latin-1 accented), spaces, `-`, `'` |
//! | [`FieldRule::Email`] | `local@domain.tld`, no whitespace or extra `@` |
//! | [`FieldRule::Phone`] | 10-20 of digits, `+`, spaces, `(`, `)`, `-` |
//! | [`FieldRule::Message`] | at least 10 UTF-16 code units |
//! | [`FieldRule::Consent`] | a checked checkbox |

use std::sync::LazyLock;

use regex_lite::Regex;

/// Class body matching the same code points as `\s` in browser regexes.
///
/// regex-lite's `\s` is ASCII-only, so the set is spelled out.
const SPACE_CLASS: &str = concat!(
    r"\t\n\x0B\x0C\r\x20\xA0\x{1680}\x{2000}-\x{200A}",
    r"\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}",
);

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[a-zA-ZÀ-ÿ{SPACE_CLASS}\-']{{2,50}}$")).expect("name regex")
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let part = format!("[^{SPACE_CLASS}@]+");
    Regex::new(&format!(r"^{part}@{part}\.{part}$")).expect("email regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[\+\d{SPACE_CLASS}\(\)\-]{{10,20}}$")).expect("phone regex")
});

pub const MESSAGE_MIN_UNITS: usize = 10;

/// Whether `c` is in the browser's whitespace set (`\s`, `String.prototype.trim`).
#[must_use]
pub const fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Trim leading and trailing browser whitespace.
#[must_use]
pub fn js_trim(raw: &str) -> &str {
    raw.trim_matches(is_js_whitespace)
}

/// Snapshot of one form control's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text-like control (`input`, `textarea`).
    Text(String),
    /// Checkbox state.
    Checked(bool),
    /// The control is not present in the page.
    Missing,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    PersonName,
    Email,
    Phone,
    Message,
    Consent,
}

impl FieldRule {
    /// Evaluate the rule against a snapshot. Missing controls always fail.
    #[must_use]
    pub fn check(self, value: &FieldValue) -> bool {
        match (self, value) {
            (_, FieldValue::Missing) => false,
            (Self::Consent, FieldValue::Checked(checked)) => *checked,
            (Self::Consent, FieldValue::Text(_)) => false,
            (rule, FieldValue::Text(text)) => rule.check_text(text),
            (_, FieldValue::Checked(_)) => false,
        }
    }

    fn check_text(self, raw: &str) -> bool {
        match self {
            Self::PersonName => is_valid_name(raw),
            Self::Email => is_valid_email(raw),
            Self::Phone => is_valid_phone(raw),
            Self::Message => is_valid_message(raw),
            Self::Consent => false,
        }
    }
}

#[must_use]
pub fn is_valid_name(raw: &str) -> bool {
    let value = js_trim(raw);
    !value.is_empty() && NAME_RE.is_match(value)
}

#[must_use]
pub fn is_valid_email(raw: &str) -> bool {
    let value = js_trim(raw);
    !value.is_empty() && EMAIL_RE.is_match(value)
}

#[must_use]
pub fn is_valid_phone(raw: &str) -> bool {
    let value = js_trim(raw);
    !value.is_empty() && PHONE_RE.is_match(value)
}

#[must_use]
pub fn is_valid_message(raw: &str) -> bool {
    js_trim(raw).encode_utf16().count() >= MESSAGE_MIN_UNITS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("  jana.novakova@firma.sk "));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn name_lengths_and_alphabet() {
        assert!(is_valid_name("Jo"));
        assert!(!is_valid_name("J"));
        assert!(!is_valid_name("John123"));
        assert!(is_valid_name("Renée Müller"));
        // Latin Extended-A letters sit outside the accepted range.
        assert!(!is_valid_name("Ľubomír"));
        assert!(is_valid_name("Anne-Marie O'Neil"));
        assert!(is_valid_name(" Jo "));
        assert!(!is_valid_name(&"a".repeat(51)));
        assert!(is_valid_name(&"a".repeat(50)));
        assert!(!is_valid_name("   "));
    }

    #[test]
    fn phone_alphabet_and_length() {
        assert!(is_valid_phone("+421 900 123 456"));
        assert!(is_valid_phone("(02) 123-45678"));
        assert!(!is_valid_phone("123456789"));
        assert!(!is_valid_phone("+421 900 abc 456"));
        assert!(!is_valid_phone(&"1".repeat(21)));
    }

    #[test]
    fn message_minimum_after_trim() {
        assert!(is_valid_message("Dobrý deň!"));
        assert!(!is_valid_message("   short   "));
        assert!(!is_valid_message(""));
    }

    #[test]
    fn consent_requires_checked_checkbox() {
        assert!(FieldRule::Consent.check(&FieldValue::Checked(true)));
        assert!(!FieldRule::Consent.check(&FieldValue::Checked(false)));
        assert!(!FieldRule::Consent.check(&FieldValue::Missing));
        assert!(!FieldRule::Consent.check(&FieldValue::text("on")));
    }

    #[test]
    fn missing_controls_fail_every_rule() {
        for rule in [
            FieldRule::PersonName,
            FieldRule::Email,
            FieldRule::Phone,
            FieldRule::Message,
        ] {
            assert!(!rule.check(&FieldValue::Missing));
        }
    }

    #[test]
    fn non_breaking_space_counts_as_whitespace() {
        assert!(!is_valid_email("a\u{a0}b@c.com"));
        assert!(!is_valid_email("a@b.c\u{3000}om"));
        assert!(is_valid_name("Jo\u{a0}Ann"));
        assert!(is_valid_phone("0900\u{a0}123\u{a0}456"));
        assert!(is_valid_email("\u{feff}a@b.com\u{a0}"));
        // U+0085 is Unicode whitespace but not part of `\s`.
        assert!(!is_valid_name("Jo\u{85}"));
    }

    #[test]
    fn message_length_counts_utf16_units() {
        // Five astral code points are ten UTF-16 units.
        assert!(is_valid_message("😀😀😀😀😀"));
        assert!(!is_valid_message("😀😀😀😀"));
        assert!(!is_valid_message("\u{a0}krátka\u{3000}"));
    }
}
