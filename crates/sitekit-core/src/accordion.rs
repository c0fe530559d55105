#![forbid(unsafe_code)]

//! Accordion toggles.
//!
//! Stateless: the button's current `aria-expanded` attribute is the state, so a
//! click is a pure function of the attributes read at click time.

/// Resolved click on an `.accordion-button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccordionToggle<'a> {
    /// Selector of the collapsible panel (`data-bs-target`).
    pub target: &'a str,
    /// Whether the panel should end up expanded.
    pub expand: bool,
}

impl AccordionToggle<'_> {
    /// Value to write back to `aria-expanded`.
    #[must_use]
    pub const fn aria_expanded(&self) -> &'static str {
        if self.expand { "true" } else { "false" }
    }
}

/// Decide what a click does, or `None` when the button names no target.
#[must_use]
pub fn on_click<'a>(
    target_attr: Option<&'a str>,
    aria_expanded: Option<&str>,
) -> Option<AccordionToggle<'a>> {
    let target = target_attr.filter(|t| !t.is_empty())?;
    Some(AccordionToggle {
        target,
        expand: aria_expanded != Some("true"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_button_collapses() {
        let toggle = on_click(Some("#faq-1"), Some("true")).expect("target present");
        assert_eq!(toggle.target, "#faq-1");
        assert!(!toggle.expand);
        assert_eq!(toggle.aria_expanded(), "false");
    }

    #[test]
    fn collapsed_or_unset_button_expands() {
        assert!(on_click(Some("#faq-2"), Some("false")).is_some_and(|t| t.expand));
        assert!(on_click(Some("#faq-2"), None).is_some_and(|t| t.expand));
    }

    #[test]
    fn missing_target_is_a_no_op() {
        assert_eq!(on_click(None, Some("true")), None);
        assert_eq!(on_click(Some(""), Some("false")), None);
    }
}
