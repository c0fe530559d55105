#![forbid(unsafe_code)]

//! Form validation and simulated submission.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ submit ┌────────────┐ any field fails ┌─────────┐
//! │ Idle │───────▶│ Validating │────────────────▶│ Invalid │──┐
//! └──────┘        └────────────┘                 └─────────┘  │ submit
//!    ▲                  │ all fields pass                     │
//!    │                  ▼                                     ▼
//!    │           ┌────────────┐ submit delay ┌─────────┐  Validating
//!    │           │ Submitting │─────────────▶│ Success │
//!    │           └────────────┘              └─────────┘
//!    └── valid, but the form has no submit control
//! ```
//!
//! Validation never short-circuits: every field is checked and marked, and only
//! the first failing field's summary message is surfaced as a notification.
//! The submission itself is simulated: a fixed delay that always succeeds.
//! While submitting, [`FormController::submit`] returns no effects, even if the
//! host forgot to disable the submit control. Nothing here can abort an
//! in-flight submission.

use core::time::Duration;

use crate::config::SiteConfig;
use crate::notify::NotifyLevel;
use crate::timer::TimerQueue;
use crate::validation::{FieldRule, FieldValue};

/// Label shown next to the spinner while a submission is in flight.
pub const SUBMITTING_LABEL: &str = "Odosielanie...";

// ---------------------------------------------------------------------------
// Form schemas
// ---------------------------------------------------------------------------

/// Where a field's inline feedback text lives relative to the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackSlot {
    /// The next sibling element, if it carries `invalid-feedback`.
    NextSibling,
    /// The first `.invalid-feedback` inside the control's parent.
    ParentQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub element_id: &'static str,
    pub rule: FieldRule,
    /// Inline feedback text written on failure, if the form uses it.
    pub feedback: Option<&'static str>,
    pub slot: FeedbackSlot,
    /// Message surfaced in the notification when this is the first failure.
    pub summary: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Contact,
    Newsletter,
}

impl FormKind {
    pub const ALL: [Self; 2] = [Self::Contact, Self::Newsletter];

    #[must_use]
    pub fn spec(self) -> &'static FormSpec {
        match self {
            Self::Contact => &CONTACT_FORM,
            Self::Newsletter => &NEWSLETTER_FORM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSpec {
    pub kind: FormKind,
    pub form_id: &'static str,
    pub fields: &'static [FieldSpec],
    pub success_message: &'static str,
    /// Navigate to the confirmation page after success.
    pub redirect_on_success: bool,
}

pub static CONTACT_FORM: FormSpec = FormSpec {
    kind: FormKind::Contact,
    form_id: "contactForm",
    fields: &[
        FieldSpec {
            element_id: "firstName",
            rule: FieldRule::PersonName,
            feedback: Some("Meno musí obsahovať 2-50 písmen."),
            slot: FeedbackSlot::NextSibling,
            summary: "Meno je povinné.",
        },
        FieldSpec {
            element_id: "lastName",
            rule: FieldRule::PersonName,
            feedback: Some("Priezvisko musí obsahovať 2-50 písmen."),
            slot: FeedbackSlot::NextSibling,
            summary: "Priezvisko je povinné.",
        },
        FieldSpec {
            element_id: "email",
            rule: FieldRule::Email,
            feedback: Some("Zadajte platnú e-mailovú adresu."),
            slot: FeedbackSlot::NextSibling,
            summary: "E-mail je povinný a musí byť platný.",
        },
        FieldSpec {
            element_id: "phone",
            rule: FieldRule::Phone,
            feedback: Some(
                "Telefón musí obsahovať 10-20 znakov (číslice, +, -, medzery, zátvorky).",
            ),
            slot: FeedbackSlot::NextSibling,
            summary: "Telefón je povinný.",
        },
        FieldSpec {
            element_id: "message",
            rule: FieldRule::Message,
            feedback: Some("Správa musí obsahovať aspoň 10 znakov."),
            slot: FeedbackSlot::NextSibling,
            summary: "Správa je povinná (min. 10 znakov).",
        },
        FieldSpec {
            element_id: "privacyConsent",
            rule: FieldRule::Consent,
            feedback: Some("Musíte súhlasiť so spracovaním údajov."),
            slot: FeedbackSlot::ParentQuery,
            summary: "Súhlas je povinný.",
        },
    ],
    success_message: "Formulár bol úspešne odoslaný!",
    redirect_on_success: true,
};

pub static NEWSLETTER_FORM: FormSpec = FormSpec {
    kind: FormKind::Newsletter,
    form_id: "newsletter-form",
    fields: &[
        FieldSpec {
            element_id: "newsletter-email",
            rule: FieldRule::Email,
            feedback: None,
            slot: FeedbackSlot::NextSibling,
            summary: "Zadajte platnú e-mailovú adresu.",
        },
        FieldSpec {
            element_id: "newsletter-consent",
            rule: FieldRule::Consent,
            feedback: None,
            slot: FeedbackSlot::ParentQuery,
            summary: "Musíte súhlasiť so spracovaním údajov.",
        },
    ],
    success_message: "Prihlásenie do newslettera bolo úspešné!",
    redirect_on_success: false,
};

// ---------------------------------------------------------------------------
// Validation pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Per-field outcome, in schema order.
    pub valid: Vec<bool>,
    /// Summary message of the first failing field.
    pub first_error: Option<&'static str>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.first_error.is_none()
    }
}

/// Check every field of `spec` against `values` (schema order).
///
/// Values beyond the end of the slice count as [`FieldValue::Missing`].
#[must_use]
pub fn validate(spec: &FormSpec, values: &[FieldValue]) -> ValidationReport {
    let mut first_error = None;
    let valid = spec
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let ok = values.get(idx).is_some_and(|value| field.rule.check(value));
            if !ok && first_error.is_none() {
                first_error = Some(field.summary);
            }
            ok
        })
        .collect();
    ValidationReport { valid, first_error }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Invalid,
    Submitting,
    Success,
}

/// DOM work requested by a form controller, applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEffect {
    /// Add `is-invalid` to the field and write its feedback text, if any.
    MarkInvalid {
        field: usize,
        feedback: Option<&'static str>,
        slot: FeedbackSlot,
    },
    /// Remove `is-invalid` from the field.
    ClearInvalid { field: usize },
    /// Add `was-validated` to the form.
    MarkValidated,
    Notify {
        message: &'static str,
        level: NotifyLevel,
    },
    /// Disable the submit control and swap its label for the spinner.
    BeginSubmitting,
    /// Re-enable the submit control and restore its original label.
    EndSubmitting,
    /// Reset field values and drop `was-validated`.
    Reset,
    Navigate { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormTimer {
    Complete,
    Redirect,
}

#[derive(Debug, Clone)]
pub struct FormController {
    spec: &'static FormSpec,
    state: SubmissionState,
    timers: TimerQueue<FormTimer>,
    submit_delay: Duration,
    redirect_delay: Duration,
    confirmation_url: String,
}

impl FormController {
    #[must_use]
    pub fn new(kind: FormKind, config: &SiteConfig) -> Self {
        Self {
            spec: kind.spec(),
            state: SubmissionState::Idle,
            timers: TimerQueue::new(),
            submit_delay: config.submit_delay(),
            redirect_delay: config.redirect_delay(),
            confirmation_url: config.confirmation_url.clone(),
        }
    }

    #[must_use]
    pub fn spec(&self) -> &'static FormSpec {
        self.spec
    }

    #[must_use]
    pub const fn state(&self) -> SubmissionState {
        self.state
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Handle a submit event with a snapshot of the field values.
    ///
    /// `has_submit_control` reports whether the form contains a
    /// `[type="submit"]` control; without one a valid form is left as is.
    pub fn submit(
        &mut self,
        now: Duration,
        values: &[FieldValue],
        has_submit_control: bool,
    ) -> Vec<FormEffect> {
        if self.state == SubmissionState::Submitting {
            tracing::debug!(form = self.spec.form_id, "submit ignored while in flight");
            return Vec::new();
        }
        self.state = SubmissionState::Validating;

        let report = validate(self.spec, values);
        let mut effects = Vec::with_capacity(self.spec.fields.len() + 2);
        for (idx, (field, ok)) in self.spec.fields.iter().zip(&report.valid).enumerate() {
            if values.get(idx).is_none_or(FieldValue::is_missing) {
                continue;
            }
            effects.push(if *ok {
                FormEffect::ClearInvalid { field: idx }
            } else {
                FormEffect::MarkInvalid {
                    field: idx,
                    feedback: field.feedback,
                    slot: field.slot,
                }
            });
        }
        effects.push(FormEffect::MarkValidated);

        if let Some(message) = report.first_error {
            self.state = SubmissionState::Invalid;
            tracing::debug!(form = self.spec.form_id, message, "validation failed");
            effects.push(FormEffect::Notify {
                message,
                level: NotifyLevel::Danger,
            });
            return effects;
        }

        if !has_submit_control {
            self.state = SubmissionState::Idle;
            tracing::debug!(form = self.spec.form_id, "valid form has no submit control");
            return effects;
        }

        self.state = SubmissionState::Submitting;
        self.timers
            .schedule_after(now, self.submit_delay, FormTimer::Complete);
        tracing::debug!(form = self.spec.form_id, "simulated submission started");
        effects.push(FormEffect::BeginSubmitting);
        effects
    }

    /// Fire due timers: submission completion and the follow-up navigation.
    pub fn poll(&mut self, now: Duration) -> Vec<FormEffect> {
        let mut effects = Vec::new();
        while let Some((at, timer)) = self.timers.pop_due(now) {
            match timer {
                FormTimer::Complete => {
                    self.state = SubmissionState::Success;
                    tracing::debug!(form = self.spec.form_id, "simulated submission succeeded");
                    effects.push(FormEffect::EndSubmitting);
                    effects.push(FormEffect::Notify {
                        message: self.spec.success_message,
                        level: NotifyLevel::Success,
                    });
                    effects.push(FormEffect::Reset);
                    if self.spec.redirect_on_success {
                        self.timers
                            .schedule_after(at, self.redirect_delay, FormTimer::Redirect);
                    }
                }
                FormTimer::Redirect => {
                    tracing::debug!(url = %self.confirmation_url, "navigating to confirmation");
                    effects.push(FormEffect::Navigate {
                        url: self.confirmation_url.clone(),
                    });
                }
            }
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn valid_contact() -> Vec<FieldValue> {
        vec![
            FieldValue::text("Jana"),
            FieldValue::text("Nováková"),
            FieldValue::text("jana@firma.sk"),
            FieldValue::text("+421 900 123 456"),
            FieldValue::text("Dobrý deň, mám otázku."),
            FieldValue::Checked(true),
        ]
    }

    #[test]
    fn empty_message_marks_field_and_starts_no_timer() {
        let mut form = FormController::new(FormKind::Contact, &SiteConfig::default());
        let mut values = valid_contact();
        values[4] = FieldValue::text("");
        let effects = form.submit(ms(0), &values, true);

        assert!(effects.contains(&FormEffect::MarkInvalid {
            field: 4,
            feedback: Some("Správa musí obsahovať aspoň 10 znakov."),
            slot: FeedbackSlot::NextSibling,
        }));
        assert!(effects.contains(&FormEffect::ClearInvalid { field: 0 }));
        assert_eq!(
            effects.last(),
            Some(&FormEffect::Notify {
                message: "Správa je povinná (min. 10 znakov).",
                level: NotifyLevel::Danger,
            })
        );
        assert!(!effects.contains(&FormEffect::BeginSubmitting));
        assert_eq!(form.state(), SubmissionState::Invalid);
        assert_eq!(form.next_deadline(), None);
    }

    #[test]
    fn every_field_is_checked_but_only_first_error_surfaces() {
        let mut form = FormController::new(FormKind::Contact, &SiteConfig::default());
        let values = vec![
            FieldValue::text("J"),
            FieldValue::text("N"),
            FieldValue::text("bad"),
            FieldValue::text("1"),
            FieldValue::text(""),
            FieldValue::Checked(false),
        ];
        let effects = form.submit(ms(0), &values, true);
        let marked = effects
            .iter()
            .filter(|e| matches!(e, FormEffect::MarkInvalid { .. }))
            .count();
        assert_eq!(marked, 6);
        let notes: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                FormEffect::Notify { message, .. } => Some(*message),
                _ => None,
            })
            .collect();
        assert_eq!(notes, vec!["Meno je povinné."]);
    }

    #[test]
    fn missing_controls_fail_without_markup() {
        let report = validate(&CONTACT_FORM, &[FieldValue::text("Jana")]);
        assert_eq!(report.first_error, Some("Priezvisko je povinné."));

        let mut form = FormController::new(FormKind::Contact, &SiteConfig::default());
        let mut values = valid_contact();
        values[1] = FieldValue::Missing;
        let effects = form.submit(ms(0), &values, true);
        assert!(!effects.iter().any(|e| matches!(
            e,
            FormEffect::MarkInvalid { field: 1, .. } | FormEffect::ClearInvalid { field: 1 }
        )));
        assert_eq!(form.state(), SubmissionState::Invalid);
    }

    #[test]
    fn valid_contact_submission_runs_full_timeline() {
        let mut form = FormController::new(FormKind::Contact, &SiteConfig::default());
        let effects = form.submit(ms(0), &valid_contact(), true);
        assert_eq!(effects.last(), Some(&FormEffect::BeginSubmitting));
        assert_eq!(form.state(), SubmissionState::Submitting);
        assert_eq!(form.next_deadline(), Some(ms(1000)));

        assert_eq!(form.poll(ms(999)), Vec::<FormEffect>::new());
        assert_eq!(
            form.poll(ms(1000)),
            vec![
                FormEffect::EndSubmitting,
                FormEffect::Notify {
                    message: "Formulár bol úspešne odoslaný!",
                    level: NotifyLevel::Success,
                },
                FormEffect::Reset,
            ]
        );
        assert_eq!(form.state(), SubmissionState::Success);
        assert_eq!(form.next_deadline(), Some(ms(2500)));
        assert_eq!(
            form.poll(ms(2500)),
            vec![FormEffect::Navigate {
                url: "thank_you.html".to_owned()
            }]
        );
    }

    #[test]
    fn resubmit_while_in_flight_is_ignored() {
        let mut form = FormController::new(FormKind::Contact, &SiteConfig::default());
        form.submit(ms(0), &valid_contact(), true);
        assert_eq!(form.submit(ms(10), &valid_contact(), true), Vec::<FormEffect>::new());
        assert_eq!(form.next_deadline(), Some(ms(1000)));
    }

    #[test]
    fn newsletter_has_no_inline_text_and_no_redirect() {
        let mut form = FormController::new(FormKind::Newsletter, &SiteConfig::default());
        let effects = form.submit(
            ms(0),
            &[FieldValue::text("a@b"), FieldValue::Checked(true)],
            true,
        );
        assert_eq!(effects[0], FormEffect::MarkInvalid {
            field: 0,
            feedback: None,
            slot: FeedbackSlot::NextSibling,
        });

        let effects = form.submit(
            ms(100),
            &[FieldValue::text("a@b.com"), FieldValue::Checked(true)],
            true,
        );
        assert_eq!(effects.last(), Some(&FormEffect::BeginSubmitting));
        let done = form.poll(ms(1100));
        assert!(done.contains(&FormEffect::Notify {
            message: "Prihlásenie do newslettera bolo úspešné!",
            level: NotifyLevel::Success,
        }));
        assert_eq!(form.next_deadline(), None);
        assert!(form.poll(ms(10_000)).is_empty());
    }

    #[test]
    fn valid_form_without_submit_control_stays_idle() {
        let mut form = FormController::new(FormKind::Contact, &SiteConfig::default());
        let effects = form.submit(ms(0), &valid_contact(), false);
        assert_eq!(effects.last(), Some(&FormEffect::MarkValidated));
        assert_eq!(form.state(), SubmissionState::Idle);
        assert_eq!(form.next_deadline(), None);
    }

    #[test]
    fn late_poll_still_orders_completion_before_redirect() {
        let mut form = FormController::new(FormKind::Contact, &SiteConfig::default());
        form.submit(ms(0), &valid_contact(), true);
        let effects = form.poll(ms(5000));
        assert_eq!(effects.len(), 4);
        assert_eq!(effects[0], FormEffect::EndSubmitting);
        assert!(matches!(effects[3], FormEffect::Navigate { .. }));
    }
}
