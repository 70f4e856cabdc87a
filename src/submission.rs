//! Contact form submission pipeline.
//!
//! # State Machine
//!
//! ```text
//! Editing ──submit──▶ Validating ──▶ Rejected(errors) ──▶ Editing
//!                          │
//!                          └──▶ Submitting ──▶ Succeeded ──▶ Editing (form reset)
//!                                    │
//!                                    └──▶ Failed(reason) ──▶ Editing (input kept)
//! ```
//!
//! Validating and the outcome states are transient; [`ContactForm::phase`]
//! only ever reports `Editing` or `Submitting`. While `Submitting`, further
//! submissions are refused with [`SubmitError::Pending`].
//!
//! # Check Order
//!
//! 1. Honeypot filled → [`SubmitError::SpamDetected`], nothing else runs.
//! 2. Rate limited → [`SubmitError::RateLimited`], nothing else runs.
//! 3. Field rules ([`crate::validate`]) → [`SubmitError::Invalid`] with all
//!    field errors.
//!
//! A submission that passes is counted by the rate limiter before delivery
//! starts, whatever the delivery outcome.
//!
//! # Notices
//!
//! Every outcome maps to exactly one toast-style [`Notice`]. Errors never
//! escape the pipeline as anything else.

use crate::config::SiteConfig;
use crate::delivery::{Delivery, DeliveryError, ProviderChain, Transport};
use crate::payload::ContactPayload;
use crate::rate_limit::RateLimiter;
use crate::types::{FormData, OrderType};
use crate::validate::{ValidationResult, validate_fields};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("{}", first_message(.0))]
    Invalid(ValidationResult),
    #[error("Spam detected")]
    SpamDetected,
    #[error("Too many submissions. Please wait a moment.")]
    RateLimited,
    #[error("A submission is already in progress")]
    Pending,
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

fn first_message(result: &ValidationResult) -> &str {
    result
        .first_error()
        .map_or("Invalid form", |(_, message)| message)
}

impl SubmitError {
    /// The single user-facing notification for this error.
    pub fn notice(&self) -> Notice {
        match self {
            SubmitError::Invalid(result) => Notice::error(
                first_message(result),
                "Please fix the error and try again.",
            ),
            SubmitError::SpamDetected | SubmitError::RateLimited => {
                Notice::error("Security Alert", &self.to_string())
            }
            SubmitError::Pending => Notice::error(
                "Submission in progress",
                "Please wait for the current submission to finish.",
            ),
            SubmitError::Delivery(DeliveryError::NotConfigured) => Notice::error(
                "Submission Error",
                "Email service needs to be configured. Run 'kolicatch providers' for setup \
                 instructions, or contact us via WhatsApp.",
            ),
            SubmitError::Delivery(err) => {
                let description = match err.last_error() {
                    Some(e) if e.is_network() => {
                        "Network error. Please check your internet connection and try again."
                    }
                    _ => {
                        "Failed to send email. Please try again in a moment or contact us via WhatsApp."
                    }
                };
                Notice::error("Submission Error", description)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast-style notification: a short title and a one-line description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(recipient: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Form Submitted Successfully!".to_string(),
            description: format!(
                "Your message has been sent to {recipient}. We'll get back to you soon!"
            ),
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
}

/// Contact form state plus the in-memory submission record.
#[derive(Debug)]
pub struct ContactForm {
    data: FormData,
    errors: ValidationResult,
    phase: Phase,
    limiter: RateLimiter,
    recipient: String,
}

impl ContactForm {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            data: FormData::default(),
            errors: ValidationResult::default(),
            phase: Phase::Editing,
            limiter: RateLimiter::from_config(&config.rate_limit),
            recipient: config.contact.recipient.clone(),
        }
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    /// Mutable access for edits (keystrokes and selections).
    pub fn data_mut(&mut self) -> &mut FormData {
        &mut self.data
    }

    /// Field errors from the most recent validation.
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run the honeypot, rate-limit, and field checks at `now`.
    ///
    /// Returns the selected order type when the form is acceptable. Does not
    /// record anything with the rate limiter.
    pub fn validate(&mut self, now: Instant) -> Result<OrderType, SubmitError> {
        self.errors = ValidationResult::default();

        if !self.data.honeypot.trim().is_empty() {
            warn!("honeypot field filled, rejecting submission");
            return Err(SubmitError::SpamDetected);
        }
        if self.limiter.is_limited(now) {
            warn!(count = self.limiter.count(), "contact form rate limited");
            return Err(SubmitError::RateLimited);
        }

        let result = validate_fields(&self.data);
        match self.data.order_type {
            Some(order_type) if result.is_valid() => Ok(order_type),
            _ => {
                self.errors = result.clone();
                Err(SubmitError::Invalid(result))
            }
        }
    }

    /// Validate, count the attempt, and enter `Submitting`.
    ///
    /// Returns the payload to hand to the providers. Pair with
    /// [`ContactForm::finish`].
    pub fn begin(&mut self, now: Instant) -> Result<ContactPayload, SubmitError> {
        if self.phase == Phase::Submitting {
            return Err(SubmitError::Pending);
        }
        let order_type = self.validate(now)?;
        self.limiter.record(now);
        self.phase = Phase::Submitting;
        Ok(ContactPayload::from_form(
            &self.recipient,
            &self.data,
            order_type,
        ))
    }

    /// Leave `Submitting`. A success clears the form; a failure keeps the
    /// visitor's input so they can retry.
    pub fn finish(&mut self, outcome: &Result<Delivery, DeliveryError>) {
        self.phase = Phase::Editing;
        if outcome.is_ok() {
            self.data = FormData::default();
            self.errors = ValidationResult::default();
        }
    }

    /// Full pipeline: validate, deliver through `chain`, and settle state.
    pub fn submit(
        &mut self,
        now: Instant,
        chain: &ProviderChain,
        transport: &dyn Transport,
    ) -> Result<Delivery, SubmitError> {
        let payload = self.begin(now)?;
        let outcome = chain.deliver(transport, &payload);
        self.finish(&outcome);
        match outcome {
            Ok(delivery) => {
                info!(provider = %delivery.provider, "contact form submitted");
                Ok(delivery)
            }
            Err(err) => Err(SubmitError::Delivery(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::{HttpResponse, ProviderKind, ProviderSlot, TransportError};
    use crate::test_helpers::{ScriptedTransport, valid_form};
    use crate::types::Field;
    use std::time::Duration;

    const W3F: &str = "https://api.web3forms.com/submit";

    fn form_with(data: FormData) -> ContactForm {
        let mut form = ContactForm::new(&SiteConfig::default());
        *form.data_mut() = data;
        form
    }

    fn ok_transport(n: usize) -> ScriptedTransport {
        (0..n).fold(ScriptedTransport::new(), |t, _| {
            t.respond(W3F, Ok(HttpResponse::new(200, r#"{"success": true}"#)))
        })
    }

    fn default_chain() -> ProviderChain {
        ProviderChain::from_config(&SiteConfig::default())
    }

    // =========================================================================
    // Validation order
    // =========================================================================

    #[test]
    fn valid_form_validates() {
        let mut form = form_with(valid_form());
        assert_eq!(form.validate(Instant::now()).unwrap(), OrderType::Home);
        assert!(form.errors().is_valid());
    }

    #[test]
    fn honeypot_rejects_even_a_valid_form() {
        let mut form = form_with(FormData {
            honeypot: "http://spam.example".into(),
            ..valid_form()
        });
        assert!(matches!(
            form.validate(Instant::now()),
            Err(SubmitError::SpamDetected)
        ));
    }

    #[test]
    fn honeypot_short_circuits_field_errors() {
        let mut form = form_with(FormData {
            honeypot: "x".into(),
            ..FormData::default()
        });
        assert!(matches!(
            form.validate(Instant::now()),
            Err(SubmitError::SpamDetected)
        ));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn whitespace_honeypot_is_ignored() {
        let mut form = form_with(FormData {
            honeypot: "   ".into(),
            ..valid_form()
        });
        assert!(form.validate(Instant::now()).is_ok());
    }

    #[test]
    fn field_errors_are_stored() {
        let mut form = form_with(FormData {
            name: "A1".into(),
            ..valid_form()
        });
        let err = form.validate(Instant::now()).unwrap_err();
        assert_eq!(err.to_string(), "Name can only contain letters and spaces");
        assert_eq!(
            form.errors().error(Field::Name),
            Some("Name can only contain letters and spaces")
        );
    }

    // =========================================================================
    // Rate limiting
    // =========================================================================

    #[test]
    fn fourth_submission_within_a_minute_is_rate_limited() {
        let t0 = Instant::now();
        let chain = default_chain();
        let transport = ok_transport(4);
        let mut form = ContactForm::new(&SiteConfig::default());

        for i in 0..3 {
            *form.data_mut() = valid_form();
            form.submit(t0 + Duration::from_secs(i * 5), &chain, &transport)
                .unwrap();
        }

        *form.data_mut() = valid_form();
        let err = form
            .submit(t0 + Duration::from_secs(20), &chain, &transport)
            .unwrap_err();
        assert!(matches!(err, SubmitError::RateLimited));
        // Rejected before delivery: input is untouched.
        assert_eq!(form.data(), &valid_form());
        assert_eq!(transport.calls().len(), 3);

        let later = t0 + Duration::from_secs(10 + 61);
        form.submit(later, &chain, &transport).unwrap();
        assert_eq!(form.rate_limiter().count(), 1);
    }

    #[test]
    fn rate_limit_checked_before_fields() {
        let t0 = Instant::now();
        let chain = default_chain();
        let transport = ok_transport(3);
        let mut form = ContactForm::new(&SiteConfig::default());
        for _ in 0..3 {
            *form.data_mut() = valid_form();
            form.submit(t0, &chain, &transport).unwrap();
        }
        // Empty form, but the limiter fires first.
        assert!(matches!(form.validate(t0), Err(SubmitError::RateLimited)));
    }

    #[test]
    fn failed_delivery_still_counts_toward_limit() {
        let t0 = Instant::now();
        let chain = default_chain();
        let transport = ScriptedTransport::new();
        let mut form = form_with(valid_form());
        for _ in 0..3 {
            assert!(form.submit(t0, &chain, &transport).is_err());
        }
        assert!(matches!(
            form.submit(t0, &chain, &transport),
            Err(SubmitError::RateLimited)
        ));
    }

    // =========================================================================
    // Phases and reset
    // =========================================================================

    #[test]
    fn success_resets_form() {
        let mut form = form_with(valid_form());
        let delivery = form
            .submit(Instant::now(), &default_chain(), &ok_transport(1))
            .unwrap();
        assert_eq!(delivery.provider, ProviderKind::Web3Forms);
        assert!(form.data().is_empty());
        assert_eq!(form.phase(), Phase::Editing);
    }

    #[test]
    fn failure_keeps_input() {
        let transport = ScriptedTransport::new()
            .respond(W3F, Err(TransportError::Network("offline".into())));
        let mut form = form_with(valid_form());
        let err = form
            .submit(Instant::now(), &default_chain(), &transport)
            .unwrap_err();
        assert!(matches!(err, SubmitError::Delivery(DeliveryError::AllFailed(_))));
        assert_eq!(form.data(), &valid_form());
        assert_eq!(form.phase(), Phase::Editing);
    }

    #[test]
    fn second_begin_while_submitting_is_pending() {
        let now = Instant::now();
        let mut form = form_with(valid_form());
        form.begin(now).unwrap();
        assert_eq!(form.phase(), Phase::Submitting);
        assert!(matches!(form.begin(now), Err(SubmitError::Pending)));
        assert_eq!(form.rate_limiter().count(), 1);

        form.finish(&Err(DeliveryError::NotConfigured));
        assert_eq!(form.phase(), Phase::Editing);
        assert!(form.begin(now).is_ok());
    }

    #[test]
    fn payload_goes_to_configured_recipient() {
        let mut config = SiteConfig::default();
        config.contact.recipient = "orders@kolicatch.io".into();
        let mut form = ContactForm::new(&config);
        *form.data_mut() = FormData {
            order_type: Some(OrderType::Bulk),
            ..valid_form()
        };
        let payload = form.begin(Instant::now()).unwrap();
        assert_eq!(payload.to, "orders@kolicatch.io");
        assert_eq!(payload.subject, "Contact Form: Bulk Order (B2B)");
    }

    // =========================================================================
    // Notices
    // =========================================================================

    #[test]
    fn security_notices() {
        let spam = SubmitError::SpamDetected.notice();
        assert_eq!(spam.title, "Security Alert");
        assert_eq!(spam.description, "Spam detected");

        let limited = SubmitError::RateLimited.notice();
        assert_eq!(limited.title, "Security Alert");
        assert_eq!(
            limited.description,
            "Too many submissions. Please wait a moment."
        );
    }

    #[test]
    fn field_error_notice_uses_first_error() {
        let mut form = form_with(FormData::default());
        let notice = form.validate(Instant::now()).unwrap_err().notice();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Name is required");
        assert_eq!(notice.description, "Please fix the error and try again.");
    }

    #[test]
    fn not_configured_notice_gives_guidance() {
        let chain = ProviderChain::new(
            ProviderKind::ORDER
                .into_iter()
                .map(ProviderSlot::unconfigured)
                .collect(),
        );
        let mut form = form_with(valid_form());
        let notice = form
            .submit(Instant::now(), &chain, &ScriptedTransport::new())
            .unwrap_err()
            .notice();
        assert_eq!(notice.title, "Submission Error");
        assert!(notice.description.contains("needs to be configured"));
    }

    #[test]
    fn network_and_rejection_notices_differ() {
        let mut form = form_with(valid_form());
        let network = form
            .submit(
                Instant::now(),
                &default_chain(),
                &ScriptedTransport::new().respond(W3F, Ok(HttpResponse::new(500, ""))),
            )
            .unwrap_err()
            .notice();
        assert!(network.description.starts_with("Network error."));

        let rejected = form
            .submit(
                Instant::now(),
                &default_chain(),
                &ScriptedTransport::new().respond(
                    W3F,
                    Ok(HttpResponse::new(200, r#"{"success": false}"#)),
                ),
            )
            .unwrap_err()
            .notice();
        assert!(rejected.description.starts_with("Failed to send email."));
    }

    #[test]
    fn success_notice_names_recipient() {
        let notice = Notice::success("info@kolicatch.io");
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(
            notice.description,
            "Your message has been sent to info@kolicatch.io. We'll get back to you soon!"
        );
    }
}
