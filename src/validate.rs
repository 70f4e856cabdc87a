//! Per-field validation of the contact form.
//!
//! Field rules run on sanitized values and every applicable error is
//! collected; one field failing never hides another's error. Each field
//! reports at most one message, from the first of its rules that fails.
//! The honeypot and rate-limit checks short-circuit the whole submission and
//! live in [`crate::submission`], which runs them before these rules.

use crate::sanitize::sanitize_input;
use crate::spam::detect_spam;
use crate::types::{Field, FormData};
use std::collections::BTreeMap;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// Outcome of validating the form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    field_errors: BTreeMap<Field, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    /// First error in display order (name, email, order type, message).
    pub fn first_error(&self) -> Option<(Field, &str)> {
        self.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.field_errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.field_errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    fn insert(&mut self, field: Field, error: Option<&'static str>) {
        if let Some(message) = error {
            self.field_errors.insert(field, message.to_string());
        }
    }
}

/// Validate name, email, order type, and message.
pub fn validate_fields(form: &FormData) -> ValidationResult {
    let mut result = ValidationResult::default();
    result.insert(Field::Name, validate_name(&form.name));
    result.insert(Field::Email, validate_email(&form.email));
    if form.order_type.is_none() {
        result.insert(Field::OrderType, Some("Please select an order type"));
    }
    result.insert(Field::Message, validate_message(&form.message));
    result
}

/// Length rules come before the character-set rule, so `"1"` reports the
/// minimum length while `"A1"` reports the character set.
pub fn validate_name(raw: &str) -> Option<&'static str> {
    let name = sanitize_input(raw);
    let len = name.chars().count();
    if name.is_empty() {
        Some("Name is required")
    } else if len < NAME_MIN_CHARS {
        Some("Name must be at least 2 characters")
    } else if len > NAME_MAX_CHARS {
        Some("Name must be less than 100 characters")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        Some("Name can only contain letters and spaces")
    } else {
        None
    }
}

pub fn validate_email(raw: &str) -> Option<&'static str> {
    let email = sanitize_input(raw);
    if email.is_empty() {
        Some("Email is required")
    } else if !is_email_shaped(&email) {
        Some("Please enter a valid email address")
    } else {
        None
    }
}

pub fn validate_message(raw: &str) -> Option<&'static str> {
    let message = sanitize_input(raw);
    let len = message.chars().count();
    if message.is_empty() {
        Some("Message is required")
    } else if len < MESSAGE_MIN_CHARS {
        Some("Message must be at least 10 characters")
    } else if len > MESSAGE_MAX_CHARS {
        Some("Message must be less than 1000 characters")
    } else if detect_spam(&message) {
        Some("Message contains suspicious content. Please revise.")
    } else {
        None
    }
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with something on both sides of it.
pub fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
