//! Shared types used across validation, payload construction, and delivery.
//!
//! [`FormData`] is the raw, unsanitized state of the contact form exactly as
//! the visitor typed it. Sanitization happens at validation and payload time,
//! never on the stored state, so a failed delivery leaves the visitor's input
//! untouched for a retry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What kind of order the visitor is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Home delivery to an individual customer.
    Home,
    /// Bulk order for a restaurant, hotel, or retailer.
    Bulk,
    /// Anything else.
    Inquiry,
}

impl OrderType {
    pub const ALL: [OrderType; 3] = [OrderType::Home, OrderType::Bulk, OrderType::Inquiry];

    /// Human-readable label used in subjects, bodies, and provider templates.
    pub fn label(self) -> &'static str {
        match self {
            OrderType::Home => "Home Delivery (B2C)",
            OrderType::Bulk => "Bulk Order (B2B)",
            OrderType::Inquiry => "General Inquiry",
        }
    }

    /// Short identifier as submitted by the form's select control.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Home => "home",
            OrderType::Bulk => "bulk",
            OrderType::Inquiry => "inquiry",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order type '{0}' (expected home, bulk, or inquiry)")]
pub struct ParseOrderTypeError(pub String);

impl FromStr for OrderType {
    type Err = ParseOrderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(OrderType::Home),
            "bulk" => Ok(OrderType::Bulk),
            "inquiry" => Ok(OrderType::Inquiry),
            _ => Err(ParseOrderTypeError(s.to_string())),
        }
    }
}

/// Contact form fields as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub name: String,
    pub email: String,
    /// `None` until the visitor picks an option.
    pub order_type: Option<OrderType>,
    pub message: String,
    /// Hidden from people, filled in by naive bots (rendered as a `website` input).
    pub honeypot: String,
}

impl FormData {
    /// True when every field is in its freshly-mounted state.
    pub fn is_empty(&self) -> bool {
        *self == FormData::default()
    }
}

/// Form fields that can carry a validation error, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    OrderType,
    Message,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::OrderType => "order type",
            Field::Message => "message",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_type_labels() {
        assert_eq!(OrderType::Home.label(), "Home Delivery (B2C)");
        assert_eq!(OrderType::Bulk.label(), "Bulk Order (B2B)");
        assert_eq!(OrderType::Inquiry.label(), "General Inquiry");
    }

    #[test]
    fn order_type_parses_case_insensitively() {
        assert_eq!("Home".parse::<OrderType>(), Ok(OrderType::Home));
        assert_eq!(" BULK ".parse::<OrderType>(), Ok(OrderType::Bulk));
        assert_eq!("inquiry".parse::<OrderType>(), Ok(OrderType::Inquiry));
    }

    #[test]
    fn order_type_rejects_unknown() {
        let err = "wholesale".parse::<OrderType>().unwrap_err();
        assert!(err.to_string().contains("wholesale"));
    }

    #[test]
    fn order_type_serde_uses_lowercase() {
        let json = serde_json::to_string(&OrderType::Bulk).unwrap();
        assert_eq!(json, "\"bulk\"");
    }

    #[test]
    fn default_form_is_empty() {
        let mut form = FormData::default();
        assert!(form.is_empty());
        form.honeypot = "x".into();
        assert!(!form.is_empty());
    }

    #[test]
    fn fields_sort_in_display_order() {
        let mut fields = vec![Field::Message, Field::Name, Field::OrderType, Field::Email];
        fields.sort();
        assert_eq!(
            fields,
            vec![Field::Name, Field::Email, Field::OrderType, Field::Message]
        );
    }
}
