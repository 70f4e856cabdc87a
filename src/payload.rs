//! The structured message handed to delivery providers.
//!
//! Built once per accepted submission from sanitized field values. The HTML
//! body is rendered with [maud](https://maud.lambda.xyz/), so anything that
//! survives sanitization is still escaped before it reaches a mail client.

use crate::sanitize::sanitize_input;
use crate::types::{FormData, OrderType};
use maud::{Markup, html};
use serde::Serialize;

/// Wire shape of the backend's `/api/contact` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactPayload {
    pub to: String,
    pub subject: String,
    pub name: String,
    pub email: String,
    /// Human-readable order type label, e.g. `"Bulk Order (B2B)"`.
    #[serde(rename = "orderType")]
    pub order_type: String,
    pub message: String,
    pub html: String,
}

impl ContactPayload {
    /// Assemble the payload for `recipient` from raw form input.
    ///
    /// `order_type` is passed separately because only a validated form has
    /// one.
    pub fn from_form(recipient: &str, form: &FormData, order_type: OrderType) -> Self {
        let name = sanitize_input(&form.name);
        let email = sanitize_input(&form.email);
        let message = sanitize_input(&form.message);
        let label = order_type.label();
        let html = render_html(&name, &email, label, &message).into_string();

        Self {
            to: recipient.to_string(),
            subject: subject_for(order_type),
            name,
            email,
            order_type: label.to_string(),
            message,
            html,
        }
    }
}

pub fn subject_for(order_type: OrderType) -> String {
    format!("Contact Form: {}", order_type.label())
}

fn render_html(name: &str, email: &str, order_type: &str, message: &str) -> Markup {
    html! {
        h2 { "New Contact Form Submission" }
        p { strong { "Name:" } " " (name) }
        p { strong { "Email:" } " " (email) }
        p { strong { "Order Type:" } " " (order_type) }
        p { strong { "Message:" } }
        p {
            @for (i, line) in message.split('\n').enumerate() {
                @if i > 0 { br; }
                (line)
            }
        }
    }
}
