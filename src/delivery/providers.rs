//! The three delivery providers.
//!
//! | Provider | Request | Success |
//! |----------|---------|---------|
//! | [`Backend`] | `POST {base_url}/api/contact` with the [`ContactPayload`] | HTTP 200 or 201 |
//! | [`EmailJs`] | `POST` to the EmailJS REST send endpoint with template params | HTTP 200 |
//! | [`Web3Forms`] | `POST` to the Web3Forms submit endpoint | 2xx **and** `"success": true` |

use super::transport::{Transport, TransportError};
use crate::payload::ContactPayload;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Backend,
    EmailJs,
    Web3Forms,
}

impl ProviderKind {
    /// Priority order in which providers are attempted.
    pub const ORDER: [ProviderKind; 3] = [
        ProviderKind::Backend,
        ProviderKind::EmailJs,
        ProviderKind::Web3Forms,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::Backend => "backend",
            ProviderKind::EmailJs => "EmailJS",
            ProviderKind::Web3Forms => "Web3Forms",
        }
    }

    /// Setup steps shown when this provider is not configured.
    pub fn setup_steps(self) -> &'static [&'static str] {
        match self {
            ProviderKind::Backend => &[
                "Deploy the site backend with a POST /api/contact route",
                "Set KOLICATCH_BACKEND_URL or [backend] base_url",
            ],
            ProviderKind::EmailJs => &[
                "Create a free account at https://www.emailjs.com/",
                "Add an email service (Gmail, Outlook, ...)",
                "Create a template using {{to_email}}, {{subject}}, {{from_name}}, {{from_email}}, {{order_type}}, {{message}}",
                "Set KOLICATCH_EMAILJS_SERVICE_ID, KOLICATCH_EMAILJS_TEMPLATE_ID, KOLICATCH_EMAILJS_PUBLIC_KEY",
            ],
            ProviderKind::Web3Forms => &[
                "Get a free access key at https://web3forms.com/",
                "Set KOLICATCH_WEB3FORMS_KEY or [web3forms] access_key",
            ],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("HTTP error! status: {0}")]
    Http(u16),
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to read provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ProviderError {
    /// Connection problems and HTTP error statuses, as opposed to a provider
    /// that answered and refused the message.
    pub fn is_network(&self) -> bool {
        matches!(self, ProviderError::Transport(_) | ProviderError::Http(_))
    }
}

pub trait Provider {
    fn kind(&self) -> ProviderKind;

    fn deliver(
        &self,
        transport: &dyn Transport,
        payload: &ContactPayload,
    ) -> Result<(), ProviderError>;
}

/// The site's own backend.
#[derive(Debug, Clone)]
pub struct Backend {
    endpoint: String,
    timeout: Duration,
}

impl Backend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            endpoint: format!("{}/api/contact", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Provider for Backend {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Backend
    }

    fn deliver(
        &self,
        transport: &dyn Transport,
        payload: &ContactPayload,
    ) -> Result<(), ProviderError> {
        let body = serde_json::to_value(payload)?;
        let response = transport.post_json(&self.endpoint, &body, self.timeout)?;
        match response.status {
            200 | 201 => Ok(()),
            status => Err(ProviderError::Http(status)),
        }
    }
}

/// EmailJS transactional email.
#[derive(Debug, Clone)]
pub struct EmailJs {
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
    timeout: Duration,
}

impl EmailJs {
    pub fn new(
        endpoint: &str,
        service_id: &str,
        template_id: &str,
        public_key: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            service_id: service_id.to_string(),
            template_id: template_id.to_string(),
            public_key: public_key.to_string(),
            timeout,
        }
    }

    fn request_body(&self, payload: &ContactPayload) -> serde_json::Value {
        json!({
            "service_id": self.service_id,
            "template_id": self.template_id,
            "user_id": self.public_key,
            "template_params": {
                "to_email": payload.to,
                "subject": payload.subject,
                "from_name": payload.name,
                "from_email": payload.email,
                "order_type": payload.order_type,
                "message": payload.message,
            },
        })
    }
}

impl Provider for EmailJs {
    fn kind(&self) -> ProviderKind {
        ProviderKind::EmailJs
    }

    fn deliver(
        &self,
        transport: &dyn Transport,
        payload: &ContactPayload,
    ) -> Result<(), ProviderError> {
        let response =
            transport.post_json(&self.endpoint, &self.request_body(payload), self.timeout)?;
        if response.status == 200 {
            return Ok(());
        }
        // EmailJS explains 4xx refusals in a plain-text body.
        let reason = response.body.trim();
        if (400..500).contains(&response.status) && !reason.is_empty() {
            Err(ProviderError::Rejected(reason.to_string()))
        } else {
            Err(ProviderError::Http(response.status))
        }
    }
}

/// Web3Forms relay.
#[derive(Debug, Clone)]
pub struct Web3Forms {
    endpoint: String,
    access_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct Web3FormsResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl Web3Forms {
    pub fn new(endpoint: &str, access_key: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            access_key: access_key.to_string(),
            timeout,
        }
    }

    fn request_body(&self, payload: &ContactPayload) -> serde_json::Value {
        json!({
            "access_key": self.access_key,
            "subject": payload.subject,
            "from_name": payload.name,
            "from_email": payload.email,
            "to_email": payload.to,
            "message": format!(
                "Order Type: {}\n\nMessage:\n{}",
                payload.order_type, payload.message
            ),
        })
    }
}

impl Provider for Web3Forms {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Web3Forms
    }

    fn deliver(
        &self,
        transport: &dyn Transport,
        payload: &ContactPayload,
    ) -> Result<(), ProviderError> {
        let response =
            transport.post_json(&self.endpoint, &self.request_body(payload), self.timeout)?;
        if !response.is_success() {
            return Err(ProviderError::Http(response.status));
        }
        let result: Web3FormsResponse = response.json()?;
        if result.success {
            Ok(())
        } else {
            Err(ProviderError::Rejected(
                result
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Failed to send email".to_string()),
            ))
        }
    }
}
