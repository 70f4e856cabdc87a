//! Ordered provider fallback.
//!
//! The chain is resolved once from [`SiteConfig`] into one slot per provider,
//! always in [`ProviderKind::ORDER`]. A slot is either configured (holds a
//! ready provider) or not. Delivery walks the configured slots strictly one
//! after another and stops at the first success, so at most one provider
//! ever accepts a given message.

use super::providers::{Backend, EmailJs, Provider, ProviderError, ProviderKind, Web3Forms};
use super::transport::Transport;
use crate::config::{SiteConfig, non_empty};
use crate::payload::ContactPayload;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// One provider that was tried and failed.
#[derive(Debug)]
pub struct Attempt {
    pub provider: ProviderKind,
    pub error: ProviderError,
}

/// A successful delivery.
#[derive(Debug)]
pub struct Delivery {
    /// Provider that accepted the message.
    pub provider: ProviderKind,
    /// Providers tried before it, with their errors.
    pub failed: Vec<Attempt>,
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error(
        "Email service not configured. Set up the backend, EmailJS, or Web3Forms to enable email sending."
    )]
    NotConfigured,
    #[error("{}", describe_failures(.0))]
    AllFailed(Vec<Attempt>),
}

impl DeliveryError {
    /// The last provider error, which is the most specific failure reason.
    pub fn last_error(&self) -> Option<&ProviderError> {
        match self {
            DeliveryError::NotConfigured => None,
            DeliveryError::AllFailed(attempts) => attempts.last().map(|a| &a.error),
        }
    }
}

fn describe_failures(attempts: &[Attempt]) -> String {
    let parts: Vec<String> = attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.error))
        .collect();
    format!("All email providers failed ({})", parts.join("; "))
}

pub struct ProviderSlot {
    kind: ProviderKind,
    provider: Option<Box<dyn Provider>>,
}

impl ProviderSlot {
    pub fn configured(provider: Box<dyn Provider>) -> Self {
        Self {
            kind: provider.kind(),
            provider: Some(provider),
        }
    }

    pub fn unconfigured(kind: ProviderKind) -> Self {
        Self {
            kind,
            provider: None,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }
}

pub struct ProviderChain {
    slots: Vec<ProviderSlot>,
}

impl ProviderChain {
    /// Build a chain from explicit slots, attempted in the given order.
    pub fn new(slots: Vec<ProviderSlot>) -> Self {
        Self { slots }
    }

    /// Resolve every provider from config. Credentials that are missing or
    /// blank leave the provider unconfigured.
    pub fn from_config(config: &SiteConfig) -> Self {
        let timeout = Duration::from_secs(config.contact.timeout_secs);

        let backend = match non_empty(&config.backend.base_url) {
            Some(url) => ProviderSlot::configured(Box::new(Backend::new(url, timeout))),
            None => ProviderSlot::unconfigured(ProviderKind::Backend),
        };

        let ejs = &config.emailjs;
        let emailjs = match (
            non_empty(&ejs.service_id),
            non_empty(&ejs.template_id),
            non_empty(&ejs.public_key),
        ) {
            (Some(service), Some(template), Some(key)) => ProviderSlot::configured(Box::new(
                EmailJs::new(&ejs.endpoint, service, template, key, timeout),
            )),
            _ => ProviderSlot::unconfigured(ProviderKind::EmailJs),
        };

        let web3forms = match non_empty(&config.web3forms.access_key) {
            Some(key) => ProviderSlot::configured(Box::new(Web3Forms::new(
                &config.web3forms.endpoint,
                key,
                timeout,
            ))),
            None => ProviderSlot::unconfigured(ProviderKind::Web3Forms),
        };

        Self::new(vec![backend, emailjs, web3forms])
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }

    pub fn has_configured(&self) -> bool {
        self.slots.iter().any(ProviderSlot::is_configured)
    }

    /// Try each configured provider in order until one accepts `payload`.
    pub fn deliver(
        &self,
        transport: &dyn Transport,
        payload: &ContactPayload,
    ) -> Result<Delivery, DeliveryError> {
        let mut failed = Vec::new();
        for slot in &self.slots {
            let Some(provider) = &slot.provider else {
                debug!(provider = %slot.kind, "skipping unconfigured provider");
                continue;
            };
            info!(provider = %slot.kind, subject = %payload.subject, "delivering contact message");
            match provider.deliver(transport, payload) {
                Ok(()) => {
                    info!(provider = %slot.kind, "contact message delivered");
                    return Ok(Delivery {
                        provider: slot.kind,
                        failed,
                    });
                }
                Err(error) => {
                    warn!(provider = %slot.kind, %error, "provider failed, falling back");
                    failed.push(Attempt {
                        provider: slot.kind,
                        error,
                    });
                }
            }
        }

        if failed.is_empty() {
            warn!("no email provider is configured");
            Err(DeliveryError::NotConfigured)
        } else {
            Err(DeliveryError::AllFailed(failed))
        }
    }
}
