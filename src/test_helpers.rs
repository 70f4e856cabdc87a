//! Shared test utilities for the kolicatch test suite.
//!
//! Provides canned form input, a ready-made payload, and a scripted
//! [`Transport`] that answers by URL and records every request, so provider
//! and pipeline tests run without a network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let transport = ScriptedTransport::new()
//!     .respond("https://api.test/api/contact", Ok(HttpResponse::new(500, "")));
//! chain.deliver(&transport, &sample_payload());
//! assert_eq!(transport.urls(), vec!["https://api.test/api/contact"]);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::delivery::transport::{HttpResponse, Transport, TransportError};
use crate::payload::ContactPayload;
use crate::types::{FormData, OrderType};

// =========================================================================
// Fixtures
// =========================================================================

/// A form that passes every validation rule.
pub fn valid_form() -> FormData {
    FormData {
        name: "Asha Rao".into(),
        email: "asha@example.com".into(),
        order_type: Some(OrderType::Home),
        message: "Please deliver 2kg pomfret weekly".into(),
        honeypot: String::new(),
    }
}

/// Payload built from [`valid_form`] for the default recipient.
pub fn sample_payload() -> ContactPayload {
    ContactPayload::from_form("info@kolicatch.io", &valid_form(), OrderType::Home)
}

// =========================================================================
// Scripted transport
// =========================================================================

/// A request seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub body: serde_json::Value,
    pub timeout: Duration,
}

/// Answers each URL from a queue of scripted results.
///
/// Unscripted URLs get a network error, which is what an unreachable host
/// looks like to the providers.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<HashMap<String, VecDeque<Result<HttpResponse, TransportError>>>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for `url`. Multiple results for one URL are returned
    /// in order.
    pub fn respond(self, url: &str, result: Result<HttpResponse, TransportError>) -> Self {
        self.responses
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.url.clone()).collect()
    }
}

impl Transport for ScriptedTransport {
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.borrow_mut().push(RecordedCall {
            url: url.to_string(),
            body: body.clone(),
            timeout,
        });
        self.responses
            .borrow_mut()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(TransportError::Network(format!("no route to {url}"))))
    }
}
