//! HTTP transport behind the delivery providers.
//!
//! Providers only ever POST a JSON body and look at the status code and the
//! response text, so the seam is a single method. [`HttpTransport`] is the
//! real implementation on a blocking `reqwest` client. Tests substitute a
//! scripted transport and never open a socket.

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Network error: request timed out after {0}s")]
    Timeout(u64),
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

pub trait Transport {
    /// POST `body` as JSON to `url`, giving up after `timeout`.
    ///
    /// Any response, including 4xx/5xx, is `Ok`; only failures to get a
    /// response at all are errors.
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("kolicatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .timeout(timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(timeout.as_secs())
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
