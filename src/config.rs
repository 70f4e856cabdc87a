//! Site configuration module.
//!
//! Handles loading, validating, and layering configuration. Values are
//! resolved once at startup from three layers, each overriding the previous:
//!
//! ```text
//! stock defaults           (SiteConfig::default)
//!   ← <config dir>/config.toml
//!     ← KOLICATCH_* environment variables
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [contact]
//! recipient = "info@kolicatch.io"  # Where contact messages are delivered
//! timeout_secs = 10                # Per-provider request timeout
//!
//! [backend]
//! # base_url = "https://api.kolicatch.io"   # POSTs to {base_url}/api/contact
//!
//! [emailjs]
//! # service_id = "service_xxx"
//! # template_id = "template_xxx"
//! # public_key = "xxxxxxxx"
//! endpoint = "https://api.emailjs.com/api/v1.0/email/send"
//!
//! [web3forms]
//! access_key = "2921dde2-ddc9-4557-be2c-9aae063c492f"
//! endpoint = "https://api.web3forms.com/submit"
//!
//! [rate_limit]
//! max_submissions = 3
//! window_secs = 60
//!
//! [images]
//! section_margin_px = 200.0        # Section look-ahead for LazyOnVisible images
//! proximity_margin_px = 1000.0     # Per-image look-ahead for LazyOnProximity images
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Key |
//! |----------|-----|
//! | `KOLICATCH_BACKEND_URL` | `backend.base_url` |
//! | `KOLICATCH_EMAILJS_SERVICE_ID` | `emailjs.service_id` |
//! | `KOLICATCH_EMAILJS_TEMPLATE_ID` | `emailjs.template_id` |
//! | `KOLICATCH_EMAILJS_PUBLIC_KEY` | `emailjs.public_key` |
//! | `KOLICATCH_WEB3FORMS_KEY` | `web3forms.access_key` |
//!
//! Empty variables are ignored. An empty string in `config.toml` marks a
//! provider credential as unset, which is how the stock Web3Forms key is
//! switched off.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Access key shipped with the site so the contact form works out of the box.
pub const FALLBACK_WEB3FORMS_KEY: &str = "2921dde2-ddc9-4557-be2c-9aae063c492f";

/// Environment variables and the `(section, key)` they override.
pub const ENV_OVERRIDES: &[(&str, &str, &str)] = &[
    ("KOLICATCH_BACKEND_URL", "backend", "base_url"),
    ("KOLICATCH_EMAILJS_SERVICE_ID", "emailjs", "service_id"),
    ("KOLICATCH_EMAILJS_TEMPLATE_ID", "emailjs", "template_id"),
    ("KOLICATCH_EMAILJS_PUBLIC_KEY", "emailjs", "public_key"),
    ("KOLICATCH_WEB3FORMS_KEY", "web3forms", "access_key"),
];

/// Site configuration.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Recipient and request timeout shared by all providers.
    pub contact: ContactConfig,
    /// Direct backend endpoint (first provider).
    pub backend: BackendConfig,
    /// EmailJS transactional email (second provider).
    pub emailjs: EmailJsConfig,
    /// Web3Forms relay (third provider).
    pub web3forms: Web3FormsConfig,
    /// Contact form throttling.
    pub rate_limit: RateLimitConfig,
    /// Image load look-ahead margins.
    pub images: ImagesConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.contact.recipient.contains('@') {
            return Err(ConfigError::Validation(
                "contact.recipient must be an email address".into(),
            ));
        }
        if self.contact.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "contact.timeout_secs must be non-zero".into(),
            ));
        }
        if let Some(url) = self.backend.base_url.as_deref().filter(|u| !u.trim().is_empty())
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "backend.base_url must start with http:// or https:// (got '{url}')"
            )));
        }
        if self.rate_limit.max_submissions == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Validation(
                "rate_limit values must be non-zero".into(),
            ));
        }
        for (key, margin) in [
            ("images.section_margin_px", self.images.section_margin_px),
            ("images.proximity_margin_px", self.images.proximity_margin_px),
        ] {
            if !margin.is_finite() || margin < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    pub recipient: String,
    pub timeout_secs: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            recipient: "info@kolicatch.io".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailJsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    pub endpoint: String,
}

impl Default for EmailJsConfig {
    fn default() -> Self {
        Self {
            service_id: None,
            template_id: None,
            public_key: None,
            endpoint: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Web3FormsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    pub endpoint: String,
}

impl Default for Web3FormsConfig {
    fn default() -> Self {
        Self {
            access_key: Some(FALLBACK_WEB3FORMS_KEY.to_string()),
            endpoint: "https://api.web3forms.com/submit".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Accepted submissions allowed inside one window.
    pub max_submissions: u32,
    /// Window length, measured from the most recent submission.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: 3,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// How far below the viewport a section counts as visible.
    pub section_margin_px: f64,
    /// How far outside the viewport a proximity-gated image starts loading.
    pub proximity_margin_px: f64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            section_margin_px: 200.0,
            proximity_margin_px: 1000.0,
        }
    }
}

/// Trimmed, non-empty value of an optional setting.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Built-in settings as a TOML table, the bottom layer every other layer
/// is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Lay `overlay` over `base`. Nested tables combine key by key; any other
/// overlay value wins outright, and base keys the overlay lacks survive.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    let (mut merged, layer) = match (base, overlay) {
        (toml::Value::Table(merged), toml::Value::Table(layer)) => (merged, layer),
        (_, overlay) => return overlay,
    };
    for (key, value) in layer {
        let value = match merged.remove(&key) {
            Some(below) => merge_toml(below, value),
            None => value,
        };
        merged.insert(key, value);
    }
    toml::Value::Table(merged)
}

/// The untyped contents of `<dir>/config.toml`, or `None` when the site has
/// no config file. Malformed TOML is an error.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let file = dir.join("config.toml");
    if !file.exists() {
        return Ok(None);
    }
    let value = toml::from_str::<toml::Value>(&fs::read_to_string(&file)?)?;
    Ok(Some(value))
}

/// Build an overlay from environment variables.
///
/// `lookup` stands in for `std::env::var` so tests never touch the real
/// process environment. Returns `None` when no override is set.
pub fn env_overlay(lookup: impl Fn(&str) -> Option<String>) -> Option<toml::Value> {
    let mut root = toml::value::Table::new();
    for (var, section, key) in ENV_OVERRIDES {
        let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let table = root
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
        if let toml::Value::Table(t) = table {
            t.insert(key.to_string(), toml::Value::String(value));
        }
    }
    (!root.is_empty()).then_some(toml::Value::Table(root))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = Option<toml::Value>>,
) -> Result<SiteConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .flatten()
        .fold(base, merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory plus the process
/// environment.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let file = load_raw_config(root)?;
    let env = env_overlay(|var| std::env::var(var).ok());
    resolve_config(stock_defaults_value(), [file, env])
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Kolicatch Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Provider credentials can also come from the environment:
#   KOLICATCH_BACKEND_URL, KOLICATCH_EMAILJS_SERVICE_ID,
#   KOLICATCH_EMAILJS_TEMPLATE_ID, KOLICATCH_EMAILJS_PUBLIC_KEY,
#   KOLICATCH_WEB3FORMS_KEY
# Environment values override this file.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Contact messages
# ---------------------------------------------------------------------------
[contact]
# Address every contact message is delivered to.
recipient = "info@kolicatch.io"

# Timeout for each delivery attempt, in seconds.
timeout_secs = 10

# ---------------------------------------------------------------------------
# Providers, tried in this order until one succeeds
# ---------------------------------------------------------------------------
[backend]
# Base URL of the site backend. Messages are POSTed to {base_url}/api/contact.
# base_url = "https://api.kolicatch.io"

[emailjs]
# All three values are required for EmailJS to be used.
# service_id = "service_xxx"
# template_id = "template_xxx"
# public_key = "xxxxxxxxxxxxxxxx"
endpoint = "https://api.emailjs.com/api/v1.0/email/send"

[web3forms]
# Set to "" to disable the bundled key.
access_key = "2921dde2-ddc9-4557-be2c-9aae063c492f"
endpoint = "https://api.web3forms.com/submit"

# ---------------------------------------------------------------------------
# Throttling
# ---------------------------------------------------------------------------
[rate_limit]
# Accepted submissions allowed before further attempts are rejected.
max_submissions = 3

# Window length in seconds, measured from the most recent submission.
window_secs = 60

# ---------------------------------------------------------------------------
# Image loading
# ---------------------------------------------------------------------------
[images]
# A section counts as visible once its top is within this many pixels
# below the viewport.
section_margin_px = 200.0

# Proximity-gated images start loading this many pixels before they scroll
# into view.
proximity_margin_px = 1000.0
"##
}
