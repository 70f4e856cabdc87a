//! # Kolicatch
//!
//! Client-side core of the Kolicatch seafood storefront: the contact form's
//! validation and delivery pipeline, and the image load gating that keeps an
//! image-heavy catalog page fast.
//!
//! # Architecture: Two Independent Halves
//!
//! ```text
//! Contact   FormData ──validate──▶ ContactPayload ──ProviderChain──▶ Notice
//! Images    ImageDescriptor ──LoadGate + PreloadCache + ViewportObserver──▶ fetch start
//! ```
//!
//! The halves share only configuration ([`config::SiteConfig`]). Neither does
//! any I/O that is not injected: delivery goes through a
//! [`delivery::Transport`], and image fetches are reported as events rather
//! than performed, so both are tested without a network or a browser.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Form data, order types, form fields |
//! | [`sanitize`] | Strips markup and script vectors from free text |
//! | [`spam`] | Spam phrase and link-flood heuristics |
//! | [`validate`] | Per-field rules and their user-facing messages |
//! | [`rate_limit`] | Sliding window on accepted submissions |
//! | [`payload`] | Sanitized outbound message, HTML body rendered with Maud |
//! | [`delivery`] | HTTP transport, the three providers, ordered fallback chain |
//! | [`submission`] | Form state machine tying the above together; one notice per outcome |
//! | [`preload`] | Image eagerness, load gates, preload cache, viewport observer, page simulation |
//! | [`config`] | Layered `config.toml` + environment loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Providers Resolved Once
//!
//! Which delivery providers exist is decided when the configuration is
//! loaded, not per submission. [`delivery::ProviderChain`] holds one slot per
//! provider in fixed order (backend, EmailJS, Web3Forms), each configured or
//! not, and tries configured ones strictly in sequence. The `providers`
//! command prints the same chain, so what an operator sees is exactly what a
//! submission will try.
//!
//! ## Honeypot and Rate Limit Short-Circuit
//!
//! A filled honeypot or an exhausted rate limit rejects the submission before
//! any field rule runs. Field errors are otherwise collected for every field
//! at once so the visitor can fix them in one pass.
//!
//! ## No Shared Image Cache
//!
//! The set of already-requested image URLs is owned by the page
//! ([`preload::PageLayout`]) and cleared on navigation, instead of living in
//! a process-wide static.
//!
//! ## Maud for the Email Body
//!
//! The HTML body sent to providers is built with Maud, so every interpolated
//! field is escaped on top of the sanitization pass.

pub mod config;
pub mod delivery;
pub mod output;
pub mod payload;
pub mod preload;
pub mod rate_limit;
pub mod sanitize;
pub mod spam;
pub mod submission;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
