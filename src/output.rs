//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Submit
//!
//! ```text
//! ✓ Form Submitted Successfully!
//!     Your message has been sent to info@kolicatch.io. We'll get back to you soon!
//!     Delivered via Web3Forms
//!     backend failed: HTTP error! status: 500
//! ```
//!
//! ## Validate
//!
//! ```text
//! Field errors
//!     name: Name can only contain letters and spaces
//!     message: Message must be at least 10 characters
//! ```
//!
//! ## Providers
//!
//! ```text
//! Providers
//! 001 backend: not configured
//!     Deploy the site backend with a POST /api/contact route
//!     Set KOLICATCH_BACKEND_URL or [backend] base_url
//! 002 EmailJS: not configured
//!     ...
//! 003 Web3Forms: configured
//! ```
//!
//! ## Simulate images
//!
//! ```text
//! Mount
//!     /img/hero.webp (preload)
//! Scroll to 500px
//!     /img/pomfret.webp [catalog] (section visible)
//! Scroll to 900px
//!     (no fetches)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::delivery::{Delivery, ProviderChain};
use crate::preload::FetchEvent;
use crate::submission::{Notice, NoticeLevel};
use crate::validate::ValidationResult;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Submit
// ============================================================================

pub fn format_notice(notice: &Notice) -> Vec<String> {
    let mark = match notice.level {
        NoticeLevel::Success => "✓",
        NoticeLevel::Error => "✗",
    };
    vec![
        format!("{} {}", mark, notice.title),
        format!("{}{}", indent(1), notice.description),
    ]
}

/// Which provider took the message, and which ones failed before it.
pub fn format_delivery(delivery: &Delivery) -> Vec<String> {
    let mut lines = vec![format!("{}Delivered via {}", indent(1), delivery.provider)];
    for attempt in &delivery.failed {
        lines.push(format!(
            "{}{} failed: {}",
            indent(1),
            attempt.provider,
            attempt.error
        ));
    }
    lines
}

pub fn print_notice(notice: &Notice) {
    print_lines(&format_notice(notice));
}

pub fn print_delivery(delivery: &Delivery) {
    print_lines(&format_delivery(delivery));
}

// ============================================================================
// Validate
// ============================================================================

pub fn format_validation(result: &ValidationResult) -> Vec<String> {
    if result.is_valid() {
        return vec!["Valid".to_string()];
    }
    let mut lines = vec!["Field errors".to_string()];
    for (field, message) in result.iter() {
        lines.push(format!("{}{}: {}", indent(1), field.label(), message));
    }
    lines
}

pub fn print_validation(result: &ValidationResult) {
    print_lines(&format_validation(result));
}

// ============================================================================
// Providers
// ============================================================================

/// The resolved chain in attempt order. Unconfigured providers list their
/// setup steps.
pub fn format_providers(chain: &ProviderChain) -> Vec<String> {
    let mut lines = vec!["Providers".to_string()];
    for (i, slot) in chain.slots().iter().enumerate() {
        let status = if slot.is_configured() {
            "configured"
        } else {
            "not configured"
        };
        lines.push(format!("{} {}: {}", format_index(i + 1), slot.kind(), status));
        if !slot.is_configured() {
            for step in slot.kind().setup_steps() {
                lines.push(format!("{}{}", indent(1), step));
            }
        }
    }
    if !chain.has_configured() {
        lines.push(String::new());
        lines.push("No provider configured: the contact form cannot send mail".to_string());
    }
    lines
}

pub fn print_providers(chain: &ProviderChain) {
    print_lines(&format_providers(chain));
}

// ============================================================================
// Simulate images
// ============================================================================

/// One step of a simulation: a header (e.g. `Mount`) and the fetches it
/// started.
pub fn format_fetch_events(header: &str, events: &[FetchEvent]) -> Vec<String> {
    let mut lines = vec![header.to_string()];
    if events.is_empty() {
        lines.push(format!("{}(no fetches)", indent(1)));
    }
    for event in events {
        let line = match &event.section {
            Some(section) => format!(
                "{}{} [{}] ({})",
                indent(1),
                event.url,
                section,
                event.trigger
            ),
            None => format!("{}{} ({})", indent(1), event.url, event.trigger),
        };
        lines.push(line);
    }
    lines
}

pub fn print_fetch_events(header: &str, events: &[FetchEvent]) {
    print_lines(&format_fetch_events(header, events));
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::delivery::{Attempt, ProviderError, ProviderKind};
    use crate::preload::Trigger;
    use crate::types::FormData;
    use crate::validate::validate_fields;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    // =========================================================================
    // Submit output
    // =========================================================================

    #[test]
    fn success_notice() {
        let lines = format_notice(&Notice::success("info@kolicatch.io"));
        assert_eq!(lines[0], "✓ Form Submitted Successfully!");
        assert!(lines[1].starts_with("    Your message has been sent to info@kolicatch.io."));
    }

    #[test]
    fn error_notice() {
        let lines = format_notice(&Notice::error("Security Alert", "Spam detected"));
        assert_eq!(lines, vec!["✗ Security Alert", "    Spam detected"]);
    }

    #[test]
    fn delivery_lists_failures_before_success() {
        let delivery = Delivery {
            provider: ProviderKind::Web3Forms,
            failed: vec![Attempt {
                provider: ProviderKind::Backend,
                error: ProviderError::Http(500),
            }],
        };
        assert_eq!(
            format_delivery(&delivery),
            vec![
                "    Delivered via Web3Forms",
                "    backend failed: HTTP error! status: 500",
            ]
        );
    }

    // =========================================================================
    // Validate output
    // =========================================================================

    #[test]
    fn valid_form_prints_valid() {
        let result = validate_fields(&crate::test_helpers::valid_form());
        assert_eq!(format_validation(&result), vec!["Valid"]);
    }

    #[test]
    fn errors_listed_in_field_order() {
        let form = FormData {
            name: "A1".into(),
            message: "short".into(),
            ..crate::test_helpers::valid_form()
        };
        let lines = format_validation(&validate_fields(&form));
        assert_eq!(
            lines,
            vec![
                "Field errors",
                "    name: Name can only contain letters and spaces",
                "    message: Message must be at least 10 characters",
            ]
        );
    }

    // =========================================================================
    // Providers output
    // =========================================================================

    #[test]
    fn stock_chain_has_only_web3forms() {
        let chain = ProviderChain::from_config(&SiteConfig::default());
        let lines = format_providers(&chain);
        assert_eq!(lines[0], "Providers");
        assert_eq!(lines[1], "001 backend: not configured");
        assert!(lines.contains(&"003 Web3Forms: configured".to_string()));
        assert!(lines.iter().any(|l| l.contains("KOLICATCH_BACKEND_URL")));
        assert!(!lines.iter().any(|l| l.contains("web3forms.com")));
    }

    #[test]
    fn empty_chain_warns() {
        let mut config = SiteConfig::default();
        config.web3forms.access_key = None;
        let lines = format_providers(&ProviderChain::from_config(&config));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("No provider configured: the contact form cannot send mail")
        );
    }

    // =========================================================================
    // Simulation output
    // =========================================================================

    #[test]
    fn fetch_events_show_section_and_trigger() {
        let events = vec![
            FetchEvent {
                url: "/img/hero.webp".into(),
                section: None,
                trigger: Trigger::Preload,
            },
            FetchEvent {
                url: "/img/pomfret.webp".into(),
                section: Some("catalog".into()),
                trigger: Trigger::SectionVisible,
            },
        ];
        assert_eq!(
            format_fetch_events("Mount", &events),
            vec![
                "Mount",
                "    /img/hero.webp (preload)",
                "    /img/pomfret.webp [catalog] (section visible)",
            ]
        );
    }

    #[test]
    fn no_fetches_is_explicit() {
        assert_eq!(
            format_fetch_events("Scroll to 900px", &[]),
            vec!["Scroll to 900px", "    (no fetches)"]
        );
    }
}
