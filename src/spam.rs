//! Heuristic spam detection for contact messages.
//!
//! A message is flagged when it contains any of the curated phrases, or at
//! least [`LINK_THRESHOLD`] email addresses, or at least [`LINK_THRESHOLD`]
//! URLs. One or two links are normal in an order
//! ("see www.example.com/menu").

/// Phrases that only show up in junk mail, matched case-insensitively.
pub const SPAM_PHRASES: &[&str] = &[
    "click here",
    "buy now",
    "limited time",
    "act now",
    "urgent",
    "viagra",
    "casino",
    "lottery",
];

/// Number of email- or URL-like substrings at which a message is spam.
pub const LINK_THRESHOLD: usize = 3;

/// True if `text` looks like spam.
pub fn detect_spam(text: &str) -> bool {
    contains_spam_phrase(text)
        || count_email_like(text) >= LINK_THRESHOLD
        || count_url_like(text) >= LINK_THRESHOLD
}

pub fn contains_spam_phrase(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    SPAM_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Count URLs introduced by `http`, `https`, or `www.`. A match consumes
/// the rest of its whitespace-delimited token, so `https://www.a.com` is one.
pub fn count_url_like(text: &str) -> usize {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(b"http") || rest.starts_with(b"www.") {
            count += 1;
            i += rest
                .iter()
                .position(u8::is_ascii_whitespace)
                .unwrap_or(rest.len());
        } else {
            i += 1;
        }
    }
    count
}

fn is_local_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'%' | b'+' | b'-')
}

fn is_domain_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-')
}

/// Count `local@domain.tld` shapes, where the TLD is two or more letters.
pub fn count_email_like(text: &str) -> usize {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(at, &b)| b == b'@' && at > 0 && is_local_byte(bytes[at - 1]))
        .filter(|&(at, _)| {
            let domain_start = at + 1;
            let domain_end = bytes[domain_start..]
                .iter()
                .position(|b| !is_domain_byte(*b))
                .map_or(bytes.len(), |n| domain_start + n);
            has_dotted_tld(&bytes[domain_start..domain_end])
        })
        .count()
}

/// True if `domain` has a label, a dot, then at least two letters.
fn has_dotted_tld(domain: &[u8]) -> bool {
    domain.iter().enumerate().any(|(dot, &b)| {
        b == b'.'
            && dot > 0
            && domain[dot + 1..]
                .iter()
                .take_while(|c| c.is_ascii_alphabetic())
                .count()
                >= 2
    })
}
