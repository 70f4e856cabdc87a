//! Input sanitization for contact form fields.
//!
//! Every user-supplied string passes through [`sanitize_input`] before it is
//! validated or sent anywhere. Three patterns are stripped, in order, each in
//! a single left-to-right pass:
//!
//! 1. Angle brackets (`<`, `>`), so no markup survives.
//! 2. The `javascript:` scheme, in any letter case.
//! 3. Inline event-handler attributes: `on` + one or more word characters +
//!    `=` (e.g. `onclick=`, `OnLoad=`), in any letter case.
//!
//! The result is trimmed. Strings that contain none of these patterns come
//! back unchanged apart from the trim, so sanitizing is idempotent on them.
//!
//! Because each pass runs once, input crafted to re-form a pattern after an
//! earlier removal (`java<script:` becomes `javascript:` after step 1 and is
//! then removed by step 2, but `javajavascript:script:` leaves a single
//! `javascript:` behind) is not fully normalized. Outbound HTML is escaped
//! separately by the payload renderer.

/// Strip markup and script-injection patterns from `input` and trim it.
pub fn sanitize_input(input: &str) -> String {
    let without_brackets: String = input.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let without_scheme = remove_ignore_ascii_case(&without_brackets, "javascript:");
    let without_handlers = remove_event_handlers(&without_scheme);
    without_handlers.trim().to_string()
}

/// Remove every non-overlapping occurrence of `needle` (lowercase ASCII),
/// matching ASCII letters case-insensitively.
fn remove_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    // ASCII lowercasing preserves byte offsets, so indices map 1:1.
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find(needle) {
        let start = pos + found;
        out.push_str(&haystack[pos..start]);
        pos = start + needle.len();
    }
    out.push_str(&haystack[pos..]);
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Remove `on<word>=` attribute prefixes.
fn remove_event_handlers(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i].eq_ignore_ascii_case(&b'o') && bytes[i + 1].eq_ignore_ascii_case(&b'n') {
            let word_start = i + 2;
            let word_end = bytes[word_start..]
                .iter()
                .position(|b| !is_word_byte(*b))
                .map_or(bytes.len(), |n| word_start + n);
            if word_end > word_start && bytes.get(word_end) == Some(&b'=') {
                out.push_str(&input[copied..i]);
                i = word_end + 1;
                copied = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&input[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_unchanged() {
        let s = "Please deliver 2kg pomfret weekly";
        assert_eq!(sanitize_input(s), s);
    }

    #[test]
    fn idempotent_on_plain_text() {
        for s in ["Asha Rao", "asha@example.com", "Need 10 kg of prawns, fresh!"] {
            let once = sanitize_input(s);
            assert_eq!(sanitize_input(&once), once);
            assert_eq!(once, s);
        }
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize_input("  Asha Rao \n"), "Asha Rao");
    }

    #[test]
    fn strips_angle_brackets() {
        assert_eq!(sanitize_input("<b>bold</b>"), "bbold/b");
    }

    #[test]
    fn strips_javascript_scheme_any_case() {
        assert_eq!(sanitize_input("JavaScript:alert(1)"), "alert(1)");
        assert_eq!(sanitize_input("go javascript:x and JAVASCRIPT:y"), "go x and y");
    }

    #[test]
    fn bracket_removal_runs_before_scheme_removal() {
        assert_eq!(sanitize_input("java<script:alert(1)"), "alert(1)");
    }

    #[test]
    fn single_pass_leaves_reformed_scheme() {
        assert_eq!(sanitize_input("javajavascript:script:x"), "javascript:x");
    }

    #[test]
    fn strips_event_handlers() {
        assert_eq!(sanitize_input("img onerror=alert(1)"), "img alert(1)");
        assert_eq!(sanitize_input("x OnMouseOver=y"), "x y");
        assert_eq!(sanitize_input("a on_load2=b"), "a b");
    }

    #[test]
    fn handler_needs_word_and_equals() {
        assert_eq!(sanitize_input("on= nothing"), "on= nothing");
        assert_eq!(sanitize_input("only once"), "only once");
        assert_eq!(sanitize_input("onion = soup"), "onion = soup");
    }

    #[test]
    fn handler_match_can_start_inside_a_word() {
        assert_eq!(sanitize_input("moonlight=1"), "mo1");
    }

    #[test]
    fn non_ascii_text_survives() {
        assert_eq!(sanitize_input("Ñoño café ondé"), "Ñoño café ondé");
        assert_eq!(sanitize_input("ü onclick=ü"), "ü ü");
    }

    #[test]
    fn empty_input() {
        assert_eq!(sanitize_input(""), "");
        assert_eq!(sanitize_input("   "), "");
        assert_eq!(sanitize_input("<>"), "");
    }
}
