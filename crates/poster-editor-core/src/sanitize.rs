//! Input sanitizer.
//!
//! Strips dangerous elements, `javascript:` references and inline event
//! handlers, HTML-escapes what is left, and truncates to a code-unit bound.
//! Existing character references are kept as-is so sanitizing twice is a no-op.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Default truncation bound, in UTF-16 code units.
pub const MAX_INPUT_LEN: usize = 500;

const BODY_TAGS: [&str; 5] = ["script", "iframe", "object", "embed", "style"];

static ELEMENTS_WITH_BODY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BODY_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("element pattern is valid")
        })
        .collect()
});

/// Opening or closing tags left over after body removal (unterminated elements,
/// and the bodiless `link`/`meta`).
static LONE_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:script|iframe|object|embed|style|link|meta)\b[^>]*>?")
        .expect("lone tag pattern is valid")
});

static JS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("scheme pattern is valid"));

static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon[a-z]+\s*=").expect("handler pattern is valid"));

/// A named or numeric character reference.
static CHAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("character reference pattern is valid")
});

/// Sanitize with the default length bound.
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, MAX_INPUT_LEN)
}

pub fn sanitize_with_limit(input: &str, max_units: usize) -> String {
    let stripped = strip_dangerous(input);
    let escaped = escape_text(&stripped);
    let truncated = truncate_units(&escaped, max_units);
    if truncated.len() < escaped.len() {
        tracing::debug!(
            target: "poster::sanitize",
            original = escaped.len(),
            kept = truncated.len(),
            "truncated input"
        );
    }
    truncated.to_string()
}

/// Remove dangerous constructs until none are left.
///
/// Removal can join fragments into a new match (`jav<script></script>ascript:`),
/// so the passes repeat until a fixpoint. Every pass only deletes, so it ends.
fn strip_dangerous(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let mut next = current.clone();
        for pattern in ELEMENTS_WITH_BODY.iter() {
            next = pattern.replace_all(&next, "").into_owned();
        }
        next = LONE_TAGS.replace_all(&next, "").into_owned();
        next = JS_SCHEME.replace_all(&next, "").into_owned();
        next = EVENT_HANDLER.replace_all(&next, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Escape `&`, `<` and `>` outside of existing character references.
fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for m in CHAR_REF.find_iter(input) {
        out.push_str(&html_escape::encode_text(&input[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&html_escape::encode_text(&input[last..]));
    out
}

/// Longest prefix of at most `max_units` UTF-16 code units that never splits
/// a surrogate pair or a character reference.
fn truncate_units(input: &str, max_units: usize) -> &str {
    let mut refs = CHAR_REF.find_iter(input).peekable();
    let mut units = 0;
    let mut idx = 0;
    while idx < input.len() {
        let (end, len) = match refs.peek() {
            Some(m) if m.start() == idx => {
                let end = m.end();
                refs.next();
                // Character references are ASCII, one unit per byte.
                (end, end - idx)
            }
            _ => {
                let Some(c) = input[idx..].chars().next() else {
                    break;
                };
                (idx + c.len_utf8(), c.len_utf16())
            }
        };
        if units + len > max_units {
            return &input[..idx];
        }
        units += len;
        idx = end;
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_removed() {
        let out = sanitize("<script>alert(1)</script>hello");
        assert!(!out.contains("<script"));
        assert!(out.contains("hello"));
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_dangerous_constructs() {
        assert_eq!(
            sanitize(r#"<a href="javascript:alert(1)" onclick="x()">go</a>"#),
            r#"&lt;a href="alert(1)" "x()"&gt;go&lt;/a&gt;"#
        );
        assert_eq!(sanitize("<IFRAME src=x></iframe>ok"), "ok");
        assert_eq!(sanitize("<style>p{}</style><meta charset=x>ok"), "ok");
    }

    #[test]
    fn test_removal_reaches_fixpoint() {
        assert_eq!(sanitize("javajavascript:script:x"), "x");
    }

    #[test]
    fn test_event_word_boundary() {
        // Words that merely contain "on" are not handlers.
        assert_eq!(sanitize("Monday = fun"), "Monday = fun");
    }

    #[test]
    fn test_escapes_and_keeps_references() {
        assert_eq!(sanitize("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(sanitize("I&nbsp;can"), "I&nbsp;can");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "<b>bold</b> & <i>x</i>",
            "plain text",
            "I can [] swim",
            "<script>x</script>on",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_truncation_bound() {
        let long = "a".repeat(600);
        assert_eq!(sanitize(&long).len(), 500);
    }

    #[test]
    fn test_truncation_keeps_references_whole() {
        let input = format!("{}&", "a".repeat(498));
        // "&" escapes to "&amp;" which would cross the bound.
        assert_eq!(sanitize(&input), "a".repeat(498));
    }

    #[test]
    fn test_truncation_keeps_surrogates_whole() {
        let input = format!("{}😀", "a".repeat(499));
        assert_eq!(sanitize(&input), "a".repeat(499));
        let again = sanitize(&sanitize(&input));
        assert_eq!(again, "a".repeat(499));
    }
}
