//! crates/study_notes_core/src/extract.rs
//!
//! Recovers a JSON document from model output that may be wrapped in code fences or
//! surrounded by prose. Extraction never fails; callers check validity themselves with
//! [`is_valid_json`] and report [`preview`] of the text when it is not.

use regex::Regex;
use std::sync::OnceLock;

/// Longest preview of bad model output carried in error messages.
pub const PREVIEW_CHARS: usize = 200;

fn fenced_block() -> &'static Regex {
    static FENCED: OnceLock<Regex> = OnceLock::new();
    FENCED.get_or_init(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)```").expect("fenced block pattern compiles"))
}

/// True if `text` parses as any JSON value.
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// At most [`PREVIEW_CHARS`] characters of `text`, ending in an ellipsis when cut.
pub fn preview(text: &str) -> String {
    const ELLIPSIS: &str = "...";
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(PREVIEW_CHARS - ELLIPSIS.len()).collect();
    format!("{}{}", head, ELLIPSIS)
}

/// Finds the first `open` bracket and returns the text up to its matching `close`.
///
/// Brackets inside string literals are ignored, and a backslash inside a string
/// skips the character after it. Returns `None` when the bracket never closes.
pub fn balanced_span(text: &str, open: u8, close: u8) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == open)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                // Brackets are ASCII, so both ends sit on char boundaries.
                return Some(&text[start..=start + offset]);
            }
        }
    }
    None
}

/// Pulls the most plausible JSON document out of a model response.
///
/// Tried in order, first valid candidate wins: the whole trimmed response; the body of
/// a code fence; the first balanced `[...]`; the first balanced `{...}`. When nothing
/// parses, the trimmed response is returned unchanged.
pub fn extract_json(raw: &str) -> String {
    let trimmed = raw.trim();

    if is_valid_json(trimmed) {
        return trimmed.to_string();
    }

    if let Some(body) = fenced_block()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
    {
        if is_valid_json(body) {
            return body.to_string();
        }
    }

    for (open, close) in [(b'[', b']'), (b'{', b'}')] {
        if let Some(span) = balanced_span(trimmed, open, close) {
            if is_valid_json(span) {
                return span.to_string();
            }
        }
    }

    trimmed.to_string()
}
