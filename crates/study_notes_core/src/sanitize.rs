//! crates/study_notes_core/src/sanitize.rs
//!
//! Cleans free-form model output (HTML summaries, titles) of the wrapping artifacts
//! models like to add: markdown fences and stray quotation marks.
//! This is artifact cleanup only, not an HTML sanitizer.

use regex::Regex;
use std::sync::OnceLock;

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?is)^```[a-z0-9_+\-]*[ \t]*\r?\n?(.*?)\r?\n?```$").expect("fence pattern compiles")
    })
}

fn leading_paragraph_quote() -> &'static Regex {
    static LEADING: OnceLock<Regex> = OnceLock::new();
    LEADING.get_or_init(|| Regex::new(r#"^(<p[^>]*>)\s*["'“”]"#).expect("leading quote pattern compiles"))
}

fn trailing_paragraph_quote() -> &'static Regex {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    TRAILING.get_or_init(|| Regex::new(r#"["'“”]\s*(</p>)$"#).expect("trailing quote pattern compiles"))
}

/// If the whole text is one fenced code block, returns its trimmed body.
pub fn strip_code_fence(text: &str) -> Option<&str> {
    fence_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Removes one pair of matching double or single quotes spanning the whole text.
pub fn strip_wrapping_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return text[1..text.len() - 1].trim();
        }
    }
    text
}

/// Cleans a raw model response.
///
/// In order: trim; unwrap a whole-text code fence; drop one pair of wrapping quotes;
/// drop a quote right after the opening `<p>` and right before the closing `</p>`.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = strip_code_fence(trimmed).unwrap_or(trimmed);
    let unquoted = strip_wrapping_quotes(unfenced);

    let cleaned = leading_paragraph_quote().replace(unquoted, "$1");
    let cleaned = trailing_paragraph_quote().replace(&cleaned, "$1");
    cleaned.into_owned()
}
