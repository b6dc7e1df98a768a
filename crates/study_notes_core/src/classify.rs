//! crates/study_notes_core/src/classify.rs
//!
//! Turns whatever a hosted-function call produced into one typed result.
//!
//! The function layer reports failures through three channels: the call can fail
//! outright, it can answer with a non-2xx status and an error body, or it can answer
//! 200 with an `error` field in the body. Every channel is checked for quota codes
//! the same way, so callers only ever match on [`PortError`].

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::{RateLimitCode, RateLimitInfo};
use crate::extract::preview;
use crate::ports::{PortError, PortResult};

/// What the transport observed for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOutcome {
    /// No response was received: connection failure, timeout, or a thrown client error.
    Threw(String),
    /// The endpoint answered with this status and body.
    Responded { status: u16, body: String },
}

/// Looks for a quota code in `text`, filling in limit details from `context` when present.
pub fn detect_rate_limit(text: &str, context: Option<&Value>) -> Option<RateLimitInfo> {
    // Account exhaustion is checked first; it is the stronger condition.
    let code = if text.contains(RateLimitCode::AccountLimitReached.as_str()) {
        RateLimitCode::AccountLimitReached
    } else if text.contains(RateLimitCode::DailyLimitReached.as_str()) {
        RateLimitCode::DailyLimitReached
    } else {
        return None;
    };

    let mut info = RateLimitInfo::new(code);
    if let Some(ctx) = context {
        info.limit = find_field(ctx, &["limit"]).and_then(as_u32);
        info.remaining = find_field(ctx, &["remaining"]).and_then(as_u32);
        info.reset_at = find_field(ctx, &["resetAt", "reset_at"]).and_then(as_timestamp);
    }
    Some(info)
}

/// Checks every error channel and returns the JSON payload of a successful call.
pub fn classify_payload(outcome: RawOutcome) -> PortResult<Value> {
    match outcome {
        RawOutcome::Threw(message) => match detect_rate_limit(&message, None) {
            Some(info) => Err(PortError::RateLimited(info)),
            None => Err(PortError::Transport(message)),
        },
        RawOutcome::Responded { status, body } => {
            let parsed = serde_json::from_str::<Value>(&body).ok();

            if !(200..300).contains(&status) {
                if let Some(info) = detect_rate_limit(&body, parsed.as_ref()) {
                    return Err(PortError::RateLimited(info));
                }
                let message = parsed
                    .as_ref()
                    .and_then(error_message)
                    .unwrap_or_else(|| preview(body.trim()));
                return Err(PortError::Transport(format!("HTTP {}: {}", status, message)));
            }

            let payload = parsed.ok_or_else(|| {
                PortError::Transport(format!("Response body is not JSON: {}", preview(body.trim())))
            })?;

            if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
                // The quota code may sit beside `error` rather than inside it.
                if let Some(info) = detect_rate_limit(&body, Some(&payload)) {
                    return Err(PortError::RateLimited(info));
                }
                let message = error_message(&payload).unwrap_or_else(|| error.to_string());
                return Err(PortError::Transport(message));
            }

            Ok(payload)
        }
    }
}

/// Classifies a call whose success payload carries its text under `field`.
/// Missing or blank text is an [`PortError::EmptyResult`].
pub fn classify(outcome: RawOutcome, field: &str) -> PortResult<String> {
    let payload = classify_payload(outcome)?;
    match payload.get(field).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(PortError::EmptyResult(format!("Response contained no `{}`", field))),
    }
}

/// Finds the first of `keys` on the object itself or on its `error`/`details` children.
fn find_field<'a>(ctx: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let scopes = [Some(ctx), ctx.get("error"), ctx.get("details")];
    scopes
        .into_iter()
        .flatten()
        .find_map(|scope| keys.iter().find_map(|k| scope.get(*k)))
}

fn error_message(payload: &Value) -> Option<String> {
    match payload.get("error") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(obj @ Value::Object(_)) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(obj.to_string())),
        _ => payload.get("message").and_then(Value::as_str).map(str::to_string),
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        // Epoch values above 10^11 can only be milliseconds.
        Value::Number(n) => n.as_i64().and_then(|secs| {
            if secs > 100_000_000_000 {
                Utc.timestamp_millis_opt(secs).single()
            } else {
                Utc.timestamp_opt(secs, 0).single()
            }
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limit_code(result: PortResult<String>) -> Option<RateLimitCode> {
        match result {
            Err(PortError::RateLimited(info)) => Some(info.code),
            _ => None,
        }
    }

    #[test]
    fn daily_limit_is_detected_on_every_channel() {
        let thrown = RawOutcome::Threw("FunctionsHttpError: DAILY_LIMIT_REACHED".into());
        let error_payload = RawOutcome::Responded {
            status: 200,
            body: r#"{"error":"Quota exceeded: DAILY_LIMIT_REACHED"}"#.into(),
        };
        let non_2xx = RawOutcome::Responded {
            status: 429,
            body: r#"{"code":"DAILY_LIMIT_REACHED","limit":20,"remaining":0}"#.into(),
        };

        for outcome in [thrown, error_payload, non_2xx] {
            assert_eq!(
                rate_limit_code(classify(outcome, "content")),
                Some(RateLimitCode::DailyLimitReached)
            );
        }
    }

    #[test]
    fn account_limit_is_distinguished() {
        let outcome = RawOutcome::Responded {
            status: 403,
            body: r#"{"error":{"code":"ACCOUNT_LIMIT_REACHED","message":"Free generations used"}}"#.into(),
        };
        assert_eq!(
            rate_limit_code(classify(outcome, "content")),
            Some(RateLimitCode::AccountLimitReached)
        );
    }

    #[test]
    fn limit_details_are_read_from_the_error_context() {
        let outcome = RawOutcome::Responded {
            status: 429,
            body: r#"{"error":{"code":"DAILY_LIMIT_REACHED","limit":20,"remaining":0,"resetAt":"2026-10-20T00:00:00Z"}}"#.into(),
        };
        match classify(outcome, "content") {
            Err(PortError::RateLimited(info)) => {
                assert_eq!(info.limit, Some(20));
                assert_eq!(info.remaining, Some(0));
                assert_eq!(
                    info.reset_at,
                    Some(Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).unwrap())
                );
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn quota_code_beside_a_200_error_is_a_rate_limit() {
        let outcome = RawOutcome::Responded {
            status: 200,
            body: r#"{"error":"Daily limit reached","code":"DAILY_LIMIT_REACHED","limit":20,"remaining":0}"#.into(),
        };
        match classify(outcome, "content") {
            Err(PortError::RateLimited(info)) => {
                assert_eq!(info.code, RateLimitCode::DailyLimitReached);
                assert_eq!(info.limit, Some(20));
                assert_eq!(info.remaining, Some(0));
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn success_returns_the_named_field() {
        let outcome = RawOutcome::Responded { status: 200, body: r#"{"content":"<p>hi</p>"}"#.into() };
        assert_eq!(classify(outcome, "content").unwrap(), "<p>hi</p>");
    }

    #[test]
    fn empty_content_is_a_failure() {
        for body in [r#"{"content":""}"#, r#"{"content":"   "}"#, r#"{}"#, r#"{"text":null}"#] {
            let outcome = RawOutcome::Responded { status: 200, body: body.into() };
            assert!(matches!(classify(outcome, "content"), Err(PortError::EmptyResult(_))));
        }
    }

    #[test]
    fn other_errors_keep_their_message() {
        let outcome = RawOutcome::Responded {
            status: 500,
            body: r#"{"error":{"message":"upstream model overloaded"}}"#.into(),
        };
        match classify(outcome, "content") {
            Err(PortError::Transport(msg)) => assert_eq!(msg, "HTTP 500: upstream model overloaded"),
            other => panic!("unexpected {:?}", other),
        }

        let thrown = classify(RawOutcome::Threw("connection reset".into()), "content");
        assert!(matches!(thrown, Err(PortError::Transport(m)) if m == "connection reset"));

        let error_payload = RawOutcome::Responded { status: 200, body: r#"{"error":"bad model"}"#.into() };
        assert!(matches!(classify(error_payload, "content"), Err(PortError::Transport(m)) if m == "bad model"));
    }

    #[test]
    fn null_error_field_is_not_an_error() {
        let outcome = RawOutcome::Responded {
            status: 200,
            body: r#"{"error":null,"text":"hello there"}"#.into(),
        };
        assert_eq!(classify(outcome, "text").unwrap(), "hello there");
    }

    #[test]
    fn payload_is_returned_whole_for_multi_field_results() {
        let outcome = RawOutcome::Responded {
            status: 200,
            body: r#"{"title":"Intro","content":"Body"}"#.into(),
        };
        let payload = classify_payload(outcome).unwrap();
        assert_eq!(payload["title"], "Intro");
        assert_eq!(payload["content"], "Body");
    }
}
