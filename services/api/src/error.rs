//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how each failure
//! is presented to HTTP clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use study_notes_core::ports::PortError;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while running the database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request itself was unusable: missing header, bad multipart form.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

//=========================================================================================
// HTTP Error Body
//=========================================================================================

/// The JSON body returned with every error response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Machine-readable failure code, e.g. `DAILY_LIMIT_REACHED` or `MALFORMED_OUTPUT`.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

impl ErrorBody {
    fn plain(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            limit: None,
            remaining: None,
            reset_at: None,
        }
    }
}

impl ApiError {
    /// Maps the error to a status and body. Port errors are judged by their root
    /// cause, but keep the full context chain in the message.
    pub fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            ApiError::Port(port_error) => {
                let message = port_error.to_string();
                match port_error.root() {
                    PortError::RateLimited(info) => (
                        StatusCode::TOO_MANY_REQUESTS,
                        ErrorBody {
                            code: info.code.as_str().to_string(),
                            message: info.user_message(),
                            limit: info.limit,
                            remaining: info.remaining,
                            reset_at: info.reset_at,
                        },
                    ),
                    PortError::InvalidInput(_) => {
                        (StatusCode::BAD_REQUEST, ErrorBody::plain("INVALID_INPUT", message))
                    }
                    PortError::NotFound(_) => {
                        (StatusCode::NOT_FOUND, ErrorBody::plain("NOT_FOUND", message))
                    }
                    PortError::Transport(_) => {
                        (StatusCode::BAD_GATEWAY, ErrorBody::plain("TRANSPORT", message))
                    }
                    PortError::EmptyResult(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::plain("EMPTY_RESULT", message),
                    ),
                    PortError::MalformedOutput { .. } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::plain("MALFORMED_OUTPUT", message),
                    ),
                    PortError::RefusalDetected(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::plain("REFUSAL_DETECTED", message),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::plain("INTERNAL", message),
                    ),
                }
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::plain("BAD_REQUEST", message.clone()))
            }
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::plain("INTERNAL", other.to_string()),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use study_notes_core::{RateLimitCode, RateLimitInfo};

    #[test]
    fn rate_limits_become_429_with_their_details() {
        let mut info = RateLimitInfo::new(RateLimitCode::DailyLimitReached);
        info.limit = Some(20);
        info.remaining = Some(0);
        info.reset_at = Utc.with_ymd_and_hms(2026, 10, 20, 0, 0, 0).single();

        let (status, body) = ApiError::from(PortError::RateLimited(info)).status_and_body();
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.code, "DAILY_LIMIT_REACHED");
        assert_eq!(body.limit, Some(20));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["resetAt"], "2026-10-20T00:00:00Z");
    }

    #[test]
    fn wrapped_errors_are_judged_by_their_cause() {
        let err = PortError::Transport("connection reset".into()).context("generate quiz");
        let (status, body) = ApiError::from(err).status_and_body();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.message.starts_with("generate quiz failed"));

        let (status, _) = ApiError::from(PortError::InvalidInput("empty".into())).status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let malformed = PortError::MalformedOutput { preview: "{".into() }.context("generate flashcards");
        let (status, body) = ApiError::from(malformed).status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "MALFORMED_OUTPUT");
    }
}
