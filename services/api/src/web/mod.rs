pub mod dto;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use rest::ApiDoc;
pub use state::AppState;

/// Recordings are uploaded through this API, so the body limit is generous.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Builds the router for every REST endpoint.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ai/summary", post(rest::summary_handler))
        .route("/ai/title", post(rest::title_handler))
        .route("/ai/flashcards", post(rest::flashcards_handler))
        .route("/ai/quiz", post(rest::quiz_handler))
        .route("/ai/exercises", post(rest::exercises_handler))
        .route("/ai/feynman-topics", post(rest::feynman_topics_handler))
        .route("/ai/detect-language", post(rest::detect_language_handler))
        .route("/ai/chat", post(rest::chat_handler))
        .route("/ai/transcribe", post(rest::transcribe_handler))
        .route("/links", post(rest::process_link_handler))
        .route("/notes/{note_id}/generate", post(rest::generate_all_handler))
        .route("/notes/{note_id}/study-content", get(rest::study_content_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}
