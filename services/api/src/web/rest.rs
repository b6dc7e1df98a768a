//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ApiError, ErrorBody};
use crate::web::dto::*;
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use study_notes_core::{
    background::{generate_all, ItemCounts, NoteGenerationJob},
    chat::{converse, ChatTurn},
    ingest::{process_web_link, transcribe_audio, AudioUpload},
    ChatMessage,
};
use tracing::{info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        summary_handler,
        title_handler,
        flashcards_handler,
        quiz_handler,
        exercises_handler,
        feynman_topics_handler,
        detect_language_handler,
        chat_handler,
        transcribe_handler,
        process_link_handler,
        generate_all_handler,
        study_content_handler,
    ),
    components(
        schemas(
            SummaryRequest, SummaryResponse, TitleRequest, TitleResponse, ItemsRequest,
            FlashcardsResponse, QuizResponse, ExercisesResponse, FeynmanTopicsResponse,
            LanguageRequest, LanguageResponse, ChatRequest, ChatResponse,
            TranscriptionResponse, LinkRequest, LinkResponse, GenerateAllRequest,
            GenerationAccepted, StudyContentDto, ErrorBody,
        )
    ),
    tags(
        (name = "Study Notes API", description = "Study material generation from lecture notes, recordings and links.")
    )
)]
pub struct ApiDoc;

/// Reads the caller's id from the `x-user-id` header.
fn user_id_from(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("x-user-id header is required".to_string()))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid x-user-id format".to_string()))
}

//=========================================================================================
// Generation Handlers
//=========================================================================================

/// Summarize notes into HTML study notes.
///
/// Long input is summarized in parts and merged.
#[utoipa::path(
    post,
    path = "/ai/summary",
    request_body = SummaryRequest,
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 400, description = "Empty input", body = ErrorBody),
        (status = 429, description = "Generation quota reached", body = ErrorBody),
        (status = 500, description = "Generation failed", body = ErrorBody)
    )
)]
pub async fn summary_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = app_state
        .generator
        .generate_summary(&request.content, &request.options())
        .await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Suggest a short title for a note.
#[utoipa::path(
    post,
    path = "/ai/title",
    request_body = TitleRequest,
    responses(
        (status = 200, description = "Title generated", body = TitleResponse),
        (status = 429, description = "Generation quota reached", body = ErrorBody)
    )
)]
pub async fn title_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<TitleRequest>,
) -> Result<Json<TitleResponse>, ApiError> {
    let title = app_state
        .generator
        .generate_title(&request.content, &request.language)
        .await?;
    Ok(Json(TitleResponse { title }))
}

/// Generate flashcards.
#[utoipa::path(
    post,
    path = "/ai/flashcards",
    request_body = ItemsRequest,
    responses(
        (status = 200, description = "At most `count` flashcards", body = FlashcardsResponse),
        (status = 429, description = "Generation quota reached", body = ErrorBody),
        (status = 500, description = "Model output unusable", body = ErrorBody)
    )
)]
pub async fn flashcards_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ItemsRequest>,
) -> Result<Json<FlashcardsResponse>, ApiError> {
    let flashcards = app_state
        .generator
        .generate_flashcards(&request.content, request.count, &request.language)
        .await?;
    Ok(Json(FlashcardsResponse { flashcards: convert_all(flashcards) }))
}

/// Generate multiple-choice quiz questions.
#[utoipa::path(
    post,
    path = "/ai/quiz",
    request_body = ItemsRequest,
    responses(
        (status = 200, description = "At most `count` questions with four options each", body = QuizResponse),
        (status = 429, description = "Generation quota reached", body = ErrorBody),
        (status = 500, description = "Model output unusable", body = ErrorBody)
    )
)]
pub async fn quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ItemsRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let questions = app_state
        .generator
        .generate_quiz(&request.content, request.count, &request.language)
        .await?;
    Ok(Json(QuizResponse { questions: convert_all(questions) }))
}

/// Generate practice exercises with worked solutions.
#[utoipa::path(
    post,
    path = "/ai/exercises",
    request_body = ItemsRequest,
    responses(
        (status = 200, description = "At most `count` exercises", body = ExercisesResponse),
        (status = 429, description = "Generation quota reached", body = ErrorBody),
        (status = 500, description = "Model output unusable", body = ErrorBody)
    )
)]
pub async fn exercises_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ItemsRequest>,
) -> Result<Json<ExercisesResponse>, ApiError> {
    let exercises = app_state
        .generator
        .generate_exercises(&request.content, request.count, &request.language)
        .await?;
    Ok(Json(ExercisesResponse { exercises: convert_all(exercises) }))
}

/// Suggest topics to explain with the Feynman technique.
///
/// Never fails: an empty list means nothing usable was generated.
#[utoipa::path(
    post,
    path = "/ai/feynman-topics",
    request_body = ItemsRequest,
    responses(
        (status = 200, description = "Topics, possibly none", body = FeynmanTopicsResponse)
    )
)]
pub async fn feynman_topics_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ItemsRequest>,
) -> Json<FeynmanTopicsResponse> {
    let topics = app_state
        .generator
        .generate_feynman_topics(&request.content, request.count, &request.language)
        .await;
    Json(FeynmanTopicsResponse { topics: convert_all(topics) })
}

/// Detect the language of a text as an ISO 639-1 code.
#[utoipa::path(
    post,
    path = "/ai/detect-language",
    request_body = LanguageRequest,
    responses(
        (status = 200, description = "Detected language, `en` when unsure", body = LanguageResponse),
        (status = 429, description = "Generation quota reached", body = ErrorBody)
    )
)]
pub async fn detect_language_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<LanguageRequest>,
) -> Result<Json<LanguageResponse>, ApiError> {
    let language = app_state.generator.detect_language(&request.content).await?;
    Ok(Json(LanguageResponse { language }))
}

/// Chat with the study assistant about a note.
#[utoipa::path(
    post,
    path = "/ai/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Missing header or empty message", body = ErrorBody),
        (status = 429, description = "Generation quota reached", body = ErrorBody)
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let user_id = user_id_from(&headers)?;
    let turn = ChatTurn {
        user_id,
        note_id: request.note_id,
        history: request.history.into_iter().map(ChatMessage::from).collect(),
        message: request.message,
        note_context: request.note_context,
        language: request.language,
    };
    let reply = converse(&app_state.generator, app_state.repo.as_ref(), turn).await?;
    Ok(Json(ChatResponse { reply }))
}

//=========================================================================================
// Ingestion Handlers
//=========================================================================================

/// Transcribe an audio recording.
///
/// Accepts a multipart/form-data request with a `file` part and an optional
/// `language` text part.
#[utoipa::path(
    post,
    path = "/ai/transcribe",
    request_body(content_type = "multipart/form-data", description = "The recording to transcribe."),
    responses(
        (status = 200, description = "Transcript", body = TranscriptionResponse),
        (status = 400, description = "Missing header or file", body = ErrorBody),
        (status = 429, description = "Generation quota reached", body = ErrorBody),
        (status = 502, description = "Upload or transcription failed", body = ErrorBody)
    ),
    params(
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn transcribe_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let user_id = user_id_from(&headers)?;

    let mut upload = None;
    let mut language = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("language") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read language: {}", e)))?;
                language = Some(text.trim().to_string()).filter(|l| !l.is_empty());
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("recording.webm").to_string();
                let mime_type = field.content_type().unwrap_or("audio/webm").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file bytes: {}", e)))?;
                upload = Some(AudioUpload { file_name, mime_type, data: data.to_vec() });
            }
            _ => {}
        }
    }

    let upload = upload
        .ok_or_else(|| ApiError::BadRequest("Multipart form must include a file".to_string()))?;
    let text = transcribe_audio(
        app_state.storage.as_ref(),
        app_state.transcriber.as_ref(),
        &app_state.config.generation,
        user_id,
        upload,
        language.as_deref(),
    )
    .await?;
    Ok(Json(TranscriptionResponse { text }))
}

/// Extract the readable text behind a web or Google Drive link.
#[utoipa::path(
    post,
    path = "/links",
    request_body = LinkRequest,
    responses(
        (status = 200, description = "Page title and text", body = LinkResponse),
        (status = 400, description = "Unsupported or invalid URL", body = ErrorBody),
        (status = 502, description = "Link processor failed", body = ErrorBody)
    )
)]
pub async fn process_link_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, ApiError> {
    let content = process_web_link(app_state.links.as_ref(), &request.url).await?;
    Ok(Json(LinkResponse::from(content)))
}

//=========================================================================================
// Note Handlers
//=========================================================================================

/// Generate every kind of study content for a note in the background.
///
/// Answers immediately; results are stored as each kind completes.
#[utoipa::path(
    post,
    path = "/notes/{note_id}/generate",
    request_body = GenerateAllRequest,
    responses(
        (status = 202, description = "Generation started", body = GenerationAccepted),
        (status = 400, description = "Empty input", body = ErrorBody)
    ),
    params(
        ("note_id" = Uuid, Path, description = "The note to generate content for.")
    )
)]
pub async fn generate_all_handler(
    State(app_state): State<Arc<AppState>>,
    Path(note_id): Path<Uuid>,
    Json(request): Json<GenerateAllRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.summary.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Note content is empty".to_string()));
    }

    let job = NoteGenerationJob {
        note_id,
        content: request.summary.content.clone(),
        options: request.summary.options(),
        counts: request.counts.map(ItemCounts::from).unwrap_or_default(),
    };

    let state = app_state.clone();
    tokio::spawn(async move {
        let report = generate_all(&state.generator, state.repo.as_ref(), job).await;
        if report.is_complete() {
            info!("All study content generated for note {}", note_id);
        } else {
            warn!("Note {} finished with failures: {:?}", note_id, report.failed);
        }
    });

    Ok((StatusCode::ACCEPTED, Json(GenerationAccepted { note_id })))
}

/// Read the study content stored for a note.
#[utoipa::path(
    get,
    path = "/notes/{note_id}/study-content",
    responses(
        (status = 200, description = "Stored content, empty when nothing was generated yet", body = StudyContentDto),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    params(
        ("note_id" = Uuid, Path, description = "The note whose content to read.")
    )
)]
pub async fn study_content_handler(
    State(app_state): State<Arc<AppState>>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<StudyContentDto>, ApiError> {
    let content = app_state.repo.get_study_content(note_id).await?;
    Ok(Json(StudyContentDto::from(content)))
}
