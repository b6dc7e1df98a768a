//! crates/study_notes_core/src/ports.rs
//!
//! Defines the service contracts (traits) the generation pipeline depends on.
//! These traits form the boundary of the hexagonal architecture, so the core never
//! knows whether completions come from the hosted backend function or straight from
//! a model provider, or where study content ends up being stored.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    CompletionRequest, LinkContent, LinkType, RateLimitInfo, Role, StudyContent,
    TranscriptionRequest,
};

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// The failure taxonomy shared by every port and every generation operation.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A quota is exhausted. Never retried and never wrapped.
    #[error("Rate limit reached: {0}")]
    RateLimited(RateLimitInfo),

    /// The provider answered successfully but with no content.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// No parseable JSON could be recovered from the model output.
    #[error("Model returned malformed structured output. Preview: {preview}")]
    MalformedOutput { preview: String },

    /// The model declined the task instead of producing data.
    #[error("Model refused the request: {0}")]
    RefusalDetected(String),

    /// Network or HTTP-layer failure, with the original message preserved.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),

    /// Another failure, annotated with the operation it happened in.
    #[error("{operation} failed: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<PortError>,
    },
}

impl PortError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self.root(), PortError::RateLimited(_))
    }

    /// Peels off every `Context` layer.
    pub fn root(&self) -> &PortError {
        match self {
            PortError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Wraps the error with the name of the failing operation.
    /// Rate-limit failures pass through untouched so their fields reach the caller intact.
    pub fn context(self, operation: impl Into<String>) -> PortError {
        match self {
            PortError::RateLimited(_) => self,
            other => PortError::Context {
                operation: operation.into(),
                source: Box::new(other),
            },
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Runs one completion and returns its text.
    ///
    /// Implementations guarantee the returned text is non-empty; empty provider
    /// output is reported as [`PortError::EmptyResult`].
    async fn complete(&self, request: CompletionRequest) -> PortResult<String>;
}

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Turns recorded speech into text. Empty transcripts are failures.
    async fn transcribe(&self, request: TranscriptionRequest) -> PortResult<String>;
}

#[async_trait]
pub trait LinkProcessingService: Send + Sync {
    /// Fetches a URL server-side and returns its readable text.
    async fn process_link(&self, url: &str, link_type: LinkType) -> PortResult<LinkContent>;
}

#[async_trait]
pub trait ObjectStorageService: Send + Sync {
    /// Stores a file under the user's prefix and returns its storage path.
    async fn upload(
        &self,
        user_id: Uuid,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> PortResult<String>;
}

#[async_trait]
pub trait StudyContentRepository: Send + Sync {
    // --- Study Content ---
    async fn get_study_content(&self, note_id: Uuid) -> PortResult<StudyContent>;

    async fn save_study_content(&self, note_id: Uuid, content: &StudyContent) -> PortResult<()>;

    // --- Conversations ---
    async fn get_or_create_conversation(&self, user_id: Uuid, note_id: Uuid) -> PortResult<Uuid>;

    async fn save_message(&self, conversation_id: Uuid, role: Role, content: &str) -> PortResult<()>;
}
