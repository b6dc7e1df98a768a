pub mod background;
pub mod chat;
pub mod chunker;
pub mod classify;
pub mod domain;
pub mod extract;
pub mod generator;
pub mod ingest;
pub mod ports;
pub mod prompts;
pub mod sanitize;
mod structured;
mod summary;

pub use domain::{
    ChatMessage, CompletionRequest, ContentKind, DetailLevel, DocumentRef, Exercise, FeynmanTopic,
    Flashcard, LinkContent, LinkType, QuizQuestion, RateLimitCode, RateLimitInfo, Role, SourceKind,
    StudyContent, TranscriptionRequest, TranscriptionSource,
};
pub use generator::StudyContentGenerator;
pub use ports::{
    CompletionService, LinkProcessingService, ObjectStorageService, PortError, PortResult,
    StudyContentRepository, TranscriptionService,
};
pub use prompts::{DetailProfile, GenerationConfig, SummaryOptions};
pub use structured::looks_like_refusal;
