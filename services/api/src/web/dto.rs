//! services/api/src/web/dto.rs
//!
//! Request and response payloads of the REST API. These mirror the core domain types
//! with OpenAPI schemas attached and convert to and from them at the boundary.

use serde::{Deserialize, Serialize};
use study_notes_core::{
    background::ItemCounts,
    prompts::DEFAULT_LANGUAGE,
    ChatMessage, DetailLevel, DocumentRef, Exercise, FeynmanTopic, Flashcard, LinkContent,
    QuizQuestion, Role, SourceKind, StudyContent, SummaryOptions,
};
use utoipa::ToSchema;
use uuid::Uuid;

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

//=========================================================================================
// Shared Input Types
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevelDto {
    Concise,
    #[default]
    Standard,
    Comprehensive,
}

impl From<DetailLevelDto> for DetailLevel {
    fn from(level: DetailLevelDto) -> Self {
        match level {
            DetailLevelDto::Concise => DetailLevel::Concise,
            DetailLevelDto::Standard => DetailLevel::Standard,
            DetailLevelDto::Comprehensive => DetailLevel::Comprehensive,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceKindDto {
    Audio,
    Link,
    Document,
    Text,
}

/// A source the note was built from, listed in the summary prompt.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DocumentRefDto {
    pub name: String,
    pub kind: SourceKindDto,
}

impl From<DocumentRefDto> for DocumentRef {
    fn from(doc: DocumentRefDto) -> Self {
        let kind = match doc.kind {
            SourceKindDto::Audio => SourceKind::Audio,
            SourceKindDto::Link => SourceKind::Link,
            SourceKindDto::Document => SourceKind::Document,
            SourceKindDto::Text => SourceKind::Text,
        };
        DocumentRef { name: doc.name, kind }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleDto {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatMessageDto {
    pub role: RoleDto,
    pub content: String,
}

impl From<ChatMessageDto> for ChatMessage {
    fn from(message: ChatMessageDto) -> Self {
        let role = match message.role {
            RoleDto::System => Role::System,
            RoleDto::User => Role::User,
            RoleDto::Assistant => Role::Assistant,
        };
        ChatMessage { role, content: message.content }
    }
}

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub content: String,
    #[serde(default)]
    pub detail_level: DetailLevelDto,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub documents: Vec<DocumentRefDto>,
}

impl SummaryRequest {
    pub fn options(&self) -> SummaryOptions {
        let mut options = SummaryOptions::new(self.detail_level.into(), self.language.clone());
        options.documents = self.documents.iter().cloned().map(DocumentRef::from).collect();
        options
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TitleRequest {
    pub content: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Input for every structured generator: the source text and how many items to make.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemsRequest {
    pub content: String,
    pub count: usize,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LanguageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// When present, both turns are stored in this note's conversation.
    pub note_id: Option<Uuid>,
    #[serde(default)]
    pub history: Vec<ChatMessageDto>,
    pub message: String,
    pub note_context: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkRequest {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemCountsDto {
    pub flashcards: usize,
    pub quiz_questions: usize,
    pub exercises: usize,
    pub feynman_topics: usize,
}

impl From<ItemCountsDto> for ItemCounts {
    fn from(counts: ItemCountsDto) -> Self {
        ItemCounts {
            flashcards: counts.flashcards,
            quiz_questions: counts.quiz_questions,
            exercises: counts.exercises,
            feynman_topics: counts.feynman_topics,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAllRequest {
    #[serde(flatten)]
    pub summary: SummaryRequest,
    /// Items per content kind; defaults to 10 flashcards, 5 questions, 3 exercises, 5 topics.
    pub counts: Option<ItemCountsDto>,
}

//=========================================================================================
// Response Payloads
//=========================================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TitleResponse {
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LanguageResponse {
    pub language: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptionResponse {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LinkResponse {
    pub title: String,
    pub content: String,
}

impl From<LinkContent> for LinkResponse {
    fn from(link: LinkContent) -> Self {
        Self { title: link.title, content: link.content }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationAccepted {
    pub note_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlashcardDto {
    pub front: String,
    pub back: String,
}

impl From<Flashcard> for FlashcardDto {
    fn from(card: Flashcard) -> Self {
        Self { front: card.front, back: card.back }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionDto {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<usize>,
}

impl From<QuizQuestion> for QuizQuestionDto {
    fn from(q: QuizQuestion) -> Self {
        Self {
            question: q.question,
            options: q.options,
            correct_answer: q.correct_answer,
            user_answer: q.user_answer,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExerciseDto {
    pub question: String,
    pub solution: String,
    pub notes: String,
}

impl From<Exercise> for ExerciseDto {
    fn from(e: Exercise) -> Self {
        Self { question: e.question, solution: e.solution, notes: e.notes }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeynmanTopicDto {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl From<FeynmanTopic> for FeynmanTopicDto {
    fn from(t: FeynmanTopic) -> Self {
        Self { id: t.id, title: t.title, description: t.description }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlashcardsResponse {
    pub flashcards: Vec<FlashcardDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestionDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExercisesResponse {
    pub exercises: Vec<ExerciseDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeynmanTopicsResponse {
    pub topics: Vec<FeynmanTopicDto>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudyContentDto {
    pub summary: String,
    pub flashcards: Vec<FlashcardDto>,
    pub quiz_questions: Vec<QuizQuestionDto>,
    pub exercises: Vec<ExerciseDto>,
    pub feynman_topics: Vec<FeynmanTopicDto>,
}

pub(crate) fn convert_all<T, U: From<T>>(items: Vec<T>) -> Vec<U> {
    items.into_iter().map(U::from).collect()
}

impl From<StudyContent> for StudyContentDto {
    fn from(content: StudyContent) -> Self {
        Self {
            summary: content.summary,
            flashcards: convert_all(content.flashcards),
            quiz_questions: convert_all(content.quiz_questions),
            exercises: convert_all(content.exercises),
            feynman_topics: convert_all(content.feynman_topics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_requests_fill_defaults() {
        let request: SummaryRequest = serde_json::from_str(r#"{"content":"notes"}"#).unwrap();
        let options = request.options();
        assert_eq!(options.detail, DetailLevel::Standard);
        assert_eq!(options.language, "en");
        assert!(options.documents.is_empty());
    }

    #[test]
    fn generate_all_accepts_summary_fields_inline() {
        let request: GenerateAllRequest = serde_json::from_str(
            r#"{"content":"notes","detailLevel":"comprehensive","language":"de",
                "documents":[{"name":"lecture.pdf","kind":"document"}],
                "counts":{"flashcards":4,"quizQuestions":2,"exercises":1,"feynmanTopics":3}}"#,
        )
        .unwrap();
        let options = request.summary.options();
        assert_eq!(options.detail, DetailLevel::Comprehensive);
        assert_eq!(options.documents[0].kind, SourceKind::Document);
        assert_eq!(ItemCounts::from(request.counts.unwrap()).quiz_questions, 2);
    }
}
