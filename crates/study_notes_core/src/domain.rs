//! crates/study_notes_core/src/domain.rs
//!
//! Defines the core data structures for study-content generation.
//! These types carry no knowledge of HTTP, databases or any particular model provider;
//! they only derive `serde` so the same shapes can be read out of model output
//! and handed to storage unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//=========================================================================================
// Conversation
//=========================================================================================

/// The author of a single chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a conversation. Order within a conversation is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A single request to the completion endpoint. Built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    /// Sampling temperature, clamped to `[0, 1]` on construction.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            messages,
            model: model.into(),
            temperature: temperature.clamp(0.0, 1.0),
        }
    }
}

//=========================================================================================
// Generation Options
//=========================================================================================

/// How much of the source a generated summary should keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Concise,
    #[default]
    Standard,
    Comprehensive,
}

/// The kind of material a note was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Audio,
    Link,
    Document,
    Text,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Audio => "audio recording",
            SourceKind::Link => "web link",
            SourceKind::Document => "document",
            SourceKind::Text => "typed text",
        }
    }
}

/// An entry of the document manifest embedded in summary prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub kind: SourceKind,
}

/// Identifies one independently generated field of [`StudyContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Summary,
    Flashcards,
    Quiz,
    Exercises,
    FeynmanTopics,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Summary => "summary",
            ContentKind::Flashcards => "flashcards",
            ContentKind::Quiz => "quiz",
            ContentKind::Exercises => "exercises",
            ContentKind::FeynmanTopics => "feynman_topics",
        }
    }
}

//=========================================================================================
// Study Content
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// A multiple-choice question with exactly four options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    /// Filled in by the client once the learner picks an option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<usize>,
}

impl QuizQuestion {
    pub const OPTION_COUNT: usize = 4;

    /// True when the question has four options and the answer index points at one of them.
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() == Self::OPTION_COUNT
            && self.correct_answer < Self::OPTION_COUNT
    }

    /// Whether the learner's chosen index matches the correct one.
    pub fn is_correct(&self) -> bool {
        self.user_answer == Some(self.correct_answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub question: String,
    pub solution: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeynmanTopic {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Everything generated for one note. Each field is either empty or complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyContent {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    #[serde(default)]
    pub quiz_questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub feynman_topics: Vec<FeynmanTopic>,
}

//=========================================================================================
// Quotas
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateLimitCode {
    /// The rolling per-day allowance is used up.
    #[serde(rename = "DAILY_LIMIT_REACHED")]
    DailyLimitReached,
    /// The one-time lifetime allowance of the account is used up.
    #[serde(rename = "ACCOUNT_LIMIT_REACHED")]
    AccountLimitReached,
}

impl RateLimitCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitCode::DailyLimitReached => "DAILY_LIMIT_REACHED",
            RateLimitCode::AccountLimitReached => "ACCOUNT_LIMIT_REACHED",
        }
    }
}

/// Quota details surfaced to the end user when a generation call is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub code: RateLimitCode,
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    pub fn new(code: RateLimitCode) -> Self {
        Self { code, limit: None, remaining: None, reset_at: None }
    }

    /// A message suitable for showing to the learner as-is.
    pub fn user_message(&self) -> String {
        match self.code {
            RateLimitCode::DailyLimitReached => {
                let mut msg = match self.limit {
                    Some(limit) => format!("You've reached your daily limit of {} AI generations.", limit),
                    None => "You've reached your daily limit of AI generations.".to_string(),
                };
                if let Some(reset_at) = self.reset_at {
                    msg.push_str(&format!(" It resets at {}.", reset_at.format("%Y-%m-%d %H:%M UTC")));
                } else {
                    msg.push_str(" Please try again tomorrow.");
                }
                msg
            }
            RateLimitCode::AccountLimitReached => {
                "You've used all of the AI generations included with your account.".to_string()
            }
        }
    }
}

impl fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.user_message())
    }
}

//=========================================================================================
// Ingestion
//=========================================================================================

/// How the link-processing endpoint should treat a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    GoogleDrive,
    Web,
    Unknown,
}

/// Text pulled out of a web page or shared document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkContent {
    pub title: String,
    pub content: String,
}

/// Where the transcription endpoint should read audio from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionSource {
    /// Audio already placed in object storage.
    StoragePath(String),
    /// Small recordings sent in the request body.
    Inline { audio: Vec<u8>, mime_type: String },
}

/// A transcription call: the audio source plus optional hints for the speech model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionRequest {
    pub source: TranscriptionSource,
    pub language: Option<String>,
    pub prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize, user: Option<usize>) -> QuizQuestion {
        QuizQuestion {
            question: "What is 2 + 2?".to_string(),
            options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            correct_answer: correct,
            user_answer: user,
        }
    }

    #[test]
    fn quiz_correctness_compares_indices() {
        assert!(question(1, Some(1)).is_correct());
        assert!(!question(1, Some(2)).is_correct());
        assert!(!question(1, None).is_correct());
    }

    #[test]
    fn quiz_shape_requires_four_options() {
        let mut q = question(3, None);
        assert!(q.is_well_formed());
        q.correct_answer = 4;
        assert!(!q.is_well_formed());
        q.correct_answer = 0;
        q.options.pop();
        assert!(!q.is_well_formed());
    }

    #[test]
    fn quiz_question_reads_camel_case_without_user_answer() {
        let q: QuizQuestion = serde_json::from_str(
            r#"{"question":"Q","options":["a","b","c","d"],"correctAnswer":2}"#,
        )
        .unwrap();
        assert_eq!(q.correct_answer, 2);
        assert_eq!(q.user_answer, None);
    }

    #[test]
    fn temperature_is_clamped() {
        let req = CompletionRequest::new(vec![], "m", 1.7);
        assert_eq!(req.temperature, 1.0);
    }

    #[test]
    fn account_limit_message_differs_from_daily() {
        let daily = RateLimitInfo::new(RateLimitCode::DailyLimitReached).user_message();
        let account = RateLimitInfo::new(RateLimitCode::AccountLimitReached).user_message();
        assert!(daily.contains("daily"));
        assert!(!account.contains("daily"));
    }
}
