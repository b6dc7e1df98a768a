//! crates/study_notes_core/src/structured.rs
//!
//! Generators for JSON-shaped study content: flashcards, quiz questions, exercises
//! and Feynman topics. Each one asks for an exact count, rejects refusals before
//! touching the output, extracts and validates the JSON, drops malformed items and
//! truncates to the requested count. A short answer is returned as-is.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, warn};

use crate::chunker::truncate_chars;
use crate::domain::{Exercise, FeynmanTopic, Flashcard, QuizQuestion};
use crate::extract::{extract_json, is_valid_json, preview};
use crate::generator::StudyContentGenerator;
use crate::ports::{PortError, PortResult};
use crate::prompts::{self, Prompt};

const REFUSAL_OPENINGS: &[&str] = &[
    "i cannot",
    "i can't",
    "i can not",
    "i'm unable",
    "i am unable",
    "unable to",
    "i'm sorry",
    "i am sorry",
    "sorry,",
];

/// Best-effort check for an apology or refusal in place of data.
///
/// English-only. Text that opens like JSON is never treated as a refusal.
pub fn looks_like_refusal(raw: &str) -> bool {
    let lower = raw.trim().to_lowercase();
    if lower.starts_with('[') || lower.starts_with('{') || lower.starts_with("```") {
        return false;
    }
    REFUSAL_OPENINGS.iter().any(|p| lower.starts_with(p))
        || (lower.contains("sorry") && lower.contains("cannot"))
}

/// Implemented by every item type a structured generator can return.
trait StudyItem: DeserializeOwned {
    fn is_usable(&self) -> bool;
}

impl StudyItem for Flashcard {
    fn is_usable(&self) -> bool {
        !self.front.trim().is_empty() && !self.back.trim().is_empty()
    }
}

impl StudyItem for QuizQuestion {
    fn is_usable(&self) -> bool {
        self.is_well_formed()
    }
}

impl StudyItem for Exercise {
    fn is_usable(&self) -> bool {
        !self.question.trim().is_empty() && !self.solution.trim().is_empty()
    }
}

impl StudyItem for FeynmanTopic {
    fn is_usable(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Reads a list of items out of already-validated JSON.
///
/// Accepts a bare array or an object holding one (`{"flashcards": [...]}`).
/// Items that do not deserialize or fail validation are skipped.
fn parse_items<T: StudyItem>(json: &str, kind: &str) -> PortResult<Vec<T>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|_| PortError::MalformedOutput { preview: preview(json) })?;

    let elements = match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .ok_or_else(|| PortError::MalformedOutput { preview: preview(json) })?,
        _ => return Err(PortError::MalformedOutput { preview: preview(json) }),
    };

    let received = elements.len();
    let items: Vec<T> = elements
        .into_iter()
        .filter_map(|v| serde_json::from_value::<T>(v).ok())
        .filter(|item| item.is_usable())
        .collect();

    if received == 0 {
        return Err(PortError::EmptyResult(format!("Model returned no {}", kind)));
    }
    if items.is_empty() {
        return Err(PortError::MalformedOutput { preview: preview(json) });
    }
    if items.len() < received {
        warn!("Dropped {} malformed {} out of {}", received - items.len(), kind, received);
    }
    Ok(items)
}

impl StudyContentGenerator {
    async fn generate_items<T: StudyItem>(&self, kind: &str, prompt: Prompt, count: usize) -> PortResult<Vec<T>> {
        let raw = self.run(prompt, self.config().structured_temperature).await?;

        if looks_like_refusal(&raw) {
            return Err(PortError::RefusalDetected(preview(raw.trim())));
        }

        let json = extract_json(&raw);
        if !is_valid_json(&json) {
            return Err(PortError::MalformedOutput { preview: preview(&json) });
        }

        let mut items = parse_items::<T>(&json, kind)?;
        if items.len() > count {
            items.truncate(count);
        } else if items.len() < count {
            warn!("Requested {} {} but model produced {}", count, kind, items.len());
        }
        Ok(items)
    }

    fn source_excerpt<'a>(&self, content: &'a str) -> PortResult<&'a str> {
        let excerpt = truncate_chars(content.trim(), self.config().structured_source_chars);
        if excerpt.is_empty() {
            Err(PortError::InvalidInput("Source content is empty".to_string()))
        } else {
            Ok(excerpt)
        }
    }

    async fn generate_checked<T: StudyItem>(
        &self,
        operation: &str,
        kind: &str,
        content: &str,
        count: usize,
        build: fn(&str, usize, &str) -> Prompt,
        language: &str,
    ) -> PortResult<Vec<T>> {
        let result = async {
            if count == 0 {
                return Err(PortError::InvalidInput(format!("Requested zero {}", kind)));
            }
            let excerpt = self.source_excerpt(content)?;
            self.generate_items(kind, build(excerpt, count, language), count).await
        }
        .await;

        result.map_err(|e| {
            error!("{} failed: {}", operation, e);
            e.context(operation)
        })
    }

    pub async fn generate_flashcards(&self, content: &str, count: usize, language: &str) -> PortResult<Vec<Flashcard>> {
        self.generate_checked("generate flashcards", "flashcards", content, count, prompts::flashcards_prompt, language)
            .await
    }

    pub async fn generate_quiz(&self, content: &str, count: usize, language: &str) -> PortResult<Vec<QuizQuestion>> {
        let mut questions: Vec<QuizQuestion> = self
            .generate_checked("generate quiz", "quiz questions", content, count, prompts::quiz_prompt, language)
            .await?;
        for q in &mut questions {
            q.user_answer = None;
        }
        Ok(questions)
    }

    pub async fn generate_exercises(&self, content: &str, count: usize, language: &str) -> PortResult<Vec<Exercise>> {
        self.generate_checked("generate exercises", "exercises", content, count, prompts::exercises_prompt, language)
            .await
    }

    /// Suggests concepts to explain. Never fails: any error yields an empty list.
    pub async fn generate_feynman_topics(&self, content: &str, count: usize, language: &str) -> Vec<FeynmanTopic> {
        let result: PortResult<Vec<FeynmanTopic>> = self
            .generate_checked("generate feynman topics", "feynman topics", content, count, prompts::feynman_prompt, language)
            .await;

        match result {
            Ok(topics) => topics
                .into_iter()
                .enumerate()
                .map(|(i, topic)| FeynmanTopic { id: (i + 1).to_string(), ..topic })
                .collect(),
            Err(e) => {
                warn!("Returning no Feynman topics: {}", e);
                Vec::new()
            }
        }
    }
}
