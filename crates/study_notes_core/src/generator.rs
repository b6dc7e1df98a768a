//! crates/study_notes_core/src/generator.rs
//!
//! The entry point for every generation operation. `StudyContentGenerator` owns the
//! completion port and the tuning, and is shared (behind an `Arc`) by all callers.
//! Summaries live in `summary.rs`, JSON-producing generators in `structured.rs`;
//! the short free-form operations are here.

use std::sync::Arc;
use tracing::{debug, error};

use crate::chunker::truncate_chars;
use crate::domain::{ChatMessage, CompletionRequest, Role};
use crate::prompts::{self, GenerationConfig, Prompt, DEFAULT_LANGUAGE};
use crate::ports::{CompletionService, PortError, PortResult};
use crate::sanitize::{sanitize, strip_wrapping_quotes};

pub struct StudyContentGenerator {
    completion: Arc<dyn CompletionService>,
    config: GenerationConfig,
}

impl StudyContentGenerator {
    pub fn new(completion: Arc<dyn CompletionService>, config: GenerationConfig) -> Self {
        Self { completion, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Sends one system+user prompt pair to the completion port.
    pub(crate) async fn run(&self, prompt: Prompt, temperature: f32) -> PortResult<String> {
        let request = CompletionRequest::new(
            vec![ChatMessage::system(prompt.system), ChatMessage::user(prompt.user)],
            self.config.model.clone(),
            temperature,
        );
        self.completion.complete(request).await
    }

    /// Generates a short title for a note.
    pub async fn generate_title(&self, content: &str, language: &str) -> PortResult<String> {
        let preview = truncate_chars(content.trim(), self.config.title_preview_chars);
        if preview.is_empty() {
            return Err(PortError::InvalidInput("Cannot title an empty note".to_string()));
        }

        let raw = self
            .run(prompts::title_prompt(preview, language), self.config.temperature)
            .await
            .map_err(|e| {
                error!("Title generation failed: {}", e);
                e.context("generate title")
            })?;

        let cleaned = sanitize(&raw);
        let first_line = cleaned.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
        let title = strip_wrapping_quotes(first_line.trim_end_matches('.')).trim();
        let title = truncate_chars(title, self.config.max_title_chars);

        if title.is_empty() {
            return Err(PortError::EmptyResult("Model returned an empty title".to_string())
                .context("generate title"));
        }
        Ok(title.to_string())
    }

    /// Returns the ISO 639-1 code of the text's language, `en` when unsure.
    pub async fn detect_language(&self, content: &str) -> PortResult<String> {
        let sample = truncate_chars(content.trim(), self.config.language_sample_chars);
        if sample.is_empty() {
            return Ok(DEFAULT_LANGUAGE.to_string());
        }

        let raw = self
            .run(prompts::language_detection_prompt(sample), 0.0)
            .await
            .map_err(|e| {
                error!("Language detection failed: {}", e);
                e.context("detect language")
            })?;

        let code = normalize_language_code(&raw);
        debug!("Detected language '{}' from model answer '{}'", code, raw.trim());
        Ok(code)
    }

    /// Answers the latest turn of a conversation about a note.
    ///
    /// Only the most recent `history_limit` turns are forwarded; system turns from the
    /// caller are replaced by the tutor prompt.
    pub async fn chat_completion(
        &self,
        history: &[ChatMessage],
        note_context: Option<&str>,
        language: &str,
    ) -> PortResult<String> {
        let turns: Vec<&ChatMessage> = history.iter().filter(|m| m.role != Role::System).collect();
        if turns.is_empty() {
            return Err(PortError::InvalidInput("Chat history is empty".to_string()));
        }

        let context = note_context.map(|c| truncate_chars(c, self.config.chat_context_chars));
        let mut messages = vec![ChatMessage::system(prompts::chat_system_prompt(context, language))];
        let skip = turns.len().saturating_sub(self.config.history_limit);
        messages.extend(turns.into_iter().skip(skip).cloned());

        let request = CompletionRequest::new(messages, self.config.model.clone(), self.config.temperature);
        let reply = self.completion.complete(request).await.map_err(|e| {
            error!("Chat completion failed: {}", e);
            e.context("chat completion")
        })?;
        Ok(reply.trim().to_string())
    }
}

/// Reduces a model's answer to a known two-letter code, falling back to `en`.
pub fn normalize_language_code(raw: &str) -> String {
    let cleaned = strip_wrapping_quotes(raw.trim()).to_ascii_lowercase();
    let code: String = cleaned.chars().take_while(|c| c.is_ascii_alphabetic()).take(2).collect();
    if code.len() == 2 && prompts::is_known_language(&code) {
        code
    } else {
        DEFAULT_LANGUAGE.to_string()
    }
}
