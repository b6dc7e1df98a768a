//! crates/study_notes_core/src/summary.rs
//!
//! Single-pass and multi-pass summarization.
//!
//! Input that fits one chunk is summarized with one completion. Longer input is
//! summarized chunk by chunk, sequentially, and the partial results are merged with
//! one more completion. Any failing call aborts the whole run.

use tracing::{error, info};

use crate::chunker::{self, truncate_chars};
use crate::generator::StudyContentGenerator;
use crate::ports::{PortError, PortResult};
use crate::prompts::{length_target, merge_prompt, summary_prompt, Part, SummaryOptions};
use crate::sanitize::sanitize;

impl StudyContentGenerator {
    /// Produces the HTML summary (or, for comprehensive detail, full rewrite) of `content`.
    pub async fn generate_summary(&self, content: &str, options: &SummaryOptions) -> PortResult<String> {
        let profile = self.config().profile(options.detail);
        let input = match profile.max_input_chars {
            Some(max) => truncate_chars(content.trim(), max),
            None => content.trim(),
        };
        if input.is_empty() {
            return Err(PortError::InvalidInput("Cannot summarize empty content".to_string()));
        }

        let chunks = chunker::split(input, profile.chunk_words);
        let overall_target = length_target(input.chars().count(), profile);

        if chunks.len() == 1 {
            let prompt = summary_prompt(input, options, overall_target, None);
            let raw = self.run(prompt, self.config().temperature).await.map_err(|e| {
                error!("Summary generation failed: {}", e);
                e.context("generate summary")
            })?;
            return non_empty(sanitize(&raw), "generate summary");
        }

        let total = chunks.len();
        info!(
            "Summarizing {} chars in {} parts ({:?} detail)",
            input.chars().count(),
            total,
            options.detail
        );

        let mut partials = Vec::with_capacity(total);
        for (i, chunk) in chunks.iter().enumerate() {
            let part = Part { index: i + 1, total };
            let target = length_target(chunk.chars().count(), profile);
            let prompt = summary_prompt(chunk, options, target, Some(part));
            let raw = self.run(prompt, self.config().temperature).await.map_err(|e| {
                error!("Summary part {} of {} failed: {}", part.index, total, e);
                e.context(format!("generate summary (part {} of {})", part.index, total))
            })?;
            partials.push(sanitize(&raw));
        }

        let prompt = merge_prompt(&partials, options, overall_target);
        let merged = self.run(prompt, self.config().temperature).await.map_err(|e| {
            error!("Summary merge failed: {}", e);
            e.context("generate summary (merge)")
        })?;
        non_empty(sanitize(&merged), "generate summary (merge)")
    }
}

fn non_empty(text: String, operation: &str) -> PortResult<String> {
    if text.trim().is_empty() {
        Err(PortError::EmptyResult("Summary was empty after cleanup".to_string()).context(operation))
    } else {
        Ok(text)
    }
}
