//! crates/study_notes_core/src/background.rs
//!
//! Unattended generation of every kind of study content for a freshly created note.
//! Each kind is generated and saved on its own; a failure in one kind is logged and
//! does not keep the others from completing.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{ContentKind, StudyContent};
use crate::generator::StudyContentGenerator;
use crate::ports::{PortError, PortResult, StudyContentRepository};
use crate::prompts::SummaryOptions;

/// How many items to request for each structured content kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounts {
    pub flashcards: usize,
    pub quiz_questions: usize,
    pub exercises: usize,
    pub feynman_topics: usize,
}

impl Default for ItemCounts {
    fn default() -> Self {
        Self { flashcards: 10, quiz_questions: 5, exercises: 3, feynman_topics: 5 }
    }
}

#[derive(Debug, Clone)]
pub struct NoteGenerationJob {
    pub note_id: Uuid,
    pub content: String,
    pub options: SummaryOptions,
    pub counts: ItemCounts,
}

/// What a generate-all run achieved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationReport {
    pub succeeded: Vec<ContentKind>,
    pub failed: Vec<(ContentKind, String)>,
}

impl GenerationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Generates summary, flashcards, quiz, exercises and Feynman topics in turn,
/// saving the accumulated content after every success.
pub async fn generate_all(
    generator: &StudyContentGenerator,
    repo: &dyn StudyContentRepository,
    job: NoteGenerationJob,
) -> GenerationReport {
    let NoteGenerationJob { note_id, content, options, counts } = job;
    let language = options.language.clone();
    let mut report = GenerationReport::default();

    let mut study = match repo.get_study_content(note_id).await {
        Ok(existing) => existing,
        Err(e) => {
            warn!("Starting note {} from empty study content: {}", note_id, e);
            StudyContent::default()
        }
    };

    info!("Generating all study content for note {}", note_id);

    let outcome = generator
        .generate_summary(&content, &options)
        .await
        .map(|summary| study.summary = summary);
    record(&mut report, repo, note_id, &study, ContentKind::Summary, outcome).await;

    let outcome = generator
        .generate_flashcards(&content, counts.flashcards, &language)
        .await
        .map(|cards| study.flashcards = cards);
    record(&mut report, repo, note_id, &study, ContentKind::Flashcards, outcome).await;

    let outcome = generator
        .generate_quiz(&content, counts.quiz_questions, &language)
        .await
        .map(|questions| study.quiz_questions = questions);
    record(&mut report, repo, note_id, &study, ContentKind::Quiz, outcome).await;

    let outcome = generator
        .generate_exercises(&content, counts.exercises, &language)
        .await
        .map(|exercises| study.exercises = exercises);
    record(&mut report, repo, note_id, &study, ContentKind::Exercises, outcome).await;

    let topics = generator
        .generate_feynman_topics(&content, counts.feynman_topics, &language)
        .await;
    let outcome = if topics.is_empty() {
        Err(PortError::EmptyResult("No Feynman topics were generated".to_string()))
    } else {
        study.feynman_topics = topics;
        Ok(())
    };
    record(&mut report, repo, note_id, &study, ContentKind::FeynmanTopics, outcome).await;

    info!(
        "Finished note {}: {} succeeded, {} failed",
        note_id,
        report.succeeded.len(),
        report.failed.len()
    );
    report
}

async fn record(
    report: &mut GenerationReport,
    repo: &dyn StudyContentRepository,
    note_id: Uuid,
    study: &StudyContent,
    kind: ContentKind,
    outcome: PortResult<()>,
) {
    let saved = match outcome {
        Ok(()) => repo.save_study_content(note_id, study).await,
        Err(e) => Err(e),
    };

    match saved {
        Ok(()) => report.succeeded.push(kind),
        Err(e) => {
            warn!("Skipping {} for note {}: {}", kind.as_str(), note_id, e);
            report.failed.push((kind, e.to_string()));
        }
    }
}
