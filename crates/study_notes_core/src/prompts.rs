//! crates/study_notes_core/src/prompts.rs
//!
//! Builds the system and user prompts for every kind of study content, and holds the
//! per-detail-level tuning that drives chunk sizes and output length targets.

use crate::domain::{DetailLevel, DocumentRef};

//=========================================================================================
// Tuning
//=========================================================================================

/// Per-detail-level knobs for summarization.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailProfile {
    /// Lower bound of the output length before scaling by input size.
    pub base_min_words: usize,
    /// Upper bound of the output length before scaling by input size.
    pub base_max_words: usize,
    /// Word budget of a single chunk.
    pub chunk_words: usize,
    /// Input is cut to this many characters before chunking. `None` keeps all of it.
    pub max_input_chars: Option<usize>,
}

/// All generation tuning in one place, passed explicitly to the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub model: String,
    /// Temperature for free-form output (summaries, chat, titles).
    pub temperature: f32,
    /// Temperature for JSON output (flashcards, quizzes, exercises, topics).
    pub structured_temperature: f32,
    pub concise: DetailProfile,
    pub standard: DetailProfile,
    pub comprehensive: DetailProfile,
    /// Most recent chat turns forwarded with a chat completion.
    pub history_limit: usize,
    /// Characters of source text shown to the title prompt.
    pub title_preview_chars: usize,
    pub max_title_chars: usize,
    /// Characters of source text shown to the language detector.
    pub language_sample_chars: usize,
    /// Characters of source text embedded in structured-content prompts.
    pub structured_source_chars: usize,
    /// Characters of note text embedded in the chat system prompt.
    pub chat_context_chars: usize,
    /// Recordings below this size may be sent inline when storage upload fails.
    pub inline_audio_max_bytes: usize,
}

impl GenerationConfig {
    pub fn profile(&self, level: DetailLevel) -> &DetailProfile {
        match level {
            DetailLevel::Concise => &self.concise,
            DetailLevel::Standard => &self.standard,
            DetailLevel::Comprehensive => &self.comprehensive,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            structured_temperature: 0.5,
            concise: DetailProfile {
                base_min_words: 2000,
                base_max_words: 4000,
                chunk_words: 900,
                max_input_chars: Some(60_000),
            },
            standard: DetailProfile {
                base_min_words: 2000,
                base_max_words: 4000,
                chunk_words: 1300,
                max_input_chars: Some(120_000),
            },
            comprehensive: DetailProfile {
                base_min_words: 2000,
                base_max_words: 4000,
                chunk_words: 8000,
                max_input_chars: None,
            },
            history_limit: 10,
            title_preview_chars: 2000,
            max_title_chars: 80,
            language_sample_chars: 1000,
            structured_source_chars: 30_000,
            chat_context_chars: 12_000,
            inline_audio_max_bytes: 2 * 1024 * 1024,
        }
    }
}

//=========================================================================================
// Length Targets
//=========================================================================================

const CHARS_PER_WORD: f64 = 5.0;
const WORDS_PER_SLIDE: f64 = 500.0;
const SLIDES_PER_UNIT: f64 = 10.0;
const MIN_TARGET_FLOOR: usize = 500;
const MAX_TARGET_FLOOR: usize = 1000;

/// Output word-count range requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthTarget {
    pub min_words: usize,
    pub max_words: usize,
}

/// Scales the profile's base range by the estimated size of the input.
///
/// The input is measured in "slides" of 500 estimated words (five characters each);
/// every ten slides count as one multiple of the base range.
pub fn length_target(char_count: usize, profile: &DetailProfile) -> LengthTarget {
    let estimated_words = char_count as f64 / CHARS_PER_WORD;
    let estimated_slides = (estimated_words / WORDS_PER_SLIDE).ceil();
    let multiplier = estimated_slides / SLIDES_PER_UNIT;

    let min_words = (profile.base_min_words as f64 * multiplier).round() as usize;
    let max_words = (profile.base_max_words as f64 * multiplier).round() as usize;

    LengthTarget {
        min_words: min_words.max(MIN_TARGET_FLOOR),
        max_words: max_words.max(MAX_TARGET_FLOOR),
    }
}

//=========================================================================================
// Languages
//=========================================================================================

const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("sv", "Swedish"),
    ("no", "Norwegian"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("pl", "Polish"),
    ("cs", "Czech"),
    ("ro", "Romanian"),
    ("hu", "Hungarian"),
    ("el", "Greek"),
    ("tr", "Turkish"),
    ("ru", "Russian"),
    ("uk", "Ukrainian"),
    ("ar", "Arabic"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("bn", "Bengali"),
    ("ur", "Urdu"),
    ("fa", "Persian"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("vi", "Vietnamese"),
    ("th", "Thai"),
    ("id", "Indonesian"),
    ("ms", "Malay"),
    ("tl", "Tagalog"),
    ("sw", "Swahili"),
];

pub const DEFAULT_LANGUAGE: &str = "en";

/// English name for an ISO 639-1 code; unknown codes resolve to English.
pub fn language_name(code: &str) -> &'static str {
    let code = code.trim().to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or("English")
}

pub fn is_known_language(code: &str) -> bool {
    LANGUAGES.iter().any(|(c, _)| *c == code)
}

fn is_english(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(DEFAULT_LANGUAGE)
}

/// Empty for English. Any other code, including one missing from the table, gets an
/// instruction naming the resolved language.
fn language_instruction(code: &str) -> String {
    if is_english(code) {
        String::new()
    } else {
        format!(
            "\n\nLANGUAGE: The source material is in {name}. Respond entirely in {name}, the same language as the source. Do not translate anything into English.",
            name = language_name(code)
        )
    }
}

//=========================================================================================
// Prompt Types
//=========================================================================================

/// A system prompt and the user prompt that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Position of a chunk within a multi-pass summary, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    pub index: usize,
    pub total: usize,
}

/// Caller-chosen options shared by the summary prompts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryOptions {
    pub detail: DetailLevel,
    pub language: String,
    pub documents: Vec<DocumentRef>,
}

impl SummaryOptions {
    pub fn new(detail: DetailLevel, language: impl Into<String>) -> Self {
        Self { detail, language: language.into(), documents: Vec::new() }
    }
}

fn manifest(documents: &[DocumentRef]) -> String {
    if documents.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = documents
        .iter()
        .map(|d| format!("- {} ({})", d.name, d.kind.label()))
        .collect();
    format!("SOURCE MATERIALS:\n{}\n\n", lines.join("\n"))
}

const HTML_FORMAT_RULES: &str = "OUTPUT FORMAT:
- Return clean HTML only, using <h2>, <h3>, <p>, <ul>, <ol>, <li>, <strong> and <em>.
- Do not wrap the answer in markdown code fences or quotation marks.
- Do not add any commentary before or after the HTML.";

//=========================================================================================
// Summaries
//=========================================================================================

fn summary_system(detail: DetailLevel, target: LengthTarget, language: &str) -> String {
    let body = match detail {
        DetailLevel::Comprehensive => format!(
            "You are an expert academic editor. Rewrite the provided material into complete, well-structured study notes. \
This is NOT a summary: every concept, argument, example and detail in the source must be preserved.

RULES:
- Reorganize the material under clear headings that follow the logical structure of the subject.
- For every key term, include a definition block: <p><strong>Definition:</strong> ...</p>.
- Preserve every equation, formula and numeric value exactly as written.
- Keep worked examples and their steps.
- Aim for roughly {min} to {max} words; never drop content to stay within the range.

{rules}",
            min = target.min_words,
            max = target.max_words,
            rules = HTML_FORMAT_RULES,
        ),
        DetailLevel::Concise | DetailLevel::Standard => {
            let focus = if detail == DetailLevel::Concise {
                "Keep only the core ideas and the most important supporting facts."
            } else {
                "Cover all main ideas with their key supporting details and examples."
            };
            format!(
                "You are an expert study assistant. Summarize the provided material into clear study notes.

RULES:
- {focus}
- Organize the summary under headings that follow the structure of the material.
- Highlight key terms with <strong>.
- The summary must be between {min} and {max} words.

{rules}",
                focus = focus,
                min = target.min_words,
                max = target.max_words,
                rules = HTML_FORMAT_RULES,
            )
        }
    };
    format!("{}{}", body, language_instruction(language))
}

/// Prompt for summarizing either the whole input or one chunk of it.
pub fn summary_prompt(
    content: &str,
    options: &SummaryOptions,
    target: LengthTarget,
    part: Option<Part>,
) -> Prompt {
    let system = summary_system(options.detail, target, &options.language);
    let framing = match part {
        Some(Part { index, total }) => format!(
            "This is part {} of {} of a longer source. Process only this part; the parts will be combined afterwards, so do not write an introduction or conclusion for the whole.\n\n",
            index, total
        ),
        None => String::new(),
    };
    let user = format!(
        "{}{}CONTENT:\n---\n{}\n---",
        manifest(&options.documents),
        framing,
        content
    );
    Prompt { system, user }
}

/// Prompt that combines the partial summaries of a multi-pass run into one document.
pub fn merge_prompt(partials: &[String], options: &SummaryOptions, target: LengthTarget) -> Prompt {
    let system = format!(
        "You are an expert editor. You receive several partial study notes that were produced from consecutive parts of the same source. \
Combine them into a single coherent document.

RULES:
- Remove repetition between parts; merge overlapping sections.
- Keep the order in which topics appear in the source.
- Do not drop any concept that appears in a part.
- The combined document should be between {min} and {max} words.

{rules}{lang}",
        min = target.min_words,
        max = target.max_words,
        rules = HTML_FORMAT_RULES,
        lang = language_instruction(&options.language),
    );

    let sections: Vec<String> = partials
        .iter()
        .enumerate()
        .map(|(i, text)| format!("=== PART {} OF {} ===\n{}", i + 1, partials.len(), text))
        .collect();
    let user = format!(
        "{}Combine these partial notes into one document:\n\n{}",
        manifest(&options.documents),
        sections.join("\n\n")
    );
    Prompt { system, user }
}

//=========================================================================================
// Short Text Outputs
//=========================================================================================

pub fn title_prompt(preview: &str, language: &str) -> Prompt {
    Prompt {
        system: format!(
            "You are a title generation assistant. Generate a short, descriptive title (maximum 8 words) for the given study material. \
The title should capture the main topic. Respond with ONLY the title, no quotes, no explanation.{}",
            language_instruction(language)
        ),
        user: format!("Generate a title for this material:\n\n{}", preview),
    }
}

pub fn language_detection_prompt(sample: &str) -> Prompt {
    Prompt {
        system: "You identify the language of a text. Respond with ONLY the two-letter ISO 639-1 code of the language (for example: en, es, fr). No other words.".to_string(),
        user: format!("Text:\n---\n{}\n---", sample),
    }
}

/// System prompt for free chat about a note.
pub fn chat_system_prompt(note_context: Option<&str>, language: &str) -> String {
    let mut prompt = String::from(
        "You are a friendly study tutor. Help the learner understand their material: explain concepts simply, \
give examples, and check understanding with short follow-up questions when useful. Keep answers focused and reasonably concise.",
    );
    if let Some(context) = note_context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str(
            "\n\nBase your answers on the learner's notes below when they are relevant. If the notes do not cover a question, say so and answer from general knowledge.\n\nNOTES:\n---\n",
        );
        prompt.push_str(context);
        prompt.push_str("\n---");
    }
    prompt.push_str(&language_instruction(language));
    prompt
}

/// Context hint passed along with audio to the speech-to-text model.
pub fn transcription_prompt(language: &str) -> String {
    format!(
        "A student's recording of a lecture or study session in {}. Transcribe it faithfully with punctuation.",
        language_name(language)
    )
}

//=========================================================================================
// Structured Outputs
//=========================================================================================

const JSON_ONLY: &str =
    "Respond with ONLY the JSON array. No markdown code fences, no explanation, no text before or after it.";

pub fn flashcards_prompt(content: &str, count: usize, language: &str) -> Prompt {
    Prompt {
        system: format!(
            "You create study flashcards. Each card has a short question or term on the front and a clear, self-contained answer on the back.

Return EXACTLY {count} flashcards as a JSON array in this shape:
[{{\"front\": \"question or term\", \"back\": \"answer or definition\"}}]

{json}{lang}",
            count = count,
            json = JSON_ONLY,
            lang = language_instruction(language),
        ),
        user: format!("Create {} flashcards from this material:\n---\n{}\n---", count, content),
    }
}

pub fn quiz_prompt(content: &str, count: usize, language: &str) -> Prompt {
    Prompt {
        system: format!(
            "You write multiple-choice quiz questions that test understanding, not just recall.

Return EXACTLY {count} questions as a JSON array in this shape:
[{{\"question\": \"...\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correctAnswer\": 0}}]

RULES:
- Every question has exactly 4 options.
- \"correctAnswer\" is the 0-based index (0-3) of the correct option.
- Distractors must be plausible; vary the position of the correct answer.

{json}{lang}",
            count = count,
            json = JSON_ONLY,
            lang = language_instruction(language),
        ),
        user: format!("Write {} quiz questions about this material:\n---\n{}\n---", count, content),
    }
}

pub fn exercises_prompt(content: &str, count: usize, language: &str) -> Prompt {
    Prompt {
        system: format!(
            "You design practice exercises that make the learner apply the material.

Return EXACTLY {count} exercises as a JSON array in this shape:
[{{\"question\": \"the exercise\", \"solution\": \"a worked, step-by-step solution\", \"notes\": \"common mistakes or tips\"}}]

{json}{lang}",
            count = count,
            json = JSON_ONLY,
            lang = language_instruction(language),
        ),
        user: format!("Create {} exercises from this material:\n---\n{}\n---", count, content),
    }
}

pub fn feynman_prompt(content: &str, count: usize, language: &str) -> Prompt {
    Prompt {
        system: format!(
            "You help learners apply the Feynman technique: picking a concept and explaining it in plain words as if teaching a beginner. \
Suggest the concepts from the material that are most worth explaining this way.

Return EXACTLY {count} topics as a JSON array in this shape:
[{{\"title\": \"concept name\", \"description\": \"one sentence on what to explain\"}}]

{json}{lang}",
            count = count,
            json = JSON_ONLY,
            lang = language_instruction(language),
        ),
        user: format!("Suggest {} Feynman topics from this material:\n---\n{}\n---", count, content),
    }
}
