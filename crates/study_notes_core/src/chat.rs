//! crates/study_notes_core/src/chat.rs
//!
//! Chat about a note, with the exchange recorded in the note's conversation.

use tracing::warn;
use uuid::Uuid;

use crate::domain::{ChatMessage, Role};
use crate::generator::StudyContentGenerator;
use crate::ports::{PortError, PortResult, StudyContentRepository};

/// One user turn plus everything needed to answer it.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub user_id: Uuid,
    /// When set, both the question and the answer are stored in the note's conversation.
    pub note_id: Option<Uuid>,
    /// Earlier turns, oldest first. The new message is not part of it.
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub note_context: Option<String>,
    pub language: String,
}

/// Answers `turn.message`.
///
/// Storage problems are logged and never cost the learner their answer.
pub async fn converse(
    generator: &StudyContentGenerator,
    repo: &dyn StudyContentRepository,
    turn: ChatTurn,
) -> PortResult<String> {
    if turn.message.trim().is_empty() {
        return Err(PortError::InvalidInput("Message is empty".to_string()));
    }

    let conversation_id = match turn.note_id {
        Some(note_id) => match repo.get_or_create_conversation(turn.user_id, note_id).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Could not open conversation for note {}: {}", note_id, e);
                None
            }
        },
        None => None,
    };

    if let Some(id) = conversation_id {
        if let Err(e) = repo.save_message(id, Role::User, &turn.message).await {
            warn!("Could not store user message in conversation {}: {}", id, e);
        }
    }

    let mut history = turn.history;
    history.push(ChatMessage::user(turn.message));
    let reply = generator
        .chat_completion(&history, turn.note_context.as_deref(), &turn.language)
        .await?;

    if let Some(id) = conversation_id {
        if let Err(e) = repo.save_message(id, Role::Assistant, &reply).await {
            warn!("Could not store assistant reply in conversation {}: {}", id, e);
        }
    }

    Ok(reply)
}
