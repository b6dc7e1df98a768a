//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `StudyContentRepository` port from the `core` crate. It handles all
//! interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use study_notes_core::domain::{
    Exercise, FeynmanTopic, Flashcard, QuizQuestion, Role, StudyContent,
};
use study_notes_core::ports::{PortError, PortResult, StudyContentRepository};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StudyContentRepository` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn db_error(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct StudyContentRecord {
    summary: String,
    flashcards: Json<Vec<Flashcard>>,
    quiz_questions: Json<Vec<QuizQuestion>>,
    exercises: Json<Vec<Exercise>>,
    feynman_topics: Json<Vec<FeynmanTopic>>,
}
impl StudyContentRecord {
    fn to_domain(self) -> StudyContent {
        StudyContent {
            summary: self.summary,
            flashcards: self.flashcards.0,
            quiz_questions: self.quiz_questions.0,
            exercises: self.exercises.0,
            feynman_topics: self.feynman_topics.0,
        }
    }
}

#[derive(FromRow)]
struct ConversationRecord {
    id: Uuid,
}

//=========================================================================================
// `StudyContentRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyContentRepository for DbAdapter {
    async fn get_study_content(&self, note_id: Uuid) -> PortResult<StudyContent> {
        let record = sqlx::query_as::<_, StudyContentRecord>(
            "SELECT summary, flashcards, quiz_questions, exercises, feynman_topics
             FROM study_content WHERE note_id = $1",
        )
        .bind(note_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        // A note with nothing generated yet simply has empty study content.
        Ok(record.map(StudyContentRecord::to_domain).unwrap_or_default())
    }

    async fn save_study_content(&self, note_id: Uuid, content: &StudyContent) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO study_content
                (note_id, summary, flashcards, quiz_questions, exercises, feynman_topics, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             ON CONFLICT (note_id) DO UPDATE SET
                summary = EXCLUDED.summary,
                flashcards = EXCLUDED.flashcards,
                quiz_questions = EXCLUDED.quiz_questions,
                exercises = EXCLUDED.exercises,
                feynman_topics = EXCLUDED.feynman_topics,
                updated_at = NOW()",
        )
        .bind(note_id)
        .bind(&content.summary)
        .bind(Json(&content.flashcards))
        .bind(Json(&content.quiz_questions))
        .bind(Json(&content.exercises))
        .bind(Json(&content.feynman_topics))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_or_create_conversation(&self, user_id: Uuid, note_id: Uuid) -> PortResult<Uuid> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let record = sqlx::query_as::<_, ConversationRecord>(
            "INSERT INTO conversations (id, user_id, note_id) VALUES ($1, $2, $3)
             ON CONFLICT (user_id, note_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(note_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.id)
    }

    async fn save_message(&self, conversation_id: Uuid, role: Role, content: &str) -> PortResult<()> {
        let result = sqlx::query(
            "INSERT INTO messages (id, conversation_id, role, content) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(
                PortError::NotFound(format!("Conversation with ID {} not found", conversation_id)),
            ),
            Err(e) => Err(db_error(e)),
        }
    }
}
