//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use study_notes_core::{
    ports::{LinkProcessingService, ObjectStorageService, StudyContentRepository, TranscriptionService},
    StudyContentGenerator,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<StudyContentGenerator>,
    pub repo: Arc<dyn StudyContentRepository>,
    pub storage: Arc<dyn ObjectStorageService>,
    pub transcriber: Arc<dyn TranscriptionService>,
    pub links: Arc<dyn LinkProcessingService>,
}
