//! In-memory fakes for the core's ports.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use study_notes_core::{
    CompletionRequest, CompletionService, GenerationConfig, LinkContent, LinkProcessingService,
    LinkType, ObjectStorageService, PortError, PortResult, Role, StudyContent,
    StudyContentGenerator, StudyContentRepository, TranscriptionRequest, TranscriptionService,
};
use uuid::Uuid;

/// Replays canned completion results in order and records every request.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<PortResult<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<PortResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn ok(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The user prompt of the n-th request.
    pub fn user_prompt(&self, n: usize) -> String {
        self.requests()[n].messages.last().unwrap().content.clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> PortResult<String> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Unexpected("no scripted reply left".to_string())))
    }
}

pub fn generator(completion: Arc<ScriptedCompletion>) -> StudyContentGenerator {
    StudyContentGenerator::new(completion, GenerationConfig::default())
}

#[derive(Default)]
pub struct MemoryRepository {
    pub content: Mutex<HashMap<Uuid, StudyContent>>,
    pub saves: Mutex<usize>,
    pub conversations: Mutex<HashMap<(Uuid, Uuid), Uuid>>,
    pub messages: Mutex<Vec<(Uuid, Role, String)>>,
}

#[async_trait]
impl StudyContentRepository for MemoryRepository {
    async fn get_study_content(&self, note_id: Uuid) -> PortResult<StudyContent> {
        Ok(self.content.lock().unwrap().get(&note_id).cloned().unwrap_or_default())
    }

    async fn save_study_content(&self, note_id: Uuid, content: &StudyContent) -> PortResult<()> {
        *self.saves.lock().unwrap() += 1;
        self.content.lock().unwrap().insert(note_id, content.clone());
        Ok(())
    }

    async fn get_or_create_conversation(&self, user_id: Uuid, note_id: Uuid) -> PortResult<Uuid> {
        Ok(*self
            .conversations
            .lock()
            .unwrap()
            .entry((user_id, note_id))
            .or_insert_with(Uuid::new_v4))
    }

    async fn save_message(&self, conversation_id: Uuid, role: Role, content: &str) -> PortResult<()> {
        self.messages
            .lock()
            .unwrap()
            .push((conversation_id, role, content.to_string()));
        Ok(())
    }
}

/// Storage that either always works or always fails.
pub struct FakeStorage {
    pub fail: bool,
    pub uploads: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new(fail: bool) -> Self {
        Self { fail, uploads: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl ObjectStorageService for FakeStorage {
    async fn upload(&self, user_id: Uuid, file_name: &str, _mime_type: &str, _data: Vec<u8>) -> PortResult<String> {
        if self.fail {
            return Err(PortError::Transport("storage unavailable".to_string()));
        }
        let path = format!("{}/{}", user_id, file_name);
        self.uploads.lock().unwrap().push(path.clone());
        Ok(path)
    }
}

#[derive(Default)]
pub struct FakeTranscriber {
    pub requests: Mutex<Vec<TranscriptionRequest>>,
    pub transcript: String,
}

#[async_trait]
impl TranscriptionService for FakeTranscriber {
    async fn transcribe(&self, request: TranscriptionRequest) -> PortResult<String> {
        self.requests.lock().unwrap().push(request);
        Ok(self.transcript.clone())
    }
}

#[derive(Default)]
pub struct FakeLinks {
    pub calls: Mutex<Vec<(String, LinkType)>>,
    pub content: String,
}

#[async_trait]
impl LinkProcessingService for FakeLinks {
    async fn process_link(&self, url: &str, link_type: LinkType) -> PortResult<LinkContent> {
        self.calls.lock().unwrap().push((url.to_string(), link_type));
        Ok(LinkContent { title: "Page".to_string(), content: self.content.clone() })
    }
}
