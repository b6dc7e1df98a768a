//! services/api/src/adapters/hosted.rs
//!
//! This module contains the adapter for the hosted backend functions: the AI gateway
//! (chat completions and transcriptions, with per-user quotas applied server side)
//! and the link processor. It implements the `CompletionService`,
//! `TranscriptionService` and `LinkProcessingService` ports from the `core` crate.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use serde_json::{json, Value};
use study_notes_core::{
    classify::{classify, classify_payload, RawOutcome},
    domain::{
        ChatMessage, CompletionRequest, LinkContent, LinkType, TranscriptionRequest,
        TranscriptionSource,
    },
    ports::{
        CompletionService, LinkProcessingService, PortError, PortResult, TranscriptionService,
    },
};
use tracing::debug;

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Serialize)]
struct ChatPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    messages: &'a [ChatMessage],
    model: &'a str,
    temperature: f32,
}

#[derive(Serialize)]
struct LinkRequest<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    link_type: LinkType,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that calls the hosted backend functions over HTTP.
#[derive(Clone)]
pub struct HostedFunctionsClient {
    http: reqwest::Client,
    functions_url: String,
    api_key: String,
    ai_function: String,
    link_function: String,
}

impl HostedFunctionsClient {
    /// Creates a new `HostedFunctionsClient`.
    ///
    /// `functions_url` is the base every function name is appended to.
    pub fn new(
        http: reqwest::Client,
        functions_url: impl Into<String>,
        api_key: impl Into<String>,
        ai_function: impl Into<String>,
        link_function: impl Into<String>,
    ) -> Self {
        Self {
            http,
            functions_url: functions_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            ai_function: ai_function.into(),
            link_function: link_function.into(),
        }
    }

    /// Invokes one function and reports what the transport saw, without judging it.
    async fn invoke<B: Serialize + ?Sized>(&self, function: &str, body: &B) -> RawOutcome {
        let url = format!("{}/{}", self.functions_url, function);
        debug!("Invoking hosted function {}", function);

        let response = match self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return RawOutcome::Threw(e.to_string()),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => RawOutcome::Responded { status, body },
            Err(e) => RawOutcome::Threw(e.to_string()),
        }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for HostedFunctionsClient {
    async fn complete(&self, request: CompletionRequest) -> PortResult<String> {
        let body = ChatPayload {
            kind: "chat",
            messages: &request.messages,
            model: &request.model,
            temperature: request.temperature,
        };
        classify(self.invoke(&self.ai_function, &body).await, "content")
    }
}

//=========================================================================================
// `TranscriptionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TranscriptionService for HostedFunctionsClient {
    async fn transcribe(&self, request: TranscriptionRequest) -> PortResult<String> {
        let mut body = json!({ "type": "transcription" });
        match request.source {
            TranscriptionSource::StoragePath(path) => {
                body["storagePath"] = json!(path);
            }
            TranscriptionSource::Inline { audio, mime_type } => {
                body["audioBase64"] = json!(BASE64.encode(audio));
                body["mimeType"] = json!(mime_type);
            }
        }
        if let Some(language) = request.language {
            body["language"] = json!(language);
        }
        if let Some(prompt) = request.prompt {
            body["prompt"] = json!(prompt);
        }
        classify(self.invoke(&self.ai_function, &body).await, "text")
    }
}

//=========================================================================================
// `LinkProcessingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl LinkProcessingService for HostedFunctionsClient {
    async fn process_link(&self, url: &str, link_type: LinkType) -> PortResult<LinkContent> {
        let body = LinkRequest { url, link_type };
        let payload = classify_payload(self.invoke(&self.link_function, &body).await)?;

        let text = |field: &str| {
            payload
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        let content = text("content");
        if content.is_empty() {
            return Err(PortError::EmptyResult(format!("No readable content at {}", url)));
        }
        Ok(LinkContent { title: text("title"), content })
    }
}
