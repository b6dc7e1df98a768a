//! services/api/src/adapters/openai.rs
//!
//! This module contains the adapter that talks to an OpenAI-compatible chat endpoint
//! directly, bypassing the hosted gateway. It implements the `CompletionService` port
//! from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use study_notes_core::{
    classify::{classify, RawOutcome},
    domain::{ChatMessage, CompletionRequest, Role},
    ports::{CompletionService, PortError, PortResult},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

fn builder_error(e: OpenAIError) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Converts one domain chat turn into the provider's message type.
fn to_request_message(message: &ChatMessage) -> PortResult<ChatCompletionRequestMessage> {
    let content = message.content.as_str();
    let built: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(builder_error)?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(builder_error)?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(builder_error)?
            .into(),
    };
    Ok(built)
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    async fn complete(&self, request: CompletionRequest) -> PortResult<String> {
        let messages = request
            .messages
            .iter()
            .map(to_request_message)
            .collect::<PortResult<Vec<_>>>()?;

        let api_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .messages(messages)
            .temperature(request.temperature)
            .n(1)
            .build()
            .map_err(builder_error)?;

        // Provider errors go through the same classifier as the gateway, so quota
        // codes surfaced by a proxy in front of the provider are still recognized.
        let response = match self.client.chat().create(api_request).await {
            Ok(response) => response,
            Err(e) => return classify(RawOutcome::Threw(e.to_string()), "content"),
        };

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                PortError::EmptyResult("Chat completion returned no text content.".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_converts() {
        for message in [
            ChatMessage::system("rules"),
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
        ] {
            assert!(to_request_message(&message).is_ok());
        }
    }
}
