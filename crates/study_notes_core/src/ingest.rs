//! crates/study_notes_core/src/ingest.rs
//!
//! Turns captured material (recordings, links) into text before any study content
//! is generated from it.

use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::domain::{LinkContent, LinkType, TranscriptionRequest, TranscriptionSource};
use crate::ports::{LinkProcessingService, ObjectStorageService, PortError, PortResult, TranscriptionService};
use crate::prompts::{transcription_prompt, GenerationConfig};

/// A recording as received from the client.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Transcribes a recording.
///
/// The audio is moved to object storage first and transcribed from there. If the
/// upload fails, recordings under the inline threshold are sent in the request body
/// instead; larger ones report the upload failure.
pub async fn transcribe_audio(
    storage: &dyn ObjectStorageService,
    transcriber: &dyn TranscriptionService,
    config: &GenerationConfig,
    user_id: Uuid,
    upload: AudioUpload,
    language: Option<&str>,
) -> PortResult<String> {
    if upload.data.is_empty() {
        return Err(PortError::InvalidInput("Recording is empty".to_string()));
    }

    let size = upload.data.len();
    let source = match storage
        .upload(user_id, &upload.file_name, &upload.mime_type, upload.data.clone())
        .await
    {
        Ok(path) => {
            info!("Uploaded {} bytes of audio to {}", size, path);
            TranscriptionSource::StoragePath(path)
        }
        Err(e) if size < config.inline_audio_max_bytes && !e.is_rate_limit() => {
            warn!("Audio upload failed ({}); sending {} bytes inline", e, size);
            TranscriptionSource::Inline { audio: upload.data, mime_type: upload.mime_type }
        }
        Err(e) => return Err(e.context("upload audio")),
    };

    let request = TranscriptionRequest {
        source,
        language: language.map(str::to_string),
        prompt: language.map(transcription_prompt),
    };

    let text = transcriber
        .transcribe(request)
        .await
        .map_err(|e| e.context("transcribe audio"))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(PortError::EmptyResult("Transcript is empty".to_string()).context("transcribe audio"));
    }
    Ok(text.to_string())
}

fn is_youtube_host(host: &str) -> bool {
    let host = host.trim_start_matches("www.").trim_start_matches("m.");
    host == "youtube.com" || host.ends_with(".youtube.com") || host == "youtu.be"
}

/// Decides how the link processor should fetch `raw_url`.
///
/// YouTube links are rejected outright; they have no readable text to extract.
pub fn classify_link(raw_url: &str) -> PortResult<LinkType> {
    let trimmed = raw_url.trim();
    let parsed = Url::parse(trimmed)
        .or_else(|_| Url::parse(&format!("https://{}", trimmed)))
        .map_err(|e| PortError::InvalidInput(format!("'{}' is not a valid URL: {}", trimmed, e)))?;

    let host = parsed.host_str().unwrap_or("").to_ascii_lowercase();
    if is_youtube_host(&host) {
        return Err(PortError::InvalidInput(
            "YouTube links are not supported. Upload the audio or paste a transcript instead.".to_string(),
        ));
    }

    Ok(match parsed.scheme() {
        "http" | "https" if host == "drive.google.com" || host == "docs.google.com" => LinkType::GoogleDrive,
        "http" | "https" if !host.is_empty() => LinkType::Web,
        _ => LinkType::Unknown,
    })
}

/// Extracts the readable text behind a URL.
pub async fn process_web_link(links: &dyn LinkProcessingService, raw_url: &str) -> PortResult<LinkContent> {
    let link_type = classify_link(raw_url)?;
    let content = links
        .process_link(raw_url.trim(), link_type)
        .await
        .map_err(|e| e.context("process link"))?;

    if content.content.trim().is_empty() {
        return Err(PortError::EmptyResult(format!("No readable content at {}", raw_url.trim())).context("process link"));
    }
    Ok(content)
}
