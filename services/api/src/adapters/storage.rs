//! services/api/src/adapters/storage.rs
//!
//! Uploads recordings to the backend's object storage so the transcription function
//! can read them by path. Implements the `ObjectStorageService` port.

use async_trait::async_trait;
use chrono::Utc;
use study_notes_core::{
    classify::{classify_payload, RawOutcome},
    ports::{ObjectStorageService, PortResult},
};
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct StorageAdapter {
    http: reqwest::Client,
    storage_url: String,
    api_key: String,
    bucket: String,
}

impl StorageAdapter {
    pub fn new(
        http: reqwest::Client,
        storage_url: impl Into<String>,
        api_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            http,
            storage_url: storage_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bucket: bucket.into(),
        }
    }
}

/// Keeps letters, digits, dots, dashes and underscores; everything else becomes `_`.
fn safe_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "recording".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ObjectStorageService for StorageAdapter {
    async fn upload(
        &self,
        user_id: Uuid,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> PortResult<String> {
        let path = format!(
            "{}/{}-{}",
            user_id,
            Utc::now().timestamp_millis(),
            safe_file_name(file_name)
        );
        let url = format!("{}/object/{}/{}", self.storage_url, self.bucket, path);
        let size = data.len();

        let outcome = match self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => RawOutcome::Responded { status, body },
                    Err(e) => RawOutcome::Threw(e.to_string()),
                }
            }
            Err(e) => RawOutcome::Threw(e.to_string()),
        };

        classify_payload(outcome)?;
        info!("Uploaded {} bytes to {}/{}", size, self.bucket, path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_made_path_safe() {
        assert_eq!(safe_file_name("Lecture 1 (final).m4a"), "Lecture_1__final_.m4a");
        assert_eq!(safe_file_name("notes.webm"), "notes.webm");
        assert_eq!(safe_file_name("///"), "recording");
    }
}
