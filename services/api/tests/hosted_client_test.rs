use api_lib::adapters::{HostedFunctionsClient, StorageAdapter};
use mockito::{Matcher, Server};
use serde_json::json;
use study_notes_core::{
    ports::{CompletionService, LinkProcessingService, ObjectStorageService, TranscriptionService},
    ChatMessage, CompletionRequest, LinkType, PortError, RateLimitCode, TranscriptionRequest,
    TranscriptionSource,
};
use uuid::Uuid;

fn client(server: &Server) -> HostedFunctionsClient {
    HostedFunctionsClient::new(
        reqwest::Client::new(),
        server.url(),
        "anon-key",
        "ai-gateway",
        "process-link",
    )
}

fn chat_request() -> CompletionRequest {
    CompletionRequest::new(
        vec![ChatMessage::system("You write notes."), ChatMessage::user("Summarize cells")],
        "gpt-4o-mini",
        0.7,
    )
}

#[tokio::test]
async fn chat_content_is_returned() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ai-gateway")
        .match_header("authorization", "Bearer anon-key")
        .match_header("apikey", "anon-key")
        .match_body(Matcher::PartialJson(json!({
            "type": "chat",
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "You write notes."},
                {"role": "user", "content": "Summarize cells"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content":"<p>Cells are small.</p>"}"#)
        .create_async()
        .await;

    let reply = client(&server).complete(chat_request()).await.unwrap();

    assert_eq!(reply, "<p>Cells are small.</p>");
    mock.assert_async().await;
}

#[tokio::test]
async fn quota_errors_in_a_200_body_become_rate_limits() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/ai-gateway")
        .with_status(200)
        .with_body(r#"{"error":"DAILY_LIMIT_REACHED","limit":20,"remaining":0}"#)
        .create_async()
        .await;

    match client(&server).complete(chat_request()).await {
        Err(PortError::RateLimited(info)) => {
            assert_eq!(info.code, RateLimitCode::DailyLimitReached);
            assert_eq!(info.limit, Some(20));
            assert_eq!(info.remaining, Some(0));
        }
        other => panic!("expected a rate limit, got {:?}", other),
    }
}

#[tokio::test]
async fn quota_codes_next_to_a_200_error_become_rate_limits() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/ai-gateway")
        .with_status(200)
        .with_body(r#"{"error":"Daily limit reached","code":"DAILY_LIMIT_REACHED","limit":20,"remaining":0}"#)
        .create_async()
        .await;

    match client(&server).complete(chat_request()).await {
        Err(PortError::RateLimited(info)) => {
            assert_eq!(info.code, RateLimitCode::DailyLimitReached);
            assert_eq!(info.limit, Some(20));
            assert_eq!(info.remaining, Some(0));
        }
        other => panic!("expected a rate limit, got {:?}", other),
    }
}

#[tokio::test]
async fn quota_errors_with_a_429_status_become_rate_limits() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/ai-gateway")
        .with_status(429)
        .with_body(r#"{"error":{"code":"ACCOUNT_LIMIT_REACHED","resetAt":"2026-11-01T00:00:00Z"}}"#)
        .create_async()
        .await;

    match client(&server).complete(chat_request()).await {
        Err(PortError::RateLimited(info)) => {
            assert_eq!(info.code, RateLimitCode::AccountLimitReached);
            assert!(info.reset_at.is_some());
        }
        other => panic!("expected a rate limit, got {:?}", other),
    }
}

#[tokio::test]
async fn server_errors_are_transport_failures() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/ai-gateway")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let err = client(&server).complete(chat_request()).await.unwrap_err();
    assert!(matches!(err, PortError::Transport(ref m) if m.starts_with("HTTP 502")));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    let unreachable = HostedFunctionsClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:1",
        "anon-key",
        "ai-gateway",
        "process-link",
    );
    let err = unreachable.complete(chat_request()).await.unwrap_err();
    assert!(matches!(err, PortError::Transport(_)));
}

#[tokio::test]
async fn empty_content_is_an_empty_result() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/ai-gateway")
        .with_status(200)
        .with_body(r#"{"content":""}"#)
        .create_async()
        .await;

    let err = client(&server).complete(chat_request()).await.unwrap_err();
    assert!(matches!(err, PortError::EmptyResult(_)));
}

#[tokio::test]
async fn inline_audio_is_sent_as_base64() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ai-gateway")
        .match_body(Matcher::PartialJson(json!({
            "type": "transcription",
            "audioBase64": "AQID",
            "mimeType": "audio/webm",
            "language": "de"
        })))
        .with_status(200)
        .with_body(r#"{"text":"Guten Morgen"}"#)
        .create_async()
        .await;

    let text = client(&server)
        .transcribe(TranscriptionRequest {
            source: TranscriptionSource::Inline { audio: vec![1, 2, 3], mime_type: "audio/webm".into() },
            language: Some("de".into()),
            prompt: None,
        })
        .await
        .unwrap();

    assert_eq!(text, "Guten Morgen");
    mock.assert_async().await;
}

#[tokio::test]
async fn stored_audio_is_sent_by_path() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/ai-gateway")
        .match_body(Matcher::PartialJson(json!({
            "type": "transcription",
            "storagePath": "user/1-lecture.m4a"
        })))
        .with_status(200)
        .with_body(r#"{"text":"Welcome back"}"#)
        .create_async()
        .await;

    let text = client(&server)
        .transcribe(TranscriptionRequest {
            source: TranscriptionSource::StoragePath("user/1-lecture.m4a".into()),
            language: None,
            prompt: Some("Lecture on biology".into()),
        })
        .await
        .unwrap();

    assert_eq!(text, "Welcome back");
    mock.assert_async().await;
}

#[tokio::test]
async fn links_return_title_and_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/process-link")
        .match_body(Matcher::PartialJson(json!({
            "url": "https://drive.google.com/file/d/1/view",
            "type": "google-drive"
        })))
        .with_status(200)
        .with_body(r#"{"title":"Syllabus","content":"Week 1: cells"}"#)
        .create_async()
        .await;

    let page = client(&server)
        .process_link("https://drive.google.com/file/d/1/view", LinkType::GoogleDrive)
        .await
        .unwrap();

    assert_eq!(page.title, "Syllabus");
    assert_eq!(page.content, "Week 1: cells");
    mock.assert_async().await;
}

#[tokio::test]
async fn storage_upload_returns_the_object_path() {
    let mut server = Server::new_async().await;
    let user_id = Uuid::new_v4();
    let mock = server
        .mock("POST", Matcher::Regex(format!(r"^/object/audio-recordings/{}/\d+-lecture\.m4a$", user_id)))
        .match_header("content-type", "audio/mp4")
        .match_header("x-upsert", "true")
        .with_status(200)
        .with_body(r#"{"Key":"audio-recordings/path"}"#)
        .create_async()
        .await;

    let storage = StorageAdapter::new(reqwest::Client::new(), server.url(), "anon-key", "audio-recordings");
    let path = storage
        .upload(user_id, "lecture.m4a", "audio/mp4", vec![0u8; 16])
        .await
        .unwrap();

    assert!(path.starts_with(&format!("{}/", user_id)));
    assert!(path.ends_with("-lecture.m4a"));
    mock.assert_async().await;
}

#[tokio::test]
async fn storage_rejections_are_transport_failures() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", Matcher::Any)
        .with_status(413)
        .with_body(r#"{"error":"Payload too large"}"#)
        .create_async()
        .await;

    let storage = StorageAdapter::new(reqwest::Client::new(), server.url(), "anon-key", "audio-recordings");
    let err = storage
        .upload(Uuid::new_v4(), "lecture.m4a", "audio/mp4", vec![0u8; 16])
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Transport(ref m) if m.contains("413")));
}
