mod support;

use study_notes_core::background::{generate_all, ItemCounts, NoteGenerationJob};
use study_notes_core::chat::{converse, ChatTurn};
use study_notes_core::ingest::{process_web_link, transcribe_audio, AudioUpload};
use study_notes_core::{
    ChatMessage, ContentKind, DetailLevel, GenerationConfig, LinkType, PortError, Role,
    SummaryOptions, TranscriptionSource,
};
use support::{generator, FakeLinks, FakeStorage, FakeTranscriber, MemoryRepository, ScriptedCompletion};
use uuid::Uuid;

fn job(note_id: Uuid) -> NoteGenerationJob {
    NoteGenerationJob {
        note_id,
        content: "Photosynthesis turns light into chemical energy.".to_string(),
        options: SummaryOptions::new(DetailLevel::Standard, "en"),
        counts: ItemCounts { flashcards: 2, quiz_questions: 1, exercises: 1, feynman_topics: 1 },
    }
}

#[tokio::test]
async fn one_failing_kind_does_not_block_the_others() {
    let completion = ScriptedCompletion::ok(&[
        "<p>Summary</p>",
        r#"[{"front":"a","back":"b"},{"front":"c","back":"d"}]"#,
        "I'm sorry, I cannot create a quiz from this.",
        r#"[{"question":"q","solution":"s","notes":"n"}]"#,
        r#"[{"title":"Light reactions","description":"d"}]"#,
    ]);
    let generator = generator(completion);
    let repo = MemoryRepository::default();
    let note_id = Uuid::new_v4();

    let report = generate_all(&generator, &repo, job(note_id)).await;

    assert_eq!(
        report.succeeded,
        vec![ContentKind::Summary, ContentKind::Flashcards, ContentKind::Exercises, ContentKind::FeynmanTopics]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, ContentKind::Quiz);
    assert!(!report.is_complete());

    let stored = repo.content.lock().unwrap().get(&note_id).cloned().unwrap();
    assert_eq!(stored.summary, "<p>Summary</p>");
    assert_eq!(stored.flashcards.len(), 2);
    assert!(stored.quiz_questions.is_empty());
    assert_eq!(stored.exercises.len(), 1);
    assert_eq!(stored.feynman_topics[0].id, "1");
    assert_eq!(*repo.saves.lock().unwrap(), 4);
}

#[tokio::test]
async fn chat_turns_are_recorded_in_the_note_conversation() {
    let completion = ScriptedCompletion::ok(&["Chlorophyll absorbs light."]);
    let generator = generator(completion.clone());
    let repo = MemoryRepository::default();
    let (user_id, note_id) = (Uuid::new_v4(), Uuid::new_v4());

    let reply = converse(
        &generator,
        &repo,
        ChatTurn {
            user_id,
            note_id: Some(note_id),
            history: vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
            message: "What absorbs light?".to_string(),
            note_context: Some("Photosynthesis notes".to_string()),
            language: "en".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(reply, "Chlorophyll absorbs light.");
    let messages = repo.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].1, Role::User);
    assert_eq!(messages[0].2, "What absorbs light?");
    assert_eq!(messages[1].1, Role::Assistant);
    assert_eq!(messages[0].0, messages[1].0);

    let sent = &completion.requests()[0].messages;
    assert_eq!(sent.last().unwrap().content, "What absorbs light?");
    assert_eq!(sent.len(), 4);
}

#[tokio::test]
async fn chat_without_a_note_is_not_stored() {
    let completion = ScriptedCompletion::ok(&["Sure."]);
    let generator = generator(completion);
    let repo = MemoryRepository::default();

    converse(
        &generator,
        &repo,
        ChatTurn {
            user_id: Uuid::new_v4(),
            note_id: None,
            history: Vec::new(),
            message: "Explain osmosis".to_string(),
            note_context: None,
            language: "en".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(repo.messages.lock().unwrap().is_empty());
}

fn upload(size: usize) -> AudioUpload {
    AudioUpload {
        file_name: "lecture.m4a".to_string(),
        mime_type: "audio/mp4".to_string(),
        data: vec![7u8; size],
    }
}

#[tokio::test]
async fn audio_is_transcribed_from_storage_when_upload_works() {
    let storage = FakeStorage::new(false);
    let transcriber = FakeTranscriber { transcript: " Today we cover cells. ".to_string(), ..Default::default() };
    let user_id = Uuid::new_v4();

    let text = transcribe_audio(&storage, &transcriber, &GenerationConfig::default(), user_id, upload(10), Some("en"))
        .await
        .unwrap();

    assert_eq!(text, "Today we cover cells.");
    let requests = transcriber.requests.lock().unwrap();
    assert_eq!(
        requests[0].source,
        TranscriptionSource::StoragePath(format!("{}/lecture.m4a", user_id))
    );
    assert_eq!(requests[0].language.as_deref(), Some("en"));
    assert!(requests[0].prompt.is_some());
}

#[tokio::test]
async fn small_audio_falls_back_to_inline_when_upload_fails() {
    let storage = FakeStorage::new(true);
    let transcriber = FakeTranscriber { transcript: "hello".to_string(), ..Default::default() };

    transcribe_audio(&storage, &transcriber, &GenerationConfig::default(), Uuid::new_v4(), upload(1024), None)
        .await
        .unwrap();

    let requests = transcriber.requests.lock().unwrap();
    match &requests[0].source {
        TranscriptionSource::Inline { audio, mime_type } => {
            assert_eq!(audio.len(), 1024);
            assert_eq!(mime_type, "audio/mp4");
        }
        other => panic!("expected inline audio, got {:?}", other),
    }
}

#[tokio::test]
async fn large_audio_reports_the_upload_failure() {
    let storage = FakeStorage::new(true);
    let transcriber = FakeTranscriber::default();

    let err = transcribe_audio(&storage, &transcriber, &GenerationConfig::default(), Uuid::new_v4(), upload(3 * 1024 * 1024), None)
        .await
        .unwrap_err();

    assert!(matches!(err.root(), PortError::Transport(_)));
    assert!(transcriber.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_transcripts_are_failures() {
    let storage = FakeStorage::new(false);
    let transcriber = FakeTranscriber { transcript: "   ".to_string(), ..Default::default() };

    let err = transcribe_audio(&storage, &transcriber, &GenerationConfig::default(), Uuid::new_v4(), upload(10), None)
        .await
        .unwrap_err();
    assert!(matches!(err.root(), PortError::EmptyResult(_)));
}

#[tokio::test]
async fn youtube_links_never_reach_the_processor() {
    let links = FakeLinks { content: "text".to_string(), ..Default::default() };

    let err = process_web_link(&links, "https://youtu.be/dQw4w9WgXcQ").await.unwrap_err();
    assert!(matches!(err, PortError::InvalidInput(_)));
    assert!(links.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn links_are_processed_with_their_type() {
    let links = FakeLinks { content: "Readable article".to_string(), ..Default::default() };

    let page = process_web_link(&links, " https://drive.google.com/file/d/1/view ").await.unwrap();
    assert_eq!(page.content, "Readable article");
    let calls = links.calls.lock().unwrap();
    assert_eq!(calls[0], ("https://drive.google.com/file/d/1/view".to_string(), LinkType::GoogleDrive));
}

#[tokio::test]
async fn empty_link_content_is_a_failure() {
    let links = FakeLinks::default();
    let err = process_web_link(&links, "https://example.com").await.unwrap_err();
    assert!(matches!(err.root(), PortError::EmptyResult(_)));
}
