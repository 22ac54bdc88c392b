use super::*;
use crate::document::Section;

#[test]
fn test_push_paths() {
    assert_eq!(Push::CloseSession.path(), "/close_sse");
    assert_eq!(Push::log(LogLevel::Info, "x").path(), "/log");
    assert_eq!(
        Push::Progress { x: 0.0, callback: None }.path(),
        "/fetch_progress"
    );
    assert_eq!(
        Push::Slice { bounds: vec![], callback: None }.path(),
        "/fetch_slice"
    );
    assert_eq!(
        Push::Content { document: TranscriptDocument::new(), callback: None }.path(),
        "/fetch_content"
    );
}

#[test]
fn test_log_body() {
    let body = Push::log(LogLevel::Error, "stale bounds").body().unwrap();
    assert_eq!(body["msg"], "stale bounds");
    assert_eq!(body["level"], "ERROR");
}

#[test]
fn test_slice_body_echoes_callback() {
    let push = Push::Slice {
        bounds: vec![("1".to_string(), Bounds::new(20.0, 50.0))],
        callback: Some(STALE_SLICE_CALLBACK.to_string()),
    };
    let body = push.body().unwrap();
    assert_eq!(body["1"]["start"], 20.0);
    assert_eq!(body["callback"], "callback_receive_slice");
}

#[test]
fn test_content_body() {
    let document = TranscriptDocument::from_sections(vec![
        Section::new("1", Bounds::new(0.0, 5.0)).with_text("source", "a"),
    ])
    .unwrap();
    let body = Push::Content { document, callback: None }.body().unwrap();
    assert_eq!(body["1"]["source"], "a");
    assert!(body.get("callback").is_none());
}

#[test]
fn test_close_body_is_empty_object() {
    let body = Push::CloseSession.body().unwrap();
    assert_eq!(body, serde_json::json!({}));
}

#[test]
fn test_log_level_display() {
    assert_eq!(LogLevel::Info.to_string(), "INFO");
    assert_eq!(LogLevel::Error.to_string(), "ERROR");
}
