use super::*;

fn sample() -> TranscriptDocument {
    TranscriptDocument::from_sections(vec![
        Section::new("1", Bounds::new(10.0, 50.0))
            .with_text("source", "hello")
            .with_text("translation", "你好"),
        Section::new("2", Bounds::new(50.0, 90.0))
            .with_text("source", "world")
            .with_text("translation", "世界"),
    ])
    .unwrap()
}

#[test]
fn test_duplicate_label_rejected() {
    let result = TranscriptDocument::from_sections(vec![
        Section::new("1", Bounds::default()),
        Section::new("1", Bounds::default()),
    ]);
    assert!(matches!(result, Err(DecodeError::DuplicateLabel(label)) if label == "1"));
}

#[test]
fn test_position_and_get() {
    let doc = sample();
    assert_eq!(doc.position("2"), Some(1));
    assert_eq!(doc.position("9"), None);
    assert_eq!(doc.get("1").unwrap().subsections["source"], "hello");
    assert_eq!(doc.labels().collect::<Vec<_>>(), vec!["1", "2"]);
}

#[test]
fn test_merge_changes_only_named_fields() {
    let mut doc = sample();
    let before = doc.clone();
    let patch = Patch::new().with("2", "translation", "世界!");

    let report = doc.merge(&patch);

    assert_eq!(report.applied, 1);
    assert!(report.is_clean());
    assert_eq!(doc.get("2").unwrap().subsections["translation"], "世界!");
    assert_eq!(doc.get("2").unwrap().subsections["source"], "world");
    assert_eq!(doc.get("1"), before.get("1"));
    assert_eq!(doc.bounds(), before.bounds());
}

#[test]
fn test_merge_drops_unknown_labels_and_keys() {
    let mut doc = sample();
    let before = doc.clone();
    let patch = Patch::new()
        .with("7", "source", "nobody home")
        .with("1", "notes", "not a field");

    let report = doc.merge(&patch);

    assert_eq!(report.applied, 0);
    assert_eq!(report.dropped_labels, vec!["7".to_string()]);
    assert_eq!(report.dropped_keys, vec![("1".to_string(), "notes".to_string())]);
    assert_eq!(doc, before);
}

#[test]
fn test_bounds_edge_helpers() {
    let bounds = Bounds::new(10.0, 50.0);
    assert_eq!(bounds.edge(Edge::Start), 10.0);
    assert_eq!(bounds.edge(Edge::End), 50.0);
    assert_eq!(bounds.with_edge(Edge::Start, 15.0), Bounds::new(15.0, 50.0));
    assert!(bounds.approx_eq(&Bounds::new(10.2, 49.9), 0.5));
    assert!(!bounds.approx_eq(&Bounds::new(20.0, 50.0), 0.5));
}

#[test]
fn test_patch_serde_is_plain_mapping() {
    let patch: Patch = serde_json::from_str(r#"{"1": {"source": "hi"}}"#).unwrap();
    assert_eq!(patch.len(), 1);
    let json = serde_json::to_value(&patch).unwrap();
    assert_eq!(json["1"]["source"], "hi");
}

#[test]
fn test_empty_patch() {
    assert!(Patch::new().is_empty());
    let patch: Patch = serde_json::from_str(r#"{"1": {}}"#).unwrap();
    assert!(patch.is_empty());
}

#[test]
fn test_edge_serde() {
    assert_eq!(serde_json::to_string(&Edge::Start).unwrap(), "\"start\"");
    let edge: Edge = serde_json::from_str("\"end\"").unwrap();
    assert_eq!(edge, Edge::End);
}
