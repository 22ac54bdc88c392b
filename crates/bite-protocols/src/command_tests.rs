use super::*;
use serde_json::json;

#[test]
fn test_decode_play() {
    let cmd = Command::from_value(json!({"action": "play", "section": "3"})).unwrap();
    assert_eq!(cmd, Command::Play { section: "3".to_string() });
    assert_eq!(cmd.action(), "play");
}

#[test]
fn test_decode_back_count_variants() {
    let cases = [
        (json!({"action": "back", "count": 3}), Some(3)),
        (json!({"action": "back", "count": "2"}), Some(2)),
        (json!({"action": "back"}), None),
        (json!({"action": "back", "count": 0}), None),
        (json!({"action": "back", "count": -4}), None),
        (json!({"action": "back", "count": "lots"}), None),
        (json!({"action": "back", "count": null}), None),
    ];
    for (value, expected) in cases {
        let cmd = Command::from_value(value.clone()).unwrap();
        assert_eq!(cmd, Command::Back { count: expected }, "input: {value}");
    }
}

#[test]
fn test_decode_push_slice() {
    let cmd = Command::from_value(json!({
        "action": "push_slice",
        "section": "1",
        "edge": "start",
        "x": 15,
        "section_edge_pos": {"1": {"start": 10, "end": 50}, "2": {"start": 50, "end": 90}}
    }))
    .unwrap();

    let Command::PushSlice { section, edge, x, section_edge_pos } = cmd else {
        panic!("expected push_slice");
    };
    assert_eq!(section, "1");
    assert_eq!(edge, Edge::Start);
    assert_eq!(x, 15.0);
    assert_eq!(section_edge_pos["1"], Bounds::new(10.0, 50.0));
    assert_eq!(section_edge_pos.len(), 2);
}

#[test]
fn test_decode_close_sse() {
    let cmd = Command::from_value(json!({"action": "close_sse"})).unwrap();
    assert_eq!(cmd, Command::CloseSession);
}

#[test]
fn test_decode_unknown_action() {
    let cmd = Command::from_value(json!({"action": "foo", "bar": 1})).unwrap();
    assert_eq!(cmd, Command::Unknown { action: "foo".to_string() });
    assert_eq!(cmd.action(), "foo");
}

#[test]
fn test_decode_missing_action() {
    let result = Command::from_value(json!({"section": "1"}));
    assert!(matches!(result, Err(DecodeError::MissingAction)));
}

#[test]
fn test_decode_speed_offset_variants() {
    let cases = [
        (json!({"action": "speed", "offset": -2}), -2),
        (json!({"action": "speed", "offset": "1"}), 1),
        (json!({"action": "speed", "offset": " -1 "}), -1),
        (json!({"action": "speed", "offset": 1.0}), 1),
    ];
    for (value, expected) in cases {
        let cmd = Command::from_value(value.clone()).unwrap();
        assert_eq!(cmd, Command::Speed { offset: expected }, "input: {value}");
    }
}

#[test]
fn test_decode_speed_fractional_offset_is_malformed() {
    let result = Command::from_value(json!({"action": "speed", "offset": 1.5}));
    assert!(matches!(result, Err(DecodeError::Malformed { .. })));
}

#[test]
fn test_decode_malformed_known_action() {
    let result = Command::from_value(json!({"action": "speed", "offset": "fast"}));
    assert!(matches!(result, Err(DecodeError::Malformed { action, .. }) if action == "speed"));
}

#[test]
fn test_inbound_array_with_patch() {
    let inbound =
        Inbound::decode(r#"[{"action": "toggle"}, {"1": {"source": "fixed"}}]"#).unwrap();
    assert_eq!(inbound.command, Command::Toggle);
    assert_eq!(inbound.patch, Some(Patch::new().with("1", "source", "fixed")));
}

#[test]
fn test_inbound_patch_keeps_only_text_entries() {
    let inbound =
        Inbound::decode(r#"[{"action":"toggle"},{"1":{"source":"x","start":10}}]"#).unwrap();
    assert_eq!(inbound.command, Command::Toggle);
    assert_eq!(inbound.patch, Some(Patch::new().with("1", "source", "x")));
}

#[test]
fn test_inbound_unusable_patch_is_dropped() {
    let cases = [
        r#"[{"action":"toggle"},{"1":{"start":10,"end":50}}]"#,
        r#"[{"action":"toggle"},{"1":"source"}]"#,
        r#"[{"action":"toggle"},{}]"#,
        r#"[{"action":"toggle"},"text"]"#,
    ];
    for text in cases {
        let inbound = Inbound::decode(text).unwrap();
        assert_eq!(inbound.command, Command::Toggle, "input: {text}");
        assert!(inbound.patch.is_none(), "input: {text}");
    }
}

#[test]
fn test_inbound_bare_object() {
    let inbound = Inbound::decode(r#"{"action": "fetch_progress", "callback": "cb"}"#).unwrap();
    assert_eq!(
        inbound.command,
        Command::FetchProgress { callback: Some("cb".to_string()) }
    );
    assert!(inbound.patch.is_none());
}

#[test]
fn test_inbound_empty_array() {
    assert!(matches!(Inbound::decode("[]"), Err(DecodeError::EmptyMessage)));
}

#[test]
fn test_inbound_invalid_json() {
    assert!(matches!(Inbound::decode("[{"), Err(DecodeError::Json(_))));
}

#[test]
fn test_inbound_to_value() {
    let inbound = Inbound::new(Command::Speed { offset: -1 })
        .with_patch(Patch::new().with("2", "translation", "好"));
    let value = inbound.to_value().unwrap();
    assert_eq!(value[0]["action"], "speed");
    assert_eq!(value[0]["offset"], -1);
    assert_eq!(value[1]["2"]["translation"], "好");

    let back = Inbound::from_value(value).unwrap();
    assert_eq!(back, inbound);
}

#[test]
fn test_unknown_command_to_value() {
    let inbound = Inbound::new(Command::Unknown { action: "rewind".to_string() });
    let value = inbound.to_value().unwrap();
    assert_eq!(value, json!([{"action": "rewind"}]));

    let back = Inbound::from_value(value).unwrap();
    assert_eq!(back, inbound);
}
