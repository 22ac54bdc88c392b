use super::*;
use bite_page_memory::{MemoryCompanion, MemoryPage, PageEvent};
use bite_protocols::{PointerKind, Section};

fn document() -> TranscriptDocument {
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

fn setup() -> (SyncEngine, Arc<MemoryPage>, Arc<MemoryCompanion>) {
    let page = Arc::new(MemoryPage::new(&document()));
    let companion = Arc::new(MemoryCompanion::new());
    let engine = SyncEngine::new(page.clone(), companion.clone(), &EngineConfig::default());
    (engine, page, companion)
}

fn errors(companion: &MemoryCompanion) -> Vec<String> {
    companion
        .logs()
        .into_iter()
        .filter(|(level, _)| *level == LogLevel::Error)
        .map(|(_, msg)| msg)
        .collect()
}

#[tokio::test]
async fn test_snapshot_reads_page() {
    let (engine, _, _) = setup();
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot, document());
}

#[tokio::test]
async fn test_snapshot_skips_broken_sections() {
    let (engine, page, _) = setup();
    page.break_bounds(0);

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.labels().collect::<Vec<_>>(), vec!["2"]);

    let bounds = engine.bounds_snapshot().await;
    assert_eq!(bounds, vec![("2".to_string(), Bounds::new(50.0, 90.0))]);
}

#[tokio::test]
async fn test_apply_patch_writes_and_notifies() {
    let (engine, page, _) = setup();
    let patch = Patch::new().with("2", "translation", "地球");

    let report = engine.apply_patch(&patch).await;

    assert_eq!(report.applied, 1);
    assert!(report.is_clean());
    assert_eq!(page.text(1, "translation").unwrap(), "地球");
    assert_eq!(
        page.journal().last(),
        Some(&PageEvent::Edited {
            section: 1,
            key: "translation".to_string()
        })
    );
}

#[tokio::test]
async fn test_apply_patch_reports_drops() {
    let (engine, page, _) = setup();
    let patch = Patch::new()
        .with("1", "source", "hi")
        .with("1", "notes", "x")
        .with("7", "source", "y");

    let report = engine.apply_patch(&patch).await;

    assert_eq!(report.applied, 1);
    assert_eq!(report.dropped_labels, vec!["7".to_string()]);
    assert_eq!(
        report.dropped_keys,
        vec![("1".to_string(), "notes".to_string())]
    );
    assert_eq!(page.text(0, "source").unwrap(), "hi");
}

#[tokio::test]
async fn test_play_section() {
    let (engine, page, _) = setup();
    let flow = engine
        .handle_command(Inbound::new(Command::Play {
            section: "2".to_string(),
        }))
        .await;

    assert_eq!(flow, Flow::Continue);
    assert_eq!(page.trigger_count(&Affordance::PlaySection(1)), 1);
    assert!(page.is_playing());
}

#[tokio::test]
async fn test_play_missing_section_is_logged_noop() {
    let (engine, page, companion) = setup();
    engine
        .handle_command(Inbound::new(Command::Play {
            section: "9".to_string(),
        }))
        .await;

    assert!(page.journal().is_empty());
    let errors = errors(&companion);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Section not found: 9"));
}

#[tokio::test]
async fn test_toggle() {
    let (engine, page, _) = setup();
    engine.handle_command(Inbound::new(Command::Toggle)).await;
    assert!(page.is_playing());
}

#[tokio::test]
async fn test_back_defaults_to_one() {
    let (engine, page, companion) = setup();
    engine
        .handle_command(Inbound::new(Command::Back { count: None }))
        .await;

    assert_eq!(page.trigger_count(&Affordance::StepBack), 1);
    assert_eq!(
        companion.logs(),
        vec![(LogLevel::Info, "Stepping back 1 time(s)".to_string())]
    );
}

#[tokio::test]
async fn test_put_applies_data() {
    let (engine, page, _) = setup();
    engine
        .handle_command(Inbound::new(Command::Put {
            data: Patch::new().with("1", "translation", "您好"),
        }))
        .await;
    assert_eq!(page.text(0, "translation").unwrap(), "您好");
}

#[tokio::test]
async fn test_trailing_patch_reapplied_after_action() {
    let (engine, page, _) = setup();
    let inbound = Inbound::new(Command::Toggle).with_patch(Patch::new().with("2", "source", "earth"));

    engine.handle_command(inbound).await;

    assert_eq!(page.text(1, "source").unwrap(), "earth");
}

#[tokio::test]
async fn test_trailing_patch_reapplied_after_failed_action() {
    let (engine, page, _) = setup();
    let inbound = Inbound::new(Command::Play {
        section: "missing".to_string(),
    })
    .with_patch(Patch::new().with("1", "source", "kept in sync"));

    engine.handle_command(inbound).await;

    assert_eq!(page.text(0, "source").unwrap(), "kept in sync");
}

#[tokio::test]
async fn test_close_session_stops_without_patch() {
    let (engine, page, companion) = setup();
    let inbound =
        Inbound::new(Command::CloseSession).with_patch(Patch::new().with("1", "source", "late"));

    let flow = engine.handle_command(inbound).await;

    assert_eq!(flow, Flow::Stop);
    assert_eq!(page.text(0, "source").unwrap(), "hello");
    assert!(companion.pushes().is_empty());
}

#[tokio::test]
async fn test_init_transcripts_generates_in_order_then_pushes_content() {
    let (engine, page, companion) = setup();
    engine
        .handle_command(Inbound::new(Command::InitTranscripts))
        .await;

    assert_eq!(
        page.journal(),
        vec![
            PageEvent::Triggered(Affordance::GenerateTranscript(0)),
            PageEvent::Triggered(Affordance::GenerateTranscript(1)),
        ]
    );
    assert_eq!(
        companion.snapshots(),
        vec![Push::Content {
            document: document(),
            callback: None
        }]
    );
}

#[tokio::test]
async fn test_fetch_content_echoes_callback() {
    let (engine, _, companion) = setup();
    engine
        .handle_command(Inbound::new(Command::FetchContent {
            callback: Some("cb-7".to_string()),
        }))
        .await;

    let pushes = companion.snapshots();
    assert!(matches!(
        &pushes[..],
        [Push::Content { callback: Some(cb), .. }] if cb == "cb-7"
    ));
}

#[tokio::test]
async fn test_fetch_slice() {
    let (engine, _, companion) = setup();
    engine
        .handle_command(Inbound::new(Command::FetchSlice {
            callback: Some("slice".to_string()),
        }))
        .await;

    assert_eq!(
        companion.snapshots(),
        vec![Push::Slice {
            bounds: document().bounds(),
            callback: Some("slice".to_string())
        }]
    );
}

#[tokio::test]
async fn test_fetch_progress() {
    let page = Arc::new(MemoryPage::new(&document()).with_playhead(33.5));
    let companion = Arc::new(MemoryCompanion::new());
    let engine = SyncEngine::new(page, companion.clone(), &EngineConfig::default());

    engine
        .handle_command(Inbound::new(Command::FetchProgress { callback: None }))
        .await;

    assert_eq!(
        companion.snapshots(),
        vec![Push::Progress {
            x: 33.5,
            callback: None
        }]
    );
}

#[tokio::test]
async fn test_speed_change_reports_label() {
    let (engine, page, companion) = setup();
    engine
        .handle_command(Inbound::new(Command::Speed { offset: 2 }))
        .await;

    assert_eq!(page.speed(), "1.5x");
    assert_eq!(
        companion.logs(),
        vec![(LogLevel::Info, "Speed: 1.5x".to_string())]
    );
}

#[tokio::test]
async fn test_push_slice_drags_from_current_edge() {
    let (engine, page, companion) = setup();
    let expected = document().bounds().into_iter().collect();

    engine
        .handle_command(Inbound::new(Command::PushSlice {
            section: "2".to_string(),
            edge: Edge::End,
            x: 95.0,
            section_edge_pos: expected,
        }))
        .await;

    let events = page.pointer_events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, PointerKind::Down);
    assert_eq!(events[0].x, 90.0);
    assert_eq!(events[2].x, 95.0);
    assert_eq!(page.bounds(1).unwrap(), Bounds::new(50.0, 95.0));
    assert!(errors(&companion).is_empty());
}

#[tokio::test]
async fn test_stale_callback_is_configurable() {
    let page = Arc::new(MemoryPage::new(&document()));
    let companion = Arc::new(MemoryCompanion::new());
    let config = EngineConfig {
        stale_slice_callback: "retry_slice".to_string(),
        ..Default::default()
    };
    let engine = SyncEngine::new(page.clone(), companion.clone(), &config);

    engine
        .handle_command(Inbound::new(Command::PushSlice {
            section: "1".to_string(),
            edge: Edge::Start,
            x: 12.0,
            section_edge_pos: BTreeMap::new(),
        }))
        .await;

    assert!(page.pointer_events().is_empty());
    assert!(matches!(
        &companion.snapshots()[..],
        [Push::Slice { callback: Some(cb), .. }] if cb == "retry_slice"
    ));
}
