use super::*;
use bite_protocols::Edge;

fn document() -> TranscriptDocument {
    TranscriptDocument::from_sections(vec![
        Section::new("1", Bounds::new(10.0, 50.0))
            .with_text("source", "hello")
            .with_text("translation", "你好"),
        Section::new("2", Bounds::new(50.0, 90.0)).with_text("source", "world"),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_read_section() {
    let page = MemoryPage::new(&document());
    assert_eq!(page.section_count().await, 2);

    let section = page.read_section(0).await.unwrap();
    assert_eq!(section.label, "1");
    assert_eq!(section.subsections["translation"], "你好");
    assert_eq!(section.bounds, Bounds::new(10.0, 50.0));
}

#[tokio::test]
async fn test_out_of_range() {
    let page = MemoryPage::new(&document());
    assert!(matches!(
        page.read_bounds(7).await,
        Err(PageError::SectionOutOfRange(7))
    ));
}

#[tokio::test]
async fn test_broken_elements() {
    let page = MemoryPage::new(&document());
    page.break_label(0);
    page.break_bounds(1);

    assert!(matches!(page.read_label(0).await, Err(PageError::MissingElement(_))));
    assert!(matches!(page.read_section(1).await, Err(PageError::MissingElement(_))));
    assert_eq!(page.read_label(1).await.unwrap(), "2");
}

#[tokio::test]
async fn test_write_unknown_key() {
    let page = MemoryPage::new(&document());
    let result = page.write_subsection(1, "translation", "x").await;
    assert!(matches!(result, Err(PageError::MissingElement(_))));
    assert!(page.journal().is_empty());
}

#[tokio::test]
async fn test_write_and_edit_journal() {
    let page = MemoryPage::new(&document());
    page.write_subsection(0, "source", "hi").await.unwrap();
    page.notify_edited(0, "source").await.unwrap();

    assert_eq!(page.text(0, "source").unwrap(), "hi");
    assert_eq!(
        page.journal(),
        vec![
            PageEvent::Wrote {
                section: 0,
                key: "source".to_string(),
                text: "hi".to_string()
            },
            PageEvent::Edited {
                section: 0,
                key: "source".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_transport_affordances() {
    let page = MemoryPage::new(&document()).with_playhead(12.0);

    page.trigger(&Affordance::StepBack).await.unwrap();
    assert_eq!(page.playhead(), 7.0);
    page.trigger(&Affordance::StepBack).await.unwrap();
    assert_eq!(page.playhead(), 2.0);
    page.trigger(&Affordance::StepBack).await.unwrap();
    assert_eq!(page.playhead(), 0.0);

    page.trigger(&Affordance::PlaySection(1)).await.unwrap();
    assert!(page.is_playing());
    assert_eq!(page.playhead(), 50.0);

    page.trigger(&Affordance::TransportToggle).await.unwrap();
    assert!(!page.is_playing());
    assert_eq!(page.trigger_count(&Affordance::StepBack), 3);
}

#[tokio::test]
async fn test_select_speed() {
    let page = MemoryPage::new(&document()).with_speed("0.75x");
    assert_eq!(page.read_speed().await.unwrap(), "0.75x");
    page.trigger(&Affordance::SelectSpeed("1.5x".to_string()))
        .await
        .unwrap();
    assert_eq!(page.speed(), "1.5x");
}

#[tokio::test]
async fn test_drag_moves_edge_on_release() {
    let page = MemoryPage::new(&document());
    let handle = SliceHandle {
        section: 0,
        edge: Edge::Start,
    };

    page.simulate_drag(&handle, 10.0, 15.0).await.unwrap();

    assert_eq!(page.bounds(0).unwrap(), Bounds::new(15.0, 50.0));
    let kinds: Vec<_> = page.pointer_events().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![PointerKind::Down, PointerKind::Move, PointerKind::Up]);
}
