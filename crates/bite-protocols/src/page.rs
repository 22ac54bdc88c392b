//! Page adapter protocol.
//!
//! The page adapter is the only thing that touches the live editing surface.
//! Sections are addressed by their position on the page; the engine resolves
//! labels to positions before calling in.

use async_trait::async_trait;

use crate::document::{Bounds, Edge, Section};
use crate::error::PageError;

/// A clickable control on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    /// Play button of one section.
    PlaySection(usize),
    /// Transport play/pause button.
    TransportToggle,
    /// Transport step-back button.
    StepBack,
    /// "Generate transcript" button of one section.
    GenerateTranscript(usize),
    /// Entry of the playback speed menu.
    SelectSpeed(String),
}

/// Pointer phase of a synthetic gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A synthetic pointer event at a timeline position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f64) -> Self {
        Self { kind, x }
    }
}

/// The drag handle on one edge of a section's region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceHandle {
    pub section: usize,
    pub edge: Edge,
}

/// Capability interface over the live page.
#[async_trait]
pub trait PageAdapter: Send + Sync {
    /// Number of section containers currently on the page.
    async fn section_count(&self) -> usize;

    /// Label of the section at `index`.
    async fn read_label(&self, index: usize) -> Result<String, PageError>;

    /// Full section at `index`: label, subsection texts and bounds.
    async fn read_section(&self, index: usize) -> Result<Section, PageError>;

    /// Bounds of the section at `index`.
    async fn read_bounds(&self, index: usize) -> Result<Bounds, PageError>;

    /// Overwrite one subsection's text.
    async fn write_subsection(&self, index: usize, key: &str, text: &str) -> Result<(), PageError>;

    /// Fire the page's "user edited this field" notification so autosave and
    /// friends run as if a human had typed.
    async fn notify_edited(&self, index: usize, key: &str) -> Result<(), PageError>;

    /// Click a control.
    async fn trigger(&self, affordance: &Affordance) -> Result<(), PageError>;

    /// Label of the currently selected playback speed.
    async fn read_speed(&self) -> Result<String, PageError>;

    /// Current playhead position on the timeline.
    async fn read_playhead(&self) -> Result<f64, PageError>;

    /// Dispatch one pointer event on a drag handle.
    async fn pointer(&self, handle: &SliceHandle, event: PointerEvent) -> Result<(), PageError>;

    /// Press at `from`, move to `to`, release at `to`.
    async fn simulate_drag(&self, handle: &SliceHandle, from: f64, to: f64) -> Result<(), PageError> {
        self.pointer(handle, PointerEvent::new(PointerKind::Down, from))
            .await?;
        self.pointer(handle, PointerEvent::new(PointerKind::Move, to))
            .await?;
        self.pointer(handle, PointerEvent::new(PointerKind::Up, to))
            .await
    }
}
