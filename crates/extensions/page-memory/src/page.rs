//! In-memory page adapter.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use bite_protocols::{
    Affordance, Bounds, PageAdapter, PageError, PointerEvent, PointerKind, Section, SliceHandle,
    TranscriptDocument,
};

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;

/// Playhead distance covered by one step-back.
const STEP_BACK: f64 = 5.0;

/// Something the page was asked to do, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Wrote {
        section: usize,
        key: String,
        text: String,
    },
    Edited {
        section: usize,
        key: String,
    },
    Triggered(Affordance),
    Pointer {
        handle: SliceHandle,
        event: PointerEvent,
    },
}

/// One section container. A `None` label or bounds stands for a broken
/// structural element on a real page.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySection {
    pub label: Option<String>,
    pub subsections: BTreeMap<String, String>,
    pub bounds: Option<Bounds>,
}

impl From<&Section> for MemorySection {
    fn from(section: &Section) -> Self {
        Self {
            label: Some(section.label.clone()),
            subsections: section.subsections.clone(),
            bounds: Some(section.bounds),
        }
    }
}

#[derive(Debug)]
struct PageState {
    sections: Vec<MemorySection>,
    speed: String,
    playhead: f64,
    playing: bool,
    journal: Vec<PageEvent>,
}

/// Page adapter over plain data with an event journal.
#[derive(Debug)]
pub struct MemoryPage {
    state: Mutex<PageState>,
}

impl MemoryPage {
    pub fn new(document: &TranscriptDocument) -> Self {
        Self {
            state: Mutex::new(PageState {
                sections: document.sections().iter().map(MemorySection::from).collect(),
                speed: "1.0x".to_string(),
                playhead: 0.0,
                playing: false,
                journal: Vec::new(),
            }),
        }
    }

    pub fn with_speed(self, speed: impl Into<String>) -> Self {
        self.state.lock().speed = speed.into();
        self
    }

    pub fn with_playhead(self, playhead: f64) -> Self {
        self.state.lock().playhead = playhead;
        self
    }

    /// Replace the bounds of a section, as a timeline shift would.
    pub fn set_bounds(&self, index: usize, bounds: Bounds) {
        if let Some(section) = self.state.lock().sections.get_mut(index) {
            section.bounds = Some(bounds);
        }
    }

    /// Drop the label of a section, making it unreadable.
    pub fn break_label(&self, index: usize) {
        if let Some(section) = self.state.lock().sections.get_mut(index) {
            section.label = None;
        }
    }

    /// Drop the region of a section, making its bounds unreadable.
    pub fn break_bounds(&self, index: usize) {
        if let Some(section) = self.state.lock().sections.get_mut(index) {
            section.bounds = None;
        }
    }

    pub fn sections(&self) -> Vec<MemorySection> {
        self.state.lock().sections.clone()
    }

    pub fn text(&self, index: usize, key: &str) -> Option<String> {
        self.state
            .lock()
            .sections
            .get(index)
            .and_then(|s| s.subsections.get(key).cloned())
    }

    pub fn bounds(&self, index: usize) -> Option<Bounds> {
        self.state.lock().sections.get(index).and_then(|s| s.bounds)
    }

    pub fn speed(&self) -> String {
        self.state.lock().speed.clone()
    }

    pub fn playhead(&self) -> f64 {
        self.state.lock().playhead
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn journal(&self) -> Vec<PageEvent> {
        self.state.lock().journal.clone()
    }

    /// Pointer events only, in order.
    pub fn pointer_events(&self) -> Vec<PointerEvent> {
        self.state
            .lock()
            .journal
            .iter()
            .filter_map(|e| match e {
                PageEvent::Pointer { event, .. } => Some(*event),
                _ => None,
            })
            .collect()
    }

    /// How many times `affordance` was clicked.
    pub fn trigger_count(&self, affordance: &Affordance) -> usize {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|e| matches!(e, PageEvent::Triggered(a) if a == affordance))
            .count()
    }
}

impl PageState {
    fn section(&self, index: usize) -> Result<&MemorySection, PageError> {
        self.sections
            .get(index)
            .ok_or(PageError::SectionOutOfRange(index))
    }

    fn section_mut(&mut self, index: usize) -> Result<&mut MemorySection, PageError> {
        self.sections
            .get_mut(index)
            .ok_or(PageError::SectionOutOfRange(index))
    }

    fn label(&self, index: usize) -> Result<String, PageError> {
        self.section(index)?
            .label
            .clone()
            .ok_or_else(|| PageError::MissingElement(format!("label of section #{}", index)))
    }

    fn bounds(&self, index: usize) -> Result<Bounds, PageError> {
        self.section(index)?
            .bounds
            .ok_or_else(|| PageError::MissingElement(format!("region of section #{}", index)))
    }
}

#[async_trait]
impl PageAdapter for MemoryPage {
    async fn section_count(&self) -> usize {
        self.state.lock().sections.len()
    }

    async fn read_label(&self, index: usize) -> Result<String, PageError> {
        self.state.lock().label(index)
    }

    async fn read_section(&self, index: usize) -> Result<Section, PageError> {
        let state = self.state.lock();
        let label = state.label(index)?;
        let bounds = state.bounds(index)?;
        Ok(Section {
            label,
            subsections: state.section(index)?.subsections.clone(),
            bounds,
        })
    }

    async fn read_bounds(&self, index: usize) -> Result<Bounds, PageError> {
        self.state.lock().bounds(index)
    }

    async fn write_subsection(&self, index: usize, key: &str, text: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        let slot = state
            .section_mut(index)?
            .subsections
            .get_mut(key)
            .ok_or_else(|| PageError::MissingElement(format!("subsection '{}'", key)))?;
        *slot = text.to_string();
        state.journal.push(PageEvent::Wrote {
            section: index,
            key: key.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn notify_edited(&self, index: usize, key: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        state.section(index)?;
        state.journal.push(PageEvent::Edited {
            section: index,
            key: key.to_string(),
        });
        Ok(())
    }

    async fn trigger(&self, affordance: &Affordance) -> Result<(), PageError> {
        let mut state = self.state.lock();
        match affordance {
            Affordance::PlaySection(index) => {
                let bounds = state.bounds(*index)?;
                state.playhead = bounds.start;
                state.playing = true;
            }
            Affordance::TransportToggle => state.playing = !state.playing,
            Affordance::StepBack => state.playhead = (state.playhead - STEP_BACK).max(0.0),
            Affordance::GenerateTranscript(index) => {
                state.section(*index)?;
            }
            Affordance::SelectSpeed(label) => state.speed = label.clone(),
        }
        debug!("Page triggered {:?}", affordance);
        state.journal.push(PageEvent::Triggered(affordance.clone()));
        Ok(())
    }

    async fn read_speed(&self) -> Result<String, PageError> {
        Ok(self.state.lock().speed.clone())
    }

    async fn read_playhead(&self) -> Result<f64, PageError> {
        Ok(self.state.lock().playhead)
    }

    async fn pointer(&self, handle: &SliceHandle, event: PointerEvent) -> Result<(), PageError> {
        let mut state = self.state.lock();
        let bounds = state.bounds(handle.section)?;
        if event.kind == PointerKind::Up {
            state.section_mut(handle.section)?.bounds = Some(bounds.with_edge(handle.edge, event.x));
        }
        state.journal.push(PageEvent::Pointer {
            handle: *handle,
            event,
        });
        Ok(())
    }
}
