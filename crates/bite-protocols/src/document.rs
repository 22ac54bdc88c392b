//! Normalized transcript document.
//!
//! A document is an ordered list of sections. Each section carries named
//! subsection texts (source text, translation, ...) and the region it covers
//! on the shared timeline. Bounds are unit-agnostic: pixels on one page,
//! seconds on another.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;

/// One side of a timeline region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Start,
    End,
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Start => write!(f, "start"),
            Edge::End => write!(f, "end"),
        }
    }
}

/// Timeline region covered by a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub start: f64,
    pub end: f64,
}

impl Bounds {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Position of one edge.
    pub fn edge(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Start => self.start,
            Edge::End => self.end,
        }
    }

    /// Copy with one edge moved.
    pub fn with_edge(self, edge: Edge, value: f64) -> Self {
        match edge {
            Edge::Start => Self { start: value, ..self },
            Edge::End => Self { end: value, ..self },
        }
    }

    /// Both edges within `tolerance` of `other`.
    pub fn approx_eq(&self, other: &Bounds, tolerance: f64) -> bool {
        (self.start - other.start).abs() <= tolerance && (self.end - other.end).abs() <= tolerance
    }
}

/// A labelled transcript unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub label: String,
    pub subsections: BTreeMap<String, String>,
    pub bounds: Bounds,
}

impl Section {
    pub fn new(label: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            label: label.into(),
            subsections: BTreeMap::new(),
            bounds,
        }
    }

    /// Builder-style subsection insert.
    pub fn with_text(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.subsections.insert(key.into(), text.into());
        self
    }
}

/// Ordered sequence of sections with unique labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptDocument {
    sections: Vec<Section>,
}

impl TranscriptDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from sections, rejecting duplicate labels.
    pub fn from_sections(sections: Vec<Section>) -> Result<Self, DecodeError> {
        let mut document = Self::new();
        for section in sections {
            document.push(section)?;
        }
        Ok(document)
    }

    /// Append a section. Labels must stay unique.
    pub fn push(&mut self, section: Section) -> Result<(), DecodeError> {
        if self.position(&section.label).is_some() {
            return Err(DecodeError::DuplicateLabel(section.label));
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.label == label)
    }

    pub fn get(&self, label: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.label.as_str())
    }

    /// Bounds of every section in document order.
    pub fn bounds(&self) -> Vec<(String, Bounds)> {
        self.sections
            .iter()
            .map(|s| (s.label.clone(), s.bounds))
            .collect()
    }

    /// Merge a patch into this document value.
    ///
    /// Only labels and keys already present are overwritten; everything else
    /// in the patch is reported as dropped. Bounds are never touched.
    pub fn merge(&mut self, patch: &Patch) -> PatchReport {
        let mut report = PatchReport::default();
        for (label, texts) in patch.iter() {
            let Some(section) = self.sections.iter_mut().find(|s| &s.label == label) else {
                report.dropped_labels.push(label.clone());
                continue;
            };
            for (key, text) in texts {
                match section.subsections.get_mut(key) {
                    Some(slot) => {
                        *slot = text.clone();
                        report.applied += 1;
                    }
                    None => report.dropped_keys.push((label.clone(), key.clone())),
                }
            }
        }
        report
    }
}

/// Partial document: label -> subsection key -> text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(BTreeMap<String, BTreeMap<String, String>>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, key: impl Into<String>, text: impl Into<String>) {
        self.0
            .entry(label.into())
            .or_default()
            .insert(key.into(), text.into());
    }

    /// Builder-style [`Patch::insert`].
    pub fn with(mut self, label: impl Into<String>, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(label, key, text);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, String>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    /// Number of text entries.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }
}

/// Outcome of applying a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Text fields overwritten.
    pub applied: usize,
    /// Patch labels with no matching section.
    pub dropped_labels: Vec<String>,
    /// `(label, key)` pairs whose section exists but has no such subsection.
    pub dropped_keys: Vec<(String, String)>,
}

impl PatchReport {
    /// Nothing in the patch was dropped.
    pub fn is_clean(&self) -> bool {
        self.dropped_labels.is_empty() && self.dropped_keys.is_empty()
    }
}
