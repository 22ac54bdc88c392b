//! JSON bodies exchanged with the companion endpoint.
//!
//! Snapshot bodies are flat objects keyed by section label, in document
//! order, with an optional `callback` key echoed back to the caller:
//!
//! ```json
//! {"1": {"source": "hello", "start": 10, "end": 50}, "callback": "cb_1"}
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::document::{Bounds, Section, TranscriptDocument};
use crate::error::DecodeError;

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;

const CALLBACK_KEY: &str = "callback";

/// Label-keyed map that keeps insertion order on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Labelled<T> {
    pub entries: Vec<(String, T)>,
    pub callback: Option<String>,
}

impl<T> Labelled<T> {
    pub fn new(entries: Vec<(String, T)>, callback: Option<String>) -> Self {
        Self { entries, callback }
    }

    pub fn get(&self, label: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| value)
    }
}

impl<T: Serialize> Serialize for Labelled<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.entries.len() + usize::from(self.callback.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        if let Some(callback) = &self.callback {
            map.serialize_entry(CALLBACK_KEY, callback)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Labelled<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelledVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for LabelledVisitor<T> {
            type Value = Labelled<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by section label")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                let mut callback = None;
                while let Some(key) = access.next_key::<String>()? {
                    if key == CALLBACK_KEY {
                        callback = access.next_value::<Option<String>>()?;
                    } else {
                        let value = access.next_value::<T>()?;
                        entries.push((key, value));
                    }
                }
                Ok(Labelled { entries, callback })
            }
        }

        deserializer.deserialize_map(LabelledVisitor(PhantomData))
    }
}

/// One section as it travels in a content push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireSection {
    #[serde(flatten)]
    pub texts: BTreeMap<String, String>,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
}

/// Body of `POST /fetch_content`.
pub type ContentPayload = Labelled<WireSection>;

/// Body of `POST /fetch_slice`.
pub type SlicePayload = Labelled<Bounds>;

impl ContentPayload {
    pub fn from_document(document: &TranscriptDocument, callback: Option<String>) -> Self {
        let entries = document
            .sections()
            .iter()
            .map(|s| {
                let wire = WireSection {
                    texts: s.subsections.clone(),
                    start: s.bounds.start,
                    end: s.bounds.end,
                };
                (s.label.clone(), wire)
            })
            .collect();
        Self::new(entries, callback)
    }

    /// Rebuild the document, rejecting duplicate labels.
    pub fn into_document(self) -> Result<TranscriptDocument, DecodeError> {
        let sections = self
            .entries
            .into_iter()
            .map(|(label, wire)| Section {
                label,
                subsections: wire.texts,
                bounds: Bounds::new(wire.start, wire.end),
            })
            .collect();
        TranscriptDocument::from_sections(sections)
    }
}

/// Body of `POST /fetch_progress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub x: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}
