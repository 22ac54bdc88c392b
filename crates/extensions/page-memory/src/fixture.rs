//! Page fixtures loaded from JSON.
//!
//! A fixture uses the same per-section shape as a content push:
//!
//! ```json
//! { "speed": "1.0x", "playhead": 12.5,
//!   "sections": { "1": { "source": "hello", "start": 10, "end": 50 } } }
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use bite_protocols::{ContentPayload, DecodeError};

use crate::page::MemoryPage;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    Document(#[from] DecodeError),
}

/// Initial page state.
#[derive(Debug, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub playhead: f64,
    pub sections: ContentPayload,
}

impl PageFixture {
    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn into_page(self) -> Result<MemoryPage, FixtureError> {
        let document = self.sections.into_document()?;
        let page = MemoryPage::new(&document).with_playhead(self.playhead);
        Ok(match self.speed {
            Some(speed) => page.with_speed(speed),
            None => page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURE: &str = r#"{
        "speed": "1.25x",
        "playhead": 12.5,
        "sections": {
            "1": {"source": "hello", "start": 10, "end": 50},
            "2": {"source": "world", "start": 50, "end": 90}
        }
    }"#;

    #[test]
    fn test_fixture_into_page() {
        let page = PageFixture::from_json(FIXTURE).unwrap().into_page().unwrap();
        assert_eq!(page.speed(), "1.25x");
        assert_eq!(page.playhead(), 12.5);
        assert_eq!(page.sections().len(), 2);
        assert_eq!(page.text(1, "source").unwrap(), "world");
    }

    #[test]
    fn test_fixture_defaults() {
        let page = PageFixture::from_json(r#"{"sections": {}}"#)
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(page.speed(), "1.0x");
        assert_eq!(page.playhead(), 0.0);
    }

    #[test]
    fn test_fixture_requires_sections() {
        assert!(matches!(
            PageFixture::from_json(r#"{"speed": "1x"}"#),
            Err(FixtureError::Json(_))
        ));
    }

    #[test]
    fn test_fixture_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", FIXTURE).unwrap();
        let fixture = PageFixture::load(file.path()).unwrap();
        assert_eq!(fixture.sections.entries.len(), 2);
    }
}
