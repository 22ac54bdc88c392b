//! Page adapter errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Element not found: {0}")]
    MissingElement(String),

    #[error("Malformed element: {0}")]
    Malformed(String),

    #[error("Section index out of range: {0}")]
    SectionOutOfRange(usize),

    #[error("Unsupported by this page: {0}")]
    Unsupported(String),
}

impl PageError {
    /// Missing or malformed structure, as opposed to a page that cannot do
    /// the operation at all.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PageError::MissingElement(_) | PageError::Malformed(_) | PageError::SectionOutOfRange(_)
        )
    }
}
