//! Error types for the sync engine and session.

use thiserror::Error;

use bite_protocols::{PageError, TransportError};

/// A command handler failed. Never escapes [`crate::SyncEngine::handle_command`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Stale slice for section {section}: {detail}")]
    StaleSlice { section: String, detail: String },

    #[error(transparent)]
    Speed(#[from] SpeedError),
}

/// Speed change rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeedError {
    #[error("Speed too low: {current} {offset:+} is below {slowest}")]
    TooLow {
        current: String,
        offset: i64,
        slowest: String,
    },

    #[error("Speed too high: {current} {offset:+} is above {fastest}")]
    TooHigh {
        current: String,
        offset: i64,
        fastest: String,
    },

    #[error("Unknown speed level: {0}")]
    UnknownLevel(String),

    #[error("No speed levels configured")]
    NoLevels,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Subscribe failed: {0}")]
    Subscribe(#[from] TransportError),
}
