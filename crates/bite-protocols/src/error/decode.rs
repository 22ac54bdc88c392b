//! Inbound message decoding errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message has no action field")]
    MissingAction,

    #[error("Malformed {action} command: {source}")]
    Malformed {
        action: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate section label: {0}")]
    DuplicateLabel(String),
}
