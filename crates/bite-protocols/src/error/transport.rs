//! Companion transport errors.

use thiserror::Error;

use super::DecodeError;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Companion returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Push stream error: {0}")]
    Stream(String),

    #[error("Undecodable message: {0}")]
    Decode(#[from] DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Outbound queue is full")]
    QueueFull,

    #[error("Connection closed")]
    Closed,
}

impl TransportError {
    /// Whether the error ends a push subscription. A single undecodable
    /// message does not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TransportError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_error() {
        assert_eq!(TransportError::Closed.to_string(), "Connection closed");
    }

    #[test]
    fn test_status_error_display() {
        let err = TransportError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn test_decode_is_not_fatal() {
        let err = TransportError::from(DecodeError::EmptyMessage);
        assert!(!err.is_fatal());
        assert!(TransportError::Stream("reset".to_string()).is_fatal());
        assert!(TransportError::Closed.is_fatal());
    }
}
