//! Companion server errors.

use thiserror::Error;

use bite_protocols::DecodeError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Server is already running")]
    AlreadyRunning,

    #[error("Server is not running")]
    NotRunning,

    #[error("Port {0} is already in use")]
    PortInUse(u16),

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid command: {0}")]
    InvalidCommand(#[from] DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
