//! Notification errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifications not supported on this platform")]
    Unsupported,

    #[error("Notification failed: {0}")]
    Failed(String),
}
