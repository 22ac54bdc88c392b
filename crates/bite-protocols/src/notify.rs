//! Notification protocol.

use async_trait::async_trait;

use crate::error::NotifyError;

/// User-visible notification sink, used for session open/close only.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}
