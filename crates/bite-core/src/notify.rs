//! Notifiers for session transitions.

use async_trait::async_trait;
use tracing::info;

use bite_protocols::{NotifyError, Notifier};

/// Native desktop notification: `notify-send` on Linux, `osascript` on
/// macOS. Other platforms report [`NotifyError::Unsupported`].
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("bite")
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    #[allow(unused_variables)]
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        #[cfg(target_os = "macos")]
        {
            let script = format!(
                r#"display notification "{}" with title "{}" subtitle "{}""#,
                message.replace('"', r#"\""#),
                self.app_name.replace('"', r#"\""#),
                title.replace('"', r#"\""#)
            );
            let output = tokio::process::Command::new("osascript")
                .args(["-e", &script])
                .output()
                .await
                .map_err(|e| NotifyError::Failed(e.to_string()))?;
            return check(output);
        }

        #[cfg(target_os = "linux")]
        {
            let output = tokio::process::Command::new("notify-send")
                .args(["--app-name", &self.app_name, title, message])
                .output()
                .await
                .map_err(|e| NotifyError::Failed(e.to_string()))?;
            return check(output);
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        Err(NotifyError::Unsupported)
    }
}

#[cfg(any(target_os = "macos", target_os = "linux"))]
fn check(output: std::process::Output) -> Result<(), NotifyError> {
    if output.status.success() {
        Ok(())
    } else {
        Err(NotifyError::Failed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        info!("[{}] {}", title, message);
        Ok(())
    }
}
