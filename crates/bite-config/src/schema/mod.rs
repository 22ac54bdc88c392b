//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod schema_sync;

pub use schema_sync::*;

pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub companion: CompanionConfig,

    #[serde(default)]
    pub outbox: OutboxConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the companion endpoint lives, as seen from the page side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the server-push stream.
    #[serde(default = "default_sse_path")]
    pub sse_path: String,

    /// Per-request timeout for outbound pushes. The push stream has none.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl CompanionConfig {
    /// Absolute URL of `path` on the companion.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn sse_url(&self) -> String {
        self.endpoint(&self.sse_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sse_path: default_sse_path(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:9001".to_string()
}

fn default_sse_path() -> String {
    "/sse".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

/// Companion server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// File the Markdown outline of received content is appended to.
    /// When unset the outline is only logged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_path: Option<PathBuf>,

    /// Subsection keys rendered into the outline, in order. Empty renders
    /// every key a section carries.
    #[serde(default)]
    pub outline_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            outline_path: None,
            outline_keys: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9001
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for the rolling log file. Defaults to `~/.bite/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn log_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".bite")
                .join("logs")
        })
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
