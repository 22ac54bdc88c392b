//! Sync-side configuration types (outbox, engine, session).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::default_true;

/// Outbound push queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxConfig {
    /// Pushes buffered before new ones are dropped.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Delivery attempts per push. 1 is at-most-once.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, doubled per attempt.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
}

impl OutboxConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
        }
    }
}

fn default_capacity() -> usize {
    64
}

fn default_max_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    200
}

fn default_max_retry_delay_ms() -> u64 {
    5_000
}

/// Command engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Playback speed labels, slowest first.
    #[serde(default = "default_speed_levels")]
    pub speed_levels: Vec<String>,

    /// Largest difference at which an expected bound still matches the page.
    /// Zero requires exact equality.
    #[serde(default = "default_bounds_tolerance")]
    pub bounds_tolerance: f64,

    /// Callback echoed with the bounds snapshot sent after a stale slice edit.
    #[serde(default = "default_stale_slice_callback")]
    pub stale_slice_callback: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed_levels: default_speed_levels(),
            bounds_tolerance: default_bounds_tolerance(),
            stale_slice_callback: default_stale_slice_callback(),
        }
    }
}

fn default_speed_levels() -> Vec<String> {
    ["0.5x", "0.75x", "1.0x", "1.25x", "1.5x", "2.0x"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_bounds_tolerance() -> f64 {
    0.0
}

fn default_stale_slice_callback() -> String {
    "callback_receive_slice".to_string()
}

/// Push session behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Raise a desktop notification when the session opens or closes.
    #[serde(default = "default_true")]
    pub desktop_notifications: bool,

    /// Announce the end of the session to the companion.
    #[serde(default = "default_true")]
    pub notify_companion_on_close: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            desktop_notifications: default_true(),
            notify_companion_on_close: default_true(),
        }
    }
}
