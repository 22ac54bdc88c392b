//! Companion endpoint protocol.
//!
//! The companion is the local process the page is mirrored to. Outbound
//! traffic is a set of fire-and-forget pushes; inbound traffic is a push
//! stream of commands.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::Inbound;
use crate::document::{Bounds, TranscriptDocument};
use crate::error::TransportError;
use crate::wire::{ContentPayload, ProgressPayload, SlicePayload};

#[cfg(test)]
#[path = "companion_tests.rs"]
mod tests;

/// Callback attached to the bounds snapshot pushed after a stale slice edit.
pub const STALE_SLICE_CALLBACK: &str = "callback_receive_slice";

/// Severity forwarded to the companion log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One outbound request to the companion.
#[derive(Debug, Clone, PartialEq)]
pub enum Push {
    /// Full document snapshot.
    Content {
        document: TranscriptDocument,
        callback: Option<String>,
    },
    /// Bounds-only snapshot in document order.
    Slice {
        bounds: Vec<(String, Bounds)>,
        callback: Option<String>,
    },
    /// Playhead position.
    Progress { x: f64, callback: Option<String> },
    /// Diagnostic line for the companion log sink.
    Log { msg: String, level: LogLevel },
    /// The push subscription ended.
    CloseSession,
}

impl Push {
    pub fn log(level: LogLevel, msg: impl Into<String>) -> Self {
        Push::Log {
            msg: msg.into(),
            level,
        }
    }

    /// Request path on the companion.
    pub fn path(&self) -> &'static str {
        match self {
            Push::Content { .. } => "/fetch_content",
            Push::Slice { .. } => "/fetch_slice",
            Push::Progress { .. } => "/fetch_progress",
            Push::Log { .. } => "/log",
            Push::CloseSession => "/close_sse",
        }
    }

    /// JSON request body.
    pub fn body(&self) -> Result<Value, serde_json::Error> {
        match self {
            Push::Content { document, callback } => {
                serde_json::to_value(ContentPayload::from_document(document, callback.clone()))
            }
            Push::Slice { bounds, callback } => {
                serde_json::to_value(SlicePayload::new(bounds.clone(), callback.clone()))
            }
            Push::Progress { x, callback } => serde_json::to_value(ProgressPayload {
                x: *x,
                callback: callback.clone(),
            }),
            Push::Log { msg, level } => Ok(serde_json::json!({ "msg": msg, "level": level })),
            Push::CloseSession => Ok(Value::Object(Default::default())),
        }
    }
}

/// Companion acknowledgement; only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReceipt {
    pub status: u16,
    pub body: String,
}

/// Outbound side of the companion endpoint.
#[async_trait]
pub trait Companion: Send + Sync {
    /// Deliver one push.
    async fn push(&self, push: Push) -> Result<PushReceipt, TransportError>;
}

/// Decoded inbound messages, in delivery order.
pub type CommandStream = Pin<Box<dyn Stream<Item = Result<Inbound, TransportError>> + Send>>;

/// Inbound side of the companion endpoint.
#[async_trait]
pub trait CommandSource: Send + Sync {
    /// Open a new push subscription.
    async fn subscribe(&self) -> Result<CommandStream, TransportError>;
}
