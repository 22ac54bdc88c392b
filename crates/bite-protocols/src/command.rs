//! Commands received on the push channel.
//!
//! Each push message is a JSON array whose first element is a command object
//! tagged by `action`. An optional second element carries patch-shaped data
//! that is re-applied after the command runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Value, json};

use crate::document::{Bounds, Edge, Patch};
use crate::error::DecodeError;

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;

/// A companion-originated command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Play one section's audio.
    Play { section: String },

    /// Transport play/pause.
    Toggle,

    /// Step back `count` times (1 when absent or invalid).
    Back {
        #[serde(
            default,
            deserialize_with = "lenient_count",
            skip_serializing_if = "Option::is_none"
        )]
        count: Option<u32>,
    },

    /// Overwrite subsection texts.
    Put {
        #[serde(default)]
        data: Patch,
    },

    /// Regenerate every section's transcript, then push content.
    InitTranscripts,

    /// Move one edge of a section, guarded by the bounds the caller last saw.
    PushSlice {
        section: String,
        edge: Edge,
        x: f64,
        #[serde(default)]
        section_edge_pos: BTreeMap<String, Bounds>,
    },

    FetchSlice {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        callback: Option<String>,
    },

    FetchContent {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        callback: Option<String>,
    },

    FetchProgress {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        callback: Option<String>,
    },

    /// Move the playback speed `offset` steps along the speed ladder.
    Speed {
        #[serde(deserialize_with = "lenient_offset")]
        offset: i64,
    },

    /// End the push subscription.
    #[serde(rename = "close_sse")]
    CloseSession,

    /// An action this build does not know. Encodes as `{"action": name}`
    /// through [`Command::to_value`].
    #[serde(skip)]
    Unknown { action: String },
}

impl Command {
    /// Wire names of every known action.
    pub const ACTIONS: [&'static str; 11] = [
        "play",
        "toggle",
        "back",
        "put",
        "init_transcripts",
        "push_slice",
        "fetch_slice",
        "fetch_content",
        "fetch_progress",
        "speed",
        "close_sse",
    ];

    /// Wire name of this command's action.
    pub fn action(&self) -> &str {
        match self {
            Command::Play { .. } => "play",
            Command::Toggle => "toggle",
            Command::Back { .. } => "back",
            Command::Put { .. } => "put",
            Command::InitTranscripts => "init_transcripts",
            Command::PushSlice { .. } => "push_slice",
            Command::FetchSlice { .. } => "fetch_slice",
            Command::FetchContent { .. } => "fetch_content",
            Command::FetchProgress { .. } => "fetch_progress",
            Command::Speed { .. } => "speed",
            Command::CloseSession => "close_sse",
            Command::Unknown { action } => action,
        }
    }

    /// Decode one command object. Unknown actions decode to
    /// [`Command::Unknown`]; known actions with bad fields are errors.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingAction)?
            .to_string();

        if !Self::ACTIONS.contains(&action.as_str()) {
            return Ok(Command::Unknown { action });
        }

        serde_json::from_value(value).map_err(|source| DecodeError::Malformed { action, source })
    }

    /// Encode as a command object.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Command::Unknown { action } => Ok(json!({ "action": action })),
            known => serde_json::to_value(known),
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let count = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    Ok(count.filter(|&n| n > 0))
}

fn lenient_offset<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let offset = match &value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    offset.ok_or_else(|| de::Error::custom(format!("invalid speed offset: {value}")))
}

/// Keep the string-valued `label -> key -> text` entries of a trailing
/// element. Anything else is dropped; nothing usable means no patch.
fn lenient_patch(value: Value) -> Option<Patch> {
    let Value::Object(labels) = value else {
        return None;
    };
    let mut patch = Patch::new();
    for (label, keys) in labels {
        let Value::Object(keys) = keys else { continue };
        for (key, text) in keys {
            if let Value::String(text) = text {
                patch.insert(label.clone(), key, text);
            }
        }
    }
    (!patch.is_empty()).then_some(patch)
}

/// One decoded push message.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub command: Command,
    /// Trailing patch re-applied after the command.
    pub patch: Option<Patch>,
}

impl Inbound {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            patch: None,
        }
    }

    pub fn with_patch(mut self, patch: Patch) -> Self {
        self.patch = Some(patch);
        self
    }

    /// Decode the `data:` payload of a push event.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Accepts `[command, patch?]`, or a bare command object.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => {
                let mut items = items.into_iter();
                let first = items.next().ok_or(DecodeError::EmptyMessage)?;
                let command = Command::from_value(first)?;
                let patch = items.next().and_then(lenient_patch);
                Ok(Self { command, patch })
            }
            object @ Value::Object(_) => Ok(Self::new(Command::from_value(object)?)),
            _ => Err(DecodeError::MissingAction),
        }
    }

    /// Encode as a push message array.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut items = vec![self.command.to_value()?];
        if let Some(patch) = &self.patch {
            items.push(serde_json::to_value(patch)?);
        }
        Ok(Value::Array(items))
    }
}
