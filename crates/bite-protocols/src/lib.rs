//! # bite protocols
//!
//! Data model, wire format and collaborator traits shared by every bite crate.
//! Contains only definitions - the sync engine lives in `bite-core`.
//!
//! ## Core Traits
//!
//! - [`PageAdapter`] - Read/write access to the live editing surface
//! - [`Companion`] - Outbound pushes to the companion endpoint
//! - [`CommandSource`] - Inbound push channel from the companion endpoint
//! - [`Notifier`] - User-visible notifications for session transitions

pub mod command;
pub mod companion;
pub mod document;
pub mod error;
pub mod notify;
pub mod page;
pub mod wire;

pub use command::{Command, Inbound};
pub use companion::{
    CommandSource, CommandStream, Companion, LogLevel, Push, PushReceipt, STALE_SLICE_CALLBACK,
};
pub use document::{Bounds, Edge, Patch, PatchReport, Section, TranscriptDocument};
pub use error::{DecodeError, NotifyError, PageError, TransportError};
pub use notify::Notifier;
pub use page::{Affordance, PageAdapter, PointerEvent, PointerKind, SliceHandle};
pub use wire::{ContentPayload, Labelled, ProgressPayload, SlicePayload, WireSection};
