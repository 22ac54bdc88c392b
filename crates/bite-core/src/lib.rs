//! # bite core
//!
//! The sync protocol engine and the machinery around it.
//!
//! ## Modules
//!
//! - [`engine`] - Command dispatch, snapshots and patch application
//! - [`reconcile`] - Stale-bounds guard for slice edits
//! - [`speed`] - Playback speed ladder
//! - [`outbox`] - Bounded outbound push queue
//! - [`session`] - The single push subscription
//! - [`notify`] - Desktop and log notifiers

pub mod engine;
pub mod error;
pub mod notify;
pub mod outbox;
pub mod reconcile;
pub mod session;
pub mod speed;

pub use engine::{Flow, SyncEngine};
pub use error::{EngineError, SessionError, SpeedError};
pub use notify::{DesktopNotifier, LogNotifier};
pub use outbox::{Outbox, OutboxStats, RetryPolicy};
pub use reconcile::{Reconciliation, reconcile};
pub use session::{SessionExit, SyncSession};
pub use speed::SpeedLadder;
