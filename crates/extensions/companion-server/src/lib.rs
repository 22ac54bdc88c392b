//! # bite companion server
//!
//! The companion endpoint process. It receives snapshot and log pushes from
//! the page side and feeds queued commands back over a server-sent-events
//! stream.
//!
//! ## Usage
//!
//! ```ignore
//! use bite_companion_server::CompanionServer;
//!
//! let server = CompanionServer::new(config.server.clone());
//! let addr = server.start().await?;
//! server.enqueue(serde_json::json!({"action": "toggle"}))?;
//! ```

mod error;
mod outline;
mod queue;
mod routes;
mod server;

pub use error::ServerError;
pub use outline::{OutlineSink, render_outline};
pub use queue::CommandQueue;
pub use routes::{ServerState, Snapshot, create_router};
pub use server::CompanionServer;
