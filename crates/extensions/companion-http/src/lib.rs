//! # bite companion HTTP extension
//!
//! Talks to the companion endpoint over plain HTTP: pushes are JSON `POST`s,
//! commands arrive on a `text/event-stream`.

mod client;
mod decoder;
mod source;

pub use client::HttpCompanion;
pub use decoder::SseDecoder;
pub use source::SseCommandSource;
