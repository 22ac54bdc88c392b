//! Error types for the bite protocol layer.

mod decode;
mod notify;
mod page;
mod transport;

pub use decode::*;
pub use notify::*;
pub use page::*;
pub use transport::*;
