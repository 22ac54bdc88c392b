//! # bite in-memory extension
//!
//! A page adapter backed by plain data, plus a companion that records every
//! push and a command source fed from code. Used for dry runs and tests.

mod companion;
mod fixture;
mod page;

pub use companion::{MemoryCompanion, ScriptedSource};
pub use fixture::{FixtureError, PageFixture};
pub use page::{MemoryPage, MemorySection, PageEvent};
