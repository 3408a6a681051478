//! Governance journal
//!
//! Append and read events as JSONL files.

pub mod replay;
pub mod store;

pub use replay::{EventFilter, EventReader};
pub use store::EventStore;
