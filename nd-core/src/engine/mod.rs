//! Sync engine
//!
//! Observes display state published by other sources and mirrors it onto the
//! paired group of the other vendor.

mod sync;

pub use sync::{StateChange, SyncEngine, SyncOutcome};
