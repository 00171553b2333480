//! Snapshot Persistence
//!
//! Simple overwrite-on-save JSON snapshot of every tracked room. Loaded
//! once at startup; written after every state-mutating operation. Losing
//! an unpersisted mutation on crash is acceptable; inconsistent in-memory
//! state is not, so capture happens only after a mutation completes.

pub mod snapshot;

pub use snapshot::{load, save, Snapshot, StoreError};
