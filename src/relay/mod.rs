//! Chat-Platform Boundary
//!
//! Everything non-deterministic lives behind the [`Outbound`] trait; the
//! tracker core only ever emits events, and this module turns them into
//! notifications and broadcasts.

pub mod outbound;

pub use outbound::{deliver, Outbound, RelayError};
