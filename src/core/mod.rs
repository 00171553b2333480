//! Core deterministic primitives.
//!
//! The random source is injectable and fully deterministic so the
//! non-repeat property of the letter pool can be asserted in tests.

pub mod letters;
pub mod rng;

// Re-export core types
pub use letters::LetterPool;
pub use rng::DeterministicRng;
