//! # Wordle Tracker
//!
//! Tracks a recurring daily word-puzzle competition among a group of
//! participants who each submit one result per day and are scored relative
//! to one another. The interesting part is the per-player,
//! timezone-independent daily rollover: every participant has their own
//! midnight, and a round is only scored once all of them have crossed it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WORDLE TRACKER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seedable Xorshift128+ PRNG                │
//! │  └── letters.rs  - Non-repeating seed-letter pool            │
//! │                                                              │
//! │  game/           - Tracker logic (synchronous, no I/O)       │
//! │  ├── state.rs    - Player records and round state            │
//! │  ├── parse.rs    - Result-text submission parser             │
//! │  ├── score.rs    - Ranking, tie-breaking, scoreboard         │
//! │  ├── rollover.rs - Per-player midnight rollover tick         │
//! │  ├── events.rs   - Events emitted by the tick                │
//! │  └── room.rs     - Room registry and command surface         │
//! │                                                              │
//! │  relay/          - Chat-platform boundary (abstract)         │
//! │  └── outbound.rs - Notification trait + event delivery       │
//! │                                                              │
//! │  store/          - Snapshot persistence                      │
//! │  └── snapshot.rs - JSON snapshot, safe defaults on load      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `game/` modules never perform I/O: the rollover tick mutates state
//! and returns [`TrackerEvent`]s, which the relay turns into notifications.
//! That keeps every invariant (no double rollover, no double scoring)
//! testable without a chat platform attached.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod relay;
pub mod store;

// Re-export commonly used types
pub use crate::core::letters::LetterPool;
pub use crate::core::rng::DeterministicRng;
pub use game::events::TrackerEvent;
pub use game::room::Tracker;
pub use game::state::{PlayerId, PlayerRecord, RoomId, RoundState, Submission, Timezone};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum guesses the daily puzzle allows; also the sentinel guess count
/// recorded for failures and non-submissions.
pub const MAX_GUESSES: u8 = 6;

/// Scheduler tick interval in seconds. The tick is level-triggered, so any
/// granularity works; one minute keeps the one-hour warning timely.
pub const TICK_INTERVAL_SECS: u64 = 60;

/// How far ahead of a player's reset deadline the warning fires.
pub const WARNING_LEAD_MINUTES: i64 = 60;
