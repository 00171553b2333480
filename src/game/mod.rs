//! Tracker Logic Module
//!
//! All round-tracking logic. Synchronous and I/O free.
//!
//! ## Module Structure
//!
//! - `state`: Player records, round state, timezones
//! - `parse`: Submission text parsing
//! - `score`: Ranking, tie-breaking, scoreboard rendering
//! - `rollover`: Per-player midnight rollover tick
//! - `events`: Events emitted by the tick for the relay to deliver
//! - `room`: Room registry and the inbound command surface

pub mod events;
pub mod parse;
pub mod rollover;
pub mod room;
pub mod score;
pub mod state;

use thiserror::Error;

// Re-export key types
pub use events::TrackerEvent;
pub use room::Tracker;
pub use rollover::tick;
pub use state::{PlayerId, PlayerRecord, RoomId, RoundState, Submission, Timezone};

/// Recoverable errors on the inbound command/submission path.
///
/// None of these are fatal; each maps to a reply telling the player what
/// to do instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// Submission self-reports a round other than the one currently open.
    #[error("submission is for round {found}, but round {expected} is open")]
    WrongRound {
        /// Round currently accepting submissions.
        expected: u32,
        /// Round number the submission claimed.
        found: u32,
    },

    /// Text does not parse as a puzzle result.
    #[error("could not parse submission text")]
    MalformedSubmission,

    /// Player already has a recorded entry for this round.
    #[error("result already submitted for this round")]
    DuplicateSubmission,

    /// Action from an identity that is not registered in the room.
    #[error("player {0} is not registered")]
    UnknownPlayer(PlayerId),

    /// Command issued in a channel the tracker is not bound to.
    #[error("tracker is not bound to room {0}")]
    RoomNotBound(RoomId),
}
