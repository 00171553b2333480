//! Tracker Events
//!
//! Events generated by the rollover tick. The tick itself performs no I/O;
//! the relay consumes these and turns them into notifications and
//! broadcasts, so the state machine stays testable in isolation.

use serde::{Deserialize, Serialize};

use crate::game::state::PlayerId;

/// Event data emitted during a scheduler tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerEvent {
    /// A player is within one hour of their personal reset deadline.
    OneHourWarning {
        /// Player to notify directly.
        player_id: PlayerId,
        /// Whether they already submitted; lets the relay phrase or
        /// suppress the nag.
        submitted: bool,
    },

    /// A player's day boundary passed and a fresh puzzle is open for them.
    NewRoundAvailable {
        /// Player to notify directly (rollover is per-timezone, not
        /// room-wide).
        player_id: PlayerId,
        /// Seed letter to announce, when the mode is enabled.
        letter: Option<char>,
    },

    /// The round closed for everyone and the ranking was computed.
    RoundScored {
        /// Round that was just scored.
        round_number: u32,
        /// Scoreboard lines, header first.
        lines: Vec<String>,
        /// Registered players who never submitted, for the shaming
        /// broadcast.
        shamed: Vec<PlayerId>,
        /// Evidence attachments per player, replayed into the room.
        attachments: Vec<(PlayerId, Vec<String>)>,
        /// Seed letter for the newly opened round, when the mode is
        /// enabled.
        next_letter: Option<char>,
    },
}

impl TrackerEvent {
    /// The player this event is addressed to, when it is a direct
    /// notification rather than a room broadcast.
    pub fn direct_recipient(&self) -> Option<PlayerId> {
        match self {
            TrackerEvent::OneHourWarning { player_id, .. }
            | TrackerEvent::NewRoundAvailable { player_id, .. } => Some(*player_id),
            TrackerEvent::RoundScored { .. } => None,
        }
    }
}
