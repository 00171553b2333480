//! JSON snapshot of tracker state.
//!
//! Field absence on load defaults safely: a missing warning flag is false,
//! a missing "yesterday" (finalized) record is simply not-yet-rolled-over,
//! and a missing letter history is empty. Old snapshot files therefore keep
//! loading as fields are added.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::core::letters::{LetterPool, LetterPoolError, DEFAULT_HISTORY_CAPACITY};
use crate::core::rng::DeterministicRng;
use crate::game::room::Tracker;
use crate::game::state::{PlayerId, PlayerRecord, RoomId, RoundState, Submission, Timezone};

/// Errors reading or writing the snapshot file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed snapshot JSON.
    #[error("snapshot decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Persisted letter pool violates the capacity invariant.
    #[error("snapshot letter pool invalid: {0}")]
    LetterPool(#[from] LetterPoolError),
}

/// Per-player persisted record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player identity.
    pub id: PlayerId,
    /// Display handle for the scoreboard.
    #[serde(default)]
    pub handle: String,
    /// Registration flag; a record that predates soft deletion counts as
    /// registered.
    #[serde(default = "default_true")]
    pub registered: bool,
    /// Accumulated wins.
    #[serde(default)]
    pub win_count: u32,
    /// Chosen timezone.
    #[serde(default)]
    pub timezone: Timezone,
    /// Next personal day boundary, absolute UTC.
    pub reset_deadline: DateTime<Utc>,
    /// Current round's in-progress entry.
    #[serde(default)]
    pub pending: Submission,
    /// Previous round's frozen entry; absent means not yet rolled over.
    #[serde(default)]
    pub finalized: Option<Submission>,
    /// One-hour-warning guard.
    #[serde(default)]
    pub warning_sent: bool,
}

/// Per-room persisted record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// Bound channel.
    pub room_id: RoomId,
    /// Currently open round.
    pub round_number: u32,
    /// Two-phase scoring flag.
    #[serde(default)]
    pub scored: bool,
    /// Seed-letter mode toggle.
    #[serde(default)]
    pub seed_letter_mode: bool,
    /// Active seed letter.
    #[serde(default)]
    pub current_letter: Option<char>,
    /// Letter exclusion buffer, oldest first.
    #[serde(default)]
    pub letter_history: Vec<char>,
    /// Capacity of the exclusion buffer.
    #[serde(default = "default_letter_capacity")]
    pub letter_capacity: usize,
    /// All known players.
    #[serde(default)]
    pub players: Vec<PlayerSnapshot>,
}

/// Whole-tracker snapshot.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every bound room.
    #[serde(default)]
    pub rooms: Vec<RoomSnapshot>,
}

fn default_true() -> bool {
    true
}

fn default_letter_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Snapshot {
    /// Capture the current tracker state.
    pub fn capture(tracker: &Tracker) -> Self {
        let rooms = tracker
            .rooms()
            .map(|state| RoomSnapshot {
                room_id: state.channel,
                round_number: state.round_number,
                scored: state.scored,
                seed_letter_mode: state.seed_letter_mode,
                current_letter: state.current_letter,
                letter_history: state.letters.history().collect(),
                letter_capacity: state.letters.capacity(),
                players: state
                    .players
                    .values()
                    .map(|p| PlayerSnapshot {
                        id: p.id,
                        handle: p.handle.clone(),
                        registered: p.registered,
                        win_count: p.win_count,
                        timezone: p.timezone,
                        reset_deadline: p.reset_deadline,
                        pending: p.pending.clone(),
                        finalized: p.finalized.clone(),
                        warning_sent: p.warning_sent,
                    })
                    .collect(),
            })
            .collect();
        Snapshot { rooms }
    }

    /// Rebuild a tracker. Letter draws after a restart continue from a
    /// fresh RNG seed; the exclusion buffer is what carries the non-repeat
    /// guarantee across restarts.
    pub fn restore(self, rng_seed: u64) -> Result<Tracker, StoreError> {
        let mut tracker = Tracker::new();
        for room in self.rooms {
            let mut state = RoundState::new(room.room_id, room.round_number, rng_seed);
            state.scored = room.scored;
            state.seed_letter_mode = room.seed_letter_mode;
            state.current_letter = room.current_letter;
            state.letters = LetterPool::from_history(room.letter_capacity, room.letter_history)?;
            state.rng = DeterministicRng::new(rng_seed ^ room.room_id.0);
            for player in room.players {
                state.players.insert(
                    player.id,
                    PlayerRecord {
                        id: player.id,
                        handle: player.handle,
                        registered: player.registered,
                        timezone: player.timezone,
                        reset_deadline: player.reset_deadline,
                        pending: player.pending,
                        finalized: player.finalized,
                        win_count: player.win_count,
                        warning_sent: player.warning_sent,
                    },
                );
            }
            tracker.insert_room(state);
        }
        Ok(tracker)
    }
}

/// Load the snapshot file; a missing file is an empty tracker, not an
/// error.
pub fn load(path: &Path) -> Result<Snapshot, StoreError> {
    if !path.exists() {
        info!(path = %path.display(), "no snapshot file, starting empty");
        return Ok(Snapshot::default());
    }
    let text = fs::read_to_string(path)?;
    let snapshot = serde_json::from_str(&text)?;
    info!(path = %path.display(), "snapshot loaded");
    Ok(snapshot)
}

/// Overwrite the snapshot file.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn sample_tracker() -> Tracker {
        let mut tracker = Tracker::new();
        tracker.bind_room(RoomId(5), 640, 7);
        tracker
            .register(RoomId(5), PlayerId(1), "ada", Some(Timezone::UsPacific), now())
            .unwrap();
        tracker.set_seed_letter_mode(RoomId(5), true).unwrap();
        tracker
            .on_submission(
                RoomId(5),
                PlayerId(1),
                "Wordle 640 3/6\n\n⬛🟨⬛⬛⬛\n🟩🟩🟩🟩🟩",
            )
            .unwrap();
        tracker
    }

    #[test]
    fn test_capture_restore_round_trip() {
        let tracker = sample_tracker();
        let snapshot = Snapshot::capture(&tracker);
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: Snapshot = serde_json::from_str(&json).unwrap();
        let restored = decoded.restore(99).unwrap();

        let before = tracker.room(RoomId(5)).unwrap();
        let after = restored.room(RoomId(5)).unwrap();
        assert_eq!(after.round_number, before.round_number);
        assert_eq!(after.seed_letter_mode, before.seed_letter_mode);
        assert_eq!(after.current_letter, before.current_letter);
        assert_eq!(
            after.letters.history().collect::<Vec<_>>(),
            before.letters.history().collect::<Vec<_>>()
        );
        assert_eq!(after.players[&PlayerId(1)], before.players[&PlayerId(1)]);
    }

    #[test]
    fn test_absent_fields_default_safely() {
        // A minimal old-format room: no warning flags, no finalized
        // records, no letter state.
        let json = r#"{
            "rooms": [{
                "room_id": 5,
                "round_number": 640,
                "players": [{
                    "id": 1,
                    "reset_deadline": "2024-03-02T08:00:00Z"
                }]
            }]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let tracker = snapshot.restore(1).unwrap();

        let state = tracker.room(RoomId(5)).unwrap();
        assert!(!state.scored);
        assert!(!state.seed_letter_mode);
        assert_eq!(state.letters.capacity(), DEFAULT_HISTORY_CAPACITY);

        let player = &state.players[&PlayerId(1)];
        assert!(player.registered);
        assert!(!player.warning_sent);
        assert!(player.finalized.is_none());
        assert!(!player.pending.submitted);
        assert_eq!(player.timezone, Timezone::UsEastern);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let snapshot = load(Path::new("/nonexistent/wordle-tracker-test.json")).unwrap();
        assert!(snapshot.rooms.is_empty());
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("wordle-tracker-snapshot-test.json");
        let snapshot = Snapshot::capture(&sample_tracker());

        save(&path, &snapshot).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.rooms.len(), 1);
        assert_eq!(loaded.rooms[0].round_number, 640);

        let _ = fs::remove_file(&path);
    }
}
