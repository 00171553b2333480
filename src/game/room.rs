//! Room Registry and Command Surface
//!
//! An explicit room-keyed store (no ambient/static state): the [`Tracker`]
//! owns every bound channel's [`RoundState`] and exposes the inbound
//! command surface the chat layer calls into. All methods mutate state as
//! one conceptual step before any notification goes out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::game::events::TrackerEvent;
use crate::game::parse::{parse_submission, ParsedSubmission};
use crate::game::rollover;
use crate::game::state::{PlayerId, PlayerRecord, RoomId, RoundState, Timezone};
use crate::game::TrackError;

/// Outcome of a register command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAck {
    /// Player was already registered; nothing changed.
    AlreadyRegistered,
    /// Player is now registered (first time, or again after a soft
    /// deregistration).
    NewlyRegistered,
}

/// Outcome of a deregister command. Deregistering twice deletes saved data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeregisterAck {
    /// Registration flag cleared; history retained.
    SoftDeregistered,
    /// Second deregistration: the record is gone.
    HardDeleted,
    /// No record for this player in the room.
    NotFound,
}

/// Coordinating store for every tracked room.
#[derive(Clone, Debug, Default)]
pub struct Tracker {
    rooms: BTreeMap<RoomId, RoundState>,
}

impl Tracker {
    /// Empty tracker; rooms are bound explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a channel, creating its round state on first use.
    pub fn bind_room(&mut self, room: RoomId, initial_round: u32, rng_seed: u64) -> &mut RoundState {
        self.rooms.entry(room).or_insert_with(|| {
            info!(%room, round = initial_round, "binding tracker to room");
            RoundState::new(room, initial_round, rng_seed)
        })
    }

    /// Adopt an already-built room state (snapshot load).
    pub fn insert_room(&mut self, state: RoundState) {
        self.rooms.insert(state.channel, state);
    }

    /// Look a bound room up.
    pub fn room(&self, room: RoomId) -> Option<&RoundState> {
        self.rooms.get(&room)
    }

    /// All bound rooms, in deterministic order.
    pub fn rooms(&self) -> impl Iterator<Item = &RoundState> {
        self.rooms.values()
    }

    fn room_mut(&mut self, room: RoomId) -> Result<&mut RoundState, TrackError> {
        self.rooms.get_mut(&room).ok_or(TrackError::RoomNotBound(room))
    }

    /// Run the rollover scheduler for every room.
    pub fn tick_all(&mut self, now: DateTime<Utc>) -> Vec<(RoomId, Vec<TrackerEvent>)> {
        self.rooms
            .values_mut()
            .map(|state| (state.channel, rollover::tick(state, now)))
            .collect()
    }

    /// Register a player for tracking in a room.
    pub fn register(
        &mut self,
        room: RoomId,
        player: PlayerId,
        handle: impl Into<String>,
        timezone: Option<Timezone>,
        now: DateTime<Utc>,
    ) -> Result<RegisterAck, TrackError> {
        let state = self.room_mut(room)?;
        if let Some(record) = state.players.get_mut(&player) {
            if record.registered {
                return Ok(RegisterAck::AlreadyRegistered);
            }
            record.registered = true;
            record.handle = handle.into();
            if let Some(tz) = timezone {
                record.set_timezone(tz, now);
            }
            info!(%room, %player, "player re-registered");
            return Ok(RegisterAck::NewlyRegistered);
        }

        let record = PlayerRecord::new(player, handle, timezone.unwrap_or_default(), now);
        info!(%room, %player, deadline = %record.reset_deadline, "player registered");
        state.players.insert(player, record);
        Ok(RegisterAck::NewlyRegistered)
    }

    /// Deregister a player; a second deregistration deletes their data.
    pub fn deregister(&mut self, room: RoomId, player: PlayerId) -> Result<DeregisterAck, TrackError> {
        let state = self.room_mut(room)?;
        match state.players.get_mut(&player) {
            Some(record) if record.registered => {
                record.registered = false;
                info!(%room, %player, "player deregistered");
                Ok(DeregisterAck::SoftDeregistered)
            }
            Some(_) => {
                state.players.remove(&player);
                info!(%room, %player, "player data deleted");
                Ok(DeregisterAck::HardDeleted)
            }
            None => Ok(DeregisterAck::NotFound),
        }
    }

    /// Toggle seed-letter mode; enabling draws a letter immediately and
    /// returns it.
    pub fn set_seed_letter_mode(
        &mut self,
        room: RoomId,
        enabled: bool,
    ) -> Result<Option<char>, TrackError> {
        let state = self.room_mut(room)?;
        state.seed_letter_mode = enabled;
        if !enabled {
            state.current_letter = None;
            info!(%room, "seed letters disabled");
            return Ok(None);
        }
        match state.draw_letter() {
            Ok(letter) => {
                info!(%room, letter = %letter, "seed letters enabled");
                Ok(Some(letter))
            }
            Err(err) => {
                warn!(%room, %err, "seed letter draw failed");
                Ok(None)
            }
        }
    }

    /// Change a player's timezone; the deadline moves to the next local
    /// midnight in the new zone.
    pub fn set_timezone(
        &mut self,
        room: RoomId,
        player: PlayerId,
        timezone: Timezone,
        now: DateTime<Utc>,
    ) -> Result<(), TrackError> {
        let state = self.room_mut(room)?;
        let record = registered_mut(state, player)?;
        record.set_timezone(timezone, now);
        info!(%room, %player, zone = timezone.name(), deadline = %record.reset_deadline, "timezone set");
        Ok(())
    }

    /// Record a player's result for the currently open round.
    ///
    /// Pure parse first, then the duplicate check; the pending entry is
    /// written only when everything validated, so a rejected attempt leaves
    /// it byte-for-byte untouched.
    pub fn on_submission(
        &mut self,
        room: RoomId,
        player: PlayerId,
        text: &str,
    ) -> Result<ParsedSubmission, TrackError> {
        let state = self.room_mut(room)?;
        let expected = state.round_number;
        let record = registered_mut(state, player)?;

        let parsed = parse_submission(text, expected)?;
        if record.pending.submitted {
            return Err(TrackError::DuplicateSubmission);
        }

        record.pending.submitted = true;
        record.pending.guesses = parsed.guesses;
        record.pending.succeeded = parsed.succeeded;
        record.pending.raw_text = text.to_string();
        info!(
            %room, %player,
            round = parsed.round,
            guesses = parsed.guesses,
            succeeded = parsed.succeeded,
            "submission recorded"
        );
        Ok(parsed)
    }

    /// Associate an evidence attachment with the player's current pending
    /// entry. Independent of the text submission.
    pub fn on_attachment(
        &mut self,
        room: RoomId,
        player: PlayerId,
        handle: impl Into<String>,
    ) -> Result<(), TrackError> {
        let state = self.room_mut(room)?;
        let record = registered_mut(state, player)?;
        record.pending.attachments.push(handle.into());
        Ok(())
    }
}

fn registered_mut(
    state: &mut RoundState,
    player: PlayerId,
) -> Result<&mut PlayerRecord, TrackError> {
    match state.players.get_mut(&player) {
        Some(record) if record.registered => Ok(record),
        _ => Err(TrackError::UnknownPlayer(player)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    const ROOM: RoomId = RoomId(10);
    const ADA: PlayerId = PlayerId(1);

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn tracker_with_ada() -> Tracker {
        let mut tracker = Tracker::new();
        tracker.bind_room(ROOM, 640, 7);
        tracker
            .register(ROOM, ADA, "ada", Some(Timezone::UsEastern), now())
            .unwrap();
        tracker
    }

    fn result_text(round: u32, guesses: u8) -> String {
        format!("Wordle {round} {guesses}/6\n\n⬛🟨⬛⬛⬛\n🟩🟩🟩🟩🟩")
    }

    #[test]
    fn test_register_lifecycle() {
        let mut tracker = tracker_with_ada();
        assert_eq!(
            tracker.register(ROOM, ADA, "ada", None, now()).unwrap(),
            RegisterAck::AlreadyRegistered
        );
        assert_eq!(
            tracker.deregister(ROOM, ADA).unwrap(),
            DeregisterAck::SoftDeregistered
        );
        // Soft-deregistered players keep their history.
        assert!(tracker.room(ROOM).unwrap().players.contains_key(&ADA));

        assert_eq!(
            tracker.register(ROOM, ADA, "ada", None, now()).unwrap(),
            RegisterAck::NewlyRegistered
        );

        tracker.deregister(ROOM, ADA).unwrap();
        assert_eq!(
            tracker.deregister(ROOM, ADA).unwrap(),
            DeregisterAck::HardDeleted
        );
        assert!(!tracker.room(ROOM).unwrap().players.contains_key(&ADA));
        assert_eq!(
            tracker.deregister(ROOM, ADA).unwrap(),
            DeregisterAck::NotFound
        );
    }

    #[test]
    fn test_commands_require_bound_room() {
        let mut tracker = Tracker::new();
        assert_eq!(
            tracker.register(RoomId(99), ADA, "ada", None, now()).unwrap_err(),
            TrackError::RoomNotBound(RoomId(99))
        );
    }

    #[test]
    fn test_submission_rejected_for_unknown_player() {
        let mut tracker = tracker_with_ada();
        assert_eq!(
            tracker
                .on_submission(ROOM, PlayerId(42), &result_text(640, 3))
                .unwrap_err(),
            TrackError::UnknownPlayer(PlayerId(42))
        );
    }

    #[test]
    fn test_wrong_round_never_mutates_pending() {
        let mut tracker = tracker_with_ada();
        let before = tracker.room(ROOM).unwrap().players[&ADA].pending.clone();

        let err = tracker
            .on_submission(ROOM, ADA, &result_text(639, 3))
            .unwrap_err();
        assert_eq!(
            err,
            TrackError::WrongRound {
                expected: 640,
                found: 639
            }
        );
        assert_eq!(tracker.room(ROOM).unwrap().players[&ADA].pending, before);
    }

    #[test]
    fn test_second_submission_rejected_pending_unchanged() {
        let mut tracker = tracker_with_ada();
        tracker.on_submission(ROOM, ADA, &result_text(640, 3)).unwrap();
        let before = tracker.room(ROOM).unwrap().players[&ADA].pending.clone();

        let err = tracker
            .on_submission(ROOM, ADA, &result_text(640, 5))
            .unwrap_err();
        assert_eq!(err, TrackError::DuplicateSubmission);
        assert_eq!(tracker.room(ROOM).unwrap().players[&ADA].pending, before);
    }

    #[test]
    fn test_attachment_joins_pending_entry() {
        let mut tracker = tracker_with_ada();
        tracker.on_attachment(ROOM, ADA, "proof.png").unwrap();
        tracker.on_submission(ROOM, ADA, &result_text(640, 2)).unwrap();
        let pending = &tracker.room(ROOM).unwrap().players[&ADA].pending;
        assert_eq!(pending.attachments, vec!["proof.png".to_string()]);
        assert!(pending.submitted);
    }

    #[test]
    fn test_seed_letter_mode_toggle() {
        let mut tracker = tracker_with_ada();
        let letter = tracker.set_seed_letter_mode(ROOM, true).unwrap();
        assert!(letter.is_some());
        assert_eq!(tracker.room(ROOM).unwrap().current_letter, letter);

        assert_eq!(tracker.set_seed_letter_mode(ROOM, false).unwrap(), None);
        assert_eq!(tracker.room(ROOM).unwrap().current_letter, None);
    }

    #[test]
    fn test_set_timezone_moves_deadline() {
        let mut tracker = tracker_with_ada();
        let before = tracker.room(ROOM).unwrap().players[&ADA].reset_deadline;

        tracker
            .set_timezone(ROOM, ADA, Timezone::UsPacific, now())
            .unwrap();
        let after = tracker.room(ROOM).unwrap().players[&ADA].reset_deadline;

        // Pacific midnight is three hours later than Eastern midnight.
        assert_eq!(after - before, chrono::Duration::hours(3));
    }
}
