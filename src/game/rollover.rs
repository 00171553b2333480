//! Rollover Scheduler
//!
//! The periodic tick that advances each player independently past their
//! personal day boundary and decides when the round is ready to score.
//! Level-triggered on wall-clock comparisons: any tick granularity produces
//! the same behavior, and a tick paused for days catches up without
//! skipping or double-counting a boundary.
//!
//! The tick mutates [`RoundState`] and returns [`TrackerEvent`]s; it never
//! performs I/O, so every invariant here is testable with plain clock
//! values.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::game::events::TrackerEvent;
use crate::game::score::{rank_round, RoundEntry};
use crate::game::state::{PlayerId, RoundState};
use crate::WARNING_LEAD_MINUTES;

/// Run one scheduler tick for a room.
///
/// Phases, in order:
///
/// 1. Per-player pass: warning step, then rollover step, for every
///    registered player independently.
/// 2. Completion check: score the round once every registered player has
///    crossed their own boundary, guarded by the `scored` flag.
/// 3. Flag reset: clear `scored` on a later tick once every deadline lies
///    in the future again.
pub fn tick(state: &mut RoundState, now: DateTime<Utc>) -> Vec<TrackerEvent> {
    let mut events = Vec::new();

    // 1. Per-player pass. BTreeMap iterates in id order - deterministic.
    let ids: Vec<PlayerId> = state
        .players
        .values()
        .filter(|p| p.registered)
        .map(|p| p.id)
        .collect();
    for id in ids {
        process_player(state, id, now, &mut events);
    }

    // 2. Room-level completion check, after the per-player pass so anyone
    // crossing their boundary this tick is already finalized.
    if !state.scored && state.ready_to_score(now) {
        events.push(score_round(state));
    } else if state.scored && state.all_rolled_over(now) {
        // 3. Two-phase flag: cleared only after every straggler has rolled,
        // on a tick later than the one that scored.
        state.scored = false;
        info!(room = %state.channel, round = state.round_number, "round reopened for scoring");
    }

    events
}

/// Warning and rollover steps for one player.
fn process_player(
    state: &mut RoundState,
    id: PlayerId,
    now: DateTime<Utc>,
    events: &mut Vec<TrackerEvent>,
) {
    let current_letter = state.current_letter;
    let Some(player) = state.players.get_mut(&id) else {
        return;
    };

    // Warning step. Idempotent inside the window via the flag; a boundary
    // that has already passed goes straight to rollover instead.
    let warning_at = player.reset_deadline - Duration::minutes(WARNING_LEAD_MINUTES);
    if !player.warning_sent && now >= warning_at && now < player.reset_deadline {
        player.warning_sent = true;
        events.push(TrackerEvent::OneHourWarning {
            player_id: id,
            submitted: player.pending.submitted,
        });
        info!(player = %id, deadline = %player.reset_deadline, "one-hour warning");
    }

    // Rollover step. The pending entry is frozen on the first crossing;
    // the deadline then advances one calendar day at a time until it is
    // strictly in the future, so a multi-day pause neither skips nor
    // double-counts a boundary.
    if now >= player.reset_deadline {
        player.finalize_pending();
        let mut crossings = 0u32;
        while now >= player.reset_deadline {
            player.reset_deadline = player.reset_deadline + Duration::days(1);
            crossings += 1;
        }
        info!(
            player = %id,
            crossings,
            next_deadline = %player.reset_deadline,
            "player rolled over"
        );
        events.push(TrackerEvent::NewRoundAvailable {
            player_id: id,
            letter: current_letter,
        });
    }
}

/// Score the just-closed round and open the next one. One conceptual step:
/// all state mutations land before the event is handed to the relay.
fn score_round(state: &mut RoundState) -> TrackerEvent {
    let mut entries = Vec::new();
    let mut shamed = Vec::new();
    let mut attachments = Vec::new();

    for player in state.registered_players() {
        let frozen = player.finalized.clone().unwrap_or_default();
        if !frozen.submitted {
            shamed.push(player.id);
        }
        if !frozen.attachments.is_empty() {
            attachments.push((player.id, frozen.attachments.clone()));
        }
        entries.push(RoundEntry {
            id: player.id,
            name: player.handle.clone(),
            win_count: player.win_count,
            guesses: frozen.effective_guesses(),
            succeeded: frozen.effective_succeeded(),
        });
    }

    let ranking = rank_round(&entries);

    // Win counts are applied exactly once per round; the `scored` flag set
    // below keeps this pass from running again for the same round.
    for id in &ranking.winners {
        if let Some(player) = state.players.get_mut(id) {
            player.win_count += 1;
        }
    }

    // Clear display residue now that the ranking snapshot exists.
    for player in state.players.values_mut() {
        player.finalized = None;
    }

    let round_number = state.round_number;
    let next_letter = if state.seed_letter_mode {
        match state.draw_letter() {
            Ok(letter) => Some(letter),
            Err(err) => {
                warn!(room = %state.channel, %err, "seed letter draw failed");
                None
            }
        }
    } else {
        None
    };

    state.round_number += 1;
    state.scored = true;

    info!(
        room = %state.channel,
        round = round_number,
        winners = ranking.winners.len(),
        shamed = shamed.len(),
        "round scored"
    );

    TrackerEvent::RoundScored {
        round_number,
        lines: ranking.lines,
        shamed,
        attachments,
        next_letter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{PlayerRecord, RoomId, RoundState, Submission, Timezone};
    use chrono::TimeZone as _;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn submission(guesses: u8, succeeded: bool) -> Submission {
        Submission {
            submitted: true,
            guesses,
            succeeded,
            raw_text: format!("Wordle 640 {guesses}/6"),
            attachments: Vec::new(),
        }
    }

    /// Room with one Eastern and one Pacific player, created mid-day.
    fn two_zone_room(now: DateTime<Utc>) -> RoundState {
        let mut state = RoundState::new(RoomId(5), 640, 7);
        let a = PlayerRecord::new(PlayerId(1), "ada", Timezone::UsEastern, now);
        let b = PlayerRecord::new(PlayerId(2), "bo", Timezone::UsPacific, now);
        state.players.insert(a.id, a);
        state.players.insert(b.id, b);
        state
    }

    #[test]
    fn test_warning_fires_once_inside_window() {
        let start = utc(2024, 3, 1, 12, 0);
        let mut state = two_zone_room(start);
        let deadline = state.players[&PlayerId(1)].reset_deadline;

        // Outside the window: nothing.
        assert!(tick(&mut state, deadline - Duration::hours(2)).is_empty());

        // Inside the window: exactly one warning for the early player.
        let events = tick(&mut state, deadline - Duration::minutes(30));
        assert_eq!(
            events,
            vec![TrackerEvent::OneHourWarning {
                player_id: PlayerId(1),
                submitted: false,
            }]
        );

        // Repeated ticks in the window stay quiet.
        assert!(tick(&mut state, deadline - Duration::minutes(10)).is_empty());
    }

    #[test]
    fn test_rollover_freezes_pending_and_advances_one_day() {
        let start = utc(2024, 3, 1, 12, 0);
        let mut state = two_zone_room(start);
        state.players.get_mut(&PlayerId(1)).unwrap().pending = submission(3, true);
        let deadline = state.players[&PlayerId(1)].reset_deadline;

        let events = tick(&mut state, deadline);
        assert!(events.contains(&TrackerEvent::NewRoundAvailable {
            player_id: PlayerId(1),
            letter: None,
        }));

        let player = &state.players[&PlayerId(1)];
        let frozen = player.finalized.as_ref().unwrap();
        assert_eq!(frozen.guesses, 3);
        assert!(!player.pending.submitted);
        assert_eq!(player.reset_deadline, deadline + Duration::days(1));
        assert!(!player.warning_sent);
    }

    #[test]
    fn test_multi_day_pause_catches_up_without_skipping() {
        let start = utc(2024, 3, 1, 12, 0);
        let mut state = two_zone_room(start);
        state.players.get_mut(&PlayerId(1)).unwrap().pending = submission(4, true);
        let deadline = state.players[&PlayerId(1)].reset_deadline;

        // Tick process was down for three and a half days.
        let now = deadline + Duration::days(3) + Duration::hours(12);
        let events = tick(&mut state, now);

        let player = &state.players[&PlayerId(1)];
        // Deadline crossed four boundaries, one day at a time, and ends in
        // the future.
        assert_eq!(player.reset_deadline, deadline + Duration::days(4));
        assert!(player.reset_deadline > now);
        // The real submission was finalized exactly once, not overwritten.
        assert_eq!(player.finalized.as_ref().unwrap().guesses, 4);
        // One notification, not one per skipped day.
        let notifications = events
            .iter()
            .filter(|e| e.direct_recipient() == Some(PlayerId(1)))
            .count();
        assert_eq!(notifications, 1);
    }

    #[test]
    fn test_round_scores_when_last_player_crosses() {
        let start = utc(2024, 3, 1, 12, 0);
        let mut state = two_zone_room(start);
        state.players.get_mut(&PlayerId(1)).unwrap().pending = submission(3, true);
        state.players.get_mut(&PlayerId(2)).unwrap().pending = submission(5, true);

        // Eastern midnight: only the early player rolls, no scoring yet.
        let eastern_midnight = state.players[&PlayerId(1)].reset_deadline;
        let events = tick(&mut state, eastern_midnight);
        assert!(!state.scored);
        assert!(!events
            .iter()
            .any(|e| matches!(e, TrackerEvent::RoundScored { .. })));

        // Pacific midnight: everyone has crossed, the round scores.
        let pacific_midnight = state.players[&PlayerId(2)].reset_deadline;
        let events = tick(&mut state, pacific_midnight);
        let scored = events
            .iter()
            .find_map(|e| match e {
                TrackerEvent::RoundScored {
                    round_number,
                    shamed,
                    ..
                } => Some((*round_number, shamed.clone())),
                _ => None,
            })
            .expect("round must score");

        assert_eq!(scored.0, 640);
        assert!(scored.1.is_empty());
        assert_eq!(state.round_number, 641);
        assert!(state.scored);
        assert_eq!(state.players[&PlayerId(1)].win_count, 1);
        assert_eq!(state.players[&PlayerId(2)].win_count, 0);
        assert!(state.players.values().all(|p| p.finalized.is_none()));
    }

    #[test]
    fn test_no_double_scoring_and_flag_clears_later() {
        let start = utc(2024, 3, 1, 12, 0);
        let mut state = two_zone_room(start);
        let pacific_midnight = state.players[&PlayerId(2)].reset_deadline;

        tick(&mut state, pacific_midnight);
        assert!(state.scored);

        // Immediate re-tick: deadlines are in the future again, the flag
        // clears, and nothing scores a second time.
        let events = tick(&mut state, pacific_midnight + Duration::minutes(1));
        assert!(!state.scored);
        assert!(events.is_empty());
        assert_eq!(state.round_number, 641);

        // Still nothing until the next full cycle completes.
        let events = tick(&mut state, pacific_midnight + Duration::hours(1));
        assert!(events.is_empty());
    }

    #[test]
    fn test_non_submitters_are_shamed_and_scored_as_failures() {
        let start = utc(2024, 3, 1, 12, 0);
        let mut state = two_zone_room(start);
        state.players.get_mut(&PlayerId(1)).unwrap().pending = submission(2, true);
        // Player 2 stays silent.

        let pacific_midnight = state.players[&PlayerId(2)].reset_deadline;
        let events = tick(&mut state, pacific_midnight);

        let (lines, shamed) = events
            .iter()
            .find_map(|e| match e {
                TrackerEvent::RoundScored { lines, shamed, .. } => {
                    Some((lines.clone(), shamed.clone()))
                }
                _ => None,
            })
            .expect("round must score");

        assert_eq!(shamed, vec![PlayerId(2)]);
        assert!(lines
            .iter()
            .any(|l| l.contains("bo") && l.contains("did not successfully guess")));
        assert_eq!(state.players[&PlayerId(2)].win_count, 0);
    }

    #[test]
    fn test_seed_letter_rotates_at_scoring() {
        let start = utc(2024, 3, 1, 12, 0);
        let mut state = two_zone_room(start);
        state.seed_letter_mode = true;
        let first = state.draw_letter().unwrap();

        let pacific_midnight = state.players[&PlayerId(2)].reset_deadline;
        let events = tick(&mut state, pacific_midnight);

        let next = events
            .iter()
            .find_map(|e| match e {
                TrackerEvent::RoundScored { next_letter, .. } => *next_letter,
                _ => None,
            })
            .expect("letter must rotate");

        assert_ne!(next, first);
        assert_eq!(state.current_letter, Some(next));
    }

    #[test]
    fn test_unregistered_players_are_skipped() {
        let start = utc(2024, 3, 1, 12, 0);
        let mut state = two_zone_room(start);
        state.players.get_mut(&PlayerId(2)).unwrap().registered = false;

        // Only the registered player's boundary matters.
        let eastern_midnight = state.players[&PlayerId(1)].reset_deadline;
        let events = tick(&mut state, eastern_midnight);

        assert!(events
            .iter()
            .any(|e| matches!(e, TrackerEvent::RoundScored { .. })));
        assert!(state.players[&PlayerId(2)].finalized.is_none());
        assert_eq!(
            state.players[&PlayerId(2)].reset_deadline,
            next_deadline_unchanged(&state, PlayerId(2), start)
        );
    }

    fn next_deadline_unchanged(
        state: &RoundState,
        id: PlayerId,
        created: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let tz = state.players[&id].timezone;
        crate::game::state::next_local_midnight(created, tz)
    }
}
