//! Round Scoring
//!
//! Deterministic ranking of a closed round with tie-breaking, plus the
//! scoreboard lines broadcast to the room. The ranking is a pure function
//! of a snapshot of finalized entries; the caller applies win-count
//! increments exactly once per round, guarded by the room's `scored` flag.

use crate::game::state::PlayerId;

/// Scoreboard header line.
pub const SCOREBOARD_HEADER: &str = "WORDLING COMPLETE!\n\n**SCOREBOARD:**";

/// One player's finalized entry, snapshotted for ranking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundEntry {
    /// Player identity.
    pub id: PlayerId,
    /// Resolved display handle.
    pub name: String,
    /// Win count before this round's increment.
    pub win_count: u32,
    /// Guess count; failures and non-submissions carry the sentinel
    /// maximum.
    pub guesses: u8,
    /// Whether the word was guessed at all.
    pub succeeded: bool,
}

/// Result of ranking one round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundRanking {
    /// Players whose win count must be incremented, once each.
    pub winners: Vec<PlayerId>,
    /// Display lines: header, winners, ranked successes, then failures.
    pub lines: Vec<String>,
}

/// Rank a round's finalized entries.
///
/// Sorts ascending by guess count. The winner set is the front run of
/// minimal guess counts, provided the very first sorted entry succeeded;
/// when it did not (a failure sentinel sorted ahead), success status takes
/// over and every succeeded entry wins instead. Calling this twice on the
/// same snapshot yields identical output; applying its win-count increments
/// twice is the caller's bug to prevent.
pub fn rank_round(entries: &[RoundEntry]) -> RoundRanking {
    let mut sorted: Vec<&RoundEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.guesses);

    let winner_ids = pick_winners(&sorted);

    let mut lines = vec![SCOREBOARD_HEADER.to_string()];
    let mut failures = Vec::new();

    // Rank advances only when the guess count changes between consecutive
    // displayed players; ties share a rank.
    let mut rank = 1u32;
    let mut prev_guesses: Option<u8> = None;

    for entry in &sorted {
        if winner_ids.contains(&entry.id) {
            // Winner lines show the count after the increment.
            lines.push(winner_line(entry, entry.win_count + 1));
            prev_guesses = Some(entry.guesses);
        } else if entry.succeeded {
            if prev_guesses.is_some_and(|g| g != entry.guesses) {
                rank += 1;
            }
            lines.push(format!(
                "{rank}. {} ({}) guessed the word in {} guesses.",
                entry.name,
                wins_phrase(entry.win_count),
                entry.guesses
            ));
            prev_guesses = Some(entry.guesses);
        } else {
            // Unsuccessful players are listed last, without a rank.
            failures.push(format!(
                "{} ({}) did not successfully guess the word.",
                entry.name,
                wins_phrase(entry.win_count)
            ));
        }
    }

    lines.extend(failures);

    RoundRanking {
        winners: winner_ids,
        lines,
    }
}

fn pick_winners(sorted: &[&RoundEntry]) -> Vec<PlayerId> {
    let Some(best) = sorted.first() else {
        return Vec::new();
    };
    if best.succeeded {
        let best_guesses = best.guesses;
        sorted
            .iter()
            .take_while(|e| e.guesses == best_guesses)
            .filter(|e| e.succeeded)
            .map(|e| e.id)
            .collect()
    } else {
        // Best raw count belongs to a failure sentinel; any genuine success
        // (necessarily a last-guess save tied with the sentinel) wins.
        sorted
            .iter()
            .filter(|e| e.succeeded)
            .map(|e| e.id)
            .collect()
    }
}

fn winner_line(entry: &RoundEntry, new_win_count: u32) -> String {
    let wins = wins_phrase(new_win_count);
    if entry.guesses == 1 {
        format!(
            "1. {} ({wins}) wins by guessing the word in one guess! WOW!",
            entry.name
        )
    } else {
        format!(
            "1. {} ({wins}) wins by guessing the word in {} guesses!",
            entry.name, entry.guesses
        )
    }
}

fn wins_phrase(count: u32) -> String {
    if count == 1 {
        "1 win".to_string()
    } else {
        format!("{count} wins")
    }
}
