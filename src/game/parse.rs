//! Submission Parsing
//!
//! Pure extraction of `(round, guesses, succeeded)` from free-text puzzle
//! results. No side effects; the caller decides whether to write the result
//! into a player's pending entry.

use serde::{Deserialize, Serialize};

use crate::game::TrackError;
use crate::MAX_GUESSES;

/// Guess-tile glyphs that mark a message as a puzzle result.
const TILE_GLYPHS: [char; 4] = ['⬛', '⬜', '🟨', '🟩'];

/// Structured data extracted from a result message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSubmission {
    /// Round number the message self-reports.
    pub round: u32,
    /// Guess count; the failure marker maps to [`MAX_GUESSES`].
    pub guesses: u8,
    /// False only for the failure marker; any numeric count is a success,
    /// including a last-guess `6/6`.
    pub succeeded: bool,
}

/// Parse a result message against the round currently open.
///
/// Recognition requires at least one guess-tile glyph and a
/// `<round> <score>/<max>` header token (the round may carry a leading `#`
/// or thousands separators, the score a trailing hard-mode `*`).
///
/// # Errors
///
/// [`TrackError::WrongRound`] when the embedded round number differs from
/// `expected_round`; [`TrackError::MalformedSubmission`] for anything
/// structurally unparseable. Neither touches any state.
pub fn parse_submission(text: &str, expected_round: u32) -> Result<ParsedSubmission, TrackError> {
    if !text.chars().any(|c| TILE_GLYPHS.contains(&c)) {
        return Err(TrackError::MalformedSubmission);
    }

    let (round, score_field) = find_header(text).ok_or(TrackError::MalformedSubmission)?;
    if round != expected_round {
        return Err(TrackError::WrongRound {
            expected: expected_round,
            found: round,
        });
    }

    let (guesses, succeeded) = parse_score(score_field)?;
    Ok(ParsedSubmission {
        round,
        guesses,
        succeeded,
    })
}

/// Locate the `<round> <score>/<max>` pair in the message.
fn find_header(text: &str) -> Option<(u32, &str)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        let Some((score, max)) = token.split_once('/') else {
            continue;
        };
        // Hard mode appends '*' to the score fraction.
        if max.trim_end_matches('*').parse::<u8>() != Ok(MAX_GUESSES) {
            continue;
        }
        let Some(round) = i
            .checked_sub(1)
            .and_then(|prev| parse_round_number(tokens[prev]))
        else {
            continue;
        };
        return Some((round, score));
    }
    None
}

/// Round numbers appear as `640`, `#640` or `1,234`.
fn parse_round_number(token: &str) -> Option<u32> {
    let digits: String = token
        .trim_start_matches('#')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn parse_score(field: &str) -> Result<(u8, bool), TrackError> {
    if field.eq_ignore_ascii_case("x") {
        return Ok((MAX_GUESSES, false));
    }
    match field.parse::<u8>() {
        Ok(n) if (1..=MAX_GUESSES).contains(&n) => Ok((n, true)),
        _ => Err(TrackError::MalformedSubmission),
    }
}
