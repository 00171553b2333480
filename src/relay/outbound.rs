//! Outbound Notifications
//!
//! The abstract interface the core needs from a chat platform, and the
//! delivery pass that maps [`TrackerEvent`]s onto it. A failure delivering
//! to one player is logged and skipped; it never blocks the rest of the
//! batch.

use thiserror::Error;
use tracing::{error, warn};

use crate::game::events::TrackerEvent;
use crate::game::state::{PlayerId, RoomId};

/// Puzzle link announced with each new round.
pub const PUZZLE_URL: &str = "https://www.nytimes.com/games/wordle/index.html";

/// Errors from the chat-platform side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The platform could not resolve a player's external handle.
    #[error("could not resolve identity of player {0}")]
    IdentityResolution(PlayerId),

    /// Message delivery failed.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Outbound side of the chat platform, as seen by the core.
pub trait Outbound {
    /// Resolve a player's mention/handle text for use inside a broadcast.
    fn resolve_handle(&self, player: PlayerId) -> Result<String, RelayError>;

    /// Send a direct notification to one player.
    fn notify_player(&mut self, player: PlayerId, text: &str) -> Result<(), RelayError>;

    /// Broadcast to the tracked room, optionally with attachments.
    fn broadcast_to_room(
        &mut self,
        room: RoomId,
        text: &str,
        attachments: &[String],
    ) -> Result<(), RelayError>;
}

/// Deliver one tick's events.
///
/// Each event is handled independently: an [`RelayError`] for one player is
/// logged and skipped so the remaining notifications still go out.
pub fn deliver(room: RoomId, events: &[TrackerEvent], out: &mut dyn Outbound) {
    for event in events {
        match event {
            TrackerEvent::OneHourWarning {
                player_id,
                submitted,
            } => {
                let text = if *submitted {
                    "Your Wordle day resets in one hour.".to_string()
                } else {
                    "One hour left to do the Wordle!".to_string()
                };
                if let Err(err) = out.notify_player(*player_id, &text) {
                    warn!(player = %player_id, %err, "skipping warning notification");
                }
            }
            TrackerEvent::NewRoundAvailable { player_id, letter } => {
                let mut text = format!("It's time to do the Wordle!\n{PUZZLE_URL}");
                if let Some(letter) = letter {
                    text.push_str(&format!(
                        "\n__**Your first word must start with the letter \"{letter}!\"**__"
                    ));
                }
                if let Err(err) = out.notify_player(*player_id, &text) {
                    warn!(player = %player_id, %err, "skipping new-round notification");
                }
            }
            TrackerEvent::RoundScored {
                round_number,
                lines,
                shamed,
                attachments,
                next_letter,
            } => {
                deliver_scoreboard(
                    room,
                    *round_number,
                    lines,
                    shamed,
                    attachments,
                    *next_letter,
                    out,
                );
            }
        }
    }
}

fn deliver_scoreboard(
    room: RoomId,
    round_number: u32,
    lines: &[String],
    shamed: &[PlayerId],
    attachments: &[(PlayerId, Vec<String>)],
    next_letter: Option<char>,
    out: &mut dyn Outbound,
) {
    // Shame list first, mention by resolved handle; unresolvable players
    // are dropped from the line, not fatal.
    if !shamed.is_empty() {
        let mut mentions = Vec::new();
        for player in shamed {
            match out.resolve_handle(*player) {
                Ok(handle) => mentions.push(handle),
                Err(err) => warn!(player = %player, %err, "cannot mention shamed player"),
            }
        }
        if !mentions.is_empty() {
            let text = format!("SHAME ON {} FOR NOT DOING THE WORDLE!", mentions.join(" "));
            if let Err(err) = out.broadcast_to_room(room, &text, &[]) {
                error!(%room, %err, "shame broadcast failed");
            }
        }
    }

    if let Err(err) = out.broadcast_to_room(room, &lines.join("\n"), &[]) {
        error!(%room, round = round_number, %err, "scoreboard broadcast failed");
    }

    // Replay each player's evidence under their handle.
    for (player, handles) in attachments {
        let header = match out.resolve_handle(*player) {
            Ok(handle) => format!("__{handle}:__"),
            Err(err) => {
                warn!(player = %player, %err, "skipping attachment replay");
                continue;
            }
        };
        if let Err(err) = out.broadcast_to_room(room, &header, handles) {
            warn!(player = %player, %err, "attachment broadcast failed");
        }
    }

    if let Some(letter) = next_letter {
        let text = format!("__**Your first word must start with the letter \"{letter}!\"**__");
        if let Err(err) = out.broadcast_to_room(room, &text, &[]) {
            error!(%room, %err, "letter broadcast failed");
        }
    }
}
