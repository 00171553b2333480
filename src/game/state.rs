//! Tracker State Definitions
//!
//! Per-player records and room-level round state.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Days, Duration, FixedOffset, LocalResult, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::letters::{LetterPool, LetterPoolError};
use crate::core::rng::DeterministicRng;
use crate::MAX_GUESSES;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque chat-platform user reference (snowflake).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque chat-platform channel/room reference.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TIMEZONES
// =============================================================================

/// The timezones players can pick from.
///
/// Fixed standard offsets; daylight-saving shifts are not modeled, so a
/// calendar day is exactly 24 hours in every zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timezone {
    /// EU Central (UTC+1)
    EuropeBerlin,
    /// CA Atlantic (UTC-4)
    CanadaAtlantic,
    /// US Eastern (UTC-5)
    #[default]
    UsEastern,
    /// US Central (UTC-6)
    UsCentral,
    /// US Mountain (UTC-7)
    UsMountain,
    /// US Pacific (UTC-8)
    UsPacific,
}

impl Timezone {
    /// All selectable zones, menu order.
    pub const ALL: [Timezone; 6] = [
        Timezone::EuropeBerlin,
        Timezone::CanadaAtlantic,
        Timezone::UsEastern,
        Timezone::UsCentral,
        Timezone::UsMountain,
        Timezone::UsPacific,
    ];

    /// Canonical zone name, as shown in the selection command.
    pub fn name(self) -> &'static str {
        match self {
            Timezone::EuropeBerlin => "Europe/Berlin",
            Timezone::CanadaAtlantic => "Canada/Atlantic",
            Timezone::UsEastern => "US/Eastern",
            Timezone::UsCentral => "US/Central",
            Timezone::UsMountain => "US/Mountain",
            Timezone::UsPacific => "US/Pacific",
        }
    }

    /// Look a zone up by its canonical name.
    pub fn from_name(name: &str) -> Option<Timezone> {
        Timezone::ALL.into_iter().find(|tz| tz.name() == name)
    }

    /// Standard UTC offset of this zone.
    pub fn offset(self) -> FixedOffset {
        let hours = match self {
            Timezone::EuropeBerlin => 1,
            Timezone::CanadaAtlantic => -4,
            Timezone::UsEastern => -5,
            Timezone::UsCentral => -6,
            Timezone::UsMountain => -7,
            Timezone::UsPacific => -8,
        };
        // 26-hour bound of FixedOffset is never hit for these zones.
        FixedOffset::east_opt(hours * 3600).expect("offset within bounds")
    }
}

/// The next local midnight strictly after `now` in the given zone,
/// expressed in UTC.
pub fn next_local_midnight(now: DateTime<Utc>, zone: Timezone) -> DateTime<Utc> {
    let offset = zone.offset();
    let local = now.with_timezone(&offset);
    let midnight = (local.date_naive() + Days::new(1)).and_time(NaiveTime::MIN);
    match offset.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // Fixed offsets never produce ambiguous or missing local times.
        _ => now + Duration::days(1),
    }
}

// =============================================================================
// SUBMISSIONS
// =============================================================================

/// One player's result entry for a single round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Whether a result has been recorded for the round.
    pub submitted: bool,
    /// Guess count; `MAX_GUESSES` doubles as the failure sentinel.
    pub guesses: u8,
    /// Whether the word was actually guessed.
    pub succeeded: bool,
    /// Raw message text, kept for the end-of-round replay.
    pub raw_text: String,
    /// Evidence attachment handles (e.g. screenshot paths).
    pub attachments: Vec<String>,
}

impl Submission {
    /// Guess count to score this entry with; an unsubmitted entry counts as
    /// a failure at the sentinel guess count.
    pub fn effective_guesses(&self) -> u8 {
        if self.submitted {
            self.guesses
        } else {
            MAX_GUESSES
        }
    }

    /// Whether this entry succeeded; unsubmitted entries never do.
    pub fn effective_succeeded(&self) -> bool {
        self.submitted && self.succeeded
    }
}

// =============================================================================
// PLAYER RECORD
// =============================================================================

/// Per-participant mutable state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Stable external user reference.
    pub id: PlayerId,
    /// Display handle captured at registration, used on the scoreboard.
    pub handle: String,
    /// Unregistered players keep history but are excluded from scoring
    /// and rollover.
    pub registered: bool,
    /// Chosen timezone; determines the personal day boundary.
    pub timezone: Timezone,
    /// Absolute timestamp of the next personal day boundary. Strictly in
    /// the future once rollover has fired.
    pub reset_deadline: DateTime<Utc>,
    /// In-progress entry for the current round.
    pub pending: Submission,
    /// Previous round's entry, frozen at rollover. This is what scoring
    /// reads; `None` until this cycle's rollover fires.
    pub finalized: Option<Submission>,
    /// Rounds won; incremented once per winning round, never decremented.
    pub win_count: u32,
    /// Guards against duplicate one-hour warnings; reset each rollover.
    pub warning_sent: bool,
}

impl PlayerRecord {
    /// Create a freshly registered player whose first boundary is the next
    /// local midnight in their zone.
    pub fn new(id: PlayerId, handle: impl Into<String>, timezone: Timezone, now: DateTime<Utc>) -> Self {
        Self {
            id,
            handle: handle.into(),
            registered: true,
            timezone,
            reset_deadline: next_local_midnight(now, timezone),
            pending: Submission::default(),
            finalized: None,
            win_count: 0,
            warning_sent: false,
        }
    }

    /// Change the player's zone and recompute the deadline to the next
    /// local midnight there.
    pub fn set_timezone(&mut self, timezone: Timezone, now: DateTime<Utc>) {
        self.timezone = timezone;
        self.reset_deadline = next_local_midnight(now, timezone);
    }

    /// Freeze the pending entry into the finalized slot and start a fresh
    /// pending entry. One conceptual step; the caller advances the deadline.
    pub fn finalize_pending(&mut self) {
        self.finalized = Some(std::mem::take(&mut self.pending));
        self.warning_sent = false;
    }
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// Room-level shared state: one per tracked channel.
#[derive(Clone, Debug)]
pub struct RoundState {
    /// Channel this tracker is bound to.
    pub channel: RoomId,
    /// Current puzzle instance number; submissions must self-report it.
    pub round_number: u32,
    /// True once the just-completed round has been scored and before the
    /// next cycle's rollovers complete.
    pub scored: bool,
    /// Whether a seed letter is announced each round.
    pub seed_letter_mode: bool,
    /// Active seed letter, `None` while the mode is disabled.
    pub current_letter: Option<char>,
    /// Recently used letters, excluded from the next draw.
    pub letters: LetterPool,
    /// All known players, registered or not.
    pub players: BTreeMap<PlayerId, PlayerRecord>,
    /// Random source for letter draws.
    pub rng: DeterministicRng,
}

impl RoundState {
    /// Create the state for a newly bound channel.
    pub fn new(channel: RoomId, round_number: u32, rng_seed: u64) -> Self {
        Self {
            channel,
            round_number,
            scored: false,
            seed_letter_mode: false,
            current_letter: None,
            letters: LetterPool::default(),
            players: BTreeMap::new(),
            rng: DeterministicRng::new(rng_seed),
        }
    }

    /// Registered players, in deterministic id order.
    pub fn registered_players(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.players.values().filter(|p| p.registered)
    }

    /// Whether the round is ready to score: every registered player has
    /// either rolled over this cycle (finalized populated) or is past their
    /// deadline and will be counted as a non-submission. Pure query; the
    /// tick pairs it with the `scored` flag to fire scoring exactly once.
    pub fn ready_to_score(&self, now: DateTime<Utc>) -> bool {
        let mut any = false;
        for player in self.registered_players() {
            any = true;
            if player.finalized.is_none() && now < player.reset_deadline {
                return false;
            }
        }
        any
    }

    /// Whether every registered player's boundary lies in the future again,
    /// i.e. all of this cycle's rollovers have fired. Clears the two-phase
    /// `scored` flag.
    pub fn all_rolled_over(&self, now: DateTime<Utc>) -> bool {
        self.registered_players()
            .all(|p| p.reset_deadline > now)
    }

    /// Draw a fresh seed letter and make it current.
    pub fn draw_letter(&mut self) -> Result<char, LetterPoolError> {
        let letter = self.letters.draw(&mut self.rng)?;
        self.current_letter = Some(letter);
        Ok(letter)
    }
}
