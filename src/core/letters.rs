//! Non-repeating seed-letter pool.
//!
//! Keeps a small fixed-capacity ring of recently drawn letters and draws a
//! fresh letter that is guaranteed not to appear in the ring. The ring order
//! matters only for eviction (oldest first); membership is what excludes a
//! candidate.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rng::DeterministicRng;

/// Number of letters in the alphabet the pool draws from.
pub const ALPHABET_LEN: u32 = 26;

/// Default number of past letters excluded from a draw.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Errors from the letter pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LetterPoolError {
    /// Requested history capacity would eventually exclude every letter.
    #[error("history capacity {0} must be smaller than the alphabet (26)")]
    CapacityTooLarge(usize),

    /// The exclusion set covers the entire alphabet. Cannot happen when the
    /// capacity invariant holds; reported instead of looping forever because
    /// pool state is loaded from disk.
    #[error("letter history excludes the entire alphabet")]
    AlphabetExhausted,
}

/// Fixed-capacity ring of recently used seed letters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LetterPool {
    capacity: usize,
    history: VecDeque<char>,
}

impl Default for LetterPool {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            history: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
        }
    }
}

impl LetterPool {
    /// Create an empty pool. Capacity must be smaller than the alphabet or
    /// the resample loop in [`draw`](Self::draw) would not terminate.
    pub fn new(capacity: usize) -> Result<Self, LetterPoolError> {
        if capacity as u32 >= ALPHABET_LEN {
            return Err(LetterPoolError::CapacityTooLarge(capacity));
        }
        Ok(Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
        })
    }

    /// Rebuild a pool from a persisted history buffer, oldest letter first.
    /// Excess entries beyond `capacity` are dropped from the old end.
    pub fn from_history(
        capacity: usize,
        letters: impl IntoIterator<Item = char>,
    ) -> Result<Self, LetterPoolError> {
        let mut pool = Self::new(capacity)?;
        for letter in letters {
            pool.remember(letter.to_ascii_uppercase());
        }
        Ok(pool)
    }

    /// The exclusion buffer, oldest letter first.
    pub fn history(&self) -> impl Iterator<Item = char> + '_ {
        self.history.iter().copied()
    }

    /// Maximum number of letters the buffer holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Draw a letter not present in the history, then remember it.
    pub fn draw(&mut self, rng: &mut DeterministicRng) -> Result<char, LetterPoolError> {
        if self.excludes_entire_alphabet() {
            return Err(LetterPoolError::AlphabetExhausted);
        }
        loop {
            let candidate = (b'A' + rng.next_index(ALPHABET_LEN) as u8) as char;
            if !self.history.contains(&candidate) {
                self.remember(candidate);
                return Ok(candidate);
            }
        }
    }

    fn remember(&mut self, letter: char) {
        if self.capacity == 0 {
            return;
        }
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(letter);
    }

    fn excludes_entire_alphabet(&self) -> bool {
        (b'A'..=b'Z').all(|b| self.history.contains(&(b as char)))
    }
}
