//! xorshift1024* random number generator
//!
//! The engine behind the byte stream. 1024 bits of state (sixteen 64-bit
//! words) rotated through by a cursor, with the output scrambled by a fixed
//! odd multiplier.
//!
//! # Algorithm
//!
//! ```text
//! s0 = state[p]
//! p  = (p + 1) & 15
//! s1 = state[p]
//! s1 ^= s1 << 31
//! s1 ^= s1 >> 11
//! s0 ^= s0 >> 30
//! state[p] = s0 ^ s1
//! return state[p] * 1181783497276652981   (mod 2^64)
//! ```
//!
//! The shift amounts, the mask and the multiplier are part of the algorithm.
//! Changing any of them loses the full period over the non-zero state space.
//!
//! NOT cryptographically secure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of 64-bit words of generator state
pub const STATE_WORDS: usize = 16;

/// Output scrambling multiplier
pub const MULTIPLIER: u64 = 1_181_783_497_276_652_981;

const POSITION_MASK: usize = STATE_WORDS - 1;

/// Errors raised when rebuilding an engine from saved parts
#[derive(Debug, Error, PartialEq)]
pub enum RngError {
    #[error("Generator state must not be all zero")]
    AllZeroState,

    #[error("State position {0} out of range (must be < 16)")]
    PositionOutOfRange(usize),
}

/// Deterministic xorshift1024* generator
///
/// # Example
/// ```
/// use merandom_core::Xorshift1024Star;
///
/// let mut a = Xorshift1024Star::new();
/// let mut b = Xorshift1024Star::new();
/// assert_eq!(a.next(), b.next());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xorshift1024Star {
    /// Generator words
    state: [u64; STATE_WORDS],
    /// Index of the word combined on the next call, always < 16
    p: usize,
}

impl Xorshift1024Star {
    /// Create an engine with the fixed seed (`state[i] = i + 1`)
    pub fn new() -> Self {
        let mut engine = Self {
            state: [0; STATE_WORDS],
            p: 0,
        };
        engine.seed();
        engine
    }

    /// Rebuild an engine from saved state words and position
    ///
    /// # Errors
    /// - `AllZeroState` if every word is zero (the generator would be stuck)
    /// - `PositionOutOfRange` if `p >= 16`
    pub fn from_parts(state: [u64; STATE_WORDS], p: usize) -> Result<Self, RngError> {
        if state.iter().all(|&word| word == 0) {
            return Err(RngError::AllZeroState);
        }
        if p >= STATE_WORDS {
            return Err(RngError::PositionOutOfRange(p));
        }
        Ok(Self { state, p })
    }

    /// Reset to the fixed seed
    ///
    /// Word `i` becomes `i + 1` and the cursor starts at 0.
    pub fn seed(&mut self) {
        for (i, word) in self.state.iter_mut().enumerate() {
            *word = i as u64 + 1;
        }
        self.p = 0;
    }

    /// Advance the state and return the next 64-bit word
    ///
    /// # Example
    /// ```
    /// use merandom_core::Xorshift1024Star;
    ///
    /// let mut rng = Xorshift1024Star::new();
    /// let first = rng.next();
    /// assert_ne!(first, rng.next());
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        let mut s0 = self.state[self.p];
        self.p = (self.p + 1) & POSITION_MASK;
        let mut s1 = self.state[self.p];

        s1 ^= s1 << 31;
        s1 ^= s1 >> 11;
        s0 ^= s0 >> 30;

        self.state[self.p] = s0 ^ s1;
        self.state[self.p].wrapping_mul(MULTIPLIER)
    }

    /// Current state words (for checkpointing)
    pub fn state(&self) -> &[u64; STATE_WORDS] {
        &self.state
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.p
    }
}

impl Default for Xorshift1024Star {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_layout() {
        let rng = Xorshift1024Star::new();
        let expected: Vec<u64> = (1..=16).collect();
        assert_eq!(rng.state().to_vec(), expected);
        assert_eq!(rng.position(), 0);
    }

    #[test]
    fn test_first_output_matches_hand_computation() {
        // s0 = 1, s1 = 2
        let mut s1: u64 = 2;
        s1 ^= s1 << 31;
        s1 ^= s1 >> 11;
        let s0: u64 = 1 ^ (1 >> 30);
        let expected = (s0 ^ s1).wrapping_mul(MULTIPLIER);

        let mut rng = Xorshift1024Star::new();
        assert_eq!(rng.next(), expected);
        assert_eq!(rng.position(), 1);
        assert_eq!(rng.state()[1], s0 ^ s1);
    }

    #[test]
    fn test_position_wraps() {
        let mut rng = Xorshift1024Star::new();
        for _ in 0..STATE_WORDS {
            rng.next();
        }
        assert_eq!(rng.position(), 0);
    }

    #[test]
    fn test_reseed_restarts_sequence() {
        let mut rng = Xorshift1024Star::new();
        let first: Vec<u64> = (0..20).map(|_| rng.next()).collect();
        rng.seed();
        let second: Vec<u64> = (0..20).map(|_| rng.next()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_parts_rejects_zero_state() {
        let result = Xorshift1024Star::from_parts([0; STATE_WORDS], 0);
        assert_eq!(result, Err(RngError::AllZeroState));
    }

    #[test]
    fn test_from_parts_rejects_bad_position() {
        let result = Xorshift1024Star::from_parts([1; STATE_WORDS], 16);
        assert_eq!(result, Err(RngError::PositionOutOfRange(16)));
    }
}
