//! Pseudo-random number engine
//!
//! Uses the xorshift1024* algorithm. Fast and deterministic, not suitable
//! for cryptographic use. Every byte the device hands out comes from here.

mod xorshift;

pub use xorshift::{RngError, Xorshift1024Star, MULTIPLIER, STATE_WORDS};
