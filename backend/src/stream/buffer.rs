//! Scratch buffer refilled in bulk from the engine
//!
//! # Refill/Drain Protocol
//!
//! ```text
//! read(n):
//!   while n > 0:
//!     cursor == capacity  → refill whole buffer, cursor = 0
//!     otherwise           → hand min(n, capacity - cursor) bytes to sink,
//!                           then advance cursor
//! ```
//!
//! # Critical Invariants
//!
//! - **Cursor bounds**: `0 <= cursor <= capacity`; `cursor == capacity` means
//!   exhausted
//! - **Whole refills**: a refill always rewrites the entire buffer from
//!   offset 0, one engine word per 8 bytes, native byte order
//! - **Chunk atomicity**: the cursor only moves after the sink accepted the
//!   chunk, so a fault never leaves a half-advanced cursor

use log::trace;
use thiserror::Error;

use super::sink::{ByteSink, TransferFault};
use crate::rng::Xorshift1024Star;

/// Default buffer size in engine words (128 × 8 = 1024 bytes)
pub const DEFAULT_BUFFER_WORDS: usize = 128;

const WORD_BYTES: usize = std::mem::size_of::<u64>();

/// Errors constructing a stream
#[derive(Debug, Error, PartialEq)]
pub enum StreamError {
    #[error("Buffer must hold at least one engine word")]
    ZeroCapacity,

    #[error("Buffer of {0} words overflows addressable size")]
    CapacityOverflow(usize),
}

/// Buffered byte stream over a xorshift1024* engine
///
/// # Example
/// ```
/// use merandom_core::ByteStream;
///
/// let mut stream = ByteStream::new(128).unwrap();
/// let bytes = stream.read(2000);
/// assert_eq!(bytes.len(), 2000);
/// ```
#[derive(Debug, Clone)]
pub struct ByteStream {
    engine: Xorshift1024Star,
    buffer: Vec<u8>,
    cursor: usize,
    refills: u64,
}

impl ByteStream {
    /// Create a stream with a freshly seeded engine
    ///
    /// The buffer is filled immediately, so the first read is served
    /// without touching the engine.
    ///
    /// # Errors
    /// - `ZeroCapacity` if `buffer_words == 0`
    /// - `CapacityOverflow` if `buffer_words * 8` overflows `usize`
    pub fn new(buffer_words: usize) -> Result<Self, StreamError> {
        Self::with_engine(Xorshift1024Star::new(), buffer_words)
    }

    /// Create a stream over an existing engine
    pub fn with_engine(engine: Xorshift1024Star, buffer_words: usize) -> Result<Self, StreamError> {
        if buffer_words == 0 {
            return Err(StreamError::ZeroCapacity);
        }
        let capacity = buffer_words
            .checked_mul(WORD_BYTES)
            .ok_or(StreamError::CapacityOverflow(buffer_words))?;

        let mut stream = Self {
            engine,
            buffer: vec![0; capacity],
            cursor: capacity,
            refills: 0,
        };
        stream.refill();
        Ok(stream)
    }

    /// Reassemble a stream from already validated parts
    pub(crate) fn from_parts(
        engine: Xorshift1024Star,
        buffer: Vec<u8>,
        cursor: usize,
        refills: u64,
    ) -> Self {
        debug_assert!(!buffer.is_empty() && buffer.len() % WORD_BYTES == 0);
        debug_assert!(cursor <= buffer.len());
        Self {
            engine,
            buffer,
            cursor,
            refills,
        }
    }

    /// Deliver exactly `length` bytes to `sink`
    ///
    /// Returns `length` on success. On a sink fault the read stops and the
    /// cursor stays at the start of the rejected chunk.
    pub fn read_into<S>(&mut self, length: usize, sink: &mut S) -> Result<usize, TransferFault>
    where
        S: ByteSink + ?Sized,
    {
        let mut remaining = length;

        while remaining > 0 {
            if self.is_exhausted() {
                self.refill();
            }

            let take = remaining.min(self.remaining());
            let end = self.cursor + take;
            sink.put(&self.buffer[self.cursor..end])?;

            self.cursor = end;
            remaining -= take;
        }

        Ok(length)
    }

    /// Read `length` bytes into a new vector
    pub fn read(&mut self, length: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(length);
        // Vec never faults
        let _ = self.read_into(length, &mut out);
        out
    }

    /// Fill `out` completely
    pub fn fill(&mut self, out: &mut [u8]) {
        let mut written = 0;
        while written < out.len() {
            if self.is_exhausted() {
                self.refill();
            }
            let take = (out.len() - written).min(self.remaining());
            out[written..written + take]
                .copy_from_slice(&self.buffer[self.cursor..self.cursor + take]);
            self.cursor += take;
            written += take;
        }
    }

    /// Buffer size in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Offset of the next unread byte
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Unread bytes left in the buffer
    pub fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.cursor)
    }

    /// Number of whole-buffer refills performed so far (including the
    /// initial fill)
    pub fn refills(&self) -> u64 {
        self.refills
    }

    pub fn engine(&self) -> &Xorshift1024Star {
        &self.engine
    }

    pub(crate) fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn is_exhausted(&self) -> bool {
        self.cursor == self.buffer.len()
    }

    fn refill(&mut self) {
        for word in self.buffer.chunks_exact_mut(WORD_BYTES) {
            word.copy_from_slice(&self.engine.next().to_ne_bytes());
        }
        self.cursor = 0;
        self.refills += 1;
        trace!("refilled {} byte buffer (refill #{})", self.buffer.len(), self.refills);
    }
}
