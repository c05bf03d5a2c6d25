//! Checkpoint - Save/Restore Stream State
//!
//! Captures everything needed to resume a byte stream at the exact byte it
//! stopped at: engine words and position, scratch buffer contents and cursor.
//!
//! # Critical Invariants
//!
//! - **Continuity**: a restored stream produces the same bytes the original
//!   would have produced next
//! - **Integrity**: snapshots carry a SHA256 digest; a tampered snapshot is
//!   rejected before any state is rebuilt
//! - **Validity**: an all-zero engine state or an out-of-range cursor is
//!   never accepted

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::rng::{RngError, Xorshift1024Star, STATE_WORDS};
use crate::stream::ByteStream;

/// Errors restoring a stream from a snapshot
#[derive(Debug, Error, PartialEq)]
pub enum CheckpointError {
    #[error("Snapshot digest mismatch: expected {expected}, computed {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("Invalid engine state: {0}")]
    InvalidEngine(#[from] RngError),

    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Complete byte stream snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    /// Engine words
    pub engine_state: [u64; STATE_WORDS],

    /// Engine cursor
    pub engine_position: usize,

    /// Scratch buffer contents
    pub buffer: Vec<u8>,

    /// Offset of the next unread byte
    pub cursor: usize,

    /// Refills performed before the snapshot
    pub refills: u64,

    /// SHA256 over all fields above (hex)
    pub digest: String,
}

impl StreamSnapshot {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    /// Recompute the digest from the snapshot's fields
    pub fn compute_digest(&self) -> String {
        compute_digest(
            &self.engine_state,
            self.engine_position,
            &self.buffer,
            self.cursor,
            self.refills,
        )
    }
}

fn compute_digest(
    engine_state: &[u64; STATE_WORDS],
    engine_position: usize,
    buffer: &[u8],
    cursor: usize,
    refills: u64,
) -> String {
    let mut hasher = Sha256::new();
    for word in engine_state {
        hasher.update(word.to_le_bytes());
    }
    hasher.update((engine_position as u64).to_le_bytes());
    hasher.update((buffer.len() as u64).to_le_bytes());
    hasher.update(buffer);
    hasher.update((cursor as u64).to_le_bytes());
    hasher.update(refills.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

impl ByteStream {
    /// Capture the current stream state
    pub fn snapshot(&self) -> StreamSnapshot {
        let engine = self.engine();
        let engine_state = *engine.state();
        let engine_position = engine.position();
        let buffer = self.buffer().to_vec();
        let digest = compute_digest(
            &engine_state,
            engine_position,
            &buffer,
            self.cursor(),
            self.refills(),
        );

        StreamSnapshot {
            engine_state,
            engine_position,
            buffer,
            cursor: self.cursor(),
            refills: self.refills(),
            digest,
        }
    }

    /// Rebuild a stream from a snapshot
    ///
    /// # Errors
    /// - `DigestMismatch` if any field was altered after the snapshot
    /// - `InvalidEngine` if the engine parts are unusable
    /// - `InvalidBuffer` if the buffer is empty, not word-aligned, or the
    ///   cursor lies past its end
    pub fn restore(snapshot: &StreamSnapshot) -> Result<ByteStream, CheckpointError> {
        let actual = snapshot.compute_digest();
        if actual != snapshot.digest {
            return Err(CheckpointError::DigestMismatch {
                expected: snapshot.digest.clone(),
                actual,
            });
        }

        let engine = Xorshift1024Star::from_parts(snapshot.engine_state, snapshot.engine_position)?;

        let word_bytes = std::mem::size_of::<u64>();
        if snapshot.buffer.is_empty() || snapshot.buffer.len() % word_bytes != 0 {
            return Err(CheckpointError::InvalidBuffer(format!(
                "length {} is not a positive multiple of {}",
                snapshot.buffer.len(),
                word_bytes
            )));
        }
        if snapshot.cursor > snapshot.buffer.len() {
            return Err(CheckpointError::InvalidBuffer(format!(
                "cursor {} past end of {} byte buffer",
                snapshot.cursor,
                snapshot.buffer.len()
            )));
        }

        Ok(ByteStream::from_parts(
            engine,
            snapshot.buffer.clone(),
            snapshot.cursor,
            snapshot.refills,
        ))
    }
}
