//! merandom Core - Rust Engine
//!
//! A /dev/urandom-like pseudo-random byte device backed by xorshift1024*.
//!
//! # Architecture
//!
//! - **rng**: xorshift1024* engine
//! - **stream**: Scratch buffer refilled in bulk and drained to readers
//! - **session**: Access gate allowing one open session at a time
//! - **device**: Character device entry points and misc device registry
//! - **checkpoint**: Save/restore of stream state
//!
//! # Critical Invariants
//!
//! 1. Output is deterministic for a given seed and NOT cryptographically secure
//! 2. Reads always deliver the full requested length (or fault)
//! 3. At most one session is open per device
//! 4. Writes never mutate generator state
//!
//! # Example
//! ```
//! use merandom_core::{DeviceConfig, MiscRegistry};
//!
//! let mut registry = MiscRegistry::new();
//! let device = registry.register(DeviceConfig::default()).unwrap();
//!
//! let session = device.open().unwrap();
//! let bytes = device.read_bytes(&session, 16).unwrap();
//! assert_eq!(bytes.len(), 16);
//! device.release(session).unwrap();
//! ```

// Module declarations
pub mod checkpoint;
pub mod device;
pub mod rng;
pub mod session;
pub mod stream;

// Re-exports for convenience
pub use checkpoint::{CheckpointError, StreamSnapshot};
pub use device::{DeviceConfig, DeviceError, DeviceNumber, MeRandom, MiscRegistry};
pub use rng::{RngError, Xorshift1024Star};
pub use session::{AccessGate, ForeignHandle, GateError, SessionHandle};
pub use stream::{
    ByteSink, ByteStream, SliceSink, StreamError, TransferFault, WriterSink, DEFAULT_BUFFER_WORDS,
};
