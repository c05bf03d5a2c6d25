//! The merandom character device
//!
//! A /dev/urandom-like device backed by xorshift1024*. One session at a
//! time; reads never come up short; writes are always refused.
//!
//! # Entry Points
//!
//! | Operation | Behavior                                                |
//! |-----------|---------------------------------------------------------|
//! | open      | claim the gate, bump the usage count                    |
//! | release   | free the gate, drop the usage count                     |
//! | read      | lock the stream for the whole call, deliver all bytes   |
//!
//! Handles are bound to the device that issued them; release and read
//! refuse a handle opened on another device.
//! | write     | `UnsupportedOperation`, no state touched                |

use log::{debug, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DeviceConfig, DeviceError, DeviceNumber};
use crate::checkpoint::StreamSnapshot;
use crate::session::{AccessGate, ForeignHandle, GateError, SessionHandle};
use crate::stream::{ByteSink, ByteStream, StreamError};

#[derive(Debug)]
pub struct MeRandom {
    config: DeviceConfig,
    number: DeviceNumber,
    gate: AccessGate,
    stream: Mutex<ByteStream>,
    users: AtomicUsize,
}

impl MeRandom {
    /// Build a device from a validated config
    ///
    /// The stream is seeded and its buffer filled here, mirroring module
    /// initialization.
    pub fn new(config: DeviceConfig, number: DeviceNumber) -> Result<Self, DeviceError> {
        config.validate()?;
        let stream = ByteStream::new(config.buffer_words).map_err(|e: StreamError| {
            DeviceError::InvalidConfig(e.to_string())
        })?;

        Ok(Self {
            config,
            number,
            gate: AccessGate::new(),
            stream: Mutex::new(stream),
            users: AtomicUsize::new(0),
        })
    }

    /// Open a session
    ///
    /// # Errors
    /// `SessionBusy` if another session is open. Nothing changes in that case.
    pub fn open(&self) -> Result<SessionHandle, DeviceError> {
        let handle = self.gate.try_open().map_err(|_: GateError| {
            debug!("{}: open refused, device busy", self.name());
            DeviceError::SessionBusy(self.name().to_string())
        })?;
        self.users.fetch_add(1, Ordering::AcqRel);
        Ok(handle)
    }

    /// Close a session
    ///
    /// Always succeeds for a handle this device issued.
    ///
    /// # Errors
    /// `ForeignHandle` (carrying the handle back) if the handle was opened
    /// on another device. Neither device changes state.
    pub fn release(&self, handle: SessionHandle) -> Result<(), ForeignHandle> {
        self.gate.release(handle).map_err(|refused| {
            warn!("{}: release with a handle from another device", self.name());
            refused
        })?;
        // Saturating: a release can never take the count below zero
        let _ = self
            .users
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        Ok(())
    }

    /// Deliver exactly `length` bytes to `sink`
    ///
    /// The stream stays locked for the whole call, so concurrent readers see
    /// disjoint, serialized slices of one stream.
    ///
    /// # Errors
    /// - `ForeignSession` if `session` was opened on another device
    /// - `TransferFault` if the sink rejects a chunk. Bytes handed over
    ///   before the fault stay consumed; the rejected chunk is served again
    ///   on the next read.
    pub fn read<S>(
        &self,
        session: &SessionHandle,
        length: usize,
        sink: &mut S,
    ) -> Result<usize, DeviceError>
    where
        S: ByteSink + ?Sized,
    {
        self.gate
            .check(session)
            .map_err(|_: GateError| DeviceError::ForeignSession(self.name().to_string()))?;
        let mut stream = self.lock_stream();
        Ok(stream.read_into(length, sink)?)
    }

    /// Read `length` bytes into a new vector
    pub fn read_bytes(&self, session: &SessionHandle, length: usize) -> Result<Vec<u8>, DeviceError> {
        let mut out = Vec::with_capacity(length);
        self.read(session, length, &mut out)?;
        Ok(out)
    }

    /// Writes are not supported; nothing is consumed and no state changes
    pub fn write(&self, _session: &SessionHandle, _data: &[u8]) -> Result<usize, DeviceError> {
        warn!(
            "{}: write operation on {} not supported",
            self.name(),
            self.path()
        );
        Err(DeviceError::UnsupportedOperation(self.name().to_string()))
    }

    /// Capture the stream state
    ///
    /// Read-only: a device never loads state from outside, so its output is
    /// always the fixed-seed sequence.
    pub fn snapshot(&self) -> StreamSnapshot {
        self.lock_stream().snapshot()
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Path of the device file
    pub fn path(&self) -> String {
        format!("/dev/{}", self.config.name)
    }

    pub fn number(&self) -> DeviceNumber {
        self.number
    }

    pub fn mode(&self) -> u16 {
        self.config.mode
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Number of open handles holding the device
    pub fn usage_count(&self) -> usize {
        self.users.load(Ordering::Acquire)
    }

    pub fn is_open(&self) -> bool {
        self.gate.is_open()
    }

    fn lock_stream(&self) -> MutexGuard<'_, ByteStream> {
        // A panicking sink cannot leave the cursor half-advanced
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
