//! Access gate - one open session at a time
//!
//! # State Machine
//!
//! ```text
//! CLOSED --try_open()--> OPEN
//! OPEN   --release()---> CLOSED
//! OPEN   --try_open()--> Err(Busy), no change
//! *      --release(h)--> Err(ForeignHandle(h)) if h came from another gate
//! ```
//!
//! The claim is a single compare-and-swap, so two racing opens can never
//! both succeed.

use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the access gate
#[derive(Debug, Error, PartialEq)]
pub enum GateError {
    #[error("A session is already open")]
    Busy,

    #[error("Session handle was issued by a different gate")]
    ForeignHandle,
}

/// A release refused because the handle belongs to another gate
///
/// Carries the handle back so it can still be released where it was issued.
#[derive(Debug, Error, PartialEq)]
#[error("Session handle was issued by a different gate")]
pub struct ForeignHandle(SessionHandle);

impl ForeignHandle {
    pub fn into_handle(self) -> SessionHandle {
        self.0
    }
}

/// Proof of an open session
///
/// Not `Clone`: releasing consumes the handle, so it cannot outlive its
/// session. Bound to the gate that issued it.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionHandle {
    gate: Uuid,
    id: Uuid,
}

impl SessionHandle {
    /// Unique id of this session
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Id of the gate that issued this handle
    pub fn gate_id(&self) -> Uuid {
        self.gate
    }
}

/// Exclusive-claim gate
#[derive(Debug)]
pub struct AccessGate {
    id: Uuid,
    open: AtomicBool,
}

impl AccessGate {
    /// Create a gate in the CLOSED state
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            open: AtomicBool::new(false),
        }
    }

    /// Claim the gate
    ///
    /// # Errors
    /// `GateError::Busy` if a session is already open.
    pub fn try_open(&self) -> Result<SessionHandle, GateError> {
        self.open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GateError::Busy)?;

        let handle = SessionHandle {
            gate: self.id,
            id: Uuid::new_v4(),
        };
        debug!("session {} opened", handle.id);
        Ok(handle)
    }

    /// Release the gate
    ///
    /// Always succeeds for a handle this gate issued. A foreign handle is
    /// handed back untouched and the gate stays as it was.
    pub fn release(&self, handle: SessionHandle) -> Result<(), ForeignHandle> {
        if !self.owns(&handle) {
            return Err(ForeignHandle(handle));
        }
        self.open.store(false, Ordering::Release);
        debug!("session {} released", handle.id);
        Ok(())
    }

    /// Check that `handle` was issued by this gate
    ///
    /// # Errors
    /// `GateError::ForeignHandle` otherwise.
    pub fn check(&self, handle: &SessionHandle) -> Result<(), GateError> {
        if self.owns(handle) {
            Ok(())
        } else {
            Err(GateError::ForeignHandle)
        }
    }

    /// True while a session is open
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Id stamped on every handle this gate issues
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn owns(&self, handle: &SessionHandle) -> bool {
        handle.gate == self.id
    }
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_starts_closed() {
        let gate = AccessGate::new();
        assert!(!gate.is_open());
    }

    #[test]
    fn test_busy_leaves_gate_open() {
        let gate = AccessGate::new();
        let handle = gate.try_open().unwrap();
        assert_eq!(gate.try_open(), Err(GateError::Busy));
        assert!(gate.is_open());
        gate.release(handle).unwrap();
        assert!(!gate.is_open());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let gate = AccessGate::new();
        let first = gate.try_open().unwrap();
        let first_id = first.id();
        gate.release(first).unwrap();
        let second = gate.try_open().unwrap();
        assert_ne!(first_id, second.id());
    }

    #[test]
    fn test_handle_carries_gate_id() {
        let gate = AccessGate::new();
        let handle = gate.try_open().unwrap();
        assert_eq!(handle.gate_id(), gate.id());
        assert_eq!(gate.check(&handle), Ok(()));
        gate.release(handle).unwrap();
    }

    #[test]
    fn test_foreign_release_returns_handle() {
        let a = AccessGate::new();
        let b = AccessGate::new();
        let handle_a = a.try_open().unwrap();
        let handle_b = b.try_open().unwrap();
        let id_a = handle_a.id();

        let refused = b.release(handle_a).unwrap_err();
        assert!(b.is_open(), "foreign release must not close the gate");
        assert_eq!(b.check(&handle_b), Ok(()));

        let handle_a = refused.into_handle();
        assert_eq!(handle_a.id(), id_a);
        a.release(handle_a).unwrap();
        assert!(!a.is_open());
        b.release(handle_b).unwrap();
    }
}
