//! Device adapter layer
//!
//! Wraps the stream and the access gate into a misc character device:
//! open / release / read / write entry points, a usage count, and a
//! registry standing in for the host's misc device table.

mod config;
mod merandom;
mod registry;

pub use config::{DeviceConfig, DEFAULT_DEVICE_NAME, DEFAULT_MODE};
pub use merandom::MeRandom;
pub use registry::{MiscRegistry, DYNAMIC_MINOR_FIRST, DYNAMIC_MINOR_LAST, MISC_MAJOR};

use thiserror::Error;

use crate::stream::TransferFault;

/// Errors surfaced by the device entry points and the registry
#[derive(Debug, Error, PartialEq)]
pub enum DeviceError {
    #[error("Device {0} is busy")]
    SessionBusy(String),

    #[error("Session handle was not issued by device {0}")]
    ForeignSession(String),

    #[error("Write operation on /dev/{0} not supported")]
    UnsupportedOperation(String),

    #[error(transparent)]
    TransferFault(#[from] TransferFault),

    #[error("Invalid device config: {0}")]
    InvalidConfig(String),

    #[error("Device {0} already registered")]
    AlreadyRegistered(String),

    #[error("Device {0} not registered")]
    NotRegistered(String),

    #[error("Device {name} in use by {users} open handle(s)")]
    InUse { name: String, users: usize },

    #[error("No dynamic minor number available")]
    NoMinorAvailable,
}

/// Major/minor device number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceNumber {
    pub major: u32,
    pub minor: u32,
}

impl DeviceNumber {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Linux encoding: `major << 20 | minor`
    pub const fn as_u64(&self) -> u64 {
        ((self.major as u64) << 20) | (self.minor as u64)
    }
}
