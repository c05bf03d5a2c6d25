//! Device configuration
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! { "name": "merandom", "buffer_words": 128, "mode": 292 }
//! ```

use serde::{Deserialize, Serialize};

use super::DeviceError;
use crate::stream::DEFAULT_BUFFER_WORDS;

/// Default device name, also the file name under /dev
pub const DEFAULT_DEVICE_NAME: &str = "merandom";

/// Read permission for user, group and other (S_IRUGO)
pub const DEFAULT_MODE: u16 = 0o444;

const WRITE_BITS: u16 = 0o222;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Device name (file name under /dev)
    pub name: String,

    /// Scratch buffer size in 64-bit engine words
    pub buffer_words: usize,

    /// Permission bits of the device file
    pub mode: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DEVICE_NAME.to_string(),
            buffer_words: DEFAULT_BUFFER_WORDS,
            mode: DEFAULT_MODE,
        }
    }
}

impl DeviceConfig {
    /// Parse a config from JSON
    pub fn from_json(json: &str) -> Result<Self, DeviceError> {
        serde_json::from_str(json).map_err(|e| DeviceError::InvalidConfig(e.to_string()))
    }

    /// Check the config before a device is built from it
    ///
    /// # Errors
    /// `InvalidConfig` if the name is empty or contains `/`, if
    /// `buffer_words` is zero, or if the mode grants write permission
    /// (the device has no write path).
    pub fn validate(&self) -> Result<(), DeviceError> {
        if self.name.is_empty() {
            return Err(DeviceError::InvalidConfig("name must not be empty".into()));
        }
        if self.name.contains('/') {
            return Err(DeviceError::InvalidConfig(format!(
                "name '{}' must not contain '/'",
                self.name
            )));
        }
        if self.buffer_words == 0 {
            return Err(DeviceError::InvalidConfig(
                "buffer_words must be at least 1".into(),
            ));
        }
        if self.mode & WRITE_BITS != 0 {
            return Err(DeviceError::InvalidConfig(format!(
                "mode {:o} grants write access to a read-only device",
                self.mode
            )));
        }
        Ok(())
    }
}
