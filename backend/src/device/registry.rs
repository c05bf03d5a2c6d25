//! Misc device registry
//!
//! In-process stand-in for the host's misc device table. Registration
//! assigns a dynamic minor under the misc major and logs the same events a
//! driver reports when its device file appears or disappears.

use log::{error, info};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::{DeviceConfig, DeviceError, DeviceNumber, MeRandom};

/// Major number shared by all misc devices
pub const MISC_MAJOR: u32 = 10;

/// Highest dynamic minor, handed out first
pub const DYNAMIC_MINOR_LAST: u32 = 255;

/// Lowest dynamic minor
pub const DYNAMIC_MINOR_FIRST: u32 = 128;

#[derive(Debug, Default)]
pub struct MiscRegistry {
    devices: HashMap<String, Arc<MeRandom>>,
    minors_in_use: BTreeSet<u32>,
}

impl MiscRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device built from `config`
    ///
    /// # Errors
    /// - `InvalidConfig` if the config fails validation
    /// - `AlreadyRegistered` if the name is taken
    /// - `NoMinorAvailable` if every dynamic minor is in use
    pub fn register(&mut self, config: DeviceConfig) -> Result<Arc<MeRandom>, DeviceError> {
        let name = config.name.clone();
        self.try_register(config).map_err(|e| {
            error!("{}: misc_register failed: {}", name, e);
            e
        })
    }

    fn try_register(&mut self, config: DeviceConfig) -> Result<Arc<MeRandom>, DeviceError> {
        config.validate()?;
        if self.devices.contains_key(&config.name) {
            return Err(DeviceError::AlreadyRegistered(config.name));
        }
        let minor = self.allocate_minor()?;

        let device = Arc::new(MeRandom::new(config, DeviceNumber::new(MISC_MAJOR, minor))?);
        self.minors_in_use.insert(minor);
        self.devices
            .insert(device.name().to_string(), Arc::clone(&device));

        info!("{}: registered", device.name());
        info!("{}: created device file {}", device.name(), device.path());
        Ok(device)
    }

    /// Remove a device
    ///
    /// # Errors
    /// - `NotRegistered` if no device has that name
    /// - `InUse` while a session holds the device
    pub fn deregister(&mut self, name: &str) -> Result<(), DeviceError> {
        let device = self
            .devices
            .get(name)
            .ok_or_else(|| DeviceError::NotRegistered(name.to_string()))?;

        let users = device.usage_count();
        if users > 0 {
            let err = DeviceError::InUse {
                name: name.to_string(),
                users,
            };
            error!("{}: misc_deregister failed: {}", name, err);
            return Err(err);
        }

        if let Some(device) = self.devices.remove(name) {
            self.minors_in_use.remove(&device.number().minor);
            info!("{}: unregistered", name);
            info!("{}: deleted {}", name, device.path());
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<MeRandom>> {
        self.devices.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn allocate_minor(&self) -> Result<u32, DeviceError> {
        (DYNAMIC_MINOR_FIRST..=DYNAMIC_MINOR_LAST)
            .rev()
            .find(|minor| !self.minors_in_use.contains(minor))
            .ok_or(DeviceError::NoMinorAvailable)
    }
}
