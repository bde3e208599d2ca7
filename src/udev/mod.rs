//! Input device discovery through udev


use std::{io, path::PathBuf};

use evdev::{AbsoluteAxisCode, KeyCode};
use thiserror::Error;
use udev::Enumerator;

/// Possible errors while looking for input devices
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to enumerate udev devices: {0}")]
    Udev(#[from] io::Error),
    #[error("No {0} device found")]
    NotFound(&'static str),
}

/// What a discovered device can be used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceRoles {
    /// Reports type B multi-touch contacts
    pub touchscreen: bool,
    pub volume_down: bool,
    pub volume_up: bool,
}

impl DeviceRoles {
    /// Classify a device from its advertised capabilities
    pub fn classify<A, K>(mut axes: A, keys: K) -> Self
    where
        A: FnMut(AbsoluteAxisCode) -> bool,
        K: Fn(KeyCode) -> bool,
    {
        let touchscreen = axes(AbsoluteAxisCode::ABS_MT_SLOT)
            && axes(AbsoluteAxisCode::ABS_MT_TRACKING_ID)
            && axes(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && axes(AbsoluteAxisCode::ABS_MT_POSITION_Y);
        Self {
            touchscreen,
            volume_down: keys(KeyCode::KEY_VOLUMEDOWN),
            volume_up: keys(KeyCode::KEY_VOLUMEUP),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.touchscreen || self.volume_down || self.volume_up)
    }

    /// Comma separated role names for display
    pub fn describe(&self) -> String {
        let mut roles = vec![];
        if self.touchscreen {
            roles.push("touchscreen");
        }
        if self.volume_down {
            roles.push("volume-down");
        }
        if self.volume_up {
            roles.push("volume-up");
        }
        roles.join(", ")
    }
}

/// An evdev node found during discovery
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredDevice {
    pub devnode: PathBuf,
    pub name: String,
    pub roles: DeviceRoles,
}

/// Returns a list of devices in the given subsystem that have a devnode property.
pub fn discover_devices(subsystem: &str) -> Result<Vec<udev::Device>, DiscoveryError> {
    let mut enumerator = Enumerator::new()?;
    enumerator.match_subsystem(subsystem)?;
    enumerator.match_is_initialized()?;

    log::debug!("Started udev {subsystem} enumerator.");

    Ok(enumerator
        .scan_devices()?
        .filter(|device| device.devnode().is_some())
        .collect())
}

/// Open every evdev node and classify it. Nodes that cannot be opened (most
/// often for lack of permission) are skipped.
pub fn discover_input_devices() -> Result<Vec<DiscoveredDevice>, DiscoveryError> {
    let mut devices = vec![];
    for device in discover_devices("input")? {
        let Some(devnode) = device.devnode() else {
            continue;
        };
        let is_event_node = device.sysname().to_string_lossy().starts_with("event");
        if !is_event_node {
            continue;
        }

        let evdev_device = match evdev::Device::open(devnode) {
            Ok(dev) => dev,
            Err(e) => {
                log::debug!("Unable to open {devnode:?}: {e}");
                continue;
            }
        };
        let axes = evdev_device.supported_absolute_axes();
        let keys = evdev_device.supported_keys();
        let roles = DeviceRoles::classify(
            |axis| axes.is_some_and(|a| a.contains(axis)),
            |key| keys.is_some_and(|k| k.contains(key)),
        );
        let name = evdev_device.name().unwrap_or("unknown").to_string();
        log::trace!("Found {name} at {devnode:?} with roles {roles:?}");

        devices.push(DiscoveredDevice {
            devnode: devnode.to_path_buf(),
            name,
            roles,
        });
    }
    devices.sort_by(|a, b| a.devnode.cmp(&b.devnode));

    Ok(devices)
}

/// Returns the devnode of the first device with the given role
pub fn find_device<F>(
    devices: &[DiscoveredDevice],
    role: &'static str,
    matches: F,
) -> Result<PathBuf, DiscoveryError>
where
    F: Fn(&DeviceRoles) -> bool,
{
    let device = devices
        .iter()
        .find(|d| matches(&d.roles))
        .ok_or(DiscoveryError::NotFound(role))?;
    log::info!("Using {} ({:?}) as {role}", device.name, device.devnode);
    Ok(device.devnode.clone())
}
