pub mod path;

use std::{io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants,
    input::touch::{AxisRange, Orientation},
    overlay::OverlayOptions,
};

/// Represents all possible errors loading a [Config]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Top-level configuration, loaded from `config.yaml`. Every section and
/// field is optional.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    pub touchscreen: Option<TouchscreenConfig>,
    pub screen: Option<ScreenConfig>,
    pub trackpad: Option<TrackpadConfig>,
    pub hotkeys: Option<HotkeyConfig>,
    pub virtual_device: Option<VirtualDeviceConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TouchscreenConfig {
    /// Path to the touchscreen event device (e.g. "/dev/input/event2"). If
    /// unset, the first multi-touch device found is used.
    pub device: Option<String>,
    /// Orientation of the overlay. Can be one of: ["portrait", "landscape"]
    pub orientation: Option<String>,
    /// Width of the touchscreen in device units
    pub width: Option<u32>,
    /// Height of the touchscreen in device units
    pub height: Option<u32>,
    /// If true, the width/height defined here are used instead of the range
    /// advertised by the device itself.
    pub override_source_size: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ScreenConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TrackpadConfig {
    /// Pointer pixels per touch pixel
    pub sensitivity: Option<f32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct HotkeyConfig {
    /// How long a hardware key must be held to count as a long press
    pub long_press_ms: Option<u64>,
    /// Device providing the key that shows/hides the overlay
    pub toggle_device: Option<String>,
    /// Device providing the key that switches orientation
    pub orientation_device: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct VirtualDeviceConfig {
    pub name: Option<String>,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

impl Config {
    /// Load a [Config] from the given YAML string
    pub fn from_yaml(content: &str) -> Result<Config, LoadError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a [Config] from the given YAML file
    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<Config, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the configuration from the first existing file in the search
    /// path. An explicitly given path must exist. Falls back to defaults if
    /// no file is found.
    pub fn load(explicit: Option<&Path>) -> Result<Config, LoadError> {
        if let Some(path) = explicit {
            log::debug!("Loading config from {path:?}");
            return Config::from_yaml_path(path);
        }
        for path in path::get_config_paths() {
            if !path.is_file() {
                log::trace!("No config at {path:?}");
                continue;
            }
            log::debug!("Loading config from {path:?}");
            return Config::from_yaml_path(path);
        }

        log::debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Touchscreen device path, if configured
    pub fn touchscreen_device(&self) -> Option<&str> {
        self.touchscreen.as_ref()?.device.as_deref()
    }

    pub fn orientation(&self) -> Orientation {
        self.touchscreen
            .as_ref()
            .and_then(|t| t.orientation.as_deref())
            .map(Orientation::from)
            .unwrap_or_default()
    }

    /// Size of the overlay surface in pixels
    pub fn screen_size(&self) -> (u32, u32) {
        let screen = self.screen.as_ref();
        let width = screen.and_then(|s| s.width);
        let height = screen.and_then(|s| s.height);
        (
            width.unwrap_or(constants::DEFAULT_SCREEN_WIDTH),
            height.unwrap_or(constants::DEFAULT_SCREEN_HEIGHT),
        )
    }

    pub fn trackpad_sensitivity(&self) -> f32 {
        self.trackpad
            .as_ref()
            .and_then(|t| t.sensitivity)
            .unwrap_or(constants::DEFAULT_TRACKPAD_SENSITIVITY)
    }

    pub fn long_press(&self) -> Duration {
        let ms = self
            .hotkeys
            .as_ref()
            .and_then(|h| h.long_press_ms)
            .unwrap_or(constants::DEFAULT_LONG_PRESS_MS);
        Duration::from_millis(ms)
    }

    pub fn toggle_device(&self) -> Option<&str> {
        self.hotkeys.as_ref()?.toggle_device.as_deref()
    }

    pub fn orientation_device(&self) -> Option<&str> {
        self.hotkeys.as_ref()?.orientation_device.as_deref()
    }

    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            trackpad_sensitivity: self.trackpad_sensitivity(),
            orientation: self.orientation(),
        }
    }

    /// Apply any touchscreen size override to the axis ranges advertised by
    /// the device
    pub fn touch_axes(&self, x_axis: AxisRange, y_axis: AxisRange) -> (AxisRange, AxisRange) {
        let Some(touchscreen) = self.touchscreen.as_ref() else {
            return (x_axis, y_axis);
        };
        if !touchscreen.override_source_size.unwrap_or_default() {
            return (x_axis, y_axis);
        }

        let x_axis = override_axis(x_axis, touchscreen.width, "width");
        let y_axis = override_axis(y_axis, touchscreen.height, "height");
        log::debug!("Overriding touchscreen size: x {x_axis:?}, y {y_axis:?}");

        (x_axis, y_axis)
    }

    pub fn virtual_device_name(&self) -> String {
        self.virtual_device
            .as_ref()
            .and_then(|v| v.name.clone())
            .unwrap_or_else(|| constants::VIRTUAL_DEVICE_NAME.to_string())
    }

    pub fn virtual_device_ids(&self) -> (u16, u16) {
        let device = self.virtual_device.as_ref();
        (
            device
                .and_then(|v| v.vendor_id)
                .unwrap_or(constants::VIRTUAL_DEVICE_VENDOR_ID),
            device
                .and_then(|v| v.product_id)
                .unwrap_or(constants::VIRTUAL_DEVICE_PRODUCT_ID),
        )
    }
}

/// Replace the maximum of the given axis with the configured size. Sizes that
/// do not fit the axis value range are ignored.
fn override_axis(axis: AxisRange, size: Option<u32>, name: &str) -> AxisRange {
    let Some(size) = size else {
        return axis;
    };
    match i32::try_from(size) {
        Ok(max) => AxisRange::new(axis.min, max),
        Err(_) => {
            log::warn!("Ignoring touchscreen {name} override {size}: out of range");
            axis
        }
    }
}
