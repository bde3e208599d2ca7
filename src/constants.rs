/// Prefix used for XDG directories
pub const PREFIX: &str = "gamepad-overlay";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

pub const DEFAULT_SCREEN_WIDTH: u32 = 1280;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 800;
pub const DEFAULT_TRACKPAD_SENSITIVITY: f32 = 1.0;
pub const DEFAULT_LONG_PRESS_MS: u64 = 250;

/// Identity of the virtual keyboard/mouse the overlay writes to
pub const VIRTUAL_DEVICE_NAME: &str = "gamepad-overlay";
pub const VIRTUAL_DEVICE_VENDOR_ID: u16 = 0x1234;
pub const VIRTUAL_DEVICE_PRODUCT_ID: u16 = 0x5678;

/// How often input devices are polled and a frame is run
pub const POLL_INTERVAL_MS: u64 = 4;
