//! Virtual devices that synthesized overlay input is written to

#[cfg(test)]
pub mod recording;
pub mod uinput;

use evdev::KeyCode;
use thiserror::Error;

/// Possible errors while writing to a target device
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Failed to create virtual device: {0}")]
    Create(std::io::Error),
    #[error("Failed to write event: {0}")]
    Write(#[from] std::io::Error),
}

/// An [InputSink] receives the key and pointer events synthesized by the
/// overlay.
pub trait InputSink {
    /// Press (`pressed == true`) or release the given key
    fn emit_key(&mut self, key: KeyCode, pressed: bool) -> Result<(), DeviceError>;

    /// Move the pointer by the given number of pixels
    fn emit_relative_move(&mut self, dx: i32, dy: i32) -> Result<(), DeviceError>;
}
