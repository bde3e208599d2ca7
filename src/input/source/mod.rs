//! Physical input devices the overlay reads from

pub mod evdev;
