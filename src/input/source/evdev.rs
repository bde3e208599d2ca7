use std::{error::Error, os::fd::AsRawFd, path::Path};

use evdev::{AbsoluteAxisCode, Device, InputEvent};
use nix::fcntl::{FcntlArg, OFlag};

use crate::input::touch::AxisRange;

/// Non-blocking wrapper around an evdev node
pub struct EventDevice {
    device: Device,
    name: String,
    grabbed: bool,
}

impl std::fmt::Debug for EventDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDevice")
            .field("name", &self.name)
            .field("grabbed", &self.grabbed)
            .finish()
    }
}

impl EventDevice {
    /// Open the device at the given path for non-blocking reads
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        log::debug!("Opening device at: {}", path.display());
        let device = Device::open(path)?;

        // Set the device to do non-blocking reads
        let raw_fd = device.as_raw_fd();
        nix::fcntl::fcntl(raw_fd, FcntlArg::F_SETFL(OFlag::O_NONBLOCK))?;

        let name = device.name().unwrap_or("unknown").to_string();
        Ok(Self {
            device,
            name,
            grabbed: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take exclusive access so events no longer reach other clients
    pub fn grab(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.grabbed {
            self.device.grab()?;
            self.grabbed = true;
            log::debug!("Grabbed {}", self.name);
        }
        Ok(())
    }

    pub fn ungrab(&mut self) -> Result<(), Box<dyn Error>> {
        if self.grabbed {
            self.device.ungrab()?;
            self.grabbed = false;
            log::debug!("Released grab on {}", self.name);
        }
        Ok(())
    }

    /// Raw ranges of the multi-touch X and Y axes
    pub fn touch_axes(&self) -> Result<(AxisRange, AxisRange), Box<dyn Error>> {
        let mut x_axis = None;
        let mut y_axis = None;
        for (axis, info) in self.device.get_absinfo()? {
            log::trace!("Found axis: {axis:?} with info: {info:?}");
            match axis {
                AbsoluteAxisCode::ABS_MT_POSITION_X => x_axis = Some(AxisRange::from(info)),
                AbsoluteAxisCode::ABS_MT_POSITION_Y => y_axis = Some(AxisRange::from(info)),
                _ => (),
            }
        }
        match (x_axis, y_axis) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(format!("{} has no multi-touch position axes", self.name).into()),
        }
    }

    /// Read all pending events. Returns an empty list if nothing is queued.
    pub fn poll(&mut self) -> Result<Vec<InputEvent>, Box<dyn Error>> {
        let events: Vec<InputEvent> = match self.device.fetch_events() {
            Ok(events) => events.collect(),
            Err(err) => match err.kind() {
                // Do nothing if this would block
                std::io::ErrorKind::WouldBlock => return Ok(vec![]),
                _ => {
                    log::trace!("Failed to fetch events: {:?}", err);
                    return Err(format!("Failed to fetch events from {}: {err}", self.name).into());
                }
            },
        };
        Ok(events)
    }
}
