use evdev::KeyCode;

use super::{DeviceError, InputSink};

/// An event delivered to a [RecordingSink]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Key(KeyCode, bool),
    Move(i32, i32),
}

/// [InputSink] that keeps everything it is given
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Recorded>,
    /// Fail every write, to exercise error paths
    pub fail: bool,
}

impl RecordingSink {
    /// Take all recorded events
    pub fn take(&mut self) -> Vec<Recorded> {
        std::mem::take(&mut self.events)
    }

    /// Sum of all recorded relative moves
    pub fn total_motion(&self) -> (i32, i32) {
        self.events.iter().fold((0, 0), |(x, y), e| match e {
            Recorded::Move(dx, dy) => (x + dx, y + dy),
            Recorded::Key(..) => (x, y),
        })
    }

    /// Recorded key events only
    pub fn keys(&self) -> Vec<(KeyCode, bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Recorded::Key(key, pressed) => Some((*key, *pressed)),
                Recorded::Move(..) => None,
            })
            .collect()
    }
}

impl InputSink for RecordingSink {
    fn emit_key(&mut self, key: KeyCode, pressed: bool) -> Result<(), DeviceError> {
        if self.fail {
            return Err(DeviceError::Write(std::io::ErrorKind::BrokenPipe.into()));
        }
        self.events.push(Recorded::Key(key, pressed));
        Ok(())
    }

    fn emit_relative_move(&mut self, dx: i32, dy: i32) -> Result<(), DeviceError> {
        if self.fail {
            return Err(DeviceError::Write(std::io::ErrorKind::BrokenPipe.into()));
        }
        self.events.push(Recorded::Move(dx, dy));
        Ok(())
    }
}
