use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, BusType, EventType, InputEvent, InputId, KeyCode, RelativeAxisCode,
};

use crate::input::keys::{EXTRA_KEYS, MAPPABLE_KEYS};

use super::{DeviceError, InputSink};

/// Virtual keyboard and relative pointer created through uinput. Every key
/// a widget can be mapped to is advertised up front so remapping never
/// requires recreating the device.
pub struct VirtualInputDevice {
    device: VirtualDevice,
}

impl std::fmt::Debug for VirtualInputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualInputDevice").finish()
    }
}

impl VirtualInputDevice {
    /// Create the virtual device with the given name and USB ids
    pub fn new(name: &str, vendor_id: u16, product_id: u16) -> Result<Self, DeviceError> {
        log::debug!("Creating virtual input device '{name}'");
        let mut keys = AttributeSet::<KeyCode>::new();
        for key in MAPPABLE_KEYS.iter() {
            keys.insert(key.code);
        }
        for key in EXTRA_KEYS {
            keys.insert(key);
        }

        let id = InputId::new(BusType::BUS_USB, vendor_id, product_id, 1);
        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(name).input_id(id).with_keys(&keys))
            .and_then(|builder| {
                builder.with_relative_axes(&AttributeSet::from_iter([
                    RelativeAxisCode::REL_X,
                    RelativeAxisCode::REL_Y,
                ]))
            })
            .and_then(|builder| builder.build())
            .map_err(DeviceError::Create)?;
        log::info!("Created virtual input device '{name}'");

        Ok(Self { device })
    }
}

impl InputSink for VirtualInputDevice {
    fn emit_key(&mut self, key: KeyCode, pressed: bool) -> Result<(), DeviceError> {
        log::trace!("Emitting key {key:?} pressed={pressed}");
        let event = InputEvent::new(EventType::KEY.0, key.0, pressed as i32);
        self.device.emit(&[event])?;
        Ok(())
    }

    fn emit_relative_move(&mut self, dx: i32, dy: i32) -> Result<(), DeviceError> {
        let mut events = Vec::with_capacity(2);
        if dx != 0 {
            events.push(InputEvent::new(
                EventType::RELATIVE.0,
                RelativeAxisCode::REL_X.0,
                dx,
            ));
        }
        if dy != 0 {
            events.push(InputEvent::new(
                EventType::RELATIVE.0,
                RelativeAxisCode::REL_Y.0,
                dy,
            ));
        }
        if events.is_empty() {
            return Ok(());
        }
        log::trace!("Emitting relative move ({dx}, {dy})");
        self.device.emit(events.as_slice())?;
        Ok(())
    }
}
