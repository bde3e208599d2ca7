use std::{
    error::Error,
    path::PathBuf,
    time::{Duration, Instant},
};

use evdev::EventSummary;
use tokio::time::{interval, MissedTickBehavior};

use crate::{
    config::Config,
    constants::POLL_INTERVAL_MS,
    input::{
        hotkey::{HotkeyAction, Hotkeys},
        source::evdev::EventDevice,
        target::{uinput::VirtualInputDevice, InputSink},
        touch::{Orientation, TouchEvent},
    },
    overlay::{
        geometry::Screen,
        scene::{LogSurface, Surface},
        Overlay,
    },
    udev::{self, DiscoveredDevice},
};

/// Devices the manager should use instead of discovering them
#[derive(Debug, Clone, Default)]
pub struct DeviceOverrides {
    pub touchscreen: Option<PathBuf>,
    pub landscape: bool,
}

/// Owns the physical and virtual devices and drives the [Overlay] from a
/// single task
pub struct Manager {
    overlay: Overlay,
    touch: EventDevice,
    /// Devices providing the volume keys, grabbed for the whole run
    key_devices: Vec<EventDevice>,
    sink: VirtualInputDevice,
    surface: LogSurface,
    hotkeys: Hotkeys,
    visible: bool,
}

impl Manager {
    /// Open all devices. Devices not named in the config are discovered.
    pub fn new(config: &Config, overrides: DeviceOverrides) -> Result<Self, Box<dyn Error>> {
        let touch_path = overrides
            .touchscreen
            .or_else(|| config.touchscreen_device().map(PathBuf::from));
        let toggle_path = config.toggle_device().map(PathBuf::from);
        let orientation_path = config.orientation_device().map(PathBuf::from);

        let needs_discovery =
            touch_path.is_none() || toggle_path.is_none() || orientation_path.is_none();
        let discovered: Vec<DiscoveredDevice> = if needs_discovery {
            udev::discover_input_devices()?
        } else {
            vec![]
        };

        let touch_path = match touch_path {
            Some(path) => path,
            None => udev::find_device(&discovered, "touchscreen", |r| r.touchscreen)?,
        };
        let toggle_path = match toggle_path {
            Some(path) => path,
            None => udev::find_device(&discovered, "volume-down", |r| r.volume_down)?,
        };
        let orientation_path = match orientation_path {
            Some(path) => Some(path),
            None => match udev::find_device(&discovered, "volume-up", |r| r.volume_up) {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("Orientation key unavailable: {e}");
                    None
                }
            },
        };

        // Touchscreen
        let mut touch = EventDevice::open(&touch_path)?;
        let (x_axis, y_axis) = touch.touch_axes()?;
        let (x_axis, y_axis) = config.touch_axes(x_axis, y_axis);
        touch.grab()?;
        log::info!("Using touchscreen '{}' ({x_axis:?}, {y_axis:?})", touch.name());

        // Volume keys
        let mut key_devices = vec![];
        let mut toggle = EventDevice::open(&toggle_path)?;
        toggle.grab()?;
        key_devices.push(toggle);
        if let Some(path) = orientation_path.filter(|p| *p != toggle_path) {
            let mut device = EventDevice::open(&path)?;
            device.grab()?;
            key_devices.push(device);
        }

        let (vendor_id, product_id) = config.virtual_device_ids();
        let sink = VirtualInputDevice::new(&config.virtual_device_name(), vendor_id, product_id)?;

        let (width, height) = config.screen_size();
        let mut options = config.overlay_options();
        if overrides.landscape {
            options.orientation = Orientation::Landscape;
        }
        let overlay = Overlay::new(Screen::new(width, height), x_axis, y_axis, options);

        Ok(Self {
            overlay,
            touch,
            key_devices,
            sink,
            surface: LogSurface::default(),
            hotkeys: Hotkeys::new(config.long_press()),
            visible: true,
        })
    }

    /// Run until interrupted
    pub async fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let mut interval = interval(Duration::from_millis(POLL_INTERVAL_MS));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        log::info!("Overlay running");
        let result = loop {
            let deadline = self.hotkeys.deadline();
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.poll() {
                        break Err(e);
                    }
                },
                // Fire a long press as soon as it is reached
                _ = wait_until(deadline) => self.poll_hotkey_timer(),
                result = &mut ctrl_c => {
                    log::info!("Shutting down");
                    break result.map_err(|e| Box::new(e) as Box<dyn Error>);
                },
            }
        };
        self.shutdown();

        result
    }

    /// Read all devices and run one frame
    fn poll(&mut self) -> Result<(), Box<dyn Error>> {
        let mut key_events = vec![];
        for device in self.key_devices.iter_mut() {
            key_events.extend(device.poll()?);
        }
        for event in key_events {
            let EventSummary::Key(_, key, value) = event.destructure() else {
                continue;
            };
            if let Some(action) = self.hotkeys.handle_key(key, value, self.visible, Instant::now())
            {
                self.apply(action)?;
            }
        }
        self.poll_hotkey_timer();

        // Touch input is drained while hidden so nothing stale is replayed,
        // but slot selection is still followed
        let touch_events = self.touch.poll()?;
        for event in touch_events {
            let Some(event) = TouchEvent::from_evdev(&event) else {
                continue;
            };
            if self.visible {
                self.overlay.handle_touch_event(event);
            } else {
                self.overlay.follow_touch_event(event);
            }
        }
        if !self.visible {
            return Ok(());
        }
        self.overlay.frame(&mut self.sink);
        self.surface.present(&self.overlay.scene());

        Ok(())
    }

    fn poll_hotkey_timer(&mut self) {
        if let Some(action) = self.hotkeys.poll(Instant::now()) {
            if let Err(e) = self.apply(action) {
                log::error!("Failed to handle {action:?}: {e}");
            }
        }
    }

    fn apply(&mut self, action: HotkeyAction) -> Result<(), Box<dyn Error>> {
        log::debug!("Hotkey action: {action:?}");
        match action {
            HotkeyAction::Forward(key, pressed) => self.emit(|sink| sink.emit_key(key, pressed)),
            HotkeyAction::Tap(key) => {
                self.emit(|sink| sink.emit_key(key, true));
                self.emit(|sink| sink.emit_key(key, false));
            }
            HotkeyAction::ToggleOverlay => self.toggle_overlay()?,
            HotkeyAction::ToggleOrientation => {
                let landscape = self.overlay.orientation() != Orientation::Landscape;
                self.overlay.set_landscape(landscape);
            }
        }
        Ok(())
    }

    fn emit<F>(&mut self, write: F)
    where
        F: FnOnce(&mut VirtualInputDevice) -> Result<(), crate::input::target::DeviceError>,
    {
        if let Err(e) = write(&mut self.sink) {
            log::error!("Failed to forward key: {e}");
        }
    }

    /// Show or hide the overlay. Hiding hands the touchscreen back to the
    /// system and releases every key the overlay is holding.
    fn toggle_overlay(&mut self) -> Result<(), Box<dyn Error>> {
        self.visible = !self.visible;
        log::info!("Overlay {}", if self.visible { "shown" } else { "hidden" });
        self.overlay.reset();
        if self.visible {
            self.touch.grab()?;
        } else {
            self.touch.ungrab()?;
            self.overlay.flush(&mut self.sink);
            self.surface.clear();
        }
        Ok(())
    }

    /// Release everything held and give all devices back to the system
    fn shutdown(&mut self) {
        self.overlay.reset();
        self.overlay.flush(&mut self.sink);
        self.surface.clear();
        if let Err(e) = self.touch.ungrab() {
            log::warn!("Failed to release touchscreen: {e}");
        }
        for device in self.key_devices.iter_mut() {
            if let Err(e) = device.ungrab() {
                log::warn!("Failed to release {}: {e}", device.name());
            }
        }
    }
}

/// Sleep until the given instant, or forever if there is none
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}
