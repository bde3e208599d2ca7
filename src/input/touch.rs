//! Multi-touch slot tracking for type B touchscreens.
//! https://www.kernel.org/doc/Documentation/input/multi-touch-protocol.txt

#[cfg(test)]
#[path = "touch_test.rs"]
pub mod touch_test;

use evdev::{AbsInfo, AbsoluteAxisCode, EventSummary, InputEvent, SynchronizationCode};

use crate::overlay::geometry::{Screen, Vec2};

/// Maximum number of simultaneous contacts that are tracked
pub const MAX_SLOTS: usize = 10;

/// Orientation of the overlay relative to the touchscreen panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl From<&str> for Orientation {
    fn from(value: &str) -> Self {
        match value {
            "landscape" | "left" | "right" => Self::Landscape,
            _ => Self::Portrait,
        }
    }
}

/// What a contact is currently doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotMode {
    #[default]
    Idle,
    /// Owns a widget, or was consumed by chrome, menu or edit input
    WidgetControl,
    /// Drives relative pointer motion
    Trackpad,
}

/// State of a single touch slot
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchSlot {
    pub active: bool,
    /// Whether the router has already seen this contact go down
    pub was_active: bool,
    /// Position in screen pixels
    pub position: Vec2,
    pub mode: SlotMode,
    orientation: Orientation,
}

/// Decoded multi-touch event relevant to slot tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    Slot(i32),
    TrackingId(i32),
    PositionX(i32),
    PositionY(i32),
    /// SYN_REPORT, the end of a batch of events
    Report,
}

impl TouchEvent {
    /// Decode the given evdev event. Events that do not take part in slot
    /// tracking return [None].
    pub fn from_evdev(event: &InputEvent) -> Option<Self> {
        match event.destructure() {
            EventSummary::Synchronization(_, SynchronizationCode::SYN_REPORT, _) => {
                Some(Self::Report)
            }
            EventSummary::AbsoluteAxis(_, AbsoluteAxisCode::ABS_MT_SLOT, value) => {
                Some(Self::Slot(value))
            }
            EventSummary::AbsoluteAxis(_, AbsoluteAxisCode::ABS_MT_TRACKING_ID, value) => {
                Some(Self::TrackingId(value))
            }
            EventSummary::AbsoluteAxis(_, AbsoluteAxisCode::ABS_MT_POSITION_X, value) => {
                Some(Self::PositionX(value))
            }
            EventSummary::AbsoluteAxis(_, AbsoluteAxisCode::ABS_MT_POSITION_Y, value) => {
                Some(Self::PositionY(value))
            }
            _ => None,
        }
    }
}

/// Raw value range advertised by the touchscreen for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    fn span(&self) -> Option<f32> {
        (self.max > self.min).then(|| (self.max - self.min) as f32)
    }

    /// Scale a raw value into `0..extent`
    fn scale(&self, value: i32, extent: f32) -> f32 {
        self.span()
            .map(|span| (value - self.min) as f32 / span * extent)
            .unwrap_or(0.0)
    }

    /// Scale a raw value into `0..extent` with the axis mirrored
    fn scale_mirrored(&self, value: i32, extent: f32) -> f32 {
        self.span()
            .map(|span| (self.max - value) as f32 / span * extent)
            .unwrap_or(0.0)
    }
}

impl From<AbsInfo> for AxisRange {
    fn from(info: AbsInfo) -> Self {
        Self::new(info.minimum(), info.maximum())
    }
}

/// Decodes the multiplexed multi-touch stream into a fixed table of slots.
/// Positions are converted to screen pixels as they arrive so that the
/// table is an authoritative snapshot at every SYN_REPORT.
#[derive(Debug)]
pub struct TouchSlotTracker {
    slots: [TouchSlot; MAX_SLOTS],
    /// Slot that position events currently apply to. [None] after a
    /// malformed slot index until the next valid one arrives.
    current: Option<usize>,
    x_axis: AxisRange,
    y_axis: AxisRange,
    orientation: Orientation,
}

impl TouchSlotTracker {
    pub fn new(x_axis: AxisRange, y_axis: AxisRange) -> Self {
        Self {
            slots: Default::default(),
            current: Some(0),
            x_axis,
            y_axis,
            orientation: Orientation::default(),
        }
    }

    /// Orientation applied to contacts that start from now on. Contacts
    /// already in progress keep the orientation they started with.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn slots(&self) -> &[TouchSlot; MAX_SLOTS] {
        &self.slots
    }

    pub fn slot(&self, idx: usize) -> Option<&TouchSlot> {
        self.slots.get(idx)
    }

    pub fn slot_mut(&mut self, idx: usize) -> Option<&mut TouchSlot> {
        self.slots.get_mut(idx)
    }

    /// Forget all contacts. The selected slot is kept since the device only
    /// reports it again when it changes.
    pub fn reset(&mut self) {
        self.slots = Default::default();
    }

    /// Follow slot selection without touching any slot state. Used while
    /// contacts are not being tracked so the selected slot stays in sync
    /// with the device.
    pub fn follow_slot(&mut self, event: TouchEvent) {
        if let TouchEvent::Slot(_) = event {
            self.ingest(event, Screen::new(0, 0));
        }
    }

    /// Update slot state from the given event. Returns true when the event
    /// ends a batch and the slot table should be routed.
    pub fn ingest(&mut self, event: TouchEvent, screen: Screen) -> bool {
        log::trace!("Received touch event: {event:?}");
        match event {
            TouchEvent::Report => return true,
            TouchEvent::Slot(value) => {
                // Devices may number slots beyond the table size
                self.current = usize::try_from(value).ok().map(|v| v % MAX_SLOTS);
                if self.current.is_none() {
                    log::debug!("Discarding events for invalid slot index {value}");
                }
            }
            TouchEvent::TrackingId(id) => {
                let orientation = self.orientation;
                let Some(slot) = self.current_slot() else {
                    return false;
                };
                if id >= 0 {
                    slot.active = true;
                    slot.was_active = false;
                    slot.orientation = orientation;
                } else {
                    slot.active = false;
                }
            }
            TouchEvent::PositionX(value) => {
                let x_axis = self.x_axis;
                let Some(slot) = self.current_slot() else {
                    return false;
                };
                match slot.orientation {
                    Orientation::Portrait => {
                        slot.position.x = x_axis.scale(value, screen.width);
                    }
                    Orientation::Landscape => {
                        slot.position.y = x_axis.scale_mirrored(value, screen.height);
                    }
                }
            }
            TouchEvent::PositionY(value) => {
                let y_axis = self.y_axis;
                let Some(slot) = self.current_slot() else {
                    return false;
                };
                match slot.orientation {
                    Orientation::Portrait => {
                        slot.position.y = y_axis.scale(value, screen.height);
                    }
                    Orientation::Landscape => {
                        slot.position.x = y_axis.scale(value, screen.width);
                    }
                }
            }
        }

        false
    }

    fn current_slot(&mut self) -> Option<&mut TouchSlot> {
        let idx = self.current?;
        self.slots.get_mut(idx)
    }
}
