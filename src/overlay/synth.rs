use evdev::KeyCode;

use crate::input::{
    target::InputSink,
    touch::{TouchSlot, MAX_SLOTS},
};

use super::{
    geometry::Vec2,
    widget::{Direction, Widget, WidgetId, WidgetRegistry},
};

/// Maximum number of events buffered between flushes
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// Output magnitude past which an analog direction counts as pressed
const DIRECTION_THRESHOLD: f32 = 0.5;

/// What produced a synthesized key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Widget(WidgetId),
    /// Tap-to-click from the trackpad contact in the given slot
    Trackpad(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// A synthesized key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub source: EventSource,
    pub state: KeyState,
    pub key: KeyCode,
}

/// Everything that can be queued for the virtual input sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Key(InputEvent),
    RelativeMove { dx: i32, dy: i32 },
}

/// Bounded FIFO of output events. Once full, further events are dropped
/// (and logged) until the next flush.
#[derive(Debug)]
pub struct EventQueue {
    events: Vec<OutputEvent>,
    capacity: usize,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }
}

impl EventQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue an event. Returns false if the queue was full and the event
    /// was dropped.
    pub fn push(&mut self, event: OutputEvent) -> bool {
        if self.events.len() >= self.capacity {
            log::warn!("Input event queue full! Dropping event: {event:?}");
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn push_key(&mut self, source: EventSource, state: KeyState, key: KeyCode) -> bool {
        self.push(OutputEvent::Key(InputEvent { source, state, key }))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputEvent> {
        self.events.iter()
    }

    /// Deliver all queued events to the sink in order, then clear the queue.
    /// Sink errors are logged; the queue is cleared either way.
    pub fn flush(&mut self, sink: &mut dyn InputSink) {
        for event in self.events.drain(..) {
            let result = match event {
                OutputEvent::Key(InputEvent { key, state, .. }) => {
                    sink.emit_key(key, state == KeyState::Down)
                }
                OutputEvent::RelativeMove { dx, dy } => sink.emit_relative_move(dx, dy),
            };
            if let Err(e) = result {
                log::error!("Failed to emit {event:?}: {e}");
            }
        }
    }
}

/// Sub-pixel motion accumulator for a single trackpad contact
#[derive(Debug, Clone, Copy, Default)]
struct PointerAccumulator {
    last: Vec2,
    remainder: Vec2,
    moved: bool,
}

impl PointerAccumulator {
    fn start(position: Vec2) -> Self {
        Self {
            last: position,
            ..Default::default()
        }
    }

    /// Advance to the given position. Returns the whole-pixel motion to emit,
    /// keeping the fractional part for the next update.
    fn advance(&mut self, position: Vec2, sensitivity: f32) -> Option<(i32, i32)> {
        let delta = position - self.last;
        if delta == Vec2::ZERO {
            return None;
        }
        self.last = position;
        self.remainder = self.remainder + delta * sensitivity;

        let dx = self.remainder.x.trunc();
        let dy = self.remainder.y.trunc();
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        self.remainder = self.remainder - Vec2::new(dx, dy);
        self.moved = true;
        Some((dx as i32, dy as i32))
    }
}

/// Turns widget state and trackpad motion into queued output events
#[derive(Debug)]
pub struct InputSynthesizer {
    queue: EventQueue,
    pointers: [PointerAccumulator; MAX_SLOTS],
    sensitivity: f32,
}

impl InputSynthesizer {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            queue: EventQueue::default(),
            pointers: Default::default(),
            sensitivity,
        }
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    /// Edge-detect the direction state of every analog widget and queue a
    /// Down or Up for each direction that changed since the last frame.
    /// Widgets without a live contact are forced back to released.
    pub fn update_analog(&mut self, widgets: &mut WidgetRegistry, slots: &[TouchSlot]) {
        for widget in widgets.iter_mut() {
            let engaged = widget
                .controlling_finger
                .and_then(|idx| slots.get(idx))
                .is_some_and(|slot| slot.active);
            let output = widget.output;
            let id = widget.id();
            let Some(mapping) = widget.analog_mut() else {
                continue;
            };

            for direction in Direction::ALL {
                let now = engaged && direction_pressed(output, direction);
                let held = &mut mapping.held[direction.index()];
                if now == *held {
                    continue;
                }
                *held = now;
                let state = if now { KeyState::Down } else { KeyState::Up };
                let key = mapping.keys[direction.index()].code;
                self.queue.push_key(EventSource::Widget(id), state, key);
            }
        }
    }

    /// Queue an Up for every key the widget currently holds down
    pub fn release_widget(&mut self, widget: &mut Widget) {
        let id = widget.id();
        if let Some(mapping) = widget.analog_mut() {
            for direction in Direction::ALL {
                let held = &mut mapping.held[direction.index()];
                if *held {
                    *held = false;
                    let key = mapping.keys[direction.index()].code;
                    self.queue.push_key(EventSource::Widget(id), KeyState::Up, key);
                }
            }
        } else if let Some(button) = widget.button_mut() {
            if button.pressed {
                button.pressed = false;
                let key = button.key.code;
                self.queue.push_key(EventSource::Widget(id), KeyState::Up, key);
            }
        }
    }

    /// Begin trackpad emulation for the contact in the given slot
    pub fn start_trackpad(&mut self, slot: usize, position: Vec2) {
        if let Some(pointer) = self.pointers.get_mut(slot) {
            *pointer = PointerAccumulator::start(position);
        }
    }

    /// Accumulate trackpad motion and queue any whole-pixel movement
    pub fn trackpad_motion(&mut self, slot: usize, position: Vec2) {
        let sensitivity = self.sensitivity;
        let Some(pointer) = self.pointers.get_mut(slot) else {
            return;
        };
        if let Some((dx, dy)) = pointer.advance(position, sensitivity) {
            self.queue.push(OutputEvent::RelativeMove { dx, dy });
        }
    }

    /// End trackpad emulation. A contact that never moved the pointer is a
    /// tap, which clicks the left mouse button.
    pub fn trackpad_release(&mut self, slot: usize) {
        let Some(pointer) = self.pointers.get_mut(slot) else {
            return;
        };
        if !pointer.moved {
            log::debug!("Trackpad click generated for slot {slot}");
            let source = EventSource::Trackpad(slot);
            self.queue.push_key(source, KeyState::Down, KeyCode::BTN_LEFT);
            self.queue.push_key(source, KeyState::Up, KeyCode::BTN_LEFT);
        }
        *pointer = PointerAccumulator::default();
    }

    /// End trackpad emulation for one contact without clicking
    pub fn cancel_trackpad(&mut self, slot: usize) {
        if let Some(pointer) = self.pointers.get_mut(slot) {
            *pointer = PointerAccumulator::default();
        }
    }

    /// Forget all trackpad contacts without clicking
    pub fn reset_trackpad(&mut self) {
        self.pointers = Default::default();
    }

    pub fn flush(&mut self, sink: &mut dyn InputSink) {
        self.queue.flush(sink);
    }
}

fn direction_pressed(output: Vec2, direction: Direction) -> bool {
    match direction {
        Direction::Up => output.y < -DIRECTION_THRESHOLD,
        Direction::Down => output.y > DIRECTION_THRESHOLD,
        Direction::Left => output.x < -DIRECTION_THRESHOLD,
        Direction::Right => output.x > DIRECTION_THRESHOLD,
    }
}
