use std::fmt::Display;

use evdev::KeyCode;

use crate::input::{
    keys::{self, MappableKey},
    touch::TouchSlot,
};

use super::{
    geometry::{Rect, Screen, Vec2},
    layout::HANDLE_SIZE,
    synth::{EventQueue, EventSource, KeyState},
};

/// Maximum number of widgets on the overlay
pub const MAX_WIDGETS: usize = 15;

/// Fraction of the radius a DPad contact must travel before a direction
/// registers
const DPAD_DEADZONE: f32 = 0.1;

/// Radii below this are treated as zero to avoid dividing by nothing
const MIN_RADIUS: f32 = 1e-5;

/// Stable widget identifier. Ids are handed out in increasing order and
/// never reused, so an id held across a deletion simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u32);

impl Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of an analog widget action, in mapping order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

/// The kinds of widget that can be placed on the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetType {
    Joystick,
    DPad,
    Button,
}

impl WidgetType {
    /// Order of the entries in the add widget menu
    pub const ALL: [WidgetType; 3] = [WidgetType::Joystick, WidgetType::DPad, WidgetType::Button];

    pub fn label(&self) -> &'static str {
        match self {
            WidgetType::Joystick => "Joystick",
            WidgetType::DPad => "DPad",
            WidgetType::Button => "Button",
        }
    }
}

/// Key mapping of a Joystick or DPad, one key per [Direction]
#[derive(Debug, Clone, PartialEq)]
pub struct AnalogMapping {
    pub keys: [MappableKey; 4],
    /// Direction state reported on the previous frame
    pub held: [bool; 4],
}

impl Default for AnalogMapping {
    fn default() -> Self {
        Self {
            keys: [
                keys::builtin(KeyCode::KEY_W),
                keys::builtin(KeyCode::KEY_S),
                keys::builtin(KeyCode::KEY_A),
                keys::builtin(KeyCode::KEY_D),
            ],
            held: [false; 4],
        }
    }
}

impl AnalogMapping {
    pub fn key(&self, direction: Direction) -> MappableKey {
        self.keys[direction.index()]
    }
}

/// Key mapping and press state of a Button
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonMapping {
    pub key: MappableKey,
    pub pressed: bool,
}

impl Default for ButtonMapping {
    fn default() -> Self {
        Self {
            key: keys::builtin(KeyCode::KEY_E),
            pressed: false,
        }
    }
}

/// Type-specific widget data
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Joystick(AnalogMapping),
    DPad(AnalogMapping),
    Button(ButtonMapping),
}

impl WidgetKind {
    fn new(widget_type: WidgetType) -> Self {
        match widget_type {
            WidgetType::Joystick => Self::Joystick(AnalogMapping::default()),
            WidgetType::DPad => Self::DPad(AnalogMapping::default()),
            WidgetType::Button => Self::Button(ButtonMapping::default()),
        }
    }

    pub fn widget_type(&self) -> WidgetType {
        match self {
            WidgetKind::Joystick(_) => WidgetType::Joystick,
            WidgetKind::DPad(_) => WidgetType::DPad,
            WidgetKind::Button(_) => WidgetType::Button,
        }
    }
}

/// A user-placed control on the overlay
#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    pub kind: WidgetKind,
    /// Center in normalized screen coordinates
    pub norm_center: Vec2,
    /// Half of the side length, relative to the smaller screen dimension
    pub norm_half_size: f32,
    center: Vec2,
    radius: f32,
    bounds: Rect,
    /// Slot of the contact operating this widget
    pub controlling_finger: Option<usize>,
    /// Deflection in [-1,1] on both axes
    pub output: Vec2,
}

impl Widget {
    fn new(id: WidgetId, widget_type: WidgetType, norm_center: Vec2, norm_half_size: f32) -> Self {
        Self {
            id,
            kind: WidgetKind::new(widget_type),
            norm_center,
            norm_half_size,
            center: Vec2::ZERO,
            radius: 0.0,
            bounds: Rect::default(),
            controlling_finger: None,
            output: Vec2::ZERO,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn widget_type(&self) -> WidgetType {
        self.kind.widget_type()
    }

    /// Absolute center in screen pixels
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Absolute half side length in screen pixels
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Absolute bounding square used for hit testing
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The resize handle at the bottom-right corner of the bounds
    pub fn resize_handle(&self) -> Rect {
        Rect::new(
            self.bounds.right() - HANDLE_SIZE,
            self.bounds.bottom() - HANDLE_SIZE,
            HANDLE_SIZE,
            HANDLE_SIZE,
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.bounds.contains(p)
    }

    pub fn is_analog(&self) -> bool {
        self.analog().is_some()
    }

    pub fn analog(&self) -> Option<&AnalogMapping> {
        match &self.kind {
            WidgetKind::Joystick(m) | WidgetKind::DPad(m) => Some(m),
            WidgetKind::Button(_) => None,
        }
    }

    pub fn analog_mut(&mut self) -> Option<&mut AnalogMapping> {
        match &mut self.kind {
            WidgetKind::Joystick(m) | WidgetKind::DPad(m) => Some(m),
            WidgetKind::Button(_) => None,
        }
    }

    pub fn button(&self) -> Option<&ButtonMapping> {
        match &self.kind {
            WidgetKind::Button(b) => Some(b),
            _ => None,
        }
    }

    pub fn button_mut(&mut self) -> Option<&mut ButtonMapping> {
        match &mut self.kind {
            WidgetKind::Button(b) => Some(b),
            _ => None,
        }
    }

    /// Whether the widget is drawn as engaged
    pub fn is_pressed(&self) -> bool {
        match &self.kind {
            WidgetKind::Button(b) => b.pressed,
            _ => self.controlling_finger.is_some(),
        }
    }

    /// Labels of the mapped keys (one for buttons, four for analog widgets)
    pub fn labels(&self) -> Vec<&'static str> {
        match &self.kind {
            WidgetKind::Joystick(m) | WidgetKind::DPad(m) => {
                m.keys.iter().map(|k| k.label).collect()
            }
            WidgetKind::Button(b) => vec![b.key.label],
        }
    }

    /// Assign a key. Analog widgets need the direction to remap; buttons
    /// ignore it.
    pub fn remap(&mut self, direction: Option<Direction>, key: MappableKey) {
        match &mut self.kind {
            WidgetKind::Button(b) => b.key = key,
            WidgetKind::Joystick(m) | WidgetKind::DPad(m) => {
                let Some(direction) = direction else {
                    log::warn!("No direction given to remap analog widget {}", self.id);
                    return;
                };
                m.keys[direction.index()] = key;
            }
        }
    }

    /// Recompute the absolute geometry from the normalized layout
    pub fn update_geometry(&mut self, screen: Screen) {
        self.center = screen.denormalize(self.norm_center);
        self.radius = self.norm_half_size * screen.min_dim();
        self.bounds = Rect::square(self.center, self.radius);
    }

    /// Keep the center on screen and recompute the absolute geometry
    pub fn clamp_to_screen(&mut self, screen: Screen) {
        self.norm_center = self.norm_center.clamp(0.0, 1.0);
        self.update_geometry(screen);
    }

    /// Run the per-frame algorithm for this widget's type
    pub fn process(&mut self, slots: &[TouchSlot], events: &mut EventQueue) {
        match self.kind {
            WidgetKind::Joystick(_) => self.process_joystick(slots),
            WidgetKind::DPad(_) => self.process_dpad(slots),
            WidgetKind::Button(_) => self.process_button(slots, events),
        }
    }

    /// Returns the position of the controlling contact if it is still down
    fn touch(&self, slots: &[TouchSlot]) -> Option<Vec2> {
        let slot = slots.get(self.controlling_finger?)?;
        slot.active.then_some(slot.position)
    }

    /// Drop ownership after the controlling contact disappeared
    fn lose_finger(&mut self) {
        if let Some(slot) = self.controlling_finger.take() {
            log::debug!(
                "{} {} lost finger slot {slot}, resetting",
                self.widget_type().label(),
                self.id
            );
        }
        self.output = Vec2::ZERO;
    }

    fn process_joystick(&mut self, slots: &[TouchSlot]) {
        let Some(touch) = self.touch(slots) else {
            self.lose_finger();
            return;
        };

        let delta = touch - self.center;
        let mut norm = if self.radius > MIN_RADIUS {
            delta / self.radius
        } else {
            Vec2::ZERO
        };
        let len_sq = norm.length_squared();
        if len_sq > 1.0 {
            norm = norm / len_sq.sqrt();
        }
        self.output = norm;
    }

    fn process_dpad(&mut self, slots: &[TouchSlot]) {
        let Some(touch) = self.touch(slots) else {
            self.lose_finger();
            return;
        };

        let delta = touch - self.center;
        let deadzone = DPAD_DEADZONE * self.radius;
        self.output = Vec2::ZERO;
        if delta.length_squared() <= deadzone * deadzone {
            return;
        }
        if delta.x.abs() > delta.y.abs() {
            self.output.x = delta.x.signum();
        } else {
            self.output.y = delta.y.signum();
        }
    }

    fn process_button(&mut self, slots: &[TouchSlot], events: &mut EventQueue) {
        let slot = self.controlling_finger;
        // Sliding off the button cancels the press without waiting for a lift
        let down = self.touch(slots).is_some_and(|p| self.contains(p));
        let id = self.id;
        let WidgetKind::Button(button) = &mut self.kind else {
            return;
        };

        if down && !button.pressed {
            log::debug!("Button {id} pressed by finger slot {slot:?}");
            button.pressed = true;
            events.push_key(EventSource::Widget(id), KeyState::Down, button.key.code);
        } else if !down && button.pressed {
            log::debug!("Button {id} released (finger slot {slot:?})");
            button.pressed = false;
            events.push_key(EventSource::Widget(id), KeyState::Up, button.key.code);
            self.controlling_finger = None;
        }
        self.output = Vec2::ZERO;
    }
}

/// Owns the widgets in registration order
#[derive(Debug)]
pub struct WidgetRegistry {
    widgets: Vec<Widget>,
    next_id: u32,
    capacity: usize,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_WIDGETS)
    }
}

impl WidgetRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            widgets: Vec::with_capacity(capacity),
            next_id: 1,
            capacity,
        }
    }

    /// Create a widget with the default mapping for its type. Returns [None]
    /// if the registry is full.
    pub fn create(
        &mut self,
        widget_type: WidgetType,
        norm_center: Vec2,
        norm_half_size: f32,
        screen: Screen,
    ) -> Option<WidgetId> {
        if self.widgets.len() >= self.capacity {
            log::info!("Cannot create widget: maximum of {} reached", self.capacity);
            return None;
        }

        let id = WidgetId(self.next_id);
        self.next_id += 1;
        let mut widget = Widget::new(id, widget_type, norm_center, norm_half_size);
        widget.update_geometry(screen);
        log::debug!("Creating {} widget ID {id}", widget_type.label());
        self.widgets.push(widget);

        Some(id)
    }

    /// Remove the widget with the given id, preserving the order of the rest
    pub fn remove(&mut self, id: WidgetId) -> Option<Widget> {
        let idx = self.widgets.iter().position(|w| w.id == id)?;
        log::debug!("Removing widget at index {idx} (ID: {id})");
        Some(self.widgets.remove(idx))
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.widgets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// First widget in registration order containing the point
    pub fn hit(&self, p: Vec2) -> Option<WidgetId> {
        self.widgets.iter().find(|w| w.contains(p)).map(|w| w.id)
    }

    /// Last (top-most drawn) widget containing the point
    pub fn hit_topmost(&self, p: Vec2) -> Option<WidgetId> {
        self.widgets.iter().rev().find(|w| w.contains(p)).map(|w| w.id)
    }

    /// Widget currently controlled by the given slot
    pub fn owned_by(&self, slot: usize) -> Option<WidgetId> {
        self.widgets
            .iter()
            .find(|w| w.controlling_finger == Some(slot))
            .map(|w| w.id)
    }

    pub fn update_geometry(&mut self, screen: Screen) {
        for widget in self.widgets.iter_mut() {
            widget.update_geometry(screen);
        }
    }
}
