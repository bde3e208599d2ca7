//! The touch arbitration engine. [Overlay] owns every piece of mutable
//! overlay state: touch slots, widgets, the modal UI state, any edit
//! gesture and the output event queue.

#[cfg(test)]
pub mod overlay_test;

pub mod edit;
pub mod geometry;
pub mod layout;
pub mod router;
pub mod scene;
pub mod state;
pub mod synth;
pub mod widget;

use crate::input::{
    keys::MAPPABLE_KEYS,
    target::InputSink,
    touch::{AxisRange, Orientation, TouchEvent, TouchSlot, TouchSlotTracker, MAX_SLOTS},
};

use self::{
    edit::{EditGeometryController, EditState},
    geometry::Screen,
    layout::GridLayout,
    state::{AppState, StateMachine},
    synth::InputSynthesizer,
    widget::WidgetRegistry,
};

/// Tunables for the overlay engine
#[derive(Debug, Clone, Copy)]
pub struct OverlayOptions {
    /// Pointer pixels per touch pixel in trackpad mode
    pub trackpad_sensitivity: f32,
    pub orientation: Orientation,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            trackpad_sensitivity: 1.0,
            orientation: Orientation::Portrait,
        }
    }
}

/// Simulation context for the overlay
#[derive(Debug)]
pub struct Overlay {
    screen: Screen,
    tracker: TouchSlotTracker,
    widgets: WidgetRegistry,
    machine: StateMachine,
    edit: EditGeometryController,
    synth: InputSynthesizer,
    key_grid: GridLayout,
}

impl Overlay {
    pub fn new(
        screen: Screen,
        x_axis: AxisRange,
        y_axis: AxisRange,
        options: OverlayOptions,
    ) -> Self {
        let mut tracker = TouchSlotTracker::new(x_axis, y_axis);
        tracker.set_orientation(options.orientation);
        Self {
            screen,
            tracker,
            widgets: WidgetRegistry::default(),
            machine: StateMachine::default(),
            edit: EditGeometryController::default(),
            synth: InputSynthesizer::new(options.trackpad_sensitivity),
            key_grid: layout::key_grid(screen, MAPPABLE_KEYS.len()),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Update the surface size. Widget geometry follows on the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Overlay resized to {width}x{height}");
        self.screen = Screen::new(width, height);
        self.key_grid = layout::key_grid(self.screen, MAPPABLE_KEYS.len());
    }

    pub fn orientation(&self) -> Orientation {
        self.tracker.orientation()
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        log::info!("Touch orientation set to {orientation:?}");
        self.tracker.set_orientation(orientation);
    }

    pub fn set_landscape(&mut self, landscape: bool) {
        let orientation = if landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        self.set_orientation(orientation);
    }

    pub fn state(&self) -> AppState {
        self.machine.state()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.widgets
    }

    pub fn edit_state(&self) -> Option<&EditState> {
        self.edit.gesture()
    }

    pub fn key_grid(&self) -> &GridLayout {
        &self.key_grid
    }

    pub fn slots(&self) -> &[TouchSlot; MAX_SLOTS] {
        self.tracker.slots()
    }

    pub fn synthesizer(&self) -> &InputSynthesizer {
        &self.synth
    }

    /// Feed one decoded touch event. Slot changes are routed at the end of
    /// each batch.
    pub fn handle_touch_event(&mut self, event: TouchEvent) {
        if self.tracker.ingest(event, self.screen) {
            self.route_batch();
        }
    }

    /// Feed one touch event while the overlay is hidden. Only slot selection
    /// is followed; contacts are not tracked or routed.
    pub fn follow_touch_event(&mut self, event: TouchEvent) {
        self.tracker.follow_slot(event);
    }

    /// Run one frame: refresh widget geometry, run the widget algorithms
    /// while running, edge-detect analog directions and flush all queued
    /// events to the sink.
    pub fn frame(&mut self, sink: &mut dyn InputSink) {
        self.widgets.update_geometry(self.screen);
        if self.machine.state() == AppState::Running {
            let slots = self.tracker.slots();
            let events = self.synth.queue_mut();
            for widget in self.widgets.iter_mut() {
                widget.process(slots, events);
            }
        }
        self.synth.update_analog(&mut self.widgets, self.tracker.slots());
        self.synth.flush(sink);
    }

    /// Deliver queued events without running a frame
    pub fn flush(&mut self, sink: &mut dyn InputSink) {
        self.synth.flush(sink);
    }

    /// Drop all transient touch, gesture and menu state and queue the
    /// release of every held key. Used when the overlay is hidden so no
    /// contact keeps ownership across the hidden period.
    pub fn reset(&mut self) {
        log::debug!("Resetting transient overlay state");
        for widget in self.widgets.iter_mut() {
            self.synth.release_widget(widget);
            widget.controlling_finger = None;
            widget.output = geometry::Vec2::ZERO;
        }
        self.tracker.reset();
        self.synth.reset_trackpad();
        self.edit.clear();
        self.machine.deselect();
        self.machine.clear_remap();
        if self.machine.state().is_menu() {
            self.machine.transition(AppState::EditMode);
        }
    }
}
