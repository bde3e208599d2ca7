use super::{
    geometry::{Screen, Vec2},
    widget::{Widget, WidgetId, WidgetRegistry},
};

/// Start distances shorter than this make the resize ratio meaningless
const MIN_START_DISTANCE: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Move,
    Resize,
}

/// Anchor of an in-progress move or resize gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditState {
    /// Slot of the contact driving the gesture
    pub slot: usize,
    pub widget: WidgetId,
    pub action: EditAction,
    pub start_touch: Vec2,
    /// Absolute center when the gesture started
    pub start_center: Vec2,
    /// Normalized half-size when the gesture started
    pub start_half_size: f32,
    pub start_distance: f32,
}

impl EditState {
    pub fn new(slot: usize, widget: &Widget, action: EditAction, touch: Vec2) -> Self {
        Self {
            slot,
            widget: widget.id(),
            action,
            start_touch: touch,
            start_center: widget.center(),
            start_half_size: widget.norm_half_size,
            start_distance: touch.distance(widget.center()),
        }
    }
}

/// Converts move/resize gestures into normalized widget geometry
#[derive(Debug, Default)]
pub struct EditGeometryController {
    gesture: Option<EditState>,
}

impl EditGeometryController {
    pub fn begin(&mut self, state: EditState) {
        log::debug!(
            "Edit: start {:?} for widget {} with slot {}",
            state.action,
            state.widget,
            state.slot
        );
        self.gesture = Some(state);
    }

    pub fn gesture(&self) -> Option<&EditState> {
        self.gesture.as_ref()
    }

    pub fn is_owned_by(&self, slot: usize) -> bool {
        self.gesture.is_some_and(|g| g.slot == slot)
    }

    pub fn clear(&mut self) {
        self.gesture = None;
    }

    /// End the gesture if the given slot is driving it
    pub fn clear_if_owned(&mut self, slot: usize) {
        if self.is_owned_by(slot) {
            log::debug!("Slot {slot} released, resetting edit state");
            self.gesture = None;
        }
    }

    /// Apply the contact's current position to the gesture target. Returns
    /// false if there is no gesture, or its widget no longer exists (in which
    /// case the gesture is dropped).
    pub fn update(&mut self, touch: Vec2, widgets: &mut WidgetRegistry, screen: Screen) -> bool {
        let Some(gesture) = self.gesture else {
            return false;
        };
        let Some(widget) = widgets.get_mut(gesture.widget) else {
            log::debug!("Edit target {} no longer exists", gesture.widget);
            self.gesture = None;
            return false;
        };

        match gesture.action {
            EditAction::Move => {
                let center = gesture.start_center + (touch - gesture.start_touch);
                widget.norm_center = screen.normalize(center);
            }
            EditAction::Resize => {
                let distance = touch.distance(widget.center());
                let ratio = if gesture.start_distance > MIN_START_DISTANCE {
                    distance / gesture.start_distance
                } else {
                    1.0
                };
                widget.norm_half_size = gesture.start_half_size * ratio;
                if widget.norm_half_size > 0.5 {
                    log::debug!(
                        "Widget {} half-size {} exceeds half the screen",
                        widget.id(),
                        widget.norm_half_size
                    );
                }
            }
        }
        widget.clamp_to_screen(screen);

        true
    }
}
