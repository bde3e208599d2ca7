//! Routes every contact to exactly one owner. Contact-down is classified by
//! the chrome buttons first, then by a handler for the current [AppState];
//! motion and lift are forwarded to whatever claimed the contact.

use crate::input::{
    keys::MAPPABLE_KEYS,
    touch::{SlotMode, MAX_SLOTS},
};

use super::{
    edit::{EditAction, EditState},
    geometry::Vec2,
    layout::{self, Chrome},
    state::AppState,
    widget::{Direction, WidgetType},
    Overlay,
};

/// Normalized center of newly created widgets
const NEW_WIDGET_CENTER: Vec2 = Vec2::new(0.5, 0.5);
/// Normalized half-size of newly created widgets
const NEW_WIDGET_HALF_SIZE: f32 = 0.1;

/// Entries of the widget properties menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAction {
    Remap,
    Delete,
}

impl PropertyAction {
    pub const ALL: [PropertyAction; 2] = [PropertyAction::Remap, PropertyAction::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            PropertyAction::Remap => "Remap",
            PropertyAction::Delete => "Delete",
        }
    }
}

/// Handles a new contact for one [AppState]
type DownHandler = fn(&mut Overlay, usize, Vec2);

impl Overlay {
    /// Returns the contact-down handler for the given state
    fn down_handler(state: AppState) -> DownHandler {
        match state {
            AppState::Running => Overlay::running_down,
            AppState::EditMode => Overlay::edit_down,
            AppState::MenuAddWidget => Overlay::add_menu_down,
            AppState::MenuWidgetProperties => Overlay::properties_menu_down,
            AppState::MenuRemapAction => Overlay::remap_action_down,
            AppState::MenuRemapKey => Overlay::remap_key_down,
        }
    }

    /// Route every slot that changed in the batch that just ended. Only the
    /// down edge of a contact is classified, so a contact held on a chrome
    /// button activates it once.
    pub(super) fn route_batch(&mut self) {
        for idx in 0..MAX_SLOTS {
            let Some(slot) = self.tracker.slot(idx).copied() else {
                continue;
            };
            match (slot.active, slot.was_active) {
                (true, false) => {
                    self.touch_down(idx, slot.position);
                    if let Some(slot) = self.tracker.slot_mut(idx) {
                        slot.was_active = true;
                    }
                }
                (true, true) => self.touch_motion(idx, slot.position),
                (false, true) => {
                    self.release_slot(idx, true);
                    if let Some(slot) = self.tracker.slot_mut(idx) {
                        slot.was_active = false;
                    }
                }
                (false, false) => (),
            }
        }
    }

    fn set_mode(&mut self, idx: usize, mode: SlotMode) {
        if let Some(slot) = self.tracker.slot_mut(idx) {
            slot.mode = mode;
        }
    }

    fn mode(&self, idx: usize) -> SlotMode {
        self.tracker.slot(idx).map(|s| s.mode).unwrap_or_default()
    }

    fn touch_down(&mut self, idx: usize, p: Vec2) {
        // The previous contact in this slot never lifted
        if self.mode(idx) != SlotMode::Idle {
            log::debug!("Slot {idx} went down again without lifting, releasing it first");
            self.release_slot(idx, false);
        }

        if self.chrome_down(idx, p) {
            self.set_mode(idx, SlotMode::WidgetControl);
            return;
        }

        let state = self.machine.state();
        Overlay::down_handler(state)(self, idx, p);

        // Any menu cancels back to edit mode on a tap that hit nothing
        if self.mode(idx) == SlotMode::Idle && self.machine.state().is_menu() {
            log::debug!("Touch outside menu, cancelling {:?}", self.machine.state());
            self.machine.cancel_to_edit();
            self.set_mode(idx, SlotMode::WidgetControl);
        }
    }

    /// Returns true if the contact was consumed by a chrome button
    fn chrome_down(&mut self, idx: usize, p: Vec2) -> bool {
        let Some(chrome) = Chrome::hit(p) else {
            return false;
        };

        let handled = match chrome {
            Chrome::Edit => self.edit_chrome(),
            Chrome::Add => self.add_chrome(),
            Chrome::Properties => self.properties_chrome(),
        };
        if handled {
            log::debug!("UI: {chrome:?} button pressed by slot {idx} at {p:?}");
        }

        handled
    }

    fn edit_chrome(&mut self) -> bool {
        match self.machine.state() {
            AppState::Running => self.machine.transition(AppState::EditMode),
            AppState::EditMode | AppState::MenuAddWidget | AppState::MenuWidgetProperties => {
                self.machine.deselect();
                self.edit.clear();
                self.machine.transition(AppState::Running);
            }
            AppState::MenuRemapAction | AppState::MenuRemapKey => {
                self.machine.clear_remap();
                self.machine.transition(AppState::MenuWidgetProperties);
            }
        }
        true
    }

    fn add_chrome(&mut self) -> bool {
        match self.machine.state() {
            AppState::EditMode => self.machine.transition(AppState::MenuAddWidget),
            AppState::MenuAddWidget => self.machine.transition(AppState::EditMode),
            _ => return false,
        }
        true
    }

    fn properties_chrome(&mut self) -> bool {
        match self.machine.state() {
            AppState::EditMode => {
                let selected = self.machine.selected();
                if !selected.is_some_and(|id| self.widgets.contains(id)) {
                    return false;
                }
                self.machine.transition(AppState::MenuWidgetProperties);
            }
            AppState::MenuWidgetProperties => self.machine.transition(AppState::EditMode),
            _ => return false,
        }
        true
    }

    fn running_down(&mut self, idx: usize, p: Vec2) {
        let Some(id) = self.widgets.hit(p) else {
            log::debug!("Trackpad START for slot {idx}");
            self.set_mode(idx, SlotMode::Trackpad);
            self.synth.start_trackpad(idx, p);
            return;
        };

        log::debug!("Widget control START for widget {id} by slot {idx}");
        self.set_mode(idx, SlotMode::WidgetControl);
        let slots = self.tracker.slots();
        let events = self.synth.queue_mut();
        if let Some(widget) = self.widgets.get_mut(id) {
            if let Some(previous) = widget.controlling_finger.replace(idx) {
                log::debug!("Widget {id} taken over from slot {previous}");
            }
            widget.process(slots, events);
        }
    }

    fn edit_down(&mut self, idx: usize, p: Vec2) {
        let Some(id) = self.widgets.hit_topmost(p) else {
            log::debug!("Touch in edit mode on background (slot {idx}), deselecting");
            self.machine.deselect();
            return;
        };
        let Some(widget) = self.widgets.get(id) else {
            return;
        };

        let action = if self.machine.selected() == Some(id) && widget.resize_handle().contains(p)
        {
            EditAction::Resize
        } else {
            EditAction::Move
        };
        self.edit.begin(EditState::new(idx, widget, action, p));
        self.machine.select(id);
        self.set_mode(idx, SlotMode::WidgetControl);
    }

    fn add_menu_down(&mut self, idx: usize, p: Vec2) {
        let Some(row) = layout::menu_hit(self.screen, WidgetType::ALL.len(), p) else {
            return;
        };
        let widget_type = WidgetType::ALL[row];
        log::debug!("Add menu: '{}' selected", widget_type.label());
        self.widgets.create(
            widget_type,
            NEW_WIDGET_CENTER,
            NEW_WIDGET_HALF_SIZE,
            self.screen,
        );
        self.machine.transition(AppState::EditMode);
        self.set_mode(idx, SlotMode::WidgetControl);
    }

    fn properties_menu_down(&mut self, idx: usize, p: Vec2) {
        let Some(row) = layout::menu_hit(self.screen, PropertyAction::ALL.len(), p) else {
            return;
        };
        let action = PropertyAction::ALL[row];
        let selected = self.machine.selected();
        log::debug!("Properties menu: '{}' selected for {selected:?}", action.label());
        self.set_mode(idx, SlotMode::WidgetControl);

        match action {
            PropertyAction::Delete => {
                if let Some(mut widget) = selected.and_then(|id| self.widgets.remove(id)) {
                    self.synth.release_widget(&mut widget);
                    if self.edit.gesture().is_some_and(|g| g.widget == widget.id()) {
                        self.edit.clear();
                    }
                }
                self.machine.deselect();
                self.machine.transition(AppState::EditMode);
            }
            PropertyAction::Remap => {
                let Some(widget) = selected.and_then(|id| self.widgets.get(id)) else {
                    return;
                };
                let (id, analog) = (widget.id(), widget.is_analog());
                if analog {
                    self.machine.begin_remap(id, Some(Direction::Up));
                    self.machine.transition(AppState::MenuRemapAction);
                } else {
                    self.machine.begin_remap(id, None);
                    self.machine.transition(AppState::MenuRemapKey);
                }
            }
        }
    }

    fn remap_action_down(&mut self, idx: usize, p: Vec2) {
        let Some(row) = layout::menu_hit(self.screen, Direction::ALL.len(), p) else {
            return;
        };
        let direction = Direction::ALL[row];
        log::debug!("Remap action: picked '{}'", direction.label());
        self.machine.set_remap_action(direction);
        self.machine.transition(AppState::MenuRemapKey);
        self.set_mode(idx, SlotMode::WidgetControl);
    }

    fn remap_key_down(&mut self, idx: usize, p: Vec2) {
        let Some(cell) = self.key_grid.hit(p, MAPPABLE_KEYS.len()) else {
            return;
        };
        let key = MAPPABLE_KEYS[cell];
        log::debug!("Key selection: hit '{}'", key.label);

        if let Some(remap) = self.machine.remap() {
            if let Some(widget) = self.widgets.get_mut(remap.widget) {
                // Release under the old mapping so nothing stays stuck down
                self.synth.release_widget(widget);
                widget.remap(remap.action, key);
            }
        }
        self.machine.clear_remap();
        self.machine.transition(AppState::EditMode);
        self.set_mode(idx, SlotMode::WidgetControl);
    }

    fn touch_motion(&mut self, idx: usize, p: Vec2) {
        match self.mode(idx) {
            SlotMode::WidgetControl => {
                // Widget deflection is recomputed per frame from ownership
                if self.machine.state() == AppState::EditMode && self.edit.is_owned_by(idx) {
                    self.edit.update(p, &mut self.widgets, self.screen);
                }
            }
            SlotMode::Trackpad => {
                if self.machine.state() == AppState::Running {
                    self.synth.trackpad_motion(idx, p);
                }
            }
            SlotMode::Idle => (),
        }
    }

    /// Clean up after the contact in the given slot ended. A trackpad contact
    /// that never moved clicks when `allow_click` is set.
    fn release_slot(&mut self, idx: usize, allow_click: bool) {
        self.edit.clear_if_owned(idx);

        if let Some(id) = self.widgets.owned_by(idx) {
            log::debug!("Releasing finger from widget {id} (slot {idx})");
            if let Some(widget) = self.widgets.get_mut(id) {
                widget.controlling_finger = None;
                widget.output = Vec2::ZERO;
                self.synth.release_widget(widget);
            }
        }

        if self.mode(idx) == SlotMode::Trackpad {
            if allow_click && self.machine.state() == AppState::Running {
                self.synth.trackpad_release(idx);
            } else {
                self.synth.cancel_trackpad(idx);
            }
        }
        self.set_mode(idx, SlotMode::Idle);
    }
}
