use super::widget::{Direction, WidgetId};

/// Modal state of the overlay UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppState {
    /// Widgets are live and stray contacts drive the trackpad
    #[default]
    Running,
    /// Widgets can be selected, moved and resized
    EditMode,
    MenuAddWidget,
    MenuWidgetProperties,
    /// Choosing which direction of an analog widget to remap
    MenuRemapAction,
    /// Choosing the key to assign
    MenuRemapKey,
}

impl AppState {
    /// Whether a modal menu covers the overlay
    pub fn is_menu(&self) -> bool {
        !matches!(self, AppState::Running | AppState::EditMode)
    }
}

/// Widget (and for analog widgets, the direction) being remapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapTarget {
    pub widget: WidgetId,
    pub action: Option<Direction>,
}

/// Holds the current [AppState] together with the selection and remap
/// context that only make sense in particular states.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: AppState,
    selected: Option<WidgetId>,
    remap: Option<RemapTarget>,
}

impl StateMachine {
    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn selected(&self) -> Option<WidgetId> {
        self.selected
    }

    pub fn remap(&self) -> Option<RemapTarget> {
        self.remap
    }

    pub fn transition(&mut self, to: AppState) {
        if self.state == to {
            return;
        }
        log::debug!("AppState {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    pub fn select(&mut self, id: WidgetId) {
        if self.selected != Some(id) {
            log::debug!("Selecting widget {id} (deselecting {:?})", self.selected);
        }
        self.selected = Some(id);
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn begin_remap(&mut self, widget: WidgetId, action: Option<Direction>) {
        self.remap = Some(RemapTarget { widget, action });
    }

    pub fn set_remap_action(&mut self, action: Direction) {
        if let Some(remap) = self.remap.as_mut() {
            remap.action = Some(action);
        }
    }

    pub fn clear_remap(&mut self) {
        self.remap = None;
    }

    /// Leave any menu for edit mode, dropping remap context
    pub fn cancel_to_edit(&mut self) {
        self.clear_remap();
        self.transition(AppState::EditMode);
    }
}
