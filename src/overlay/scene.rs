//! Renderer-independent description of what the overlay shows. Every
//! rectangle comes from the same layout functions the router hit-tests
//! against.

use std::fmt::Write;

use crate::input::keys::MAPPABLE_KEYS;

use super::{
    geometry::{Rect, Vec2},
    layout::{self, Chrome},
    router::PropertyAction,
    state::AppState,
    widget::{Direction, WidgetId, WidgetType},
    Overlay,
};

/// A button along the top edge
#[derive(Debug, Clone, PartialEq)]
pub struct ChromeButton {
    pub kind: Chrome,
    pub rect: Rect,
    pub label: &'static str,
    /// Drawn highlighted because its mode or menu is open
    pub active: bool,
    /// Drawn greyed out because pressing it does nothing
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub id: WidgetId,
    pub widget_type: WidgetType,
    pub bounds: Rect,
    pub center: Vec2,
    pub radius: f32,
    pub labels: Vec<&'static str>,
    pub pressed: bool,
    /// Joystick knob deflection in [-1,1]
    pub output: Vec2,
    pub selected: bool,
    /// Present only for the selected widget in edit mode
    pub resize_handle: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub label: &'static str,
    pub rect: Rect,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub title: String,
    /// Where the title is drawn
    pub title_origin: Vec2,
    pub items: Vec<MenuItem>,
}

/// Everything needed to draw one frame of the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub state: AppState,
    pub chrome: Vec<ChromeButton>,
    pub widgets: Vec<WidgetView>,
    pub menu: Option<Menu>,
}

impl Scene {
    /// Short single-line summary used when tracing frames
    pub fn summary(&self) -> String {
        let mut out = format!("{:?}: {} widget(s)", self.state, self.widgets.len());
        let pressed: Vec<String> = self
            .widgets
            .iter()
            .filter(|w| w.pressed)
            .map(|w| w.id.to_string())
            .collect();
        if !pressed.is_empty() {
            let _ = write!(out, ", pressed [{}]", pressed.join(", "));
        }
        if let Some(menu) = self.menu.as_ref() {
            let _ = write!(out, ", menu '{}' ({} items)", menu.title, menu.items.len());
        }
        out
    }
}

/// Something that can draw a [Scene]
pub trait Surface {
    fn present(&mut self, scene: &Scene);
    /// Remove everything from the display, used while the overlay is hidden
    fn clear(&mut self);
}

/// [Surface] that traces scene changes to the log instead of drawing
#[derive(Debug, Default)]
pub struct LogSurface {
    last: Option<Scene>,
}

impl Surface for LogSurface {
    fn present(&mut self, scene: &Scene) {
        if self.last.as_ref() == Some(scene) {
            return;
        }
        log::trace!("Scene: {}", scene.summary());
        self.last = Some(scene.clone());
    }

    fn clear(&mut self) {
        if self.last.take().is_some() {
            log::trace!("Scene cleared");
        }
    }
}

impl Overlay {
    /// Describe the current frame
    pub fn scene(&self) -> Scene {
        let state = self.machine.state();
        let selected = self.machine.selected();
        let has_selection = selected.is_some_and(|id| self.widgets.contains(id));

        let chrome = Chrome::ALL
            .into_iter()
            .map(|kind| {
                let (label, active, disabled) = match kind {
                    Chrome::Edit => {
                        let label = match state {
                            AppState::Running => "Edit",
                            AppState::MenuRemapAction | AppState::MenuRemapKey => "Back",
                            _ => "Done",
                        };
                        (label, state != AppState::Running, false)
                    }
                    Chrome::Add => (
                        "Add",
                        state == AppState::MenuAddWidget,
                        !matches!(state, AppState::EditMode | AppState::MenuAddWidget),
                    ),
                    Chrome::Properties => (
                        "Props",
                        state == AppState::MenuWidgetProperties,
                        !(state == AppState::MenuWidgetProperties
                            || (state == AppState::EditMode && has_selection)),
                    ),
                };
                ChromeButton {
                    kind,
                    rect: kind.rect(),
                    label,
                    active,
                    disabled,
                }
            })
            .collect();

        let widgets = self
            .widgets
            .iter()
            .map(|w| {
                let is_selected = selected == Some(w.id());
                let show_handle = is_selected && state == AppState::EditMode;
                WidgetView {
                    id: w.id(),
                    widget_type: w.widget_type(),
                    bounds: w.bounds(),
                    center: w.center(),
                    radius: w.radius(),
                    labels: w.labels(),
                    pressed: w.is_pressed(),
                    output: w.output,
                    selected: is_selected,
                    resize_handle: show_handle.then(|| w.resize_handle()),
                }
            })
            .collect();

        Scene {
            state,
            chrome,
            widgets,
            menu: self.menu(state),
        }
    }

    fn menu(&self, state: AppState) -> Option<Menu> {
        let row_menu = |title: String, labels: &[&'static str], highlight: Option<usize>| {
            let rows = layout::menu_rows(self.screen, labels.len());
            let title_origin = rows
                .first()
                .map(|r| Vec2::new(r.x, r.y - layout::MENU_ROW_H * 0.5))
                .unwrap_or_default();
            let items = labels
                .iter()
                .zip(rows)
                .enumerate()
                .map(|(i, (&label, rect))| MenuItem {
                    label,
                    rect,
                    highlighted: highlight == Some(i),
                })
                .collect();
            Menu {
                title,
                title_origin,
                items,
            }
        };
        let remap = self.machine.remap();

        match state {
            AppState::Running | AppState::EditMode => None,
            AppState::MenuAddWidget => {
                let labels: Vec<_> = WidgetType::ALL.iter().map(|t| t.label()).collect();
                Some(row_menu("Add Widget".to_string(), &labels, None))
            }
            AppState::MenuWidgetProperties => {
                let labels: Vec<_> = PropertyAction::ALL.iter().map(|a| a.label()).collect();
                let title = match self.machine.selected() {
                    Some(id) => format!("Widget {id}"),
                    None => "Widget".to_string(),
                };
                Some(row_menu(title, &labels, None))
            }
            AppState::MenuRemapAction => {
                let labels: Vec<_> = Direction::ALL.iter().map(|d| d.label()).collect();
                let current = remap.and_then(|r| r.action).map(|d| d.index());
                Some(row_menu("Remap Direction".to_string(), &labels, current))
            }
            AppState::MenuRemapKey => {
                let current = remap.and_then(|r| {
                    let widget = self.widgets.get(r.widget)?;
                    match (widget.analog(), widget.button(), r.action) {
                        (Some(m), _, Some(direction)) => Some(m.key(direction).code),
                        (_, Some(b), _) => Some(b.key.code),
                        _ => None,
                    }
                });
                let title = match remap.and_then(|r| r.action) {
                    Some(direction) => format!("Select Key for {}", direction.label()),
                    None => "Select Key".to_string(),
                };
                let grid = self.key_grid;
                let items = MAPPABLE_KEYS
                    .iter()
                    .enumerate()
                    .map(|(i, key)| MenuItem {
                        label: key.label,
                        rect: grid.cell_rect(i),
                        highlighted: current == Some(key.code),
                    })
                    .collect();
                let title_origin = Vec2::new(
                    grid.start_x,
                    grid.start_y - layout::KEY_GRID_TITLE_GAP - layout::KEY_GRID_TITLE_H,
                );
                Some(Menu {
                    title,
                    title_origin,
                    items,
                })
            }
        }
    }
}
