//! Fixed layout of the chrome buttons, menus and key selection grid. The
//! scene and the touch router both go through these functions so what is
//! drawn is exactly what is hit.

use super::geometry::{Rect, Screen, Vec2};

/// Side of the resize handle drawn at the bottom-right of a selected widget
pub const HANDLE_SIZE: f32 = 20.0;

const CHROME_Y: f32 = 10.0;
const CHROME_W: f32 = 80.0;
const CHROME_H: f32 = 40.0;
const CHROME_SPACING: f32 = 10.0;

pub const MENU_ROW_W: f32 = 150.0;
pub const MENU_ROW_H: f32 = 50.0;
pub const MENU_ROW_SPACING: f32 = 10.0;

pub const KEY_GRID_COLS: usize = 8;
pub const KEY_CELL_SIZE: f32 = 60.0;
pub const KEY_CELL_SPACING: f32 = 10.0;
/// Height reserved for the key grid title text, and the gap below it
pub const KEY_GRID_TITLE_H: f32 = 16.0;
pub const KEY_GRID_TITLE_GAP: f32 = 10.0;

/// The always-present control buttons along the top edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chrome {
    /// Enter/leave edit mode, or back out of a remap menu
    Edit,
    /// Open/close the add widget menu
    Add,
    /// Open/close the properties of the selected widget
    Properties,
}

impl Chrome {
    pub const ALL: [Chrome; 3] = [Chrome::Edit, Chrome::Add, Chrome::Properties];

    pub fn rect(&self) -> Rect {
        let idx = match self {
            Chrome::Edit => 0.0,
            Chrome::Add => 1.0,
            Chrome::Properties => 2.0,
        };
        let x = CHROME_SPACING + idx * (CHROME_W + CHROME_SPACING);
        Rect::new(x, CHROME_Y, CHROME_W, CHROME_H)
    }

    /// Returns the chrome button under the given point
    pub fn hit(p: Vec2) -> Option<Chrome> {
        Chrome::ALL.into_iter().find(|c| c.rect().contains(p))
    }
}

/// Rows of a vertically stacked menu centered on the screen
pub fn menu_rows(screen: Screen, count: usize) -> Vec<Rect> {
    let total_h = (MENU_ROW_H + MENU_ROW_SPACING) * count as f32 - MENU_ROW_SPACING;
    let start_y = (screen.height - total_h) * 0.5;
    let start_x = (screen.width - MENU_ROW_W) * 0.5;
    (0..count)
        .map(|i| {
            let y = start_y + i as f32 * (MENU_ROW_H + MENU_ROW_SPACING);
            Rect::new(start_x, y, MENU_ROW_W, MENU_ROW_H)
        })
        .collect()
}

/// Returns the index of the menu row under the given point
pub fn menu_hit(screen: Screen, count: usize, p: Vec2) -> Option<usize> {
    menu_rows(screen, count).iter().position(|r| r.contains(p))
}

/// Layout of a uniform grid, scaled down (never up) to fit the screen below
/// a top offset and centered in the remaining space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f32,
    pub cell_spacing: f32,
    pub total_width: f32,
    pub total_height: f32,
    pub start_x: f32,
    pub start_y: f32,
}

impl GridLayout {
    pub fn compute(
        screen: Screen,
        item_count: usize,
        cols: usize,
        cell_size: f32,
        cell_spacing: f32,
        offset_top: f32,
    ) -> Self {
        if cols == 0 || item_count == 0 {
            return Self {
                rows: 0,
                cols,
                cell_size,
                cell_spacing,
                total_width: 0.0,
                total_height: 0.0,
                start_x: 0.0,
                start_y: offset_top,
            };
        }

        let rows = item_count.div_ceil(cols);
        let required_w = cols as f32 * (cell_size + cell_spacing) - cell_spacing;
        let required_h = rows as f32 * (cell_size + cell_spacing) - cell_spacing;
        let avail_w = screen.width;
        let avail_h = screen.height - offset_top;

        let scale = (avail_w / required_w).min(avail_h / required_h).clamp(0.1, 1.0);
        let cell_size = cell_size * scale;
        let cell_spacing = cell_spacing * scale;
        let total_width = cols as f32 * (cell_size + cell_spacing) - cell_spacing;
        let total_height = rows as f32 * (cell_size + cell_spacing) - cell_spacing;
        let start_x = ((avail_w - total_width) * 0.5).max(0.0);
        let start_y = offset_top + ((avail_h - total_height) * 0.5).max(0.0);

        Self {
            rows,
            cols,
            cell_size,
            cell_spacing,
            total_width,
            total_height,
            start_x,
            start_y,
        }
    }

    /// Rectangle of the cell at the given item index
    pub fn cell_rect(&self, index: usize) -> Rect {
        let cols = self.cols.max(1);
        let row = (index / cols) as f32;
        let col = (index % cols) as f32;
        let pitch = self.cell_size + self.cell_spacing;
        Rect::new(
            self.start_x + col * pitch,
            self.start_y + row * pitch,
            self.cell_size,
            self.cell_size,
        )
    }

    /// Returns the index of the item under the given point
    pub fn hit(&self, p: Vec2, item_count: usize) -> Option<usize> {
        (0..item_count).find(|&i| self.cell_rect(i).contains(p))
    }
}

/// Layout of the key selection grid for the given screen
pub fn key_grid(screen: Screen, item_count: usize) -> GridLayout {
    let content_top = CHROME_Y + CHROME_H + 20.0;
    let offset_top = content_top + KEY_GRID_TITLE_H + KEY_GRID_TITLE_GAP;
    GridLayout::compute(
        screen,
        item_count,
        KEY_GRID_COLS,
        KEY_CELL_SIZE,
        KEY_CELL_SPACING,
        offset_top,
    )
}
