// src/screen.rs

//! The composited screen: every window's surface flattened into one grid.

use crate::geometry::Vec2;
use crate::glyph::{Glyph, DEFAULT_GLYPH};

pub struct ScreenBuffer {
    cols: usize,
    rows: usize,
    cells: Vec<Glyph>,
    dirty: Vec<bool>,
}

impl ScreenBuffer {
    /// Creates a blank screen whose rows all need drawing.
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![DEFAULT_GLYPH; cols * rows],
            dirty: vec![true; rows],
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.cols as i32, self.rows as i32)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return None;
        }
        Some(y as usize * self.cols + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Glyph> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Writes one cell, marking its row dirty on change. Off-screen writes
    /// are dropped.
    pub fn set(&mut self, x: i32, y: i32, glyph: Glyph) {
        if let Some(i) = self.index(x, y) {
            if self.cells[i] != glyph {
                self.cells[i] = glyph;
                self.dirty[y as usize] = true;
            }
        }
    }

    pub fn row(&self, y: usize) -> &[Glyph] {
        let start = y * self.cols;
        &self.cells[start..start + self.cols]
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|d| *d = true);
    }

    pub fn is_dirty(&self, y: usize) -> bool {
        self.dirty.get(y).copied().unwrap_or(false)
    }

    /// Returns the dirty row indices and clears their flags.
    pub fn take_dirty_rows(&mut self) -> Vec<usize> {
        let rows = self
            .dirty
            .iter()
            .enumerate()
            .filter_map(|(y, d)| d.then_some(y))
            .collect();
        self.dirty.iter_mut().for_each(|d| *d = false);
        rows
    }

    pub fn row_text(&self, y: usize) -> String {
        self.row(y).iter().map(|g| g.c).collect()
    }
}
