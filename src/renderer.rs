// src/renderer.rs

//! This module defines the `Renderer`.
//!
//! The `Renderer` translates the composited [`ScreenBuffer`] into text runs
//! for a [`Driver`]. Only dirty rows are redrawn. Consecutive cells sharing
//! style bits and color pair are batched into one `draw_text_run` call, and
//! pair indices are resolved to concrete colors here, at present time.

use crate::attribute::ColorPairTable;
use crate::backends::{CellCoords, Driver, TextRunStyle};
use crate::error::Result;
use crate::glyph::Glyph;
use crate::screen::ScreenBuffer;

use log::trace;

#[derive(Debug, Default)]
pub struct Renderer {
    runs_last_frame: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every dirty row of `screen` and clears the dirty flags.
    ///
    /// Returns `true` when anything was sent to the driver.
    pub fn draw<D: Driver>(
        &mut self,
        screen: &mut ScreenBuffer,
        pairs: &ColorPairTable,
        driver: &mut D,
    ) -> Result<bool> {
        let (cols, rows) = screen.dimensions();
        if cols == 0 || rows == 0 {
            return Ok(false);
        }
        self.runs_last_frame = 0;
        for y in screen.take_dirty_rows() {
            self.draw_dirty_line(y, screen.row(y), pairs, driver)?;
        }
        Ok(self.runs_last_frame > 0)
    }

    /// Number of text runs emitted by the most recent `draw`.
    pub fn runs_last_frame(&self) -> usize {
        self.runs_last_frame
    }

    fn draw_dirty_line<D: Driver>(
        &mut self,
        y: usize,
        row: &[Glyph],
        pairs: &ColorPairTable,
        driver: &mut D,
    ) -> Result<()> {
        trace!("Renderer: Drawing dirty line {}", y);
        let mut start = 0;
        while start < row.len() {
            let first = row[start];
            let end = row[start..]
                .iter()
                .position(|g| !g.same_style(&first))
                .map_or(row.len(), |offset| start + offset);
            let text: String = row[start..end].iter().map(Glyph::displayed_char).collect();
            let colors = pairs.resolve(first.pair);
            let style = TextRunStyle {
                fg: colors.fg,
                bg: colors.bg,
                flags: first.flags,
            };
            driver.draw_text_run(CellCoords { x: start, y }, &text, style)?;
            self.runs_last_frame += 1;
            start = end;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
