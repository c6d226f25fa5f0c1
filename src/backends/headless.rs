// src/backends/headless.rs

//! In-memory driver used by tests and scripted sessions.
//!
//! Drawn text lands in a cell grid that can be inspected afterwards. Input
//! comes from a script of key codes separated by tick pauses.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, trace};

use crate::backends::{CellCoords, CursorVisibility, Driver, KeyPoll, TextRunStyle};
use crate::color::{NamedColor, Rgb1000};
use crate::error::{Error, Result};
use crate::glyph::AttrFlags;

/// One entry of the input script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptItem {
    Key(i32),
    /// Makes the next poll report `Empty`, ending the current tick's drain.
    Pause,
}

/// A cell as the headless terminal received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessCell {
    pub c: char,
    pub style: TextRunStyle,
}

impl Default for HeadlessCell {
    fn default() -> Self {
        HeadlessCell {
            c: ' ',
            style: TextRunStyle {
                fg: NamedColor::White,
                bg: NamedColor::Black,
                flags: AttrFlags::NORMAL,
            },
        }
    }
}

pub struct HeadlessDriver {
    cols: u16,
    rows: u16,
    cells: Vec<HeadlessCell>,
    script: VecDeque<ScriptItem>,
    close_when_drained: bool,
    max_color_pairs: u16,
    can_change_color: bool,
    cursor: Option<CellCoords>,
    visibility: CursorVisibility,
    visibility_log: Vec<CursorVisibility>,
    palette_log: Vec<(NamedColor, Rgb1000)>,
    runs_drawn: usize,
    presents: usize,
    waits: usize,
}

impl HeadlessDriver {
    pub fn new(cols: u16, rows: u16) -> Self {
        debug!("HeadlessDriver: creating {}x{} terminal", cols, rows);
        HeadlessDriver {
            cols,
            rows,
            cells: vec![HeadlessCell::default(); cols as usize * rows as usize],
            script: VecDeque::new(),
            close_when_drained: true,
            max_color_pairs: 256,
            can_change_color: true,
            cursor: None,
            visibility: CursorVisibility::Default,
            visibility_log: Vec::new(),
            palette_log: Vec::new(),
            runs_drawn: 0,
            presents: 0,
            waits: 0,
        }
    }

    /// Whether an exhausted script reports `Closed` (the default) or `Empty`.
    pub fn close_when_drained(mut self, close: bool) -> Self {
        self.close_when_drained = close;
        self
    }

    pub fn with_max_color_pairs(mut self, pairs: u16) -> Self {
        self.max_color_pairs = pairs;
        self
    }

    pub fn with_color_change(mut self, supported: bool) -> Self {
        self.can_change_color = supported;
        self
    }

    pub fn push_key(&mut self, key: i32) {
        self.script.push_back(ScriptItem::Key(key));
    }

    /// Queues every character of `text` as its ASCII code.
    pub fn push_text(&mut self, text: &str) {
        self.script
            .extend(text.chars().map(|c| ScriptItem::Key(c as i32)));
    }

    pub fn push_pause(&mut self) {
        self.script.push_back(ScriptItem::Pause);
    }

    pub fn pending_script(&self) -> usize {
        self.script.len()
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<HeadlessCell> {
        if x >= self.cols as usize || y >= self.rows as usize {
            return None;
        }
        self.cells.get(y * self.cols as usize + x).copied()
    }

    pub fn row_text(&self, y: usize) -> String {
        (0..self.cols as usize)
            .filter_map(|x| self.cell(x, y))
            .map(|cell| cell.c)
            .collect()
    }

    pub fn cursor(&self) -> Option<CellCoords> {
        self.cursor
    }

    pub fn visibility(&self) -> CursorVisibility {
        self.visibility
    }

    /// Every visibility change, in order.
    pub fn visibility_log(&self) -> &[CursorVisibility] {
        &self.visibility_log
    }

    pub fn palette_log(&self) -> &[(NamedColor, Rgb1000)] {
        &self.palette_log
    }

    pub fn runs_drawn(&self) -> usize {
        self.runs_drawn
    }

    pub fn presents(&self) -> usize {
        self.presents
    }

    pub fn waits(&self) -> usize {
        self.waits
    }
}

impl Driver for HeadlessDriver {
    fn dimensions(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn poll_key(&mut self) -> Result<KeyPoll> {
        Ok(match self.script.pop_front() {
            Some(ScriptItem::Key(key)) => {
                trace!("HeadlessDriver: key {}", key);
                KeyPoll::Key(key)
            }
            Some(ScriptItem::Pause) => KeyPoll::Empty,
            None if self.close_when_drained => KeyPoll::Closed,
            None => KeyPoll::Empty,
        })
    }

    fn wait_for_input(&mut self, _timeout: Duration) -> Result<()> {
        self.waits += 1;
        Ok(())
    }

    fn draw_text_run(
        &mut self,
        coords: CellCoords,
        text: &str,
        style: TextRunStyle,
    ) -> Result<()> {
        if coords.y >= self.rows as usize {
            return Ok(());
        }
        let cols = self.cols as usize;
        for (offset, c) in text.chars().enumerate() {
            let x = coords.x + offset;
            if x >= cols {
                break;
            }
            self.cells[coords.y * cols + x] = HeadlessCell { c, style };
        }
        self.runs_drawn += 1;
        Ok(())
    }

    fn set_cursor(&mut self, pos: Option<CellCoords>, visibility: CursorVisibility) -> Result<()> {
        if pos.is_some() {
            self.cursor = pos;
        }
        if visibility != self.visibility {
            trace!("HeadlessDriver: cursor visibility {:?}", visibility);
            self.visibility = visibility;
            self.visibility_log.push(visibility);
        }
        Ok(())
    }

    fn max_color_pairs(&self) -> u16 {
        self.max_color_pairs
    }

    fn can_change_color(&self) -> bool {
        self.can_change_color
    }

    fn change_color(&mut self, color: NamedColor, rgb: Rgb1000) -> Result<()> {
        if !self.can_change_color {
            return Err(Error::ColorChangeUnsupported);
        }
        self.palette_log.push((color, rgb));
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        debug!("HeadlessDriver: cleanup");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_pauses_and_closes() {
        let mut driver = HeadlessDriver::new(4, 2);
        driver.push_text("a");
        driver.push_pause();
        driver.push_key(259);
        assert_eq!(driver.poll_key().unwrap(), KeyPoll::Key(97));
        assert_eq!(driver.poll_key().unwrap(), KeyPoll::Empty);
        assert_eq!(driver.poll_key().unwrap(), KeyPoll::Key(259));
        assert_eq!(driver.poll_key().unwrap(), KeyPoll::Closed);

        let mut open = HeadlessDriver::new(4, 2).close_when_drained(false);
        assert_eq!(open.poll_key().unwrap(), KeyPoll::Empty);
    }

    #[test]
    fn runs_clip_at_right_edge() {
        let mut driver = HeadlessDriver::new(4, 2);
        let style = HeadlessCell::default().style;
        driver
            .draw_text_run(CellCoords { x: 2, y: 1 }, "xyz", style)
            .unwrap();
        assert_eq!(driver.row_text(1), "  xy");
        assert_eq!(driver.row_text(0), "    ");
    }

    #[test]
    fn color_change_can_be_refused() {
        let mut driver = HeadlessDriver::new(1, 1).with_color_change(false);
        let rgb = Rgb1000::new(0, 0, 0).unwrap();
        assert!(matches!(
            driver.change_color(NamedColor::Red, rgb),
            Err(Error::ColorChangeUnsupported)
        ));
    }
}
