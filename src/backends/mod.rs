// src/backends/mod.rs

//! Defines the `Driver` trait for terminal backends (console, headless)
//! and the common types exchanged with the renderer, such as `CellCoords`,
//! `TextRunStyle` and `KeyPoll`.

use crate::color::{NamedColor, Rgb1000};
use crate::error::Result;
use crate::glyph::AttrFlags;
use std::time::Duration;

pub mod console;
pub mod decode;
pub mod headless;

pub use console::ConsoleDriver;
pub use headless::HeadlessDriver;

/// Visibility of the hardware cursor, in curses order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorVisibility {
    Invisible,
    /// The terminal's normal cursor.
    #[default]
    Default,
    /// The terminal's very visible cursor, where supported.
    Visible,
}

/// Result of one non-blocking key poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPoll {
    /// One raw key code in curses numbering.
    Key(i32),
    /// No input pending right now.
    Empty,
    /// The input stream has ended; no further keys will arrive.
    Closed,
}

/// Represents a cell coordinate on the terminal grid (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoords {
    pub x: usize, // column
    pub y: usize, // row
}

/// Resolved style of a run of text. Colors are concrete palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRunStyle {
    pub fg: NamedColor,
    pub bg: NamedColor,
    pub flags: AttrFlags,
}

/// Defines the interface for a terminal backend.
///
/// A driver owns the physical (or simulated) terminal. The compositor polls
/// it for raw key codes once per tick and pushes styled text runs into it
/// when presenting. Drawing calls may be buffered until `present`.
pub trait Driver {
    /// Terminal size as `(columns, rows)`.
    fn dimensions(&self) -> (u16, u16);

    /// Returns the next pending raw key code without blocking.
    fn poll_key(&mut self) -> Result<KeyPoll>;

    /// Blocks for at most `timeout` or until input becomes available.
    fn wait_for_input(&mut self, timeout: Duration) -> Result<()>;

    /// Draws `text` starting at `coords`, every character in `style`.
    fn draw_text_run(&mut self, coords: CellCoords, text: &str, style: TextRunStyle)
    -> Result<()>;

    /// Moves the hardware cursor and applies its visibility.
    /// `None` leaves the cursor where the last draw put it.
    fn set_cursor(&mut self, pos: Option<CellCoords>, visibility: CursorVisibility) -> Result<()>;

    /// Number of color pairs the terminal can hold.
    fn max_color_pairs(&self) -> u16;

    /// Whether `change_color` may be called.
    fn can_change_color(&self) -> bool;

    /// Remaps one indexed color to an RGB value.
    fn change_color(&mut self, color: NamedColor, rgb: Rgb1000) -> Result<()>;

    /// Flushes buffered drawing to the terminal.
    fn present(&mut self) -> Result<()>;

    /// Restores the terminal to its original state.
    fn cleanup(&mut self) -> Result<()>;
}
