// src/keys.rs

//! Frame-synchronized key state table.
//!
//! Raw key codes use the curses numbering: `0..=127` for ASCII, `258..=261`
//! for the arrow keys and `265..=276` for F1-F12. Each tick collapses the raw
//! samples into one of four debounced states per key.

use serde::{Deserialize, Serialize};
use std::fmt;

use log::trace;

/// Well-known raw key codes.
pub mod code {
    pub const BACKSPACE_ASCII: i32 = 8;
    pub const LINE_FEED: i32 = 10;
    pub const CARRIAGE_RETURN: i32 = 13;
    pub const ESCAPE: i32 = 27;
    pub const SPACE: i32 = 32;
    pub const DELETE: i32 = 127;

    pub const DOWN: i32 = 258;
    pub const UP: i32 = 259;
    pub const LEFT: i32 = 260;
    pub const RIGHT: i32 = 261;
    /// Curses' `KEY_BACKSPACE`; outside the tracked ranges but accepted by text input.
    pub const BACKSPACE: i32 = 263;

    pub const F1: i32 = 265;
    pub const F12: i32 = 276;

    /// `F(n)` for `n` in `1..=12`.
    pub const fn f(n: i32) -> i32 {
        F1 + n - 1
    }

    pub fn is_enter(code: i32) -> bool {
        code == LINE_FEED || code == CARRIAGE_RETURN
    }

    pub fn is_backspace(code: i32) -> bool {
        matches!(code, BACKSPACE_ASCII | DELETE | BACKSPACE)
    }

    pub fn is_printable(code: i32) -> bool {
        (32..=126).contains(&code)
    }
}

const ASCII_RANGE: std::ops::RangeInclusive<i32> = 0..=127;
const ARROW_RANGE: std::ops::RangeInclusive<i32> = code::DOWN..=code::RIGHT;
const FUNCTION_RANGE: std::ops::RangeInclusive<i32> = code::F1..=code::F12;

const ASCII_SLOTS: usize = 128;
const ARROW_SLOTS: usize = 4;
const FUNCTION_SLOTS: usize = 12;
const TOTAL_SLOTS: usize = ASCII_SLOTS + ARROW_SLOTS + FUNCTION_SLOTS;

/// Debounced state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyState {
    #[default]
    Released,
    /// Sampled this tick, not sampled the tick before.
    Down,
    /// Not sampled this tick, sampled the tick before.
    Up,
    /// Sampled this tick and the tick before.
    Pressed,
}

impl KeyState {
    fn is_held(self) -> bool {
        matches!(self, KeyState::Down | KeyState::Pressed)
    }

    /// Next state given whether the key was sampled during the tick.
    pub fn advance(self, sampled: bool) -> KeyState {
        match (self.is_held(), sampled) {
            (true, true) => KeyState::Pressed,
            (false, true) => KeyState::Down,
            (true, false) => KeyState::Up,
            (false, false) => KeyState::Released,
        }
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyState::Released => "released",
            KeyState::Down => "down",
            KeyState::Up => "up",
            KeyState::Pressed => "pressed",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct KeyRecord {
    state: KeyState,
    sampled_down_this_tick: bool,
}

/// Maps a raw code onto its slot, `None` for untracked codes.
fn slot_of(key: i32) -> Option<usize> {
    if ASCII_RANGE.contains(&key) {
        Some(key as usize)
    } else if ARROW_RANGE.contains(&key) {
        Some(ASCII_SLOTS + (key - code::DOWN) as usize)
    } else if FUNCTION_RANGE.contains(&key) {
        Some(ASCII_SLOTS + ARROW_SLOTS + (key - code::F1) as usize)
    } else {
        None
    }
}

/// Per-key debounced state for every tracked key code.
#[derive(Debug, Clone)]
pub struct KeyStateTable {
    records: [KeyRecord; TOTAL_SLOTS],
}

impl Default for KeyStateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStateTable {
    pub fn new() -> Self {
        Self {
            records: [KeyRecord::default(); TOTAL_SLOTS],
        }
    }

    /// Whether `key` falls in one of the tracked ranges.
    pub fn is_tracked(key: i32) -> bool {
        slot_of(key).is_some()
    }

    /// Clears every sampled flag. First step of a tick.
    pub fn begin_tick(&mut self) {
        for record in self.records.iter_mut() {
            record.sampled_down_this_tick = false;
        }
    }

    /// Records one raw sample. Returns `false` for untracked codes.
    pub fn sample(&mut self, key: i32) -> bool {
        match slot_of(key) {
            Some(slot) => {
                self.records[slot].sampled_down_this_tick = true;
                true
            }
            None => {
                trace!("KeyStateTable: ignoring untracked key code {}", key);
                false
            }
        }
    }

    /// Advances every key from its sampled flag. Last step of a tick.
    pub fn end_tick(&mut self) {
        for record in self.records.iter_mut() {
            record.state = record.state.advance(record.sampled_down_this_tick);
        }
    }

    /// Untracked codes always read `Released`.
    pub fn get_key_state(&self, key: i32) -> KeyState {
        slot_of(key)
            .map(|slot| self.records[slot].state)
            .unwrap_or(KeyState::Released)
    }

    pub fn get_key(&self, state: KeyState, key: i32) -> bool {
        self.get_key_state(key) == state
    }

    pub fn sampled_this_tick(&self, key: i32) -> bool {
        slot_of(key)
            .map(|slot| self.records[slot].sampled_down_this_tick)
            .unwrap_or(false)
    }
}
