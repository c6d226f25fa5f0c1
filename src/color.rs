// src/color.rs

//! Defines the indexed palette (`NamedColor`), foreground/background pairs
//! (`ColorPair`) and RGB remap values (`Rgb1000`).

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The eight indexed terminal colors (indices 0-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NamedColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl NamedColor {
    pub const ALL: [NamedColor; 8] = [
        NamedColor::Black,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Yellow,
        NamedColor::Blue,
        NamedColor::Magenta,
        NamedColor::Cyan,
        NamedColor::White,
    ];

    /// Converts a palette index to a `NamedColor`, `None` outside 0-7.
    pub fn from_index(idx: u8) -> Option<Self> {
        let color = Self::ALL.get(idx as usize).copied();
        if color.is_none() {
            warn!("NamedColor::from_index: index {} outside the 8-color palette", idx);
        }
        color
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Foreground/background pair bound to one color-pair index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorPair {
    pub fg: NamedColor,
    pub bg: NamedColor,
}

impl ColorPair {
    pub const fn new(fg: NamedColor, bg: NamedColor) -> Self {
        Self { fg, bg }
    }
}

impl Default for ColorPair {
    fn default() -> Self {
        ColorPair::new(NamedColor::White, NamedColor::Black)
    }
}

/// Per-channel intensity on the curses 0-1000 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb1000 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

/// Upper bound of every `Rgb1000` channel.
pub const RGB1000_MAX: u16 = 1000;

impl Rgb1000 {
    /// Builds a remap value, rejecting channels above 1000.
    pub fn new(r: u16, g: u16, b: u16) -> Result<Self> {
        if r > RGB1000_MAX || g > RGB1000_MAX || b > RGB1000_MAX {
            return Err(Error::InvalidRgb { r, g, b });
        }
        Ok(Self { r, g, b })
    }

    /// Scales the channels to 8 bits, rounding to nearest.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let scale = |c: u16| ((c.min(RGB1000_MAX) as u32 * 255 + 500) / 1000) as u8;
        (scale(self.r), scale(self.g), scale(self.b))
    }
}
