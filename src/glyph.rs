// src/glyph.rs

//! Defines the `Glyph` cell type and its style bits (`AttrFlags`).
//!
//! A `Glyph` is one character cell of a window surface or of the screen:
//! the character, the style mask it was written with, and the index of the
//! color pair it was written with. Pair indices are resolved to concrete
//! colors only when the screen is presented, so rebinding a pair recolors
//! every cell that uses it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Combinable text style bits.
    ///
    /// `AttrFlags::NORMAL` (no bits) is plain text. Masks are OR-composable,
    /// e.g. `AttrFlags::BOLD | AttrFlags::UNDERLINE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AttrFlags: u16 {
        const UNDERLINE   = 1 << 0;
        const BLINK       = 1 << 1;
        const DIM         = 1 << 2; // Half bright.
        const BOLD        = 1 << 3;
        const INVISIBLE   = 1 << 4;
        const STANDOUT    = 1 << 5; // Best highlighting mode of the terminal.
        const REVERSED    = 1 << 6;
        const ALT_CHARSET = 1 << 7; // DEC special graphics.
        const PROTECTED   = 1 << 8;
    }
}

impl AttrFlags {
    pub const NORMAL: AttrFlags = AttrFlags::empty();
}

/// A single character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub c: char,
    pub flags: AttrFlags,
    /// Index into the compositor's color-pair table.
    pub pair: u16,
}

/// A blank cell drawn with the default pair.
pub const DEFAULT_GLYPH: Glyph = Glyph {
    c: ' ',
    flags: AttrFlags::empty(),
    pair: 0,
};

impl Default for Glyph {
    fn default() -> Self {
        DEFAULT_GLYPH
    }
}

impl Glyph {
    pub fn new(c: char, flags: AttrFlags, pair: u16) -> Self {
        Self { c, flags, pair }
    }

    /// The character as it should appear on screen, honouring `ALT_CHARSET`.
    pub fn displayed_char(&self) -> char {
        if self.flags.contains(AttrFlags::ALT_CHARSET) {
            map_to_dec_line_drawing(self.c)
        } else {
            self.c
        }
    }

    /// True when two cells would be emitted with the same style sequence.
    pub fn same_style(&self, other: &Glyph) -> bool {
        self.flags == other.flags && self.pair == other.pair
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.displayed_char())
    }
}

/// Characters used to frame a window.
///
/// Both vertical edges share `vertical`, both horizontal edges share
/// `horizontal` and all four corners share `corner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderGlyphs {
    pub vertical: char,
    pub horizontal: char,
    pub corner: char,
}

impl Default for BorderGlyphs {
    fn default() -> Self {
        BorderGlyphs {
            vertical: '|',
            horizontal: '-',
            corner: '+',
        }
    }
}

/// Maps an ASCII character to its DEC Special Graphics equivalent.
///
/// Characters without a mapping are returned unchanged.
#[must_use]
pub fn map_to_dec_line_drawing(ch: char) -> char {
    match ch {
        '`' => '◆',
        'a' => '▒',
        'f' => '°',
        'g' => '±',
        'j' => '┘',
        'k' => '┐',
        'l' => '┌',
        'm' => '└',
        'n' => '┼',
        'o' | 'p' | 'q' | 'r' | 's' => '─',
        't' => '├',
        'u' => '┤',
        'v' => '┴',
        'w' => '┬',
        'x' => '│',
        'y' => '≤',
        'z' => '≥',
        '{' => 'π',
        '|' => '≠',
        '}' => '£',
        '~' => '·',
        _ => ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_compose() {
        let mask = AttrFlags::BOLD | AttrFlags::UNDERLINE;
        assert!(mask.contains(AttrFlags::BOLD));
        assert!(!mask.contains(AttrFlags::BLINK));
        assert_eq!(AttrFlags::NORMAL, AttrFlags::empty());
    }

    #[test]
    fn alt_charset_maps_box_drawing() {
        let corner = Glyph::new('l', AttrFlags::ALT_CHARSET, 0);
        assert_eq!(corner.displayed_char(), '┌');
        let plain = Glyph::new('l', AttrFlags::BOLD, 0);
        assert_eq!(plain.displayed_char(), 'l');
        assert_eq!(map_to_dec_line_drawing('A'), 'A');
    }

    #[test]
    fn style_comparison_ignores_character() {
        let a = Glyph::new('a', AttrFlags::BOLD, 2);
        let b = Glyph::new('b', AttrFlags::BOLD, 2);
        let c = Glyph::new('a', AttrFlags::BOLD, 3);
        assert!(a.same_style(&b));
        assert!(!a.same_style(&c));
    }
}
