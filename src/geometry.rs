// src/geometry.rs

//! Integer 2D vectors used for window sizes, positions and cursor cells.
//!
//! `x` is always the column axis and `y` the row axis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A pair of signed cell coordinates or extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Clamps each axis into `[0, bound)`. A non-positive bound clamps to 0.
    pub fn clamp_below(self, bound: Vec2) -> Self {
        Self {
            x: clamp_axis(self.x, bound.x),
            y: clamp_axis(self.y, bound.y),
        }
    }

    /// True when both axes lie in `[0, bound)`.
    pub fn is_within(self, bound: Vec2) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < bound.x && self.y < bound.y
    }

    /// Per-axis addition, `None` if either axis overflows.
    pub fn checked_add(self, rhs: Vec2) -> Option<Vec2> {
        Some(Vec2::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    /// Number of cells covered by an extent (zero for degenerate extents).
    pub fn area(self) -> usize {
        if self.x <= 0 || self.y <= 0 {
            return 0;
        }
        self.x as usize * self.y as usize
    }
}

fn clamp_axis(value: i32, bound: i32) -> i32 {
    if bound <= 0 {
        return 0;
    }
    value.clamp(0, bound - 1)
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Vec2 {
    fn from((x, y): (i32, i32)) -> Self {
        Vec2::new(x, y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_below_keeps_in_range_values() {
        let size = Vec2::new(10, 5);
        assert_eq!(Vec2::new(3, 4).clamp_below(size), Vec2::new(3, 4));
        assert_eq!(Vec2::new(-2, 9).clamp_below(size), Vec2::new(0, 4));
        assert_eq!(Vec2::new(10, 5).clamp_below(size), Vec2::new(9, 4));
    }

    #[test]
    fn degenerate_bound_clamps_to_origin() {
        assert_eq!(Vec2::new(7, 7).clamp_below(Vec2::ZERO), Vec2::ZERO);
        assert_eq!(Vec2::new(0, 3).area(), 0);
    }

    #[test]
    fn arithmetic() {
        let mut p = Vec2::new(1, 2) + Vec2::new(3, 4);
        assert_eq!(p, Vec2::new(4, 6));
        p += Vec2::new(-4, -6);
        assert_eq!(p, Vec2::ZERO);
        assert_eq!(Vec2::new(5, 5) - Vec2::new(2, 1), Vec2::new(3, 4));
        assert_eq!(Vec2::new(2, 3).to_string(), "(2, 3)");
    }
}
