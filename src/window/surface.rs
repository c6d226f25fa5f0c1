// src/window/surface.rs

//! Per-window cell grid with cursor and per-row dirty spans.

use crate::geometry::Vec2;
use crate::glyph::{BorderGlyphs, Glyph, DEFAULT_GLYPH};

/// Columns `first..=last` of `row` changed since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtySpan {
    pub row: i32,
    pub first: i32,
    pub last: i32,
}

#[derive(Debug, Clone)]
pub struct Surface {
    size: Vec2,
    cells: Vec<Glyph>,
    cursor: Vec2,
    dirty: Vec<Option<(i32, i32)>>,
    generation: u64,
}

impl Surface {
    /// An unbuilt surface of `size`; every row is dirty.
    pub fn new(size: Vec2) -> Self {
        let rows = size.y.max(0) as usize;
        Self {
            size,
            cells: vec![DEFAULT_GLYPH; size.area()],
            cursor: Vec2::ZERO,
            dirty: vec![Some((0, size.x - 1)); rows],
            generation: 0,
        }
    }

    /// Replaces the grid with a blank one of `size` and bumps the generation.
    pub fn rebuild(&mut self, size: Vec2, fill: Glyph) {
        let generation = self.generation + 1;
        *self = Surface::new(size);
        self.generation = generation;
        self.cells.iter_mut().for_each(|c| *c = fill);
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Callers clamp `pos` first; out-of-range positions are clamped here.
    pub fn set_cursor(&mut self, pos: Vec2) {
        self.cursor = pos.clamp_below(self.size);
    }

    fn index(&self, pos: Vec2) -> Option<usize> {
        pos.is_within(self.size)
            .then(|| pos.y as usize * self.size.x as usize + pos.x as usize)
    }

    pub fn get(&self, pos: Vec2) -> Option<Glyph> {
        self.index(pos).map(|i| self.cells[i])
    }

    fn mark(&mut self, pos: Vec2) {
        let span = &mut self.dirty[pos.y as usize];
        *span = Some(match *span {
            Some((first, last)) => (first.min(pos.x), last.max(pos.x)),
            None => (pos.x, pos.x),
        });
    }

    /// Writes one cell. Returns `false` (and writes nothing) outside the grid.
    pub fn put(&mut self, pos: Vec2, glyph: Glyph) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = glyph;
                self.mark(pos);
                true
            }
            None => false,
        }
    }

    /// Writes at the cursor and moves it one cell on, wrapping to the next
    /// row. Returns `false` when the cursor was already on the last cell and
    /// could not move.
    pub fn put_at_cursor(&mut self, glyph: Glyph) -> bool {
        let pos = self.cursor;
        self.put(pos, glyph);
        let next = if pos.x + 1 < self.size.x {
            Vec2::new(pos.x + 1, pos.y)
        } else {
            Vec2::new(0, pos.y + 1)
        };
        if next.y >= self.size.y {
            return false;
        }
        self.cursor = next;
        true
    }

    /// Moves the cursor to the start of the next row, if there is one.
    pub fn newline(&mut self) -> bool {
        if self.cursor.y + 1 >= self.size.y {
            return false;
        }
        self.cursor = Vec2::new(0, self.cursor.y + 1);
        true
    }

    pub fn fill(&mut self, glyph: Glyph) {
        self.cells.iter_mut().for_each(|c| *c = glyph);
        self.mark_all_dirty();
    }

    /// Draws `border` around the edge of the grid.
    pub fn draw_border(&mut self, border: &BorderGlyphs, style: Glyph) {
        let (w, h) = (self.size.x, self.size.y);
        if w <= 0 || h <= 0 {
            return;
        }
        let with = |c: char| Glyph { c, ..style };
        for x in 1..w - 1 {
            self.put(Vec2::new(x, 0), with(border.horizontal));
            self.put(Vec2::new(x, h - 1), with(border.horizontal));
        }
        for y in 1..h - 1 {
            self.put(Vec2::new(0, y), with(border.vertical));
            self.put(Vec2::new(w - 1, y), with(border.vertical));
        }
        for corner in [
            Vec2::new(0, 0),
            Vec2::new(w - 1, 0),
            Vec2::new(0, h - 1),
            Vec2::new(w - 1, h - 1),
        ] {
            self.put(corner, with(border.corner));
        }
    }

    pub fn mark_all_dirty(&mut self) {
        let last = self.size.x - 1;
        self.dirty.iter_mut().for_each(|span| *span = Some((0, last)));
    }

    /// Marks the cells of `origin..origin + size` dirty, clipped to the grid.
    pub fn mark_rect(&mut self, origin: Vec2, size: Vec2) {
        let first = origin.x.max(0);
        let last = (origin.x + size.x - 1).min(self.size.x - 1);
        if first > last {
            return;
        }
        let rows = origin.y.max(0)..(origin.y + size.y).min(self.size.y);
        for y in rows {
            self.mark(Vec2::new(first, y));
            self.mark(Vec2::new(last, y));
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.iter().any(Option::is_some)
    }

    /// Returns every dirty span and clears them.
    pub fn take_dirty(&mut self) -> Vec<DirtySpan> {
        self.dirty
            .iter_mut()
            .enumerate()
            .filter_map(|(row, span)| {
                span.take().map(|(first, last)| DirtySpan {
                    row: row as i32,
                    first,
                    last,
                })
            })
            .collect()
    }

    pub fn row_text(&self, y: i32) -> String {
        (0..self.size.x)
            .filter_map(|x| self.get(Vec2::new(x, y)))
            .map(|g| g.c)
            .collect()
    }
}
