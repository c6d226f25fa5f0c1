// src/content.rs

//! Drawing into windows.
//!
//! Every write goes to the window's surface with the active attribute and
//! is then flushed onto the screen buffer. Windows paint in tree pre-order:
//! a child covers its parent and a later sibling covers an earlier one,
//! whichever of them was written last. Nothing reaches the terminal until
//! [`Compositor::present`].

use std::fmt::{self, Write as _};

use log::{trace, warn};

use crate::attribute::AttrId;
use crate::backends::Driver;
use crate::compositor::{Compositor, Correction};
use crate::error::{Error, Result};
use crate::geometry::Vec2;
use crate::glyph::Glyph;
use crate::window::WindowId;

/// Outcome of `put_string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PutReport {
    /// Cells written.
    pub written: usize,
    /// The formatted message exceeded the scratch buffer and was cut short.
    pub truncated: bool,
    /// Characters dropped after the bottom-right cell was reached.
    pub clipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapStatus {
    Complete,
    /// The text ran past the last interior row; later words were skipped.
    InsufficientVerticalSpace,
}

/// Outcome of `put_string_wrapped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapReport {
    /// Words written in full.
    pub placed: usize,
    /// Words not written, or only partly written, in order.
    pub skipped: Vec<String>,
    pub status: WrapStatus,
    pub truncated: bool,
}

/// The cells inside a window's border, as inclusive bounds.
///
/// Wrapped text and text input stay within these cells: column 1 is the left
/// margin and `size - 2` the last usable column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interior {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Interior {
    pub fn of(size: Vec2) -> Self {
        Interior {
            left: 1,
            top: 1,
            right: size.x - 2,
            bottom: size.y - 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.right < self.left || self.bottom < self.top
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left + 1).max(0)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        (self.left..=self.right).contains(&pos.x) && (self.top..=self.bottom).contains(&pos.y)
    }

    /// Nearest interior cell. Only meaningful for a non-empty interior.
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            pos.x.clamp(self.left, self.right.max(self.left)),
            pos.y.clamp(self.top, self.bottom.max(self.top)),
        )
    }

    /// Moves `by` cells forward in reading order, wrapping from the right
    /// edge to the left margin of the next row. The result may lie below
    /// the last interior row.
    pub fn advance(&self, pos: Vec2, by: usize) -> Vec2 {
        // Rows saturate at i32::MAX, below any interior.
        let rows_down =
            |rows: i64| pos.y.saturating_add(i32::try_from(rows).unwrap_or(i32::MAX));
        let by = i64::try_from(by).unwrap_or(i64::MAX);
        let width = self.width() as i64;
        if width == 0 {
            return Vec2::new(pos.x, rows_down(by));
        }
        let linear = (pos.x as i64 - self.left as i64).saturating_add(by);
        Vec2::new(
            self.left + (linear % width) as i32,
            rows_down(linear / width),
        )
    }

    /// Moves `by` cells backward in reading order, wrapping from the left
    /// margin to the right edge of the previous row.
    pub fn retreat(&self, pos: Vec2, by: usize) -> Result<Vec2> {
        let width = self.width() as i64;
        let linear = (pos.y as i64 - self.top as i64) * width
            + (pos.x as i64 - self.left as i64)
            - i64::try_from(by).unwrap_or(i64::MAX);
        if width == 0 || linear < 0 {
            return Err(Error::CursorUnderflow { at: pos, by });
        }
        Ok(Vec2::new(
            self.left + (linear % width) as i32,
            self.top + (linear / width) as i32,
        ))
    }
}

/// Byte-bounded `fmt::Write` sink; overflow is cut at a char boundary.
struct BoundedWriter {
    buf: String,
    limit: usize,
    truncated: bool,
}

impl fmt::Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        let room = self.limit - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.buf.push_str(&s[..cut]);
        self.truncated = true;
        Ok(())
    }
}

/// Formats `args` into at most `limit` bytes. Returns the text and whether
/// it was cut short.
pub fn format_bounded(args: fmt::Arguments<'_>, limit: usize) -> (String, bool) {
    let mut writer = BoundedWriter {
        buf: String::new(),
        limit,
        truncated: false,
    };
    if writer.write_fmt(args).is_err() {
        writer.truncated = true;
    }
    (writer.buf, writer.truncated)
}

impl<D: Driver> Compositor<D> {
    /// The explicit attribute, or the window's default one.
    fn resolve_attribute(&self, id: WindowId, attr: Option<AttrId>) -> Result<AttrId> {
        let attr = match attr {
            Some(attr) => attr,
            None => self.window(id)?.default_attr,
        };
        self.attributes.get(attr)?;
        Ok(attr)
    }

    fn styled(&self, c: char) -> Glyph {
        let style = self.attributes.active();
        Glyph::new(c, style.flags, style.pair)
    }

    fn format_message(&self, args: fmt::Arguments<'_>) -> (String, bool) {
        let limit = self.config.render.max_message_len;
        let (text, truncated) = format_bounded(args, limit);
        if truncated {
            warn!("Message truncated to {} bytes", limit);
        }
        (text, truncated)
    }

    /// Blanks the window and redraws its border.
    pub fn clear(&mut self, id: WindowId) -> Result<()> {
        let (fill, border_style) = self.base_glyph(id)?;
        let window = self.window_mut(id)?;
        window.surface.fill(fill);
        if let Some(border) = window.border {
            window.surface.draw_border(&border, border_style);
        }
        self.update_content(id)
    }

    /// Moves the window's cursor, clamping it into the window.
    pub fn set_cursor_position(&mut self, id: WindowId, pos: Vec2) -> Result<Vec2> {
        let window = self.window(id)?;
        let corrected = pos.clamp_below(window.size);
        if corrected != pos {
            warn!(
                "Cursor {} outside window '{}' of size {}; clamped to {}",
                pos, window.title, window.size, corrected
            );
            self.record(Correction::CursorClamped {
                window: id,
                requested: pos,
                corrected,
            });
        }
        self.window_mut(id)?.surface.set_cursor(corrected);
        Ok(corrected)
    }

    /// Writes one character at `pos` with `attr` (the window default when
    /// `None`) and flushes the window chain.
    pub fn put_char(
        &mut self,
        id: WindowId,
        pos: Vec2,
        attr: Option<AttrId>,
        c: char,
    ) -> Result<()> {
        self.set_cursor_position(id, pos)?;
        let attr = self.resolve_attribute(id, attr)?;
        self.with_attribute(attr, |comp| {
            let glyph = comp.styled(c);
            comp.window_mut(id)?.surface.put_at_cursor(glyph);
            Ok(())
        })?;
        trace!("put_char '{}' at {} in {:?}", c, pos, id);
        self.update_content(id)
    }

    /// Formats and writes text from `pos`, continuing on the next row past
    /// the right edge. `\n` starts a new row. Writing stops at the
    /// bottom-right cell.
    pub fn put_string(
        &mut self,
        id: WindowId,
        pos: Vec2,
        attr: Option<AttrId>,
        args: fmt::Arguments<'_>,
    ) -> Result<PutReport> {
        let (text, truncated) = self.format_message(args);
        self.set_cursor_position(id, pos)?;
        let attr = self.resolve_attribute(id, attr)?;
        let report = self.with_attribute(attr, |comp| {
            let mut report = PutReport {
                truncated,
                ..PutReport::default()
            };
            let mut exhausted = false;
            for c in text.chars() {
                if exhausted {
                    report.clipped += 1;
                    continue;
                }
                let glyph = comp.styled(c);
                let surface = &mut comp.window_mut(id)?.surface;
                if c == '\n' {
                    exhausted = !surface.newline();
                    continue;
                }
                exhausted = !surface.put_at_cursor(glyph);
                report.written += 1;
            }
            Ok(report)
        })?;
        if report.clipped > 0 {
            warn!("put_string clipped {} characters at the window edge", report.clipped);
        }
        self.update_content(id)?;
        Ok(report)
    }

    /// Moves `pos` inside the border, recording the correction when it moved.
    pub(crate) fn clamp_into_interior(
        &mut self,
        id: WindowId,
        interior: &Interior,
        pos: Vec2,
    ) -> Vec2 {
        let start = interior.clamp(pos);
        if start != pos {
            warn!("Start {} moved inside the border to {}", pos, start);
            self.record(Correction::CursorClamped {
                window: id,
                requested: pos,
                corrected: start,
            });
        }
        start
    }

    /// Formats text and lays it out word by word inside the border.
    ///
    /// A word that would cross the last interior column starts on the next
    /// row at the left margin; a word wider than the interior is split
    /// across rows. Words that would fall below the last interior row are
    /// skipped and reported.
    pub fn put_string_wrapped(
        &mut self,
        id: WindowId,
        pos: Vec2,
        attr: Option<AttrId>,
        args: fmt::Arguments<'_>,
    ) -> Result<WrapReport> {
        let (text, truncated) = self.format_message(args);
        let interior = Interior::of(self.window(id)?.size);
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut report = WrapReport {
            placed: 0,
            skipped: Vec::new(),
            status: WrapStatus::Complete,
            truncated,
        };
        if words.is_empty() {
            return Ok(report);
        }
        if interior.is_empty() {
            warn!("Window {:?} has no interior for wrapped text", id);
            report.skipped = words.iter().map(|w| w.to_string()).collect();
            report.status = WrapStatus::InsufficientVerticalSpace;
            return Ok(report);
        }
        let start = self.clamp_into_interior(id, &interior, pos);
        let attr = self.resolve_attribute(id, attr)?;
        let report = self.with_attribute(attr, |comp| {
            let mut cursor = start;
            for word in words {
                if report.status != WrapStatus::Complete {
                    report.skipped.push(word.to_string());
                    continue;
                }
                let len = word.chars().count() as i32;
                if cursor.x != interior.left && cursor.x + len - 1 > interior.right {
                    cursor = Vec2::new(interior.left, cursor.y + 1);
                }
                let mut complete = true;
                for c in word.chars() {
                    if cursor.y > interior.bottom {
                        complete = false;
                        break;
                    }
                    let glyph = comp.styled(c);
                    let surface = &mut comp.window_mut(id)?.surface;
                    surface.put(cursor, glyph);
                    cursor = interior.advance(cursor, 1);
                    surface.set_cursor(cursor);
                }
                if !complete {
                    report.status = WrapStatus::InsufficientVerticalSpace;
                    report.skipped.push(word.to_string());
                    continue;
                }
                report.placed += 1;
                if cursor.x != interior.left {
                    cursor = interior.advance(cursor, 1);
                }
            }
            Ok(report)
        })?;
        if report.status == WrapStatus::InsufficientVerticalSpace {
            warn!(
                "Wrapped text ran out of rows; {} words skipped",
                report.skipped.len()
            );
        }
        self.update_content(id)?;
        Ok(report)
    }

    /// Blanks `len` interior cells from `pos`, wrapping at the right edge.
    /// Returns the number of cells blanked.
    pub fn delete_range_in_position(&mut self, id: WindowId, pos: Vec2, len: usize) -> Result<usize> {
        let interior = Interior::of(self.window(id)?.size);
        if interior.is_empty() || len == 0 {
            return Ok(0);
        }
        let start = interior.clamp(pos);
        let (fill, _) = self.base_glyph(id)?;
        let surface = &mut self.window_mut(id)?.surface;
        let mut cursor = start;
        let mut blanked = 0;
        while blanked < len && cursor.y <= interior.bottom {
            surface.put(cursor, fill);
            cursor = interior.advance(cursor, 1);
            blanked += 1;
        }
        surface.set_cursor(start);
        self.update_content(id)?;
        Ok(blanked)
    }

    /// Flushes `id` and then each ancestor up to the root onto the screen.
    /// The window's cursor becomes the hardware cursor on the next present.
    pub fn update_content(&mut self, id: WindowId) -> Result<()> {
        let mut current = Some(id);
        while let Some(window) = current {
            self.flush_window(window)?;
            current = self.window(window)?.parent;
        }
        self.cursor_window = Some(id);
        Ok(())
    }

    /// Copies the dirty cells of one window onto the screen. Every window
    /// painted after it (its descendants, then later siblings of it and of
    /// its ancestors) that overlaps the copied cells is flushed again, so
    /// the screen keeps the tree's paint order.
    pub(crate) fn flush_window(&mut self, id: WindowId) -> Result<()> {
        self.window(id)?;
        let mut covered = self.copy_dirty(id);
        if covered.is_empty() {
            return Ok(());
        }
        let order = self.subtree(self.root)?;
        let later: &[WindowId] = match order.iter().position(|&w| w == id) {
            Some(at) => &order[at + 1..],
            None => &[],
        };
        for &above in later {
            let Some(window) = self.windows.get_mut(above) else {
                continue;
            };
            let rect = Rect::new(window.global, window.size);
            if covered.iter().any(|c| c.overlaps(&rect)) {
                trace!("Re-flushing '{}' over changed cells", window.title);
                window.surface.mark_all_dirty();
                self.copy_dirty(above);
                covered.push(rect);
            }
        }
        Ok(())
    }

    /// Writes the dirty spans of one window to the screen buffer and returns
    /// them as screen rectangles.
    fn copy_dirty(&mut self, id: WindowId) -> Vec<Rect> {
        let Some(window) = self.windows.get_mut(id) else {
            return Vec::new();
        };
        let origin = window.global;
        let spans = window.surface.take_dirty();
        for span in &spans {
            for x in span.first..=span.last {
                if let Some(glyph) = window.surface.get(Vec2::new(x, span.row)) {
                    self.screen.set(origin.x + x, origin.y + span.row, glyph);
                }
            }
        }
        spans
            .iter()
            .map(|span| {
                Rect::new(
                    Vec2::new(origin.x + span.first, origin.y + span.row),
                    Vec2::new(span.last - span.first + 1, 1),
                )
            })
            .collect()
    }
}

/// Screen-space rectangle.
#[derive(Debug, Clone, Copy)]
struct Rect {
    origin: Vec2,
    size: Vec2,
}

impl Rect {
    fn new(origin: Vec2, size: Vec2) -> Self {
        Rect { origin, size }
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.origin.x < other.origin.x + other.size.x
            && other.origin.x < self.origin.x + self.size.x
            && self.origin.y < other.origin.y + other.size.y
            && other.origin.y < self.origin.y + self.size.y
    }
}
