// src/text_input.rs

//! Line-wrapped text entry inside a window's border.
//!
//! Keys are taken one at a time from the compositor's typed-key queue, which
//! is refilled by ticking the compositor whenever it runs dry. Typed
//! characters are echoed as they arrive. Completed words are re-laid out so
//! that no word straddles the right edge of the interior.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, trace};

use crate::backends::{CursorVisibility, Driver};
use crate::compositor::Compositor;
use crate::content::Interior;
use crate::error::Result;
use crate::geometry::Vec2;
use crate::keys::code;
use crate::window::WindowId;

/// Shared flag that asks an in-progress read to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// The underlying flag, for registration with signal handlers.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// Why a word read ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Enter,
    Space,
    Backspace,
    /// The word reached the configured maximum length.
    Limit,
    /// No interior cell was left to echo into.
    OutOfSpace,
    /// The input stream ended.
    Closed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRead {
    pub word: String,
    pub terminator: Terminator,
    /// Cell after the last echoed character.
    pub end: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Enter was pressed.
    Completed,
    WordLimit,
    LineLimit,
    OutOfSpace,
    Closed,
    Cancelled,
}

/// Result of `read_line_wrapped`; partial on every outcome but `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInput {
    /// Committed words, each followed by one space.
    pub text: String,
    pub cursor: Vec2,
    pub outcome: LineOutcome,
}

/// Forces the cursor visible while alive; restores the default on drop.
pub struct CursorGuard<'a, D: Driver> {
    compositor: &'a mut Compositor<D>,
}

impl<'a, D: Driver> CursorGuard<'a, D> {
    pub fn new(compositor: &'a mut Compositor<D>) -> Self {
        compositor.set_cursor_visibility(CursorVisibility::Visible);
        Self { compositor }
    }
}

impl<D: Driver> Deref for CursorGuard<'_, D> {
    type Target = Compositor<D>;

    fn deref(&self) -> &Self::Target {
        self.compositor
    }
}

impl<D: Driver> DerefMut for CursorGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.compositor
    }
}

impl<D: Driver> Drop for CursorGuard<'_, D> {
    fn drop(&mut self) {
        self.compositor
            .set_cursor_visibility(CursorVisibility::Default);
        if let Err(e) = self.compositor.present() {
            error!("Failed to restore cursor visibility: {}", e);
        }
    }
}

enum NextKey {
    Key(i32),
    Closed,
}

impl<D: Driver> Compositor<D> {
    /// Next typed key, ticking (and idling one tick interval) while none is
    /// queued.
    fn next_typed_key(&mut self, cancel: &CancelToken) -> Result<Option<NextKey>> {
        if let Some(key) = self.pop_typed_key() {
            return Ok(Some(NextKey::Key(key)));
        }
        if self.input_closed() {
            return Ok(Some(NextKey::Closed));
        }
        self.present()?;
        self.tick()?;
        if let Some(key) = self.pop_typed_key() {
            return Ok(Some(NextKey::Key(key)));
        }
        if self.input_closed() {
            return Ok(Some(NextKey::Closed));
        }
        if !cancel.is_cancelled() {
            let interval = self.config.input.tick_interval();
            self.driver.wait_for_input(interval)?;
        }
        Ok(None)
    }

    /// Continues `word`, echoing each printable key at `cursor`.
    fn read_word_into(
        &mut self,
        id: WindowId,
        cursor: &mut Vec2,
        word: &mut String,
        cancel: &CancelToken,
    ) -> Result<Terminator> {
        let interior = Interior::of(self.window_size(id)?);
        let max_word_len = self.config.input.max_word_len;
        loop {
            if cancel.is_cancelled() {
                return Ok(Terminator::Cancelled);
            }
            let key = match self.next_typed_key(cancel)? {
                Some(NextKey::Key(key)) => key,
                Some(NextKey::Closed) => return Ok(Terminator::Closed),
                None => continue,
            };
            trace!("read_word: key {}", key);
            if code::is_enter(key) {
                return Ok(Terminator::Enter);
            }
            if key == code::SPACE {
                return Ok(Terminator::Space);
            }
            if code::is_backspace(key) {
                return Ok(Terminator::Backspace);
            }
            if !code::is_printable(key) {
                continue;
            }
            if interior.is_empty() || cursor.y > interior.bottom {
                return Ok(Terminator::OutOfSpace);
            }
            let c = key as u8 as char;
            self.put_char(id, *cursor, None, c)?;
            word.push(c);
            *cursor = interior.advance(*cursor, 1);
            if word.len() >= max_word_len {
                error!("Word reached the {} character limit", max_word_len);
                return Ok(Terminator::Limit);
            }
        }
    }

    /// Reads one word starting at `start`, echoing it inside the window.
    /// A start on or outside the border is moved to the nearest interior cell.
    pub fn read_word(
        &mut self,
        id: WindowId,
        start: Vec2,
        cancel: &CancelToken,
    ) -> Result<WordRead> {
        let interior = Interior::of(self.window_size(id)?);
        let mut end = self.clamp_into_interior(id, &interior, start);
        let mut word = String::new();
        let terminator = self.read_word_into(id, &mut end, &mut word, cancel)?;
        Ok(WordRead {
            word,
            terminator,
            end,
        })
    }

    /// Erases `word` from `at` and draws it again at `to`.
    fn move_word(&mut self, id: WindowId, at: Vec2, to: Vec2, word: &str) -> Result<()> {
        let interior = Interior::of(self.window_size(id)?);
        self.delete_range_in_position(id, at, word.len())?;
        let mut cursor = to;
        for c in word.chars() {
            self.put_char(id, cursor, None, c)?;
            cursor = interior.advance(cursor, 1);
        }
        Ok(())
    }

    /// Reads words until Enter, wrapping them inside the window's border.
    ///
    /// The cursor is visible for the duration of the call. Backspace edits
    /// the word being typed, or re-opens the last committed word when none
    /// is. Aborted reads log an error and return what was committed so far.
    pub fn read_line_wrapped(
        &mut self,
        id: WindowId,
        start: Vec2,
        cancel: &CancelToken,
    ) -> Result<LineInput> {
        let mut comp = CursorGuard::new(self);
        let interior = Interior::of(comp.window_size(id)?);
        let max_line_len = comp.config.input.max_line_len;
        let start = comp.clamp_into_interior(id, &interior, start);

        let mut text = String::new();
        let mut cursor = start;
        let mut word = String::new();
        let mut word_start = start;
        let mut committed: Vec<(Vec2, String)> = Vec::new();

        let outcome = loop {
            match comp.read_word_into(id, &mut cursor, &mut word, cancel)? {
                terminator @ (Terminator::Space | Terminator::Enter) => {
                    if !word.is_empty() {
                        if text.len() + word.len() + 1 > max_line_len {
                            break LineOutcome::LineLimit;
                        }
                        let len = word.chars().count();
                        let mut placed_at = word_start;
                        if word_start.x != interior.left
                            && word_start.x + len as i32 - 1 > interior.right
                        {
                            placed_at = Vec2::new(interior.left, word_start.y + 1);
                            if placed_at.y > interior.bottom {
                                break LineOutcome::OutOfSpace;
                            }
                            comp.move_word(id, word_start, placed_at, &word)?;
                        }
                        text.push_str(&word);
                        text.push(' ');
                        cursor = interior.advance(placed_at, len + 1);
                        debug!("Committed word '{}' at {}", word, placed_at);
                        committed.push((placed_at, std::mem::take(&mut word)));
                        word_start = cursor;
                    }
                    if terminator == Terminator::Enter {
                        break LineOutcome::Completed;
                    }
                }
                Terminator::Backspace => {
                    if word.pop().is_some() {
                        cursor = interior.retreat(cursor, 1)?;
                        comp.delete_range_in_position(id, cursor, 1)?;
                    } else if let Some((at, previous)) = committed.pop() {
                        text.truncate(text.len() - previous.len() - 1);
                        cursor = interior.advance(at, previous.chars().count());
                        word_start = at;
                        word = previous;
                        trace!("Re-opened word '{}'", word);
                    }
                }
                Terminator::Limit => break LineOutcome::WordLimit,
                Terminator::OutOfSpace => break LineOutcome::OutOfSpace,
                Terminator::Closed => break LineOutcome::Closed,
                Terminator::Cancelled => break LineOutcome::Cancelled,
            }
        };

        if outcome != LineOutcome::Completed {
            error!(
                "Text input aborted ({:?}) after {} committed bytes",
                outcome,
                text.len()
            );
        }
        comp.set_cursor_position(id, cursor.clamp_below(interior_end(&interior)))?;
        Ok(LineInput {
            text,
            cursor,
            outcome,
        })
    }
}

/// Exclusive bound covering the interior, for clamping the window cursor.
fn interior_end(interior: &Interior) -> Vec2 {
    Vec2::new(interior.right + 1, interior.bottom + 1)
}
