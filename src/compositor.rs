// src/compositor.rs

//! The `Compositor` owns every piece of windowing state for one terminal
//! session: the window arena, the attribute registry, the key table and the
//! composited screen. Operations are spread over the `window`, `content`,
//! `attribute` and `text_input` modules as further `impl` blocks.
//!
//! An application calls [`Compositor::tick`] once per frame before reading
//! key state and [`Compositor::present`] once after drawing.

use std::collections::VecDeque;

use log::{debug, info, trace, warn};

use crate::arena::Arena;
use crate::attribute::AttributeRegistry;
use crate::backends::{CellCoords, CursorVisibility, Driver, KeyPoll};
use crate::config::Config;
use crate::error::Result;
use crate::geometry::Vec2;
use crate::keys::{KeyState, KeyStateTable};
use crate::renderer::Renderer;
use crate::screen::ScreenBuffer;
use crate::window::{Window, WindowId};

pub const ROOT_WINDOW_TITLE: &str = "root";

/// A bounds problem that was silently repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// The window would have extended past the terminal and was moved back.
    WindowTranslated {
        window: WindowId,
        requested: Vec2,
        corrected: Vec2,
    },
    /// A cursor position was clamped into the window.
    CursorClamped {
        window: WindowId,
        requested: Vec2,
        corrected: Vec2,
    },
}

pub struct Compositor<D: Driver> {
    pub(crate) driver: D,
    pub(crate) config: Config,
    pub(crate) windows: Arena<Window>,
    pub(crate) root: WindowId,
    pub(crate) attributes: AttributeRegistry,
    pub(crate) keys: KeyStateTable,
    pub(crate) typed: VecDeque<i32>,
    pub(crate) input_closed: bool,
    pub(crate) screen: ScreenBuffer,
    pub(crate) renderer: Renderer,
    pub(crate) corrections: VecDeque<Correction>,
    pub(crate) cursor_visibility: CursorVisibility,
    pub(crate) cursor_window: Option<WindowId>,
    ticks: u64,
}

impl<D: Driver> Compositor<D> {
    /// Takes ownership of `driver` and creates the root window covering the
    /// whole terminal.
    pub fn new(driver: D, config: Config) -> Result<Self> {
        let (mut cols, mut rows) = driver.dimensions();
        if cols == 0 || rows == 0 {
            warn!(
                "Driver reported {}x{} terminal, using fallback {}x{}",
                cols, rows, config.terminal.fallback_columns, config.terminal.fallback_rows
            );
            cols = config.terminal.fallback_columns;
            rows = config.terminal.fallback_rows;
        }
        let pair_capacity = config.render.max_color_pairs.min(driver.max_color_pairs());
        let attributes = AttributeRegistry::new(config.render.default_colors, pair_capacity);
        let size = Vec2::new(cols as i32, rows as i32);
        let mut root_window = Window::new(
            ROOT_WINDOW_TITLE,
            Vec2::ZERO,
            size,
            attributes.default_attribute(),
            None,
            None,
        );
        // Blank, like the fresh screen; nothing to flush yet.
        root_window.surface.take_dirty();
        let mut windows = Arena::new();
        let root = windows.insert(root_window);
        info!(
            "Compositor initialised: {}x{} terminal, {} color pairs",
            cols, rows, pair_capacity
        );
        let capacity = config.render.diagnostic_capacity;
        Ok(Self {
            driver,
            config,
            windows,
            root,
            attributes,
            keys: KeyStateTable::new(),
            typed: VecDeque::new(),
            input_closed: false,
            screen: ScreenBuffer::new(cols as usize, rows as usize),
            renderer: Renderer::new(),
            corrections: VecDeque::with_capacity(capacity),
            cursor_visibility: CursorVisibility::Default,
            cursor_window: None,
            ticks: 0,
        })
    }

    /// Samples input for one frame: resets the sampled flags, drains every
    /// pending key from the driver and advances each key's state.
    ///
    /// The typed-key queue is cleared first and refilled with this tick's
    /// codes in arrival order.
    pub fn tick(&mut self) -> Result<()> {
        self.ticks += 1;
        self.keys.begin_tick();
        self.typed.clear();
        loop {
            match self.driver.poll_key()? {
                KeyPoll::Key(key) => {
                    trace!("tick {}: key {}", self.ticks, key);
                    self.keys.sample(key);
                    self.typed.push_back(key);
                }
                KeyPoll::Empty => break,
                KeyPoll::Closed => {
                    if !self.input_closed {
                        info!("Input stream closed");
                        self.input_closed = true;
                    }
                    break;
                }
            }
        }
        self.keys.end_tick();
        if !self.typed.is_empty() {
            debug!("tick {}: {} keys", self.ticks, self.typed.len());
        }
        Ok(())
    }

    /// Draws the dirty parts of the screen, places the hardware cursor and
    /// flushes the driver.
    pub fn present(&mut self) -> Result<()> {
        self.renderer
            .draw(&mut self.screen, self.attributes.pairs(), &mut self.driver)?;
        let cursor = self.hardware_cursor();
        self.driver.set_cursor(cursor, self.cursor_visibility)?;
        self.driver.present()
    }

    /// Screen cell of the cursor of the most recently drawn-to window.
    fn hardware_cursor(&self) -> Option<CellCoords> {
        let window = self.windows.get(self.cursor_window?)?;
        let pos = window.global_position() + window.surface().cursor();
        let (cols, rows) = self.screen.dimensions();
        let pos = Vec2::new(pos.x.clamp(0, cols as i32 - 1), pos.y.clamp(0, rows as i32 - 1));
        Some(CellCoords {
            x: pos.x as usize,
            y: pos.y as usize,
        })
    }

    /// Applied on the next `present`.
    pub fn set_cursor_visibility(&mut self, visibility: CursorVisibility) {
        if visibility != self.cursor_visibility {
            debug!("Cursor visibility {:?} -> {:?}", self.cursor_visibility, visibility);
        }
        self.cursor_visibility = visibility;
    }

    pub fn cursor_visibility(&self) -> CursorVisibility {
        self.cursor_visibility
    }

    pub(crate) fn record(&mut self, correction: Correction) {
        let capacity = self.config.render.diagnostic_capacity;
        if capacity == 0 {
            return;
        }
        while self.corrections.len() >= capacity {
            self.corrections.pop_front();
        }
        self.corrections.push_back(correction);
    }

    /// Recorded bounds corrections, oldest first.
    pub fn corrections(&self) -> impl Iterator<Item = &Correction> {
        self.corrections.iter()
    }

    pub fn clear_corrections(&mut self) {
        self.corrections.clear();
    }

    pub fn key_state(&self, key: i32) -> KeyState {
        self.keys.get_key_state(key)
    }

    pub fn get_key(&self, state: KeyState, key: i32) -> bool {
        self.keys.get_key(state, key)
    }

    pub fn keys(&self) -> &KeyStateTable {
        &self.keys
    }

    /// Codes drained by the most recent tick that text input has not consumed.
    pub fn typed_keys(&self) -> impl Iterator<Item = &i32> {
        self.typed.iter()
    }

    pub(crate) fn pop_typed_key(&mut self) -> Option<i32> {
        self.typed.pop_front()
    }

    pub fn input_closed(&self) -> bool {
        self.input_closed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn root(&self) -> WindowId {
        self.root
    }

    /// Terminal size as `(columns, rows)` in a `Vec2`.
    pub fn terminal_size(&self) -> Vec2 {
        self.screen.size()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Restores the terminal through the driver.
    pub fn shutdown(&mut self) -> Result<()> {
        info!("Compositor shutting down after {} ticks", self.ticks);
        self.driver.cleanup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::HeadlessDriver;
    use crate::keys::code;
    use test_log::test;

    fn compositor(driver: HeadlessDriver) -> Compositor<HeadlessDriver> {
        Compositor::new(driver, Config::default()).unwrap()
    }

    #[test]
    fn root_covers_the_terminal() {
        let comp = compositor(HeadlessDriver::new(80, 24));
        assert_eq!(comp.terminal_size(), Vec2::new(80, 24));
        assert_eq!(comp.window_size(comp.root()).unwrap(), Vec2::new(80, 24));
        assert_eq!(comp.global_position(comp.root()).unwrap(), Vec2::ZERO);
    }

    #[test]
    fn zero_sized_driver_uses_fallback() {
        let comp = compositor(HeadlessDriver::new(0, 0));
        assert_eq!(comp.terminal_size(), Vec2::new(80, 24));
    }

    #[test]
    fn pair_capacity_is_the_smaller_bound() {
        let comp = compositor(HeadlessDriver::new(10, 5).with_max_color_pairs(16));
        assert_eq!(comp.attributes().pairs().capacity(), 16);
    }

    #[test]
    fn tick_fills_queue_in_arrival_order() {
        let mut driver = HeadlessDriver::new(10, 5).close_when_drained(false);
        driver.push_text("ab");
        driver.push_key(code::UP);
        driver.push_pause();
        driver.push_text("c");
        let mut comp = compositor(driver);

        comp.tick().unwrap();
        let typed: Vec<_> = comp.typed_keys().copied().collect();
        assert_eq!(typed, vec![97, 98, code::UP]);
        assert!(comp.get_key(KeyState::Down, code::UP));

        comp.tick().unwrap();
        let typed: Vec<_> = comp.typed_keys().copied().collect();
        assert_eq!(typed, vec![99]);
        assert_eq!(comp.key_state(code::UP), KeyState::Up);
        assert!(!comp.input_closed());
    }

    #[test]
    fn closed_input_is_sticky() {
        let mut comp = compositor(HeadlessDriver::new(10, 5));
        comp.tick().unwrap();
        assert!(comp.input_closed());
        comp.tick().unwrap();
        assert!(comp.input_closed());
        assert_eq!(comp.ticks(), 2);
    }

    #[test]
    fn corrections_ring_drops_oldest() {
        let mut config = Config::default();
        config.render.diagnostic_capacity = 2;
        let mut comp = Compositor::new(HeadlessDriver::new(10, 5), config).unwrap();
        let root = comp.root();
        for x in 0..3 {
            comp.record(Correction::CursorClamped {
                window: root,
                requested: Vec2::new(x, 0),
                corrected: Vec2::ZERO,
            });
        }
        let requested: Vec<_> = comp
            .corrections()
            .map(|c| match c {
                Correction::CursorClamped { requested, .. } => requested.x,
                Correction::WindowTranslated { .. } => -1,
            })
            .collect();
        assert_eq!(requested, vec![1, 2]);
    }

    #[test]
    fn present_applies_visibility() {
        let mut comp = compositor(HeadlessDriver::new(10, 5));
        comp.set_cursor_visibility(CursorVisibility::Invisible);
        comp.present().unwrap();
        assert_eq!(comp.driver().visibility(), CursorVisibility::Invisible);
        assert_eq!(comp.driver().presents(), 1);
    }
}
