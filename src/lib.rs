// src/lib.rs

//! Character-cell terminal windowing.
//!
//! A [`Compositor`] owns a tree of parent-relative windows drawn onto one
//! terminal through a [`Driver`], a registry of text attributes bound to
//! indexed color pairs, a debounced key state table, and a line-wrapped
//! text-entry primitive built on top of them.

pub mod arena;
pub mod attribute;
pub mod backends;
pub mod color;
pub mod compositor;
pub mod config;
pub mod content;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod keys;
pub mod renderer;
pub mod screen;
pub mod text_input;
pub mod window;

pub use attribute::{AttrId, TextAttribute};
pub use backends::{CursorVisibility, Driver, HeadlessDriver, KeyPoll};
pub use color::{ColorPair, NamedColor, Rgb1000};
pub use compositor::{Compositor, Correction};
pub use config::Config;
pub use content::{PutReport, WrapReport, WrapStatus};
pub use error::{Error, Result};
pub use geometry::Vec2;
pub use glyph::{AttrFlags, BorderGlyphs, Glyph};
pub use keys::{KeyState, KeyStateTable};
pub use text_input::{CancelToken, LineInput, LineOutcome, Terminator, WordRead};
pub use window::{Window, WindowId};
