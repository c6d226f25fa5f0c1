// src/config.rs

//! Defines the configuration structures for the window compositor.
//!
//! Every section falls back to its defaults when missing, so a partial JSON
//! file such as `{"input": {"max_word_len": 32}}` is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::color::{ColorPair, NamedColor};
use crate::error::Result;
use crate::glyph::BorderGlyphs;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "CELLWIN_CONFIG";

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub terminal: TerminalConfig,
    pub render: RenderConfig,
    pub input: InputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reads a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads the file named by `CELLWIN_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(&PathBuf::from(path)),
            None => {
                debug!("{} not set, using default configuration", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }
}

// --- Terminal Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerminalConfig {
    /// Used when the terminal reports a zero width.
    pub fallback_columns: u16,
    /// Used when the terminal reports a zero height.
    pub fallback_rows: u16,
    /// Whether the console accepts OSC 4 palette changes.
    pub can_change_color: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            fallback_columns: 80,
            fallback_rows: 24,
            can_change_color: false,
        }
    }
}

// --- Render Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Colors bound to pair 0, the pair of the default attribute.
    pub default_colors: ColorPair,
    /// Border drawn around every newly created window.
    pub border: BorderGlyphs,
    /// Upper bound on color pairs; the driver may lower it further.
    pub max_color_pairs: u16,
    /// Size in bytes of the scratch buffer used by formatted writes.
    pub max_message_len: usize,
    /// Number of bounds corrections retained for inspection.
    pub diagnostic_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            default_colors: ColorPair::new(NamedColor::White, NamedColor::Black),
            border: BorderGlyphs::default(),
            max_color_pairs: 256,
            max_message_len: 512,
            diagnostic_capacity: 64,
        }
    }
}

// --- Input Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Characters accepted into one word before the word is cut off.
    pub max_word_len: usize,
    /// Bytes accepted into one line of text input.
    pub max_line_len: usize,
    /// Ticks per second; text input idles one tick between empty polls.
    pub tick_rate_hz: u32,
}

impl InputConfig {
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            max_word_len: 64,
            max_line_len: 1024,
            tick_rate_hz: 50,
        }
    }
}

// --- Logging Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file; the terminal itself is the display.
    pub file: PathBuf,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: PathBuf::from("debug.log"),
            default_filter: "info".to_string(),
        }
    }
}
