// src/error.rs

//! Error type shared by every compositor operation.

use thiserror::Error;

use crate::geometry::Vec2;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("stale {kind} handle {handle}")]
    StaleHandle { kind: &'static str, handle: String },

    #[error("invalid geometry for window '{title}': {reason}")]
    InvalidGeometry { title: String, reason: String },

    #[error("window '{child}' cannot be parented to '{parent}': {reason}")]
    InvalidParent {
        child: String,
        parent: String,
        reason: &'static str,
    },

    #[error("the root window cannot be {0}")]
    RootWindow(&'static str),

    #[error("the default text attribute cannot be destroyed")]
    DefaultAttribute,

    #[error("color pair table exhausted ({capacity} pairs)")]
    ColorPairsExhausted { capacity: u16 },

    #[error("attribute '{label}' disabled out of order")]
    UnbalancedAttribute { label: String },

    #[error("terminal does not support changing colors")]
    ColorChangeUnsupported,

    #[error("rgb channels must be within 0..=1000, got ({r}, {g}, {b})")]
    InvalidRgb { r: u16, g: u16, b: u16 },

    #[error("cursor at {at} cannot retreat {by} cells past the top margin")]
    CursorUnderflow { at: Vec2, by: usize },

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn stale<T>(kind: &'static str, handle: crate::arena::Handle<T>) -> Self {
        Error::StaleHandle {
            kind,
            handle: format!("{:?}", handle),
        }
    }
}
