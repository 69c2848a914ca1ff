//! Setup errors. Everything past setup is total.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid can't be smaller than 2x2 (got {width}x{height})")]
    GridTooSmall { width: usize, height: usize },

    #[error("there must be at least 2 colors defined (got {0})")]
    TooFewColors(usize),

    #[error("at most 255 colors are supported (got {0})")]
    TooManyColors(usize),

    #[error("color {color} at {column},{row} is outside the palette of {color_count}")]
    ColorOutOfRange {
        column: usize,
        row: usize,
        color: u8,
        color_count: u8,
    },

    #[error("column {column} has {len} rows, expected {expected}")]
    RaggedColumns {
        column: usize,
        len: usize,
        expected: usize,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
