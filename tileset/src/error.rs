//! Tileset errors.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("unable to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: malformed palette entry '{text}'")]
    Palette { line: usize, text: String },

    #[error("line {line}: malformed tile: {reason}")]
    MalformedTile { line: usize, reason: String },

    #[error("line {line}: '{key}' is not in the palette")]
    UnknownKey { line: usize, key: char },

    #[error("failed to read tile data: {0}")]
    Io(#[from] io::Error),

    #[error("buffer holds {len} bytes, {needed} needed")]
    BufferTooSmall { needed: usize, len: usize },

    #[error("frame is {actual:?} (rows, cols), expected {expected:?}")]
    FrameShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Drawing or copying before any tiles were loaded.
    #[error("tiles have not been loaded")]
    NotLoaded,
}
