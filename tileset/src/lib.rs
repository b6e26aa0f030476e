//! NLE Tileset - pixel rendering of dungeon observations
//!
//! Loads the text tile descriptions shipped with the game data
//! (`monsters.txt`, `objects.txt`, `other.txt`) into RGB tiles and draws
//! glyph grids into RGB frames.

use std::path::Path;

use tracing::{debug, warn};

mod error;
pub mod text;
mod tileset;

#[cfg(test)]
mod test_utils;

pub use error::TileError;
pub use tileset::Tileset;

use nle_shared::constants::{DUNGEON_COLS, DUNGEON_ROWS};

/// Tile width in pixels.
pub const TILE_X: usize = 16;
/// Tile height in pixels.
pub const TILE_Y: usize = 16;
/// Channels per pixel (RGB).
pub const TILE_Z: usize = 3;

/// Tiles per row of the tile sheet.
pub const TILES_PER_ROW: usize = 40;

/// Tile files in load order, relative to the data directory.
pub const DEFAULT_TILE_FILES: [&str; 3] = ["monsters.txt", "objects.txt", "other.txt"];

pub type Rgb = [u8; TILE_Z];

/// One 16x16 RGB tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub name: String,
    pub pixels: [[Rgb; TILE_X]; TILE_Y],
}

/// `(rows, cols, channels)` of a rendered dungeon frame.
pub const TILE_RENDER_SHAPE: (usize, usize, usize) =
    (DUNGEON_ROWS * TILE_Y, DUNGEON_COLS * TILE_X, TILE_Z);

/// Read the tiles of each file in order, appending them to `tiles`.
///
/// Returns the number of files read successfully: reading stops at the
/// first file that cannot be opened or parsed, so anything less than
/// `paths.len()` is a failure. An empty path list reads nothing and
/// returns 0.
pub fn init_rgb_tileset<P: AsRef<Path>>(paths: &[P], tiles: &mut Vec<Tile>) -> usize {
    match read_tile_files(paths, tiles) {
        Ok(()) => paths.len(),
        Err((read, _)) => read,
    }
}

/// Like [`init_rgb_tileset`], but reports which file failed and why.
pub(crate) fn read_tile_files<P: AsRef<Path>>(
    paths: &[P],
    tiles: &mut Vec<Tile>,
) -> Result<(), (usize, TileError)> {
    for (read, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        match text::read_tile_file(path) {
            Ok(file_tiles) => {
                debug!(path = %path.display(), tiles = file_tiles.len(), "tile file loaded");
                tiles.extend(file_tiles);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unable to load tile file");
                return Err((read, e));
            }
        }
    }
    Ok(())
}
