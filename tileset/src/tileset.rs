//! Loaded tiles and frame rendering.

use std::path::Path;

use image::{Rgb as Pixel, RgbImage};
use nle_shared::DungeonGrid;
use nle_shared::constants::{DUNGEON_COLS, DUNGEON_ROWS};
use tracing::debug;

use crate::error::TileError;
use crate::{DEFAULT_TILE_FILES, TILE_RENDER_SHAPE, TILE_X, TILE_Y, TILE_Z, TILES_PER_ROW, Tile};

/// Tiles in sheet order. Empty until set up.
#[derive(Debug, Clone, Default)]
pub struct Tileset {
    tiles: Vec<Tile>,
}

impl Tileset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tiles from `paths`, in order.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, TileError> {
        let mut tileset = Self::new();
        tileset.setup(paths)?;
        Ok(tileset)
    }

    /// Load the stock tile files from a data directory.
    pub fn load_dir(dir: &Path) -> Result<Self, TileError> {
        let paths: Vec<_> = DEFAULT_TILE_FILES.iter().map(|name| dir.join(name)).collect();
        Self::load(&paths)
    }

    /// Replace the loaded tiles. On failure the previous tiles are kept.
    pub fn setup<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), TileError> {
        if paths.is_empty() {
            return Err(TileError::NotLoaded);
        }
        let mut tiles = Vec::new();
        crate::read_tile_files(paths, &mut tiles).map_err(|(_, e)| e)?;
        debug!(files = paths.len(), tiles = tiles.len(), "tileset ready");
        self.tiles = tiles;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        !self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Pixel size `(rows, cols)` of the tile sheet, `TILES_PER_ROW` wide.
    pub fn sheet_shape(&self) -> (usize, usize) {
        let tile_rows = self.tiles.len().div_ceil(TILES_PER_ROW);
        (tile_rows * TILE_Y, TILES_PER_ROW * TILE_X)
    }

    /// Colour of a sheet pixel; black past the last tile.
    fn sheet_pixel(&self, row: usize, col: usize) -> [u8; TILE_Z] {
        let index = (row / TILE_Y) * TILES_PER_ROW + col / TILE_X;
        self.tiles
            .get(index)
            .map_or([0; TILE_Z], |tile| tile.pixels[row % TILE_Y][col % TILE_X])
    }

    /// Copy the top-left `rows` x `cols` pixels of the tile sheet into an
    /// RGB frame. A frame smaller than the sheet receives a crop; a larger
    /// one is rejected.
    pub fn copy_into(&self, frame: &mut [u8], rows: usize, cols: usize) -> Result<(), TileError> {
        if !self.is_loaded() {
            return Err(TileError::NotLoaded);
        }
        let sheet = self.sheet_shape();
        if rows > sheet.0 || cols > sheet.1 {
            return Err(TileError::FrameShape {
                expected: sheet,
                actual: (rows, cols),
            });
        }
        check_len(frame, rows, cols)?;

        for (row, line) in frame.chunks_exact_mut(cols * TILE_Z).take(rows).enumerate() {
            for (col, pixel) in line.chunks_exact_mut(TILE_Z).enumerate() {
                pixel.copy_from_slice(&self.sheet_pixel(row, col));
            }
        }
        Ok(())
    }

    /// Draw a glyph grid into an RGB frame of `TILE_RENDER_SHAPE`.
    ///
    /// `glyph_to_tile` maps glyph numbers to tile indices. Glyphs outside
    /// the table, and tiles outside the tileset, are drawn black.
    pub fn draw_glyphs(
        &self,
        glyphs: &DungeonGrid<i16>,
        glyph_to_tile: &[u16],
        frame: &mut [u8],
        rows: usize,
        cols: usize,
    ) -> Result<(), TileError> {
        if !self.is_loaded() {
            return Err(TileError::NotLoaded);
        }
        let expected = (TILE_RENDER_SHAPE.0, TILE_RENDER_SHAPE.1);
        if (rows, cols) != expected {
            return Err(TileError::FrameShape {
                expected,
                actual: (rows, cols),
            });
        }
        check_len(frame, rows, cols)?;

        let blank = [[[0u8; TILE_Z]; TILE_X]; TILE_Y];
        for y in 0..DUNGEON_ROWS {
            for x in 0..DUNGEON_COLS {
                let pixels = usize::try_from(glyphs[(y, x)])
                    .ok()
                    .and_then(|glyph| glyph_to_tile.get(glyph))
                    .and_then(|&tile| self.tiles.get(usize::from(tile)))
                    .map_or(&blank, |tile| &tile.pixels);

                for (ty, tile_row) in pixels.iter().enumerate() {
                    let start = ((y * TILE_Y + ty) * cols + x * TILE_X) * TILE_Z;
                    let dst = &mut frame[start..start + TILE_X * TILE_Z];
                    for (pixel, rgb) in dst.chunks_exact_mut(TILE_Z).zip(tile_row) {
                        pixel.copy_from_slice(rgb);
                    }
                }
            }
        }
        Ok(())
    }

    /// Render a glyph grid to an image.
    pub fn render_glyphs(
        &self,
        glyphs: &DungeonGrid<i16>,
        glyph_to_tile: &[u16],
    ) -> Result<RgbImage, TileError> {
        let (rows, cols, channels) = TILE_RENDER_SHAPE;
        let mut frame = vec![0u8; rows * cols * channels];
        self.draw_glyphs(glyphs, glyph_to_tile, &mut frame, rows, cols)?;
        RgbImage::from_raw(cols as u32, rows as u32, frame).ok_or(TileError::BufferTooSmall {
            needed: rows * cols * channels,
            len: 0,
        })
    }

    /// The whole tile sheet as an image, for PNG export.
    pub fn to_rgb_image(&self) -> Result<RgbImage, TileError> {
        if !self.is_loaded() {
            return Err(TileError::NotLoaded);
        }
        let (rows, cols) = self.sheet_shape();
        Ok(RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
            Pixel(self.sheet_pixel(y as usize, x as usize))
        }))
    }
}

fn check_len(frame: &[u8], rows: usize, cols: usize) -> Result<(), TileError> {
    let needed = rows * cols * TILE_Z;
    if frame.len() < needed {
        return Err(TileError::BufferTooSmall {
            needed,
            len: frame.len(),
        });
    }
    Ok(())
}
