//! Shared helpers for tileset tests

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{Rgb, TILE_X, TILE_Y, Tileset};

pub const PALETTE: &str = "! test palette\nA = (71, 108, 108)\nB = (255, 0, 10)\n";

/// One tile filled with a single palette key.
pub fn tile_text(name: &str, key: char) -> String {
    let row = key.to_string().repeat(TILE_X);
    let mut text = format!("# tile 0 ({name})\n{{\n");
    for _ in 0..TILE_Y {
        let _ = writeln!(text, "  {row}");
    }
    text.push_str("}\n");
    text
}

/// Write a file with one solid tile per `(key, colour)` entry.
pub fn write_tile_file(dir: &Path, name: &str, tiles: &[(char, Rgb)]) -> PathBuf {
    let mut text = String::new();
    for (i, (key, [r, g, b])) in tiles.iter().enumerate() {
        let _ = writeln!(text, "{key} = ({r}, {g}, {b})");
        text.push_str(&tile_text(&format!("tile {i}"), *key));
    }
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

/// A tileset of `count` solid tiles where tile `i` has red channel `i`.
pub fn sample_tileset(dir: &TempDir, count: usize) -> Tileset {
    let tiles: Vec<(char, Rgb)> = (0..count).map(|i| ('X', [i as u8, 0, 0])).collect();
    let path = write_tile_file(dir.path(), "sample.txt", &tiles);
    Tileset::load(&[path]).unwrap()
}
