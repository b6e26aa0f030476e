//! Text tile file parser
//!
//! ```text
//! ! comment
//! A = (71, 108, 108)
//! B = (255, 255, 255)
//! # tile 0 (giant ant)
//! {
//!   AAAAAAAAAAAAAAAA
//!   ... 16 rows of 16 palette keys ...
//! }
//! ```
//!
//! Palette entries may appear anywhere outside a tile and apply to the
//! tiles that follow them in the same file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::TileError;
use crate::{Rgb, TILE_X, TILE_Y, Tile};

/// Read every tile of one file.
pub fn read_tile_file(path: &Path) -> Result<Vec<Tile>, TileError> {
    let file = File::open(path).map_err(|source| TileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tiles(BufReader::new(file))
}

/// Parse tiles from text.
pub fn parse_tiles<R: BufRead>(reader: R) -> Result<Vec<Tile>, TileError> {
    let mut palette: HashMap<char, Rgb> = HashMap::new();
    let mut tiles = Vec::new();
    let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));

    while let Some((number, line)) = lines.next() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('!') {
            continue;
        }
        if let Some(header) = text.strip_prefix('#') {
            let name = tile_name(header);
            let pixels = read_tile_body(&mut lines, &palette, number)?;
            tiles.push(Tile { name, pixels });
            continue;
        }
        let (key, color) = parse_palette_entry(text).ok_or_else(|| TileError::Palette {
            line: number,
            text: text.to_string(),
        })?;
        palette.insert(key, color);
    }
    Ok(tiles)
}

/// `" tile 12 (giant ant)"` → `"giant ant"`; falls back to the raw header.
fn tile_name(header: &str) -> String {
    match (header.find('('), header.rfind(')')) {
        (Some(open), Some(close)) if open < close => header[open + 1..close].to_string(),
        _ => header.trim().to_string(),
    }
}

/// `A = (71, 108, 108)`
fn parse_palette_entry(text: &str) -> Option<(char, Rgb)> {
    let (key, value) = text.split_once('=')?;
    let mut key_chars = key.trim().chars();
    let key = key_chars.next()?;
    if key_chars.next().is_some() {
        return None;
    }

    let inner = value.trim().strip_prefix('(')?.strip_suffix(')')?;
    let mut channels = inner.split(',').map(|c| c.trim().parse::<u8>());
    let color = [
        channels.next()?.ok()?,
        channels.next()?.ok()?,
        channels.next()?.ok()?,
    ];
    if channels.next().is_some() {
        return None;
    }
    Some((key, color))
}

fn read_tile_body<I>(
    lines: &mut I,
    palette: &HashMap<char, Rgb>,
    header_line: usize,
) -> Result<[[Rgb; TILE_X]; TILE_Y], TileError>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let mut next_line = |expect: &str| -> Result<(usize, String), TileError> {
        match lines.next() {
            Some((number, line)) => Ok((number, line?.trim().to_string())),
            None => Err(TileError::MalformedTile {
                line: header_line,
                reason: format!("file ends before {expect}"),
            }),
        }
    };

    let (number, open) = next_line("'{'")?;
    if open != "{" {
        return Err(TileError::MalformedTile {
            line: number,
            reason: format!("expected '{{', found '{open}'"),
        });
    }

    let mut pixels = [[[0u8; 3]; TILE_X]; TILE_Y];
    for row in pixels.iter_mut() {
        let (number, text) = next_line("the last pixel row")?;
        if text.chars().count() != TILE_X {
            return Err(TileError::MalformedTile {
                line: number,
                reason: format!("row '{text}' is not {TILE_X} pixels wide"),
            });
        }
        for (pixel, key) in row.iter_mut().zip(text.chars()) {
            *pixel = *palette
                .get(&key)
                .ok_or(TileError::UnknownKey { line: number, key })?;
        }
    }

    let (number, close) = next_line("'}'")?;
    if close != "}" {
        return Err(TileError::MalformedTile {
            line: number,
            reason: format!("expected '}}', found '{close}'"),
        });
    }
    Ok(pixels)
}
