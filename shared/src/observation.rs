//! The observation snapshot handed to the caller after every step.
//!
//! Every field has a fixed shape. At each suspension the whole record is
//! rewritten from program state; nothing from a previous step leaks into
//! the next one.

use crate::constants::{
    BLSTATS_SIZE, DUNGEON_COLS, DUNGEON_ROWS, INTERNAL_SIZE, INVENTORY_SIZE,
    INVENTORY_STR_LENGTH, MAXOCLASSES, MESSAGE_SIZE, MISC_SIZE, NO_GLYPH, NOT_DONE,
    PROGRAM_STATE_SIZE, SCREEN_DESCRIPTION_LENGTH, TERM_CO, TERM_LI, blstats,
};
use crate::grid::Grid;

/// Grid shaped like the dungeon map (21 x 79).
pub type DungeonGrid<T> = Grid<T, DUNGEON_ROWS, DUNGEON_COLS>;

/// Grid shaped like the terminal (24 x 80).
pub type TerminalGrid<T> = Grid<T, TERM_LI, TERM_CO>;

/// Full observation of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Last action consumed by the program.
    pub action: i32,
    pub done: bool,
    /// The program is past its start-up screens and inside the move loop.
    pub in_normal_game: bool,
    /// `HowDone` code when `done`, otherwise `NOT_DONE`.
    pub how_done: i32,

    pub glyphs: DungeonGrid<i16>,
    pub chars: DungeonGrid<u8>,
    pub colors: DungeonGrid<u8>,
    pub specials: DungeonGrid<u8>,

    pub blstats: [i64; BLSTATS_SIZE],
    /// NUL-terminated top-line message.
    pub message: [u8; MESSAGE_SIZE],
    pub program_state: [i32; PROGRAM_STATE_SIZE],
    pub internal: [i32; INTERNAL_SIZE],
    pub misc: [i32; MISC_SIZE],

    pub inv_glyphs: [i16; INVENTORY_SIZE],
    pub inv_strs: Grid<u8, INVENTORY_SIZE, INVENTORY_STR_LENGTH>,
    pub inv_letters: [u8; INVENTORY_SIZE],
    pub inv_oclasses: [u8; INVENTORY_SIZE],

    pub screen_descriptions: DungeonGrid<[u8; SCREEN_DESCRIPTION_LENGTH]>,

    pub tty_chars: TerminalGrid<u8>,
    pub tty_colors: TerminalGrid<i8>,
    /// `(row, col)` of the terminal cursor.
    pub tty_cursor: [u8; 2],
}

impl Observation {
    pub fn new() -> Self {
        Self {
            action: 0,
            done: false,
            in_normal_game: false,
            how_done: NOT_DONE,
            glyphs: Grid::filled(NO_GLYPH),
            chars: Grid::filled(b' '),
            colors: Grid::filled(0),
            specials: Grid::filled(0),
            blstats: [0; BLSTATS_SIZE],
            message: [0; MESSAGE_SIZE],
            program_state: [0; PROGRAM_STATE_SIZE],
            internal: [0; INTERNAL_SIZE],
            misc: [0; MISC_SIZE],
            inv_glyphs: [NO_GLYPH; INVENTORY_SIZE],
            inv_strs: Grid::filled(0),
            inv_letters: [0; INVENTORY_SIZE],
            inv_oclasses: [MAXOCLASSES; INVENTORY_SIZE],
            screen_descriptions: Grid::filled([0; SCREEN_DESCRIPTION_LENGTH]),
            tty_chars: Grid::filled(b' '),
            tty_colors: Grid::filled(0),
            tty_cursor: [0; 2],
        }
    }

    /// Reset every program-derived field to its blank value.
    ///
    /// `action` is kept; it describes the input that led here.
    pub fn clear(&mut self) {
        self.done = false;
        self.in_normal_game = false;
        self.how_done = NOT_DONE;
        self.glyphs.fill(NO_GLYPH);
        self.chars.fill(b' ');
        self.colors.fill(0);
        self.specials.fill(0);
        self.blstats = [0; BLSTATS_SIZE];
        self.message = [0; MESSAGE_SIZE];
        self.program_state = [0; PROGRAM_STATE_SIZE];
        self.internal = [0; INTERNAL_SIZE];
        self.misc = [0; MISC_SIZE];
        self.inv_glyphs = [NO_GLYPH; INVENTORY_SIZE];
        self.inv_strs.fill(0);
        self.inv_letters = [0; INVENTORY_SIZE];
        self.inv_oclasses = [MAXOCLASSES; INVENTORY_SIZE];
        self.screen_descriptions.fill([0; SCREEN_DESCRIPTION_LENGTH]);
        self.tty_chars.fill(b' ');
        self.tty_colors.fill(0);
        self.tty_cursor = [0; 2];
    }

    pub fn set_message(&mut self, text: &str) {
        copy_cstr(&mut self.message, text);
    }

    /// Top-line message up to its terminator.
    pub fn message_text(&self) -> String {
        cstr_to_string(&self.message)
    }

    /// Fill one inventory slot. Out-of-range slots are ignored.
    pub fn set_inventory_slot(&mut self, slot: usize, glyph: i16, letter: u8, oclass: u8, text: &str) {
        if slot >= INVENTORY_SIZE {
            return;
        }
        self.inv_glyphs[slot] = glyph;
        self.inv_letters[slot] = letter;
        self.inv_oclasses[slot] = oclass;
        copy_cstr(self.inv_strs.row_mut(slot), text);
    }

    /// Inventory line of `slot`, or `None` for an empty slot.
    pub fn inventory_text(&self, slot: usize) -> Option<String> {
        if slot >= INVENTORY_SIZE || self.inv_letters[slot] == 0 {
            return None;
        }
        Some(cstr_to_string(self.inv_strs.row(slot)))
    }

    pub fn set_screen_description(&mut self, row: usize, col: usize, text: &str) {
        let mut entry = [0; SCREEN_DESCRIPTION_LENGTH];
        copy_cstr(&mut entry, text);
        self.screen_descriptions.set(row, col, entry);
    }

    pub fn screen_description(&self, row: usize, col: usize) -> Option<String> {
        self.screen_descriptions
            .get(row, col)
            .map(|entry| cstr_to_string(&entry))
    }

    /// Player `(x, y)` in map coordinates.
    pub fn player_position(&self) -> (i64, i64) {
        (self.blstats[blstats::X], self.blstats[blstats::Y])
    }

    /// The terminal as text lines, trailing blanks kept.
    pub fn tty_lines(&self) -> Vec<String> {
        self.tty_chars
            .rows()
            .iter()
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect()
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `text` into `dst` as a NUL-terminated string, truncating so the
/// terminator always fits. Bytes after the terminator are zeroed.
pub fn copy_cstr(dst: &mut [u8], text: &str) {
    dst.fill(0);
    if dst.is_empty() {
        return;
    }
    let len = text.len().min(dst.len() - 1);
    dst[..len].copy_from_slice(&text.as_bytes()[..len]);
}

/// Read a NUL-terminated string out of a fixed buffer.
pub fn cstr_to_string(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}
