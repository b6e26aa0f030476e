//! In-memory VT100 mirror of the program's terminal output
//!
//! The program draws its whole UI with escape sequences. The mirror
//! replays that stream into a fixed 24x80 grid of characters and colour
//! codes plus a cursor, which is what ends up in the `tty_*` observation
//! fields.
//!
//! Only the subset of VT100/ANSI that curses-style output needs is
//! understood: cursor motion, erase, insert/delete, scroll regions and
//! SGR colours. Unknown sequences are consumed and ignored.

mod attributes;
mod render;

pub use attributes::Attributes;
pub use render::tty_render;

use std::fmt;

use nle_shared::constants::{TERM_CO, TERM_LI};
use nle_shared::{Observation, TerminalGrid};
use smallvec::SmallVec;
use tracing::trace;
use vte::{Params, Perform};

const TAB_WIDTH: usize = 8;

/// CSI parameters flattened to one list, sub-parameters included.
type ParamList = SmallVec<[u16; 8]>;

/// Cursor position, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Borrowed view of the screen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct TerminalSnapshot<'a> {
    pub chars: &'a TerminalGrid<u8>,
    pub colors: &'a TerminalGrid<i8>,
    pub cursor: Cursor,
}

/// Escape-sequence parser plus the screen it drives.
///
/// `vte` keeps partial sequences between calls, so a sequence may arrive
/// split across several writes.
#[derive(Default)]
pub struct TerminalMirror {
    parser: vte::Parser,
    screen: Screen,
    bytes_fed: u64,
}

impl fmt::Debug for TerminalMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalMirror")
            .field("cursor", &self.screen.cursor)
            .field("attrs", &self.screen.attrs)
            .field("bytes_fed", &self.bytes_fed)
            .finish_non_exhaustive()
    }
}

impl TerminalMirror {
    /// Blank screen, cursor at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to the power-on state, dropping any partial sequence.
    pub fn reset(&mut self) {
        self.parser = vte::Parser::new();
        self.screen = Screen::default();
    }

    /// Consume a chunk of program output.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.bytes_fed += bytes.len() as u64;
        self.parser.advance(&mut self.screen, bytes);
    }

    pub fn snapshot(&self) -> TerminalSnapshot<'_> {
        TerminalSnapshot {
            chars: &self.screen.chars,
            colors: &self.screen.colors,
            cursor: self.screen.cursor,
        }
    }

    pub fn chars(&self) -> &TerminalGrid<u8> {
        &self.screen.chars
    }

    pub fn colors(&self) -> &TerminalGrid<i8> {
        &self.screen.colors
    }

    /// Reported cursor; the column is clamped to the last one even while a
    /// wrap is pending.
    pub fn cursor(&self) -> Cursor {
        self.screen.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.screen.cursor_visible
    }

    /// Total bytes consumed since creation.
    pub fn bytes_fed(&self) -> u64 {
        self.bytes_fed
    }

    /// One screen row as text.
    pub fn row_text(&self, row: usize) -> String {
        String::from_utf8_lossy(self.screen.chars.row(row)).into_owned()
    }

    /// Copy the screen into the `tty_*` observation fields.
    pub fn copy_into(&self, obs: &mut Observation) {
        let screen = &self.screen;
        obs.tty_chars.rows_mut().copy_from_slice(screen.chars.rows());
        obs.tty_colors.rows_mut().copy_from_slice(screen.colors.rows());
        obs.tty_cursor = [screen.cursor.row as u8, screen.cursor.col as u8];
    }
}

/// Grid state updated by the parser callbacks.
#[derive(Debug, Clone)]
struct Screen {
    chars: TerminalGrid<u8>,
    colors: TerminalGrid<i8>,
    cursor: Cursor,
    attrs: Attributes,
    saved: Option<(Cursor, Attributes)>,
    /// Set after printing in the last column; the next printable wraps.
    pending_wrap: bool,
    scroll_top: usize,
    scroll_bottom: usize,
    cursor_visible: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            chars: TerminalGrid::filled(b' '),
            colors: TerminalGrid::filled(0),
            cursor: Cursor::default(),
            attrs: Attributes::default(),
            saved: None,
            pending_wrap: false,
            scroll_top: 0,
            scroll_bottom: TERM_LI - 1,
            cursor_visible: true,
        }
    }
}

impl Perform for Screen {
    fn print(&mut self, c: char) {
        // The grid holds single bytes; anything outside Latin-1 shows as '?'.
        let byte = u8::try_from(u32::from(c)).unwrap_or(b'?');
        self.put_byte(byte);
    }

    fn execute(&mut self, byte: u8) {
        self.control(byte);
    }

    fn csi_dispatch(&mut self, params: &Params, intermediates: &[u8], ignore: bool, action: char) {
        if ignore {
            return;
        }
        let list: ParamList = params.iter().flatten().copied().collect();
        match intermediates.first() {
            None => self.csi(&list, action),
            Some(b'?') => self.private_mode(&list, action),
            Some(_) => {}
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], ignore: bool, byte: u8) {
        // Charset designations carry an intermediate; the grid stores raw bytes.
        if ignore || !intermediates.is_empty() {
            return;
        }
        self.esc(byte);
    }
}

impl Screen {
    fn put_byte(&mut self, byte: u8) {
        if self.pending_wrap {
            self.pending_wrap = false;
            self.cursor.col = 0;
            self.linefeed();
        }
        let Cursor { row, col } = self.cursor;
        self.chars[(row, col)] = byte;
        self.colors[(row, col)] = self.attrs.color_code();
        if col == TERM_CO - 1 {
            self.pending_wrap = true;
        } else {
            self.cursor.col += 1;
        }
    }

    fn control(&mut self, byte: u8) {
        match byte {
            b'\r' => self.move_to(self.cursor.row, 0),
            b'\n' | 0x0b | 0x0c => {
                self.pending_wrap = false;
                self.linefeed();
            }
            0x08 => {
                let col = self.cursor.col.saturating_sub(1);
                self.move_to(self.cursor.row, col);
            }
            b'\t' => {
                let col = ((self.cursor.col / TAB_WIDTH) + 1) * TAB_WIDTH;
                self.move_to(self.cursor.row, col);
            }
            // BEL, SO, SI and the rest have no visible effect.
            _ => {}
        }
    }

    fn esc(&mut self, action: u8) {
        match action {
            b'7' => self.save_cursor(),
            b'8' => self.restore_cursor(),
            b'c' => *self = Self::default(),
            b'D' => {
                self.pending_wrap = false;
                self.linefeed();
            }
            b'E' => {
                self.move_to(self.cursor.row, 0);
                self.linefeed();
            }
            b'M' => self.reverse_index(),
            b'=' | b'>' => {}
            other => trace!(action = other, "ignoring escape sequence"),
        }
    }

    fn private_mode(&mut self, params: &[u16], action: char) {
        if params.contains(&25) {
            match action {
                'h' => self.cursor_visible = true,
                'l' => self.cursor_visible = false,
                _ => {}
            }
        }
    }

    fn csi(&mut self, params: &[u16], action: char) {
        let n = count(params, 0);
        let Cursor { row, col } = self.cursor;
        match action {
            'A' => self.move_to(row.saturating_sub(n), col),
            'B' | 'e' => self.move_to(row + n, col),
            'C' | 'a' => self.move_to(row, col + n),
            'D' => self.move_to(row, col.saturating_sub(n)),
            'E' => self.move_to(row + n, 0),
            'F' => self.move_to(row.saturating_sub(n), 0),
            'G' | '`' => self.move_to(row, n - 1),
            'H' | 'f' => self.move_to(count(params, 0) - 1, count(params, 1) - 1),
            'd' => self.move_to(n - 1, col),
            'J' => self.erase_display(param(params, 0)),
            'K' => self.erase_line(param(params, 0)),
            'L' => self.insert_lines(n),
            'M' => self.delete_lines(n),
            '@' => self.insert_chars(n),
            'P' => self.delete_chars(n),
            'X' => self.erase_chars(n),
            'S' => self.scroll_up(self.scroll_top, self.scroll_bottom, n),
            'T' => self.scroll_down(self.scroll_top, self.scroll_bottom, n),
            'm' => self.attrs.apply_sgr(params),
            'r' => self.set_scroll_region(params),
            's' => self.save_cursor(),
            'u' => self.restore_cursor(),
            'h' | 'l' | 'n' | 'c' | 'g' => {}
            other => trace!(action = %other, "ignoring CSI sequence"),
        }
    }

    fn move_to(&mut self, row: usize, col: usize) {
        self.pending_wrap = false;
        self.cursor = Cursor::new(row.min(TERM_LI - 1), col.min(TERM_CO - 1));
    }

    fn linefeed(&mut self) {
        if self.cursor.row == self.scroll_bottom {
            self.scroll_up(self.scroll_top, self.scroll_bottom, 1);
        } else if self.cursor.row < TERM_LI - 1 {
            self.cursor.row += 1;
        }
    }

    fn reverse_index(&mut self) {
        self.pending_wrap = false;
        if self.cursor.row == self.scroll_top {
            self.scroll_down(self.scroll_top, self.scroll_bottom, 1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    fn save_cursor(&mut self) {
        self.saved = Some((self.cursor, self.attrs));
    }

    fn restore_cursor(&mut self) {
        let (cursor, attrs) = self.saved.unwrap_or_default();
        self.attrs = attrs;
        self.move_to(cursor.row, cursor.col);
    }

    fn set_scroll_region(&mut self, params: &[u16]) {
        let top = count(params, 0) - 1;
        let bottom = match param(params, 1) {
            0 => TERM_LI - 1,
            b => (b as usize - 1).min(TERM_LI - 1),
        };
        if top < bottom {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        } else {
            self.scroll_top = 0;
            self.scroll_bottom = TERM_LI - 1;
        }
        self.move_to(0, 0);
    }

    fn clear_cells(&mut self, row: usize, cols: std::ops::Range<usize>) {
        self.chars.row_mut(row)[cols.clone()].fill(b' ');
        self.colors.row_mut(row)[cols].fill(0);
    }

    fn erase_display(&mut self, mode: u16) {
        let Cursor { row, col } = self.cursor;
        match mode {
            0 => {
                self.clear_cells(row, col..TERM_CO);
                for r in row + 1..TERM_LI {
                    self.clear_cells(r, 0..TERM_CO);
                }
            }
            1 => {
                for r in 0..row {
                    self.clear_cells(r, 0..TERM_CO);
                }
                self.clear_cells(row, 0..col + 1);
            }
            2 | 3 => {
                self.chars.fill(b' ');
                self.colors.fill(0);
            }
            _ => {}
        }
    }

    fn erase_line(&mut self, mode: u16) {
        let Cursor { row, col } = self.cursor;
        match mode {
            0 => self.clear_cells(row, col..TERM_CO),
            1 => self.clear_cells(row, 0..col + 1),
            2 => self.clear_cells(row, 0..TERM_CO),
            _ => {}
        }
    }

    fn erase_chars(&mut self, n: usize) {
        let Cursor { row, col } = self.cursor;
        self.clear_cells(row, col..(col + n).min(TERM_CO));
    }

    fn insert_chars(&mut self, n: usize) {
        let Cursor { row, col } = self.cursor;
        let n = n.min(TERM_CO - col);
        self.chars.row_mut(row)[col..].rotate_right(n);
        self.colors.row_mut(row)[col..].rotate_right(n);
        self.clear_cells(row, col..col + n);
    }

    fn delete_chars(&mut self, n: usize) {
        let Cursor { row, col } = self.cursor;
        let n = n.min(TERM_CO - col);
        self.chars.row_mut(row)[col..].rotate_left(n);
        self.colors.row_mut(row)[col..].rotate_left(n);
        self.clear_cells(row, TERM_CO - n..TERM_CO);
    }

    fn insert_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if (self.scroll_top..=self.scroll_bottom).contains(&row) {
            self.scroll_down(row, self.scroll_bottom, n);
            self.move_to(row, 0);
        }
    }

    fn delete_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if (self.scroll_top..=self.scroll_bottom).contains(&row) {
            self.scroll_up(row, self.scroll_bottom, n);
            self.move_to(row, 0);
        }
    }

    /// Move rows `top..=bottom` up by `n`, blanking the freed rows.
    fn scroll_up(&mut self, top: usize, bottom: usize, n: usize) {
        let n = n.min(bottom + 1 - top);
        self.chars.rows_mut()[top..=bottom].rotate_left(n);
        self.colors.rows_mut()[top..=bottom].rotate_left(n);
        for r in bottom + 1 - n..=bottom {
            self.clear_cells(r, 0..TERM_CO);
        }
    }

    /// Move rows `top..=bottom` down by `n`, blanking the freed rows.
    fn scroll_down(&mut self, top: usize, bottom: usize, n: usize) {
        let n = n.min(bottom + 1 - top);
        self.chars.rows_mut()[top..=bottom].rotate_right(n);
        self.colors.rows_mut()[top..=bottom].rotate_right(n);
        for r in top..top + n {
            self.clear_cells(r, 0..TERM_CO);
        }
    }
}

/// Parameter `index`, 0 when absent.
fn param(params: &[u16], index: usize) -> u16 {
    params.get(index).copied().unwrap_or(0)
}

/// Parameter `index` as a count, where absent or 0 means 1.
fn count(params: &[u16], index: usize) -> usize {
    usize::from(param(params, index).max(1))
}
