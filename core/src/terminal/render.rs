//! Render a character/colour grid back into ANSI text.
//!
//! Used for debugging and for human-readable dumps of `tty_*` observation
//! fields.

use nle_shared::Grid;

use super::Cursor;

/// Render `chars`/`colors` as ANSI text, one `\n`-prefixed line per row.
///
/// Each cell is emitted as `ESC[<bold>;3<color>m<char>`. The cursor cell is
/// additionally prefixed with an underline sequence, and every row ends
/// with a reset. Reverse-video (negative) colours are prefixed with
/// `ESC[7m`.
pub fn tty_render<const R: usize, const C: usize>(
    chars: &Grid<u8, R, C>,
    colors: &Grid<i8, R, C>,
    cursor: Option<Cursor>,
) -> String {
    let mut out = String::with_capacity(R * (C * 8 + 5));
    for row in 0..R {
        out.push('\n');
        for col in 0..C {
            if cursor == Some(Cursor::new(row, col)) {
                out.push_str("\x1b[4m");
            }
            let color = colors[(row, col)];
            let code = if color < 0 {
                out.push_str("\x1b[7m");
                !color
            } else {
                color
            };
            let bold = u8::from(code & 8 != 0);
            out.push_str(&format!("\x1b[{};3{}m", bold, code & 7));
            out.push(char::from(chars[(row, col)]));
        }
        out.push_str("\x1b[0m");
    }
    out
}
