//! Character attributes set by SGR sequences.

/// Current graphic rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attributes {
    /// Foreground colour 0-7, `None` for the terminal default.
    pub fg: Option<u8>,
    pub bg: Option<u8>,
    /// Foreground set through the 90-97 bright range.
    pub bright: bool,
    pub bold: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
}

impl Attributes {
    /// Colour code stored in the tty colour grid.
    ///
    /// Default foreground is 0, 30-37 map to 0-7 and bold or bright adds 8.
    /// Reverse video stores the one's complement, which is always negative.
    pub fn color_code(&self) -> i8 {
        let mut code = self.fg.unwrap_or(0) as i8;
        if self.bold || self.bright {
            code |= 8;
        }
        if self.reverse { !code } else { code }
    }

    /// Apply one SGR parameter list.
    pub fn apply_sgr(&mut self, params: &[u16]) {
        if params.is_empty() {
            *self = Self::default();
            return;
        }
        let mut iter = params.iter().copied();
        while let Some(code) = iter.next() {
            match code {
                0 => *self = Self::default(),
                1 => self.bold = true,
                4 => self.underline = true,
                5 => self.blink = true,
                7 => self.reverse = true,
                22 => self.bold = false,
                24 => self.underline = false,
                25 => self.blink = false,
                27 => self.reverse = false,
                30..=37 => {
                    self.fg = Some((code - 30) as u8);
                    self.bright = false;
                }
                38 => {
                    if let Some(color) = extended_color(&mut iter) {
                        self.fg = Some(color & 7);
                        self.bright = color >= 8;
                    }
                }
                39 => {
                    self.fg = None;
                    self.bright = false;
                }
                40..=47 => self.bg = Some((code - 40) as u8),
                48 => {
                    if let Some(color) = extended_color(&mut iter) {
                        self.bg = Some(color & 7);
                    }
                }
                49 => self.bg = None,
                90..=97 => {
                    self.fg = Some((code - 90) as u8);
                    self.bright = true;
                }
                100..=107 => self.bg = Some((code - 100) as u8),
                _ => {}
            }
        }
    }
}

/// Consume a `5;n` or `2;r;g;b` tail and map it onto the 16-colour range.
fn extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<u8> {
    match iter.next()? {
        5 => {
            let index = iter.next()?;
            (index < 16).then_some(index as u8)
        }
        2 => {
            let (r, g, b) = (iter.next()?, iter.next()?, iter.next()?);
            let bit = |v: u16| u8::from(v >= 128);
            Some(bit(r) | bit(g) << 1 | bit(b) << 2)
        }
        _ => None,
    }
}
