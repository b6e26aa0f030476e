//! Buffered window for program output.
//!
//! The program writes its terminal stream in many small pieces. Bytes are
//! collected here and forwarded to the terminal mirror (and recorder) in
//! larger chunks: whenever the window fills, and before every suspension.

use nle_shared::constants::BUFSIZ;

/// Fixed-capacity output window with a write cursor.
#[derive(Debug, Clone)]
pub struct OutputWindow {
    buf: Box<[u8]>,
    write: usize,
}

impl Default for OutputWindow {
    fn default() -> Self {
        Self::new(BUFSIZ)
    }
}

impl OutputWindow {
    /// Create a window holding at most `capacity` bytes (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
            write: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes waiting to be flushed.
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.write]
    }

    /// Append `bytes`, handing full windows to `flush` as they fill up.
    pub fn write<F: FnMut(&[u8])>(&mut self, mut bytes: &[u8], mut flush: F) {
        while !bytes.is_empty() {
            if self.write == self.buf.len() {
                flush(&self.buf[..self.write]);
                self.write = 0;
            }
            let n = (self.buf.len() - self.write).min(bytes.len());
            self.buf[self.write..self.write + n].copy_from_slice(&bytes[..n]);
            self.write += n;
            bytes = &bytes[n..];
        }
    }

    /// Hand any pending bytes to `flush` and rewind the write cursor.
    pub fn drain<F: FnOnce(&[u8])>(&mut self, flush: F) {
        if self.write > 0 {
            flush(&self.buf[..self.write]);
            self.write = 0;
        }
    }
}
