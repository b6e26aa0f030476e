//! ttyrec frame writer

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use super::Frame;

/// Writes ttyrec frames to any byte sink.
pub struct TtyrecWriter<W: Write> {
    writer: W,
}

impl<W: Write> TtyrecWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one frame: 13-byte header followed by the payload.
    pub fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        let len = u32::try_from(frame.data.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame payload too large"))?;
        self.writer.write_u32::<LittleEndian>(frame.sec)?;
        self.writer.write_u32::<LittleEndian>(frame.usec)?;
        self.writer.write_u32::<LittleEndian>(len)?;
        self.writer.write_u8(frame.channel as u8)?;
        self.writer.write_all(&frame.data)?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}
