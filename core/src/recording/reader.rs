//! ttyrec frame reader

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use super::{Channel, Frame};

/// Largest payload accepted when reading, to reject corrupt length fields.
const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Reads ttyrec frames from any byte source.
pub struct TtyrecReader<R: Read> {
    reader: R,
}

impl<R: Read> TtyrecReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next frame, or `None` at a clean end of stream.
    ///
    /// A stream that ends inside a frame is an `UnexpectedEof` error.
    pub fn read_frame(&mut self) -> io::Result<Option<Frame>> {
        let mut first = [0u8; 1];
        if self.reader.read(&mut first)? == 0 {
            return Ok(None);
        }
        let mut rest = [0u8; 3];
        self.reader.read_exact(&mut rest)?;
        let sec = u32::from_le_bytes([first[0], rest[0], rest[1], rest[2]]);
        let usec = self.reader.read_u32::<LittleEndian>()?;
        let len = self.reader.read_u32::<LittleEndian>()?;
        if len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame length {len} exceeds limit"),
            ));
        }
        let channel = Channel::from_u8(self.reader.read_u8()?)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown frame channel"))?;
        let mut data = vec![0u8; len as usize];
        self.reader.read_exact(&mut data)?;
        Ok(Some(Frame {
            sec,
            usec,
            channel,
            data,
        }))
    }
}

impl<R: Read> Iterator for TtyrecReader<R> {
    type Item = io::Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}
