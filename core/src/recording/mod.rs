//! ttyrec recording of the terminal stream
//!
//! Every byte the program writes to its terminal, and every key it reads,
//! can be appended to a ttyrec file. Replaying the output frames through a
//! fresh `TerminalMirror` reproduces the screen at any point of the
//! episode.
//!
//! # Frame layout
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────┬───────────────┐
//! │ sec u32  │ usec u32 │ len u32  │ chan u8 │ payload (len) │
//! └──────────┴──────────┴──────────┴─────────┴───────────────┘
//!   little-endian           chan: 0 = output, 1 = input
//! ```
//!
//! Files with an `.lz4` extension are wrapped in an LZ4 frame stream.

mod reader;
mod sink;
mod writer;

pub use reader::TtyrecReader;
pub use sink::RecordingSink;
pub use writer::TtyrecWriter;

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::terminal::TerminalMirror;

/// Size of the fixed frame header.
pub const FRAME_HEADER_SIZE: usize = 13;

/// Direction of a recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    /// Bytes the program wrote to the terminal.
    Output = 0,
    /// A key the program consumed.
    Input = 1,
}

impl Channel {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Channel::Output),
            1 => Some(Channel::Input),
            _ => None,
        }
    }
}

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub sec: u32,
    pub usec: u32,
    pub channel: Channel,
    pub data: Vec<u8>,
}

impl Frame {
    /// Frame stamped with the current wall-clock time.
    pub fn now(channel: Channel, data: Vec<u8>) -> Self {
        let now = chrono::Utc::now();
        Self {
            sec: now.timestamp() as u32,
            usec: now.timestamp_subsec_micros(),
            channel,
            data,
        }
    }
}

/// True when `path` should be LZ4-framed.
pub fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("lz4"))
}

/// Open a recording for reading, decompressing `.lz4` files.
pub fn open(path: &Path) -> io::Result<TtyrecReader<Box<dyn Read>>> {
    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = if is_compressed(path) {
        Box::new(lz4_flex::frame::FrameDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(TtyrecReader::new(reader))
}

/// Read every frame of a recording.
pub fn read_frames(path: &Path) -> io::Result<Vec<Frame>> {
    open(path)?.collect()
}

/// Replay the output frames of a recording into a fresh terminal.
pub fn replay_screen(path: &Path) -> io::Result<TerminalMirror> {
    let mut terminal = TerminalMirror::new();
    for frame in open(path)? {
        let frame = frame?;
        if frame.channel == Channel::Output {
            terminal.feed(&frame.data);
        }
    }
    Ok(terminal)
}
