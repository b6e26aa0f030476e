//! File-backed recorder used by a running episode.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use lz4_flex::frame::FrameEncoder;
use tracing::{debug, warn};

use super::{Channel, Frame, TtyrecWriter, is_compressed};

/// Destination file, optionally LZ4-framed.
enum Target {
    Plain(BufWriter<File>),
    Lz4(FrameEncoder<BufWriter<File>>),
}

impl Write for Target {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Target::Plain(w) => w.write(buf),
            Target::Lz4(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Target::Plain(w) => w.flush(),
            Target::Lz4(w) => w.flush(),
        }
    }
}

/// Appends the episode's terminal traffic to a ttyrec file.
///
/// Write failures never interrupt the episode: the first failure is
/// logged and recording stops for the rest of the episode.
pub struct RecordingSink {
    writer: Option<TtyrecWriter<Target>>,
    path: PathBuf,
    frames_written: u64,
}

impl RecordingSink {
    /// Create (or truncate) the recording at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        let target = if is_compressed(path) {
            Target::Lz4(FrameEncoder::new(file))
        } else {
            Target::Plain(file)
        };
        debug!(path = %path.display(), "ttyrec recording started");
        Ok(Self {
            writer: Some(TtyrecWriter::new(target)),
            path: path.to_path_buf(),
            frames_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// False once a write has failed.
    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record_output(&mut self, data: &[u8]) {
        if !data.is_empty() {
            self.record(Frame::now(Channel::Output, data.to_vec()));
        }
    }

    pub fn record_input(&mut self, key: u8) {
        self.record(Frame::now(Channel::Input, vec![key]));
    }

    /// Push buffered frames to the file. An LZ4 recording stays readable
    /// only up to the last finished block until `finish`.
    pub fn flush(&mut self) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(e) = writer.flush() {
            warn!(path = %self.path.display(), error = %e, "ttyrec flush failed, recording stopped");
            self.writer = None;
        }
    }

    fn record(&mut self, frame: Frame) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        match writer.write_frame(&frame) {
            Ok(()) => self.frames_written += 1,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ttyrec write failed, recording stopped");
                self.writer = None;
            }
        }
    }

    /// Flush and close the file, finishing the LZ4 stream if any.
    pub fn finish(mut self) -> io::Result<()> {
        self.close()
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        let result = match writer.into_inner() {
            Target::Plain(mut w) => w.flush(),
            Target::Lz4(encoder) => encoder
                .finish()
                .map_err(io::Error::other)
                .and_then(|mut w| w.flush()),
        };
        debug!(
            path = %self.path.display(),
            frames = self.frames_written,
            "ttyrec recording finished"
        );
        result
    }
}

impl Drop for RecordingSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "failed to finalise ttyrec");
        }
    }
}
