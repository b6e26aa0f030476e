//! Program-side end of the bridge.

use std::io::{self, Write};
use std::panic;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender};

use nle_shared::{EpisodeSettings, TerminationReason};
use tracing::{debug, trace};

use super::Suspend;
use super::io::EpisodeIo;
use crate::program::{GameView, Interrupted};
use crate::rng::RngSet;

/// Handle through which a hosted program talks to its episode.
///
/// Terminal output goes through the [`Write`] impl. Input comes from
/// [`read_key`](Self::read_key), which suspends the program until the
/// caller supplies the next action.
pub struct GameIo {
    /// Present while the program holds control.
    io: Option<Box<EpisodeIo>>,
    settings: Arc<EpisodeSettings>,
    resume_rx: Receiver<Box<EpisodeIo>>,
    suspend_tx: SyncSender<Suspend>,
    interrupted: bool,
}

impl GameIo {
    pub(super) fn new(
        io: Box<EpisodeIo>,
        resume_rx: Receiver<Box<EpisodeIo>>,
        suspend_tx: SyncSender<Suspend>,
    ) -> Self {
        Self {
            settings: io.settings.clone(),
            io: Some(io),
            resume_rx,
            suspend_tx,
            interrupted: false,
        }
    }

    /// Suspend until the caller delivers the next action.
    ///
    /// Before suspending, pending output is flushed to the terminal
    /// mirror and `view` fills a fresh observation. Returns
    /// `Err(Interrupted)` if the episode is reset or closed instead; a
    /// second call after that unwinds the program thread.
    pub fn read_key(&mut self, view: &dyn GameView) -> Result<i32, Interrupted> {
        self.record().prepare_observation(view);
        let Some(io) = self.io.take() else {
            return Err(self.interrupt());
        };

        trace!("program suspended for input");
        if self.suspend_tx.send(Suspend::Input(io)).is_err() {
            return Err(self.interrupt());
        }
        match self.resume_rx.recv() {
            Ok(mut io) => {
                let key = io.take_action();
                self.io = Some(io);
                Ok(key)
            }
            Err(_) => Err(self.interrupt()),
        }
    }

    /// The episode's random streams.
    pub fn rng(&mut self) -> &mut RngSet {
        &mut self.record().rng
    }

    pub fn settings(&self) -> &EpisodeSettings {
        &self.settings
    }

    /// True once the episode has been torn down underneath the program.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Hand the final record back to the caller.
    pub(super) fn finish(mut self, reason: TerminationReason) {
        let Some(mut io) = self.io.take() else {
            debug!("program finished without its I/O record");
            return;
        };
        io.mark_done(&reason);
        if self.suspend_tx.send(Suspend::Finished { io, reason }).is_err() {
            debug!("caller went away before the final hand-off");
        }
    }

    /// The I/O record; unwinds the program thread if it has been revoked.
    fn record(&mut self) -> &mut EpisodeIo {
        if self.interrupted {
            panic::resume_unwind(Box::new(Interrupted));
        }
        match self.io.as_deref_mut() {
            Some(io) => io,
            None => panic::resume_unwind(Box::new(Interrupted)),
        }
    }

    fn interrupt(&mut self) -> Interrupted {
        debug!("episode torn down while program was suspended");
        self.interrupted = true;
        Interrupted
    }
}

impl Write for GameIo {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.io.as_deref_mut() {
            Some(io) if !self.interrupted => {
                io.write_output(buf);
                Ok(buf.len())
            }
            _ => Err(io::Error::new(io::ErrorKind::BrokenPipe, Interrupted)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(io) = self.io.as_deref_mut() {
            io.flush_output();
        }
        Ok(())
    }
}
