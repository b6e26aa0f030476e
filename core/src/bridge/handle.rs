//! Caller-side handle to a program thread
//!
//! Resumes the program and manages the thread's lifecycle.

use std::sync::mpsc::{Receiver, SendError, SyncSender};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use super::Suspend;
use super::io::EpisodeIo;

/// The program thread disappeared. Carries the I/O record back when the
/// hand-off failed before the program took it.
pub(crate) struct Lost(pub(crate) Option<Box<EpisodeIo>>);

/// Handle to a running program thread
///
/// Returned from `thread::spawn_program()`. Dropping the handle interrupts
/// a suspended program and waits for its thread to exit.
pub(crate) struct CoroutineHandle {
    /// Resume channel (Option to allow explicit drop before join)
    pub(super) resume_tx: Option<SyncSender<Box<EpisodeIo>>>,

    pub(super) suspend_rx: Receiver<Suspend>,

    /// Thread join handle
    pub(super) handle: Option<JoinHandle<()>>,
}

impl CoroutineHandle {
    /// Give control to the program and block until it suspends again.
    pub(crate) fn resume(&mut self, io: Box<EpisodeIo>) -> Result<Suspend, Lost> {
        let Some(tx) = self.resume_tx.as_ref() else {
            return Err(Lost(Some(io)));
        };
        if let Err(SendError(io)) = tx.send(io) {
            warn!("program thread is gone, cannot resume");
            return Err(Lost(Some(io)));
        }
        self.suspend_rx.recv().map_err(|_| {
            warn!("program thread exited without handing back control");
            Lost(None)
        })
    }
}

impl Drop for CoroutineHandle {
    fn drop(&mut self) {
        // Drop the sender first: a suspended read_key sees the disconnect
        // and unwinds. Joining before that would deadlock.
        drop(self.resume_tx.take());

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("program thread panicked during shutdown");
            } else {
                debug!("program thread joined");
            }
        }
    }
}
