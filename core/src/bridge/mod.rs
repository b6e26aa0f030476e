//! Coroutine bridge between the caller and the hosted program
//!
//! The program runs on its own thread with its own stack. Control moves
//! between the two threads by handing a single [`EpisodeIo`] record back
//! and forth over a pair of rendezvous channels, so exactly one side is
//! ever running:
//!
//! ```text
//! Caller Thread                          Program Thread
//!     │                                        │
//! [Episode::step]                              │ (blocked in read_key)
//!     │──────(resume: EpisodeIo + action)────►[read_key returns]
//!     │ (blocked)                             [update game, write output]
//!     │                                       [read_key: flush, observe]
//! [step returns] ◄──────(suspend: EpisodeIo)───│
//!     │                                        │ (blocked in read_key)
//! ```
//!
//! When the program returns (or panics) the last hand-off carries the
//! termination reason instead. Dropping the caller's handle disconnects
//! the resume channel, which makes a suspended `read_key` return
//! [`Interrupted`](crate::program::Interrupted) so the program unwinds.

mod game_io;
mod handle;
mod io;
mod thread;

pub use game_io::GameIo;

pub(crate) use handle::{CoroutineHandle, Lost};
pub(crate) use io::EpisodeIo;
pub(crate) use thread::spawn_program;

use nle_shared::TerminationReason;

/// Hand-off from the program thread back to the caller.
pub(crate) enum Suspend {
    /// The program is blocked in `read_key`; the observation is filled.
    Input(Box<EpisodeIo>),
    /// The program has finished and its thread is exiting.
    Finished {
        io: Box<EpisodeIo>,
        reason: TerminationReason,
    },
}
