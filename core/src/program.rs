//! Interface between the bridge and the hosted program.
//!
//! The hosted program is an ordinary blocking, turn-based main loop. It
//! renders by writing terminal bytes to its [`GameIo`] and blocks for
//! input by calling [`GameIo::read_key`]. Every `read_key` is a suspension
//! point: control returns to the caller of `Episode::step` until the next
//! action arrives.

use std::fmt;

use nle_shared::{HowDone, Observation};

pub use crate::bridge::GameIo;

/// A program that can run inside an episode.
///
/// `run` is called once per episode, on the episode's own thread, and
/// returns how the game ended. Implementations must propagate
/// [`Interrupted`] out of `run` as soon as `read_key` reports it.
pub trait LegacyProgram: Send + 'static {
    fn run(&mut self, io: &mut GameIo) -> Result<HowDone, Interrupted>;
}

impl<P: LegacyProgram + ?Sized> LegacyProgram for Box<P> {
    fn run(&mut self, io: &mut GameIo) -> Result<HowDone, Interrupted> {
        (**self).run(io)
    }
}

/// Program state exported into the observation at each suspension.
///
/// `observe` receives a blank observation and fills the game-derived
/// fields (dungeon grids, status, message, inventory, program flags). The
/// `tty_*` fields are filled by the bridge from the terminal mirror
/// afterwards.
pub trait GameView {
    fn observe(&self, obs: &mut Observation);
}

/// The episode was reset or closed while the program was suspended.
///
/// The program must unwind and return; any further `read_key` call
/// unwinds the program thread directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("episode interrupted")
    }
}

impl std::error::Error for Interrupted {}
