//! NLE Core - Coroutine bridge for hosting a blocking terminal game
//!
//! This crate runs an ordinary turn-based program, one that blocks for
//! keyboard input and paints a terminal, as a steppable episode suitable
//! for learning agents.
//!
//! # Architecture
//!
//! - [`Episode`] - `reset` / `step` / `close` over one hosted program
//! - [`LegacyProgram`] - Trait implemented by the hosted program
//! - [`GameIo`] - Program-side handle: terminal output and blocking input
//! - [`TerminalMirror`] - VT100 emulator reproducing the screen grid
//! - [`RecordingSink`] - ttyrec recording of output and consumed actions
//! - [`tasks`] - Reward helpers for training tasks

mod bridge;
pub mod episode;
pub mod error;
pub mod output;
pub mod program;
pub mod recording;
pub mod rng;
pub mod tasks;
pub mod terminal;

#[cfg(test)]
mod integration;
#[cfg(test)]
pub mod test_utils;

pub use episode::{BridgeConfig, Episode, MIN_STACK_SIZE};
pub use error::BridgeError;
pub use program::{GameIo, GameView, Interrupted, LegacyProgram};
pub use recording::{RecordingSink, TtyrecReader, TtyrecWriter, replay_screen};
pub use rng::RngSet;
pub use tasks::{
    ChallengeTask, EatTask, GoldTask, OracleTask, PenaltyMode, ScoreTask, ScoutTask, StaircasePetTask,
    StaircaseTask, StepStatus, Task, TaskRunner, TimePenalty,
};
pub use terminal::{Cursor, TerminalMirror, tty_render};

// Re-export the shared contracts for convenience
pub use nle_shared::{
    CurrentSeeds, EpisodeSettings, HowDone, Observation, SeedConfig, SettingsError,
    TerminationReason,
};
