//! Error types surfaced by the episode API.

use std::io;

use nle_shared::SettingsError;

/// Failures of `Episode` operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The program's private stack (its thread) could not be created.
    #[error("failed to spawn program thread: {0}")]
    SpawnFailed(#[source] io::Error),

    #[error("stack size {requested} is below the minimum of {minimum} bytes")]
    StackTooSmall { requested: usize, minimum: usize },

    /// `step` was called after the program finished.
    #[error("episode already terminated")]
    AlreadyTerminated,

    /// Operation on an episode that has been closed.
    #[error("episode is closed")]
    Closed,

    /// `close` was called twice.
    #[error("episode already closed")]
    AlreadyClosed,

    /// The program thread went away without handing control back.
    #[error("lost contact with the program thread")]
    ProgramLost,

    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The recording file could not be opened or finalised.
    #[error("ttyrec recording failed: {0}")]
    Recording(#[source] io::Error),
}
