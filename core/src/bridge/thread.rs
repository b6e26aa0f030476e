//! Program thread entry point.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

use nle_shared::TerminationReason;
use tracing::{debug, info, trace};

use super::Suspend;
use super::game_io::GameIo;
use super::handle::CoroutineHandle;
use super::io::EpisodeIo;
use crate::episode::BridgeConfig;
use crate::error::BridgeError;
use crate::program::{Interrupted, LegacyProgram};

/// Spawn the program on its own thread.
///
/// The thread waits for the first resume before running any program
/// code, so creating an episode never executes the program.
pub(crate) fn spawn_program(
    config: &BridgeConfig,
    program: Box<dyn LegacyProgram>,
) -> Result<CoroutineHandle, BridgeError> {
    // Rendezvous-style hand-off: at most one record is ever in flight.
    let (resume_tx, resume_rx) = mpsc::sync_channel::<Box<EpisodeIo>>(1);
    let (suspend_tx, suspend_rx) = mpsc::sync_channel::<Suspend>(1);

    let handle = thread::Builder::new()
        .name(config.thread_name.clone())
        .stack_size(config.stack_size)
        .spawn(move || run_program(program, resume_rx, suspend_tx))
        .map_err(BridgeError::SpawnFailed)?;

    debug!(
        thread = %config.thread_name,
        stack_size = config.stack_size,
        "program thread spawned"
    );

    Ok(CoroutineHandle {
        resume_tx: Some(resume_tx),
        suspend_rx,
        handle: Some(handle),
    })
}

fn run_program(
    mut program: Box<dyn LegacyProgram>,
    resume_rx: Receiver<Box<EpisodeIo>>,
    suspend_tx: SyncSender<Suspend>,
) {
    let Ok(io) = resume_rx.recv() else {
        trace!("episode dropped before the program started");
        return;
    };

    let mut game_io = GameIo::new(io, resume_rx, suspend_tx);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| program.run(&mut game_io)));

    let reason = match outcome {
        Ok(Ok(how)) => TerminationReason::GameOver(how),
        Ok(Err(Interrupted)) => {
            trace!("program unwound after interruption");
            return;
        }
        Err(payload) if payload.is::<Interrupted>() => {
            trace!("program thread unwound after interruption");
            return;
        }
        Err(payload) => TerminationReason::Fault {
            message: panic_message(payload.as_ref()),
        },
    };

    if game_io.is_interrupted() {
        return;
    }
    info!(%reason, "program finished");
    game_io.finish(reason);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
