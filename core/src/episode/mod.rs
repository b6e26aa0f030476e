//! Episode lifecycle
//!
//! An [`Episode`] owns one run of a hosted program and exposes it as a
//! synchronous step API: `reset` runs the program to its first input
//! point, each `step` delivers one key and runs to the next, and `close`
//! tears everything down. Between calls the program is parked inside
//! `read_key` on its own thread.

use std::path::Path;
use std::sync::Arc;

use nle_shared::{CurrentSeeds, EpisodeSettings, Observation, SeedConfig, TerminationReason};
use tracing::{debug, error, info, warn};

use crate::bridge::{CoroutineHandle, EpisodeIo, Lost, Suspend, spawn_program};
use crate::error::BridgeError;
use crate::program::LegacyProgram;
use crate::recording::RecordingSink;
use crate::rng::RngSet;
use crate::terminal::TerminalMirror;

mod config;


pub use config::{BridgeConfig, MIN_STACK_SIZE};

/// Builds a fresh program instance for each run.
type ProgramFactory = Box<dyn FnMut() -> Box<dyn LegacyProgram>>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    /// Program thread exists but has not run yet.
    Ready,
    /// Program is blocked waiting for an action.
    Suspended,
    Terminated(TerminationReason),
    Closed,
}

/// One hosted program behind a step API.
pub struct Episode {
    config: BridgeConfig,
    settings: Arc<EpisodeSettings>,
    factory: ProgramFactory,
    /// Seeds applied on the next (re)start.
    initial_seeds: SeedConfig,
    coroutine: Option<CoroutineHandle>,
    /// Held by the caller whenever the program is not running.
    io: Option<Box<EpisodeIo>>,
    phase: Phase,
    steps: u64,
    runs: u64,
}

impl Episode {
    /// Create an episode with the default bridge configuration.
    pub fn create<F, P>(settings: EpisodeSettings, factory: F) -> Result<Self, BridgeError>
    where
        F: FnMut() -> P + 'static,
        P: LegacyProgram,
    {
        Self::with_config(BridgeConfig::default(), settings, factory)
    }

    /// Create an episode.
    ///
    /// Validates the settings, opens the recording if one is configured,
    /// seeds the random streams and spawns the program thread. The
    /// program itself does not run until the first `reset` or `step`.
    pub fn with_config<F, P>(
        config: BridgeConfig,
        settings: EpisodeSettings,
        mut factory: F,
    ) -> Result<Self, BridgeError>
    where
        F: FnMut() -> P + 'static,
        P: LegacyProgram,
    {
        config.validate()?;
        settings.validate()?;

        let recorder = open_recorder(settings.ttyrec.as_deref())?;
        let mut episode = Self {
            config,
            initial_seeds: settings.seeds,
            settings: Arc::new(settings),
            factory: Box::new(move || Box::new(factory()) as Box<dyn LegacyProgram>),
            coroutine: None,
            io: None,
            phase: Phase::Ready,
            steps: 0,
            runs: 0,
        };
        episode.start(recorder)?;
        Ok(episode)
    }

    /// Run to the first input point and return the initial observation.
    ///
    /// A started episode is torn down first and a fresh program instance
    /// is run with the current initial seeds. The recording, if any,
    /// continues in the same file.
    pub fn reset(&mut self) -> Result<&Observation, BridgeError> {
        self.reset_with(None, None)
    }

    /// `reset`, optionally replacing the initial seeds and switching the
    /// recording to a new file.
    pub fn reset_with(
        &mut self,
        seeds: Option<SeedConfig>,
        ttyrec: Option<&Path>,
    ) -> Result<&Observation, BridgeError> {
        if self.phase == Phase::Closed {
            return Err(BridgeError::Closed);
        }
        if let Some(seeds) = seeds {
            self.initial_seeds = seeds;
        }

        let new_recorder = match ttyrec {
            Some(path) => Some(open_recorder(Some(path))?),
            None => None,
        };

        if self.phase != Phase::Ready || new_recorder.is_some() || seeds.is_some() {
            let old_recorder = self.teardown();
            let recorder = match new_recorder {
                Some(recorder) => {
                    finish_recorder(old_recorder);
                    recorder
                }
                None => old_recorder,
            };
            self.start(recorder)?;
        }

        self.advance(None)?;
        self.current()
    }

    /// Deliver one action and run the program to its next input point.
    ///
    /// An episode that was never reset is first run to its initial input
    /// point. Stepping a terminated episode fails with
    /// `AlreadyTerminated` and leaves the observation untouched.
    pub fn step(&mut self, action: i32) -> Result<&Observation, BridgeError> {
        match &self.phase {
            Phase::Closed => return Err(BridgeError::Closed),
            Phase::Terminated(_) => return Err(BridgeError::AlreadyTerminated),
            Phase::Ready => {
                self.advance(None)?;
                if self.is_done() {
                    return self.current();
                }
            }
            Phase::Suspended => {}
        }

        self.advance(Some(action))?;
        self.steps += 1;
        self.current()
    }

    /// Stop the program and release the episode.
    ///
    /// Closing twice fails with `AlreadyClosed`.
    pub fn close(&mut self) -> Result<(), BridgeError> {
        if self.phase == Phase::Closed {
            return Err(BridgeError::AlreadyClosed);
        }
        let recorder = self.teardown();
        self.phase = Phase::Closed;
        debug!(runs = self.runs, "episode closed");
        match recorder {
            Some(recorder) => recorder.finish().map_err(BridgeError::Recording),
            None => Ok(()),
        }
    }

    /// Seeds for the next `reset`. Applied immediately if the program has
    /// not started yet.
    pub fn set_initial_seeds(&mut self, seeds: SeedConfig) -> Result<(), BridgeError> {
        if self.phase == Phase::Closed {
            return Err(BridgeError::Closed);
        }
        self.initial_seeds = seeds;
        if self.phase == Phase::Ready {
            if let Some(io) = self.io.as_deref_mut() {
                io.rng = RngSet::from_config(&seeds);
            }
        }
        Ok(())
    }

    pub fn initial_seeds(&self) -> SeedConfig {
        self.initial_seeds
    }

    /// Seeds currently driving the program's random streams.
    pub fn current_seeds(&self) -> Result<CurrentSeeds, BridgeError> {
        self.io
            .as_deref()
            .map(|io| io.rng.current_seeds())
            .ok_or(BridgeError::Closed)
    }

    /// Reseed the running program's random streams.
    pub fn set_current_seeds(
        &mut self,
        core: u64,
        disp: u64,
        reseed: bool,
        lgen: Option<u64>,
    ) -> Result<(), BridgeError> {
        let io = self.io.as_deref_mut().ok_or(BridgeError::Closed)?;
        io.rng.set_seeds(core, disp, reseed, lgen);
        Ok(())
    }

    /// Latest observation; `None` once closed.
    pub fn observation(&self) -> Option<&Observation> {
        self.io.as_deref().map(|io| &io.observation)
    }

    pub fn terminal(&self) -> Option<&TerminalMirror> {
        self.io.as_deref().map(|io| &io.terminal)
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Terminated(_))
    }

    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// True once the program has been run at least to its first input.
    pub fn is_started(&self) -> bool {
        !matches!(self.phase, Phase::Ready | Phase::Closed)
    }

    /// The program is inside its main loop (past start-up screens).
    pub fn in_normal_game(&self) -> bool {
        !self.is_done() && self.observation().is_some_and(|obs| obs.in_normal_game)
    }

    pub fn termination(&self) -> Option<&TerminationReason> {
        match &self.phase {
            Phase::Terminated(reason) => Some(reason),
            _ => None,
        }
    }

    /// Actions delivered since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn settings(&self) -> &EpisodeSettings {
        &self.settings
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Fresh program instance, record and thread, ready to run.
    fn start(&mut self, recorder: Option<RecordingSink>) -> Result<(), BridgeError> {
        let mut io = Box::new(EpisodeIo::new(
            self.settings.clone(),
            &self.initial_seeds,
            self.config.output_buffer_size,
            None,
        ));
        io.set_recorder(recorder);
        let program = (self.factory)();
        let coroutine = spawn_program(&self.config, program)?;

        self.io = Some(io);
        self.coroutine = Some(coroutine);
        self.phase = Phase::Ready;
        self.steps = 0;
        self.runs += 1;
        debug!(run = self.runs, "episode started");
        Ok(())
    }

    /// Stop the program thread and hand back the recorder.
    fn teardown(&mut self) -> Option<RecordingSink> {
        // Dropping the handle interrupts a suspended program and joins it.
        drop(self.coroutine.take());
        self.io.take().and_then(|mut io| io.take_recorder())
    }

    /// Resume the program and wait for its next suspension.
    fn advance(&mut self, action: Option<i32>) -> Result<(), BridgeError> {
        let coroutine = self.coroutine.as_mut().ok_or(BridgeError::Closed)?;
        let mut io = self.io.take().ok_or(BridgeError::ProgramLost)?;
        io.set_pending_action(action);

        match coroutine.resume(io) {
            Ok(Suspend::Input(io)) => {
                self.io = Some(io);
                self.phase = Phase::Suspended;
            }
            Ok(Suspend::Finished { io, reason }) => {
                self.io = Some(io);
                self.terminate(reason);
            }
            Err(Lost(io)) => {
                let reason = TerminationReason::Fault {
                    message: "program thread exited without handing back control".to_string(),
                };
                let mut io = io.unwrap_or_else(|| {
                    Box::new(EpisodeIo::new(
                        self.settings.clone(),
                        &self.initial_seeds,
                        self.config.output_buffer_size,
                        None,
                    ))
                });
                io.mark_done(&reason);
                error!(%reason, "lost the program thread");
                self.io = Some(io);
                self.terminate(reason);
            }
        }
        Ok(())
    }

    fn terminate(&mut self, reason: TerminationReason) {
        if reason.is_fault() {
            warn!(%reason, steps = self.steps, "episode ended by a program fault");
        } else {
            info!(%reason, steps = self.steps, "episode over");
        }
        drop(self.coroutine.take());
        self.phase = Phase::Terminated(reason);
    }

    fn current(&self) -> Result<&Observation, BridgeError> {
        self.observation().ok_or(BridgeError::ProgramLost)
    }
}

impl Drop for Episode {
    fn drop(&mut self) {
        if self.phase != Phase::Closed {
            if let Err(e) = self.close() {
                warn!(error = %e, "failed to close episode cleanly");
            }
        }
    }
}

fn open_recorder(path: Option<&Path>) -> Result<Option<RecordingSink>, BridgeError> {
    path.map(RecordingSink::create)
        .transpose()
        .map_err(BridgeError::Recording)
}

fn finish_recorder(recorder: Option<RecordingSink>) {
    if let Some(recorder) = recorder {
        let path = recorder.path().display().to_string();
        if let Err(e) = recorder.finish() {
            warn!(path = %path, error = %e, "failed to finalise ttyrec");
        }
    }
}
