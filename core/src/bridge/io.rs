//! The record that travels between caller and program.

use std::sync::Arc;

use nle_shared::constants::program_state;
use nle_shared::{EpisodeSettings, Observation, SeedConfig, TerminationReason};
use tracing::warn;

use crate::output::OutputWindow;
use crate::program::GameView;
use crate::recording::RecordingSink;
use crate::rng::RngSet;
use crate::terminal::TerminalMirror;

/// Key delivered when a resume carries no action.
const ESCAPE: i32 = 0x1b;

/// Everything one episode's I/O needs, owned by whichever side runs.
pub(crate) struct EpisodeIo {
    pub(crate) terminal: TerminalMirror,
    output: OutputWindow,
    recorder: Option<RecordingSink>,
    pub(crate) rng: RngSet,
    pub(crate) settings: Arc<EpisodeSettings>,
    pub(crate) observation: Observation,
    pending_action: Option<i32>,
}

impl EpisodeIo {
    pub(crate) fn new(
        settings: Arc<EpisodeSettings>,
        seeds: &SeedConfig,
        output_buffer_size: usize,
        recorder: Option<RecordingSink>,
    ) -> Self {
        Self {
            terminal: TerminalMirror::new(),
            output: OutputWindow::new(output_buffer_size),
            recorder,
            rng: RngSet::from_config(seeds),
            settings,
            observation: Observation::new(),
            pending_action: None,
        }
    }

    pub(crate) fn write_output(&mut self, bytes: &[u8]) {
        let Self {
            output,
            terminal,
            recorder,
            ..
        } = self;
        output.write(bytes, |chunk| forward(terminal, recorder, chunk));
    }

    /// Push buffered output through to the terminal mirror.
    pub(crate) fn flush_output(&mut self) {
        let Self {
            output,
            terminal,
            recorder,
            ..
        } = self;
        output.drain(|chunk| forward(terminal, recorder, chunk));
    }

    /// Rebuild the observation for a suspension at an input point.
    pub(crate) fn prepare_observation(&mut self, view: &dyn GameView) {
        self.flush_output();
        self.observation.clear();
        view.observe(&mut self.observation);
        self.observation.done = false;
        self.terminal.copy_into(&mut self.observation);
    }

    /// Final observation: game fields keep their last values, the
    /// terminal is refreshed and the done flags are set.
    pub(crate) fn mark_done(&mut self, reason: &TerminationReason) {
        self.flush_output();
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.flush();
        }
        let obs = &mut self.observation;
        self.terminal.copy_into(obs);
        obs.done = true;
        obs.in_normal_game = false;
        obs.how_done = reason.how_done().code();
        obs.program_state[program_state::GAMEOVER] = 1;
        obs.program_state[program_state::IN_MOVELOOP] = 0;
        if reason.is_fault() {
            obs.program_state[program_state::PANICKING] = 1;
        }
    }

    pub(crate) fn set_pending_action(&mut self, action: Option<i32>) {
        self.pending_action = action;
    }

    /// Consume the action delivered with the last resume.
    pub(crate) fn take_action(&mut self) -> i32 {
        let key = self.pending_action.take().unwrap_or_else(|| {
            warn!("program resumed without an action, delivering ESC");
            ESCAPE
        });
        self.observation.action = key;
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record_input(key as u8);
        }
        key
    }

    pub(crate) fn take_recorder(&mut self) -> Option<RecordingSink> {
        self.recorder.take()
    }

    pub(crate) fn set_recorder(&mut self, recorder: Option<RecordingSink>) {
        self.recorder = recorder;
    }
}

fn forward(terminal: &mut TerminalMirror, recorder: &mut Option<RecordingSink>, chunk: &[u8]) {
    terminal.feed(chunk);
    if let Some(recorder) = recorder.as_mut() {
        recorder.record_output(chunk);
    }
}
