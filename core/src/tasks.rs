//! Reward helpers for training tasks built on an episode.
//!
//! A [`Task`] judges each transition `(previous observation, new
//! observation)`: whether the episode should end and what reward the
//! transition earns. [`TaskRunner`] drives an [`Episode`] with a task and
//! an optional step limit.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use nle_shared::Observation;
use nle_shared::constants::{blstats, glyph, internal};
use tracing::debug;

use crate::episode::Episode;
use crate::error::BridgeError;

/// Outcome of one task step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum StepStatus {
    /// The step limit was reached.
    Aborted = -1,
    Running = 0,
    /// The program ended the game.
    Death = 1,
    TaskSuccessful = 2,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        self != StepStatus::Running
    }
}

/// How steps that do not advance game time are penalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenaltyMode {
    /// `step` once any frozen step has been seen.
    #[default]
    Constant,
    /// `2^frozen * step`
    Exp,
    /// `frozen^2 * step`
    Square,
    /// `frozen * step`
    Linear,
    /// `step` on every transition.
    Always,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown penalty mode '{0}'")]
pub struct UnknownPenaltyMode(String);

impl FromStr for PenaltyMode {
    type Err = UnknownPenaltyMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Self::Constant),
            "exp" => Ok(Self::Exp),
            "square" => Ok(Self::Square),
            "linear" => Ok(Self::Linear),
            "always" => Ok(Self::Always),
            other => Err(UnknownPenaltyMode(other.to_string())),
        }
    }
}

impl fmt::Display for PenaltyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Constant => "constant",
            Self::Exp => "exp",
            Self::Square => "square",
            Self::Linear => "linear",
            Self::Always => "always",
        };
        f.write_str(name)
    }
}

/// Penalty for transitions where the game clock stands still.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePenalty {
    pub mode: PenaltyMode,
    /// Applied per frozen step according to `mode`.
    pub step: f64,
    /// Applied per elapsed game turn.
    pub time: f64,
    frozen_steps: u32,
}

impl Default for TimePenalty {
    fn default() -> Self {
        Self::new(PenaltyMode::Constant, -0.01, 0.0)
    }
}

impl TimePenalty {
    pub fn new(mode: PenaltyMode, step: f64, time: f64) -> Self {
        Self {
            mode,
            step,
            time,
            frozen_steps: 0,
        }
    }

    /// Consecutive transitions without a change of game time.
    pub fn frozen_steps(&self) -> u32 {
        self.frozen_steps
    }

    pub fn reset(&mut self) {
        self.frozen_steps = 0;
    }

    pub fn penalty(&mut self, last: &Observation, obs: &Observation) -> f64 {
        let old_time = last.blstats[blstats::TIME];
        let new_time = obs.blstats[blstats::TIME];

        if old_time == new_time {
            self.frozen_steps += 1;
        } else {
            self.frozen_steps = 0;
        }

        let frozen = f64::from(self.frozen_steps);
        let penalty = match self.mode {
            PenaltyMode::Constant if self.frozen_steps > 0 => self.step,
            PenaltyMode::Constant => 0.0,
            PenaltyMode::Exp => 2f64.powf(frozen) * self.step,
            PenaltyMode::Square => frozen * frozen * self.step,
            PenaltyMode::Linear => frozen * self.step,
            PenaltyMode::Always => self.step,
        };
        penalty + (new_time - old_time) as f64 * self.time
    }
}

/// Judges transitions of an episode.
pub trait Task {
    /// Whether the episode should end after reaching `obs`.
    fn end_status(&self, obs: &Observation) -> StepStatus {
        if obs.done {
            StepStatus::Death
        } else {
            StepStatus::Running
        }
    }

    fn reward(&mut self, last: &Observation, obs: &Observation, status: StepStatus) -> f64;

    /// Called after every step; `true` aborts an episode that is still
    /// running.
    fn should_abort(&mut self, _obs: &Observation) -> bool {
        false
    }

    /// Clear per-episode state.
    fn reset(&mut self) {}
}

fn score_reward(penalty: &mut TimePenalty, last: &Observation, obs: &Observation) -> f64 {
    let penalty = penalty.penalty(last, obs);
    if !obs.in_normal_game {
        return penalty;
    }
    let score_diff = obs.blstats[blstats::SCORE] - last.blstats[blstats::SCORE];
    score_diff as f64 + penalty
}

/// 1 for a successful step plus the time penalty.
fn success_reward(
    penalty: &mut TimePenalty,
    last: &Observation,
    obs: &Observation,
    status: StepStatus,
) -> f64 {
    let success = if status == StepStatus::TaskSuccessful {
        1.0
    } else {
        0.0
    };
    success + penalty.penalty(last, obs)
}

fn on_stairs(obs: &Observation) -> bool {
    obs.internal[internal::STAIRS_DOWN] != 0
}

/// Whether any glyph in the 3x3 block around the player matches.
fn next_to_player(obs: &Observation, matches: impl Fn(i16) -> bool) -> bool {
    let (x, y) = obs.player_position();
    let (x, y) = (x as usize, y as usize);
    (y.saturating_sub(1)..=y + 1).any(|row| {
        (x.saturating_sub(1)..=x + 1).any(|col| obs.glyphs.get(row, col).is_some_and(&matches))
    })
}

/// Score delta plus a time penalty.
#[derive(Debug, Clone, Default)]
pub struct ScoreTask {
    pub penalty: TimePenalty,
}

impl ScoreTask {
    pub fn new(penalty: TimePenalty) -> Self {
        Self { penalty }
    }
}

impl Task for ScoreTask {
    fn reward(&mut self, last: &Observation, obs: &Observation, _status: StepStatus) -> f64 {
        score_reward(&mut self.penalty, last, obs)
    }

    fn reset(&mut self) {
        self.penalty.reset();
    }
}

/// Reach a staircase down. Reward 1 on success plus the time penalty.
#[derive(Debug, Clone, Default)]
pub struct StaircaseTask {
    pub penalty: TimePenalty,
}

impl StaircaseTask {
    pub fn new(penalty: TimePenalty) -> Self {
        Self { penalty }
    }
}

impl Task for StaircaseTask {
    fn end_status(&self, obs: &Observation) -> StepStatus {
        if obs.done {
            StepStatus::Death
        } else if on_stairs(obs) {
            StepStatus::TaskSuccessful
        } else {
            StepStatus::Running
        }
    }

    fn reward(&mut self, last: &Observation, obs: &Observation, status: StepStatus) -> f64 {
        success_reward(&mut self.penalty, last, obs, status)
    }

    fn reset(&mut self) {
        self.penalty.reset();
    }
}

/// Reach a staircase down with a pet standing next to the player.
#[derive(Debug, Clone, Default)]
pub struct StaircasePetTask {
    pub penalty: TimePenalty,
}

impl StaircasePetTask {
    pub fn new(penalty: TimePenalty) -> Self {
        Self { penalty }
    }
}

impl Task for StaircasePetTask {
    fn end_status(&self, obs: &Observation) -> StepStatus {
        if obs.done {
            StepStatus::Death
        } else if on_stairs(obs) && next_to_player(obs, glyph::is_pet) {
            StepStatus::TaskSuccessful
        } else {
            StepStatus::Running
        }
    }

    fn reward(&mut self, last: &Observation, obs: &Observation, status: StepStatus) -> f64 {
        success_reward(&mut self.penalty, last, obs, status)
    }

    fn reset(&mut self) {
        self.penalty.reset();
    }
}

/// Stand next to the Oracle.
///
/// The Oracle's glyph depends on the program's monster table, so it is
/// supplied by the caller.
#[derive(Debug, Clone)]
pub struct OracleTask {
    pub oracle_glyph: i16,
    pub penalty: TimePenalty,
}

impl OracleTask {
    pub fn new(oracle_glyph: i16, penalty: TimePenalty) -> Self {
        Self {
            oracle_glyph,
            penalty,
        }
    }
}

impl Task for OracleTask {
    fn end_status(&self, obs: &Observation) -> StepStatus {
        if obs.done {
            StepStatus::Death
        } else if next_to_player(obs, |g| g == self.oracle_glyph) {
            StepStatus::TaskSuccessful
        } else {
            StepStatus::Running
        }
    }

    fn reward(&mut self, last: &Observation, obs: &Observation, status: StepStatus) -> f64 {
        success_reward(&mut self.penalty, last, obs, status)
    }

    fn reset(&mut self) {
        self.penalty.reset();
    }
}

/// Gold delta plus the time penalty.
///
/// Outside the normal game the reward is 0 and the penalty is not
/// advanced.
#[derive(Debug, Clone, Default)]
pub struct GoldTask {
    pub penalty: TimePenalty,
}

impl GoldTask {
    pub fn new(penalty: TimePenalty) -> Self {
        Self { penalty }
    }

    /// `base` with autopickup restricted to gold.
    pub fn options(base: &str) -> String {
        base.split(',')
            .map(|option| {
                if option.trim().starts_with("pickup_types") {
                    "pickup_types:$"
                } else {
                    option
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Task for GoldTask {
    fn reward(&mut self, last: &Observation, obs: &Observation, _status: StepStatus) -> f64 {
        if !obs.in_normal_game {
            return 0.0;
        }
        let gold_diff = obs.blstats[blstats::GOLD] - last.blstats[blstats::GOLD];
        gold_diff as f64 + self.penalty.penalty(last, obs)
    }

    fn reset(&mut self) {
        self.penalty.reset();
    }
}

/// Nutrition gained plus the time penalty. Getting hungrier earns nothing.
#[derive(Debug, Clone, Default)]
pub struct EatTask {
    pub penalty: TimePenalty,
}

impl EatTask {
    pub fn new(penalty: TimePenalty) -> Self {
        Self { penalty }
    }
}

impl Task for EatTask {
    fn reward(&mut self, last: &Observation, obs: &Observation, _status: StepStatus) -> f64 {
        if !obs.in_normal_game {
            return 0.0;
        }
        let gained = obs.internal[internal::NUTRITION] - last.internal[internal::NUTRITION];
        f64::from(gained.max(0)) + self.penalty.penalty(last, obs)
    }

    fn reset(&mut self) {
        self.penalty.reset();
    }
}

/// Newly seen map cells plus the time penalty.
///
/// Cells are counted per `(dungeon, level)`: returning to a level only
/// pays for what was not seen there before.
#[derive(Debug, Clone, Default)]
pub struct ScoutTask {
    pub penalty: TimePenalty,
    explored: HashMap<(i64, i64), usize>,
}

impl ScoutTask {
    pub fn new(penalty: TimePenalty) -> Self {
        Self {
            penalty,
            explored: HashMap::new(),
        }
    }

    /// Cells seen so far on a level.
    pub fn explored(&self, dungeon: i64, level: i64) -> usize {
        self.explored.get(&(dungeon, level)).copied().unwrap_or(0)
    }
}

impl Task for ScoutTask {
    fn reward(&mut self, last: &Observation, obs: &Observation, _status: StepStatus) -> f64 {
        if !obs.in_normal_game {
            return 0.0;
        }
        let key = (obs.blstats[blstats::DNUM], obs.blstats[blstats::DLEVEL]);
        let explored = obs
            .glyphs
            .as_flat()
            .iter()
            .filter(|&&g| g != glyph::CMAP_OFF)
            .count();
        let before = self.explored.insert(key, explored).unwrap_or(0);
        (explored as f64 - before as f64) + self.penalty.penalty(last, obs)
    }

    fn reset(&mut self) {
        self.penalty.reset();
        self.explored.clear();
    }
}

/// Score task for the full game: no step penalty, and the episode is
/// aborted once game time has not moved for `no_progress_timeout` steps.
#[derive(Debug, Clone)]
pub struct ChallengeTask {
    pub penalty: TimePenalty,
    pub no_progress_timeout: u64,
    turns: Option<i64>,
    no_progress: u64,
}

impl Default for ChallengeTask {
    fn default() -> Self {
        Self::new(Self::NO_PROGRESS_TIMEOUT)
    }
}

impl ChallengeTask {
    /// Step limit to run a challenge episode with.
    pub const MAX_EPISODE_STEPS: u64 = 1_000_000;
    pub const NO_PROGRESS_TIMEOUT: u64 = 10_000;

    pub fn new(no_progress_timeout: u64) -> Self {
        Self {
            penalty: TimePenalty::new(PenaltyMode::Constant, 0.0, 0.0),
            no_progress_timeout,
            turns: None,
            no_progress: 0,
        }
    }

    /// Steps in a row without a change of game time.
    pub fn no_progress(&self) -> u64 {
        self.no_progress
    }
}

impl Task for ChallengeTask {
    fn reward(&mut self, last: &Observation, obs: &Observation, _status: StepStatus) -> f64 {
        score_reward(&mut self.penalty, last, obs)
    }

    fn should_abort(&mut self, obs: &Observation) -> bool {
        let turns = obs.blstats[blstats::TIME];
        if self.turns == Some(turns) {
            self.no_progress += 1;
        } else {
            self.turns = Some(turns);
            self.no_progress = 0;
        }
        self.no_progress >= self.no_progress_timeout
    }

    fn reset(&mut self) {
        self.penalty.reset();
        self.turns = None;
        self.no_progress = 0;
    }
}

/// Result of [`TaskRunner::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskStep {
    pub reward: f64,
    pub status: StepStatus,
}

/// Drives an episode under a task.
pub struct TaskRunner<T> {
    episode: Episode,
    task: T,
    max_episode_steps: u64,
    last: Option<Observation>,
}

impl<T: Task> TaskRunner<T> {
    pub fn new(episode: Episode, task: T, max_episode_steps: u64) -> Self {
        Self {
            episode,
            task,
            max_episode_steps,
            last: None,
        }
    }

    pub fn reset(&mut self) -> Result<&Observation, BridgeError> {
        self.task.reset();
        let obs = self.episode.reset()?;
        self.last = Some(obs.clone());
        Ok(obs)
    }

    /// Step the episode and score the transition.
    ///
    /// Reaching the step limit, or the task asking to abort, ends the
    /// task with `Aborted` unless the transition already ended it some
    /// other way.
    pub fn step(&mut self, action: i32) -> Result<TaskStep, BridgeError> {
        if self.last.is_none() {
            self.reset()?;
        }
        self.episode.step(action)?;
        let steps = self.episode.steps();
        let obs = self
            .episode
            .observation()
            .ok_or(BridgeError::ProgramLost)?;
        let mut status = self.task.end_status(obs);
        let abort = self.task.should_abort(obs);
        if status == StepStatus::Running && (abort || steps >= self.max_episode_steps) {
            status = StepStatus::Aborted;
        }

        let reward = match self.last.as_ref() {
            Some(last) => self.task.reward(last, obs, status),
            None => 0.0,
        };
        if status.is_terminal() {
            debug!(?status, steps, "task finished");
        }
        self.last = Some(obs.clone());
        Ok(TaskStep { reward, status })
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn into_episode(self) -> Episode {
        self.episode
    }
}
