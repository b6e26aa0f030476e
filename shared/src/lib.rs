//! Shared types for the NLE coroutine bridge.
//!
//! Everything that both the bridge (`nle-core`) and asset tooling
//! (`nle-tileset`) need to agree on lives here: the fixed observation
//! layout, the seed contract, per-episode settings and the ways an
//! episode can end.

pub mod constants;
pub mod grid;
pub mod observation;
pub mod seeds;
pub mod settings;
pub mod termination;

pub use grid::Grid;
pub use observation::{DungeonGrid, Observation, TerminalGrid};
pub use seeds::{CurrentSeeds, SeedConfig};
pub use settings::{EpisodeSettings, SettingsError};
pub use termination::{Conditions, HowDone, TerminationReason};
