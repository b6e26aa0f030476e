//! Seed contract for deterministic episodes.

use serde::{Deserialize, Serialize};

/// Seeds applied when an episode starts.
///
/// With `use_init_seeds` unset the bridge draws fresh seeds from system
/// entropy and `reseed` reads as `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed of the gameplay random stream.
    pub core: u64,
    /// Seed of the display-only random stream.
    pub disp: u64,
    /// Allow the program to reseed the core stream from entropy mid-game.
    pub reseed: bool,
    pub use_init_seeds: bool,
    /// Separate level-generation stream; falls back to `core` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lgen: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            core: 0,
            disp: 0,
            reseed: false,
            use_init_seeds: false,
            lgen: None,
        }
    }
}

impl SeedConfig {
    /// Fixed core and display seeds, no reseeding.
    pub fn fixed(core: u64, disp: u64) -> Self {
        Self {
            core,
            disp,
            reseed: false,
            use_init_seeds: true,
            lgen: None,
        }
    }

    pub fn with_lgen(mut self, lgen: u64) -> Self {
        self.lgen = Some(lgen);
        self
    }

    pub fn with_reseed(mut self, reseed: bool) -> Self {
        self.reseed = reseed;
        self
    }
}

/// Seeds in effect right now, as reported by a running episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSeeds {
    pub core: u64,
    pub disp: u64,
    pub reseed: bool,
    pub lgen: Option<u64>,
}

impl CurrentSeeds {
    /// `(core, disp, reseed, lgen)` with an unused lgen stream reported as 0.
    pub fn as_tuple(&self) -> (u64, u64, bool, u64) {
        (self.core, self.disp, self.reseed, self.lgen.unwrap_or(0))
    }
}
