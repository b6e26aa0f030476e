//! Seeded random streams handed to the program.
//!
//! Three independent PCG streams keep gameplay reproducible:
//! - `core` drives gameplay decisions
//! - `disp` drives display-only randomness, so rendering choices never
//!   perturb the gameplay sequence
//! - `lgen` (optional) drives level generation; without it level layout
//!   draws from `core`

use nle_shared::{CurrentSeeds, SeedConfig};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RngSet {
    core: Pcg64,
    disp: Pcg64,
    lgen: Option<Pcg64>,
    seeds: CurrentSeeds,
}

impl RngSet {
    /// Build the streams for a fresh episode.
    ///
    /// Without `use_init_seeds` both seeds come from system entropy and
    /// reseeding is enabled.
    pub fn from_config(config: &SeedConfig) -> Self {
        let seeds = if config.use_init_seeds {
            CurrentSeeds {
                core: config.core,
                disp: config.disp,
                reseed: config.reseed,
                lgen: config.lgen,
            }
        } else {
            let mut entropy = rand::rng();
            CurrentSeeds {
                core: entropy.random(),
                disp: entropy.random(),
                reseed: true,
                lgen: config.lgen,
            }
        };
        debug!(
            core = seeds.core,
            disp = seeds.disp,
            reseed = seeds.reseed,
            "seeding random streams"
        );
        Self::from_seeds(seeds)
    }

    fn from_seeds(seeds: CurrentSeeds) -> Self {
        Self {
            core: Pcg64::seed_from_u64(seeds.core),
            disp: Pcg64::seed_from_u64(seeds.disp),
            lgen: seeds.lgen.map(Pcg64::seed_from_u64),
            seeds,
        }
    }

    /// Reseed every stream, restarting their sequences.
    pub fn set_seeds(&mut self, core: u64, disp: u64, reseed: bool, lgen: Option<u64>) {
        *self = Self::from_seeds(CurrentSeeds {
            core,
            disp,
            reseed,
            lgen,
        });
    }

    pub fn current_seeds(&self) -> CurrentSeeds {
        self.seeds
    }

    /// Uniform integer in `0..n`; 0 when `n <= 0`.
    pub fn rn2(&mut self, n: i32) -> i32 {
        draw(&mut self.core, n)
    }

    /// Uniform integer in `1..=n`; 1 when `n <= 0`.
    pub fn rnd(&mut self, n: i32) -> i32 {
        draw(&mut self.core, n) + 1
    }

    /// `rn2` on the display stream.
    pub fn rn2_on_display_rng(&mut self, n: i32) -> i32 {
        draw(&mut self.disp, n)
    }

    /// `rn2` on the level-generation stream, or on `core` when it is unset.
    pub fn rn2_lgen(&mut self, n: i32) -> i32 {
        match self.lgen.as_mut() {
            Some(lgen) => draw(lgen, n),
            None => draw(&mut self.core, n),
        }
    }

    /// Replace the core seed with fresh entropy when reseeding is enabled.
    ///
    /// Returns whether a reseed happened.
    pub fn reseed_random(&mut self) -> bool {
        if !self.seeds.reseed {
            return false;
        }
        let seed: u64 = rand::rng().random();
        self.seeds.core = seed;
        self.core = Pcg64::seed_from_u64(seed);
        debug!(core = seed, "core stream reseeded");
        true
    }
}

fn draw(rng: &mut Pcg64, n: i32) -> i32 {
    if n <= 0 { 0 } else { rng.random_range(0..n) }
}
