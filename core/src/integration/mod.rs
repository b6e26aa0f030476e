//! Integration tests for the NLE core bridge
//!
//! Tests full episode lifecycle against the toy dungeon, determinism under
//! fixed seeds, game-over and fault handling, ttyrec recording and the
//! task reward helpers.


#[cfg(test)]
pub(crate) mod test_utils {
    use nle_shared::Observation;

    use crate::episode::Episode;
    use crate::test_utils::{ENTER, find_char, walk_to};

    /// Install a test subscriber once; honours `RUST_LOG`.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Map coordinates of the first cell showing `ch`.
    pub fn locate(episode: &Episode, ch: u8) -> (usize, usize) {
        let obs = episode.observation().unwrap();
        find_char(obs, ch).unwrap_or_else(|| panic!("no '{}' on the map", char::from(ch)))
    }

    /// Walk onto the spiked pit and confirm the death message.
    pub fn die_in_trap(episode: &mut Episode) {
        let trap = locate(episode, b'^');
        walk_to(episode, trap);
        if !episode.is_done() {
            episode.step(ENTER).unwrap();
        }
        assert!(episode.is_done());
    }

    /// Map rows as text.
    pub fn map_text(obs: &Observation) -> Vec<String> {
        obs.chars
            .rows()
            .iter()
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect()
    }
}
