//! Per-episode settings (`nle.toml`)
//!
//! Options string, data directories and recording target handed to the
//! program at start-up. Settings are plain TOML so an experiment can be
//! reproduced from a checked-in file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::seeds::SeedConfig;

/// Longest accepted path for `hackdir`, `scoreprefix` and `ttyrec`.
pub const MAX_PATH_LEN: usize = 4096;

/// Longest accepted `options` string.
pub const MAX_OPTIONS_LEN: usize = 32768;

/// Options used when none are configured.
pub const DEFAULT_OPTIONS: &str = "windowtype:rl,color,showexp,nobones,time,norest_on_space,\
number_pad:0,pickup_types:$?!/=\"+,pettype:none,autopickup,!legacy,!news";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{field} is {len} bytes long, limit is {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("invalid settings file: {0}")]
    Parse(String),
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Settings of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSettings {
    /// Comma-separated program options.
    #[serde(default = "default_options")]
    pub options: String,
    /// Program data directory.
    #[serde(default = "default_hackdir")]
    pub hackdir: PathBuf,
    /// Directory prefix for the score file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoreprefix: Option<PathBuf>,
    /// Starting-kit specification, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizkit: Option<String>,
    /// Let the program spawn wandering monsters.
    #[serde(default = "default_true")]
    pub spawn_monsters: bool,
    /// Record the terminal stream to this file (`.lz4` compresses).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttyrec: Option<PathBuf>,
    #[serde(default)]
    pub seeds: SeedConfig,
}

fn default_options() -> String {
    DEFAULT_OPTIONS.to_string()
}

fn default_hackdir() -> PathBuf {
    data_dir()
        .map(|dir| dir.join("nethackdir"))
        .unwrap_or_else(|| PathBuf::from("nethackdir"))
}

fn default_true() -> bool {
    true
}

impl Default for EpisodeSettings {
    fn default() -> Self {
        Self {
            options: default_options(),
            hackdir: default_hackdir(),
            scoreprefix: None,
            wizkit: None,
            spawn_monsters: default_true(),
            ttyrec: None,
            seeds: SeedConfig::default(),
        }
    }
}

/// Returns the platform-specific data directory for program files.
///
/// On Linux: `~/.local/share/nle`
///
/// Returns `None` if the home directory cannot be determined.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "nle", "nle").map(|dirs| dirs.data_dir().to_path_buf())
}

impl EpisodeSettings {
    /// Parse settings from TOML; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            toml::from_str(content).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate a settings file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Check length limits. Settings that pass are safe to hand to the
    /// program's fixed-size buffers.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_len("options", self.options.len(), MAX_OPTIONS_LEN)?;
        check_path("hackdir", &self.hackdir)?;
        if let Some(prefix) = &self.scoreprefix {
            check_path("scoreprefix", prefix)?;
        }
        if let Some(wizkit) = &self.wizkit {
            check_len("wizkit", wizkit.len(), MAX_PATH_LEN)?;
        }
        if let Some(ttyrec) = &self.ttyrec {
            if ttyrec.as_os_str().is_empty() {
                return Err(SettingsError::Empty("ttyrec"));
            }
            check_path("ttyrec", ttyrec)?;
        }
        Ok(())
    }

    /// Options with the ones implied by other settings appended.
    pub fn effective_options(&self) -> String {
        let mut options = self.options.clone();
        if !self.spawn_monsters && !options.split(',').any(|o| o == "!spawn_monsters") {
            if !options.is_empty() {
                options.push(',');
            }
            options.push_str("!spawn_monsters");
        }
        options
    }

    /// True when `name` is switched on in the options string.
    pub fn option_enabled(&self, name: &str) -> bool {
        let mut enabled = false;
        for option in self.options.split(',').map(str::trim) {
            if option == name {
                enabled = true;
            } else if option.strip_prefix('!') == Some(name) {
                enabled = false;
            }
        }
        enabled
    }
}

fn check_len(field: &'static str, len: usize, max: usize) -> Result<(), SettingsError> {
    if len > max {
        return Err(SettingsError::TooLong { field, len, max });
    }
    Ok(())
}

fn check_path(field: &'static str, path: &Path) -> Result<(), SettingsError> {
    check_len(field, path.as_os_str().len(), MAX_PATH_LEN)
}
