//! How an episode ends.

use bitflags::bitflags;
use std::fmt;

/// Game-over causes reported in `Observation::how_done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum HowDone {
    Died = 0,
    Choking = 1,
    Poisoning = 2,
    Starving = 3,
    Drowning = 4,
    Burning = 5,
    Dissolved = 6,
    Crushing = 7,
    Stoning = 8,
    TurnedSlime = 9,
    Genocided = 10,
    Panicked = 11,
    Tricked = 12,
    Quit = 13,
    Escaped = 14,
    Ascended = 15,
}

impl HowDone {
    pub const ALL: [HowDone; 16] = [
        HowDone::Died,
        HowDone::Choking,
        HowDone::Poisoning,
        HowDone::Starving,
        HowDone::Drowning,
        HowDone::Burning,
        HowDone::Dissolved,
        HowDone::Crushing,
        HowDone::Stoning,
        HowDone::TurnedSlime,
        HowDone::Genocided,
        HowDone::Panicked,
        HowDone::Tricked,
        HowDone::Quit,
        HowDone::Escaped,
        HowDone::Ascended,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Deaths, as opposed to quitting, escaping or ascending.
    pub fn is_death(self) -> bool {
        self.code() <= HowDone::Genocided.code()
    }
}

impl fmt::Display for HowDone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HowDone::Died => "died",
            HowDone::Choking => "choked",
            HowDone::Poisoning => "poisoned",
            HowDone::Starving => "starved",
            HowDone::Drowning => "drowned",
            HowDone::Burning => "burned",
            HowDone::Dissolved => "dissolved",
            HowDone::Crushing => "crushed",
            HowDone::Stoning => "turned to stone",
            HowDone::TurnedSlime => "turned into slime",
            HowDone::Genocided => "genocided",
            HowDone::Panicked => "panicked",
            HowDone::Tricked => "tricked",
            HowDone::Quit => "quit",
            HowDone::Escaped => "escaped",
            HowDone::Ascended => "ascended",
        };
        f.write_str(name)
    }
}

/// Why an episode stopped running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The program's main routine returned normally.
    GameOver(HowDone),
    /// The program faulted; reported to the caller as `HowDone::Panicked`.
    Fault { message: String },
}

impl TerminationReason {
    pub fn how_done(&self) -> HowDone {
        match self {
            TerminationReason::GameOver(how) => *how,
            TerminationReason::Fault { .. } => HowDone::Panicked,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, TerminationReason::Fault { .. })
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::GameOver(how) => write!(f, "game over ({how})"),
            TerminationReason::Fault { message } => write!(f, "program fault: {message}"),
        }
    }
}

bitflags! {
    /// Status conditions packed into `blstats[CONDITION]`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Conditions: i64 {
        const STONE = 0x0001;
        const SLIME = 0x0002;
        const STRNGL = 0x0004;
        const FOODPOIS = 0x0008;
        const TERMILL = 0x0010;
        const BLIND = 0x0020;
        const DEAF = 0x0040;
        const STUN = 0x0080;
        const CONF = 0x0100;
        const HALLU = 0x0200;
        const LEV = 0x0400;
        const FLY = 0x0800;
        const RIDE = 0x1000;
    }
}
