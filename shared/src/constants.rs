//! Fixed dimensions and field indices of the observation layout.
//!
//! These values are part of the external contract: consumers index the
//! observation arrays with them, so they never change between episodes.

/// Rows of the dungeon map.
pub const ROWNO: usize = 21;

/// Columns of the dungeon map, including the unused column 0.
pub const COLNO: usize = 80;

/// Rows of the dungeon-shaped observation grids.
pub const DUNGEON_ROWS: usize = ROWNO;

/// Columns of the dungeon-shaped observation grids (column 0 is dropped).
pub const DUNGEON_COLS: usize = COLNO - 1;

/// Terminal height in rows.
pub const TERM_LI: usize = 24;

/// Terminal width in columns.
pub const TERM_CO: usize = 80;

pub const MESSAGE_SIZE: usize = 256;
pub const BLSTATS_SIZE: usize = 27;
pub const PROGRAM_STATE_SIZE: usize = 6;
pub const INTERNAL_SIZE: usize = 9;
pub const MISC_SIZE: usize = 3;
pub const INVENTORY_SIZE: usize = 55;
pub const INVENTORY_STR_LENGTH: usize = 80;
pub const SCREEN_DESCRIPTION_LENGTH: usize = 80;

/// Size of the program output window before it is flushed to the terminal.
pub const BUFSIZ: usize = 8192;

/// Glyph value for "nothing here".
pub const NO_GLYPH: i16 = 5976;

/// Object class value for an empty inventory slot.
pub const MAXOCLASSES: u8 = 18;

/// Value of `how_done` while the episode is still running.
pub const NOT_DONE: i32 = -1;

/// Indices into `Observation::blstats`.
pub mod blstats {
    pub const X: usize = 0;
    pub const Y: usize = 1;
    pub const STR25: usize = 2;
    pub const STR125: usize = 3;
    pub const DEX: usize = 4;
    pub const CON: usize = 5;
    pub const INT: usize = 6;
    pub const WIS: usize = 7;
    pub const CHA: usize = 8;
    pub const SCORE: usize = 9;
    pub const HP: usize = 10;
    pub const HPMAX: usize = 11;
    pub const DEPTH: usize = 12;
    pub const GOLD: usize = 13;
    pub const ENE: usize = 14;
    pub const ENEMAX: usize = 15;
    pub const AC: usize = 16;
    pub const HD: usize = 17;
    pub const XP: usize = 18;
    pub const EXP: usize = 19;
    pub const TIME: usize = 20;
    pub const HUNGER: usize = 21;
    pub const CAP: usize = 22;
    pub const DNUM: usize = 23;
    pub const DLEVEL: usize = 24;
    pub const CONDITION: usize = 25;
    pub const ALIGN: usize = 26;
}

/// Indices into `Observation::program_state`.
pub mod program_state {
    pub const GAMEOVER: usize = 0;
    pub const PANICKING: usize = 1;
    pub const EXITING: usize = 2;
    pub const IN_MOVELOOP: usize = 3;
    pub const IN_IMPOSSIBLE: usize = 4;
    pub const SOMETHING_WORTH_SAVING: usize = 5;
}

/// Indices into `Observation::internal`.
///
/// Slots 1..=3 mirror `misc` so that prompt detection works from either
/// field.
pub mod internal {
    pub const DEEPEST_LEVEL: usize = 0;
    pub const IN_YN_FUNCTION: usize = 1;
    pub const IN_GETLIN: usize = 2;
    pub const XWAITFORSPACE: usize = 3;
    pub const STAIRS_DOWN: usize = 4;
    pub const NUTRITION: usize = 5;
}

/// Indices into `Observation::misc`.
pub mod misc {
    pub const IN_YN_FUNCTION: usize = 0;
    pub const IN_GETLIN: usize = 1;
    pub const XWAITFORSPACE: usize = 2;
}

/// Glyph number ranges.
///
/// Monsters come first, then the same monsters drawn as pets, then the
/// remembered-invisible marker, detected, dead and ridden monsters,
/// objects and finally the map symbols.
pub mod glyph {
    use super::NO_GLYPH;

    /// Number of monster species.
    pub const NUMMONS: i16 = 381;

    pub const MON_OFF: i16 = 0;
    pub const PET_OFF: i16 = MON_OFF + NUMMONS;
    pub const INVIS_OFF: i16 = PET_OFF + NUMMONS;
    pub const DETECT_OFF: i16 = INVIS_OFF + 1;
    pub const BODY_OFF: i16 = DETECT_OFF + NUMMONS;
    pub const RIDDEN_OFF: i16 = BODY_OFF + NUMMONS;
    pub const OBJ_OFF: i16 = RIDDEN_OFF + NUMMONS;
    /// First map symbol, which is also dark solid stone.
    pub const CMAP_OFF: i16 = 2359;

    pub fn is_monster(glyph: i16) -> bool {
        (MON_OFF..PET_OFF).contains(&glyph)
    }

    pub fn is_pet(glyph: i16) -> bool {
        (PET_OFF..INVIS_OFF).contains(&glyph)
    }

    pub fn is_cmap(glyph: i16) -> bool {
        (CMAP_OFF..NO_GLYPH).contains(&glyph)
    }
}
