//! Shared test utilities for integration and unit tests

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::io::Write;

use nle_shared::constants::{
    DUNGEON_COLS, DUNGEON_ROWS, blstats as bl, glyph, internal, misc, program_state,
};
use nle_shared::{Conditions, EpisodeSettings, HowDone, Observation, SeedConfig};

use crate::episode::{BridgeConfig, Episode};
use crate::program::{GameIo, GameView, Interrupted, LegacyProgram};
use crate::rng::RngSet;

// ============================================================================
// Toy Dungeon
// ============================================================================

pub const GREETING: &str = "Hello Agent, welcome to the toy dungeon!";
pub const QUIT_PROMPT: &str = "Really quit? [yn] (n)";
pub const NAME_PROMPT: &str = "What do you want to call yourself?";
pub const FAULT_MESSAGE: &str = "toy dungeon fault injected";

pub const ESC: i32 = 0x1b;
pub const ENTER: i32 = b'\r' as i32;

pub const GLYPH_PLAYER: i16 = 337;
pub const GLYPH_LICHEN: i16 = 160;
pub const GLYPH_GOLD: i16 = 1905;
pub const GLYPH_STONE: i16 = glyph::CMAP_OFF;
pub const GLYPH_VWALL: i16 = 2360;
pub const GLYPH_HWALL: i16 = 2361;
pub const GLYPH_FLOOR: i16 = 2378;
pub const GLYPH_STAIRS: i16 = 2383;
pub const GLYPH_TRAP: i16 = 2400;

const START_HP: i64 = 14;

/// Direction keys and their `(dx, dy)`.
pub const MOVES: [(u8, i32, i32); 8] = [
    (b'h', -1, 0),
    (b'j', 0, 1),
    (b'k', 0, -1),
    (b'l', 1, 0),
    (b'y', -1, -1),
    (b'u', 1, -1),
    (b'b', -1, 1),
    (b'n', 1, 1),
];

const INVENTORY: [(u8, i16, u8, &str); 4] = [
    (b'a', 1966, 3, "a +2 pair of leather gloves (being worn)"),
    (b'b', 2150, 7, "an uncursed food ration"),
    (b'c', 2233, 10, "a blessed spellbook of sleep"),
    (b'd', 2180, 8, "2 uncursed potions of healing"),
];

const RATION_LETTER: u8 = b'b';
pub const RATION_NUTRITION: i64 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tile {
    Stone,
    HWall,
    VWall,
    Floor,
    Stairs,
    Trap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    None,
    More,
    YesNo,
    GetLine,
    Menu,
}

#[derive(Debug, Clone, Copy)]
struct Monster {
    x: usize,
    y: usize,
    hp: i64,
}

/// A small roguelike that runs through the bridge like a real program.
///
/// One rectangular room per level, laid out from the level-generation
/// stream. A lichen wanders on the core stream. Walking onto the spiked
/// pit is fatal, `Q` then `y` quits, `!` panics, `e` eats the food
/// ration, `i` shows the inventory, `C` asks for a name and `>` on the
/// stairs descends.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToyDungeon;

impl LegacyProgram for ToyDungeon {
    fn run(&mut self, io: &mut GameIo) -> Result<HowDone, Interrupted> {
        let mut game = Game::new(io);
        game.play(io)
    }
}

struct Game {
    map: [[Tile; DUNGEON_COLS]; DUNGEON_ROWS],
    px: usize,
    py: usize,
    monster: Option<Monster>,
    gold_at: Option<(usize, usize)>,
    hp: i64,
    conditions: Conditions,
    gold: i64,
    exp: i64,
    turn: i64,
    depth: i64,
    deepest: i64,
    nutrition: i64,
    ration_eaten: bool,
    name: String,
    message: String,
    prompt: Prompt,
    in_moveloop: bool,
}

impl Game {
    fn new(io: &mut GameIo) -> Self {
        let mut game = Self {
            map: [[Tile::Stone; DUNGEON_COLS]; DUNGEON_ROWS],
            px: 0,
            py: 0,
            monster: None,
            gold_at: None,
            hp: START_HP,
            conditions: Conditions::empty(),
            gold: 0,
            exp: 0,
            turn: 1,
            depth: 1,
            deepest: 1,
            nutrition: 900,
            ration_eaten: false,
            name: "Agent".to_string(),
            message: String::new(),
            prompt: Prompt::None,
            in_moveloop: false,
        };
        game.generate_level(io);
        game
    }

    fn play(&mut self, io: &mut GameIo) -> Result<HowDone, Interrupted> {
        self.message = GREETING.to_string();
        self.more(io)?;
        self.in_moveloop = true;

        loop {
            self.render(io);
            let key = io.read_key(&*self)?;
            if let Some(how) = self.command(io, key)? {
                return Ok(how);
            }
        }
    }

    /// Show the message with `--More--` and wait for any key.
    fn more(&mut self, io: &mut GameIo) -> Result<(), Interrupted> {
        self.prompt = Prompt::More;
        self.render(io);
        io.read_key(&*self)?;
        self.prompt = Prompt::None;
        self.message.clear();
        Ok(())
    }

    fn command(&mut self, io: &mut GameIo, key: i32) -> Result<Option<HowDone>, Interrupted> {
        self.message.clear();
        let key = u8::try_from(key).unwrap_or(0);
        if let Some(&(_, dx, dy)) = MOVES.iter().find(|(k, _, _)| *k == key) {
            if self.step_player(dx, dy) {
                return self.end_turn(io);
            }
            return Ok(None);
        }
        match key {
            b's' | b'.' => {
                const SOUNDS: [&str; 3] = [
                    "You hear some noises in the distance.",
                    "You hear the footsteps of a guard on patrol.",
                    "You hear bubbling water.",
                ];
                let idx = io.rng().rn2_on_display_rng(SOUNDS.len() as i32) as usize;
                self.message = SOUNDS[idx].to_string();
                self.end_turn(io)
            }
            b'>' => {
                if self.map[self.py][self.px] == Tile::Stairs {
                    self.depth += 1;
                    self.deepest = self.deepest.max(self.depth);
                    self.generate_level(io);
                    self.end_turn(io)
                } else {
                    self.message = "You can't go down here.".to_string();
                    Ok(None)
                }
            }
            b'e' => {
                if self.ration_eaten {
                    self.message = "You don't have anything to eat.".to_string();
                    return Ok(None);
                }
                self.ration_eaten = true;
                self.nutrition += RATION_NUTRITION;
                self.message = "This food really hits the spot!".to_string();
                self.end_turn(io)
            }
            b'i' => {
                self.prompt = Prompt::Menu;
                self.render(io);
                io.read_key(&*self)?;
                self.prompt = Prompt::None;
                Ok(None)
            }
            b'Q' => {
                self.message = QUIT_PROMPT.to_string();
                self.prompt = Prompt::YesNo;
                self.render(io);
                let answer = io.read_key(&*self)?;
                self.prompt = Prompt::None;
                if answer == i32::from(b'y') {
                    self.message = format!("Goodbye {}...", self.name);
                    self.render(io);
                    return Ok(Some(HowDone::Quit));
                }
                self.message = "Never mind.".to_string();
                Ok(None)
            }
            b'C' => {
                self.message = NAME_PROMPT.to_string();
                self.prompt = Prompt::GetLine;
                let mut name = String::new();
                loop {
                    self.render(io);
                    emit(io, &name);
                    match io.read_key(&*self)? {
                        ENTER => break,
                        ESC => {
                            name.clear();
                            break;
                        }
                        key => {
                            if let Ok(byte) = u8::try_from(key) {
                                if byte.is_ascii_graphic() && name.len() < 30 {
                                    name.push(char::from(byte));
                                }
                            }
                        }
                    }
                }
                self.prompt = Prompt::None;
                if !name.is_empty() {
                    self.name = name;
                }
                self.message.clear();
                Ok(None)
            }
            b'!' => panic!("{}", FAULT_MESSAGE),
            0x1b => Ok(None),
            other => {
                self.message = format!("Unknown command '{}'.", char::from(other).escape_default());
                Ok(None)
            }
        }
    }

    /// Try to move; returns whether a turn passed.
    fn step_player(&mut self, dx: i32, dy: i32) -> bool {
        let nx = self.px as i32 + dx;
        let ny = self.py as i32 + dy;
        if nx < 0 || ny < 0 || nx >= DUNGEON_COLS as i32 || ny >= DUNGEON_ROWS as i32 {
            return false;
        }
        let (nx, ny) = (nx as usize, ny as usize);

        if let Some(monster) = self.monster.as_mut() {
            if (monster.x, monster.y) == (nx, ny) {
                monster.hp -= 2;
                if monster.hp <= 0 {
                    self.monster = None;
                    self.exp += 4;
                    self.message = "You kill the lichen!".to_string();
                } else {
                    self.message = "You hit the lichen.".to_string();
                }
                return true;
            }
        }

        match self.map[ny][nx] {
            Tile::Floor | Tile::Stairs | Tile::Trap => {
                self.px = nx;
                self.py = ny;
                if self.gold_at == Some((nx, ny)) {
                    self.gold_at = None;
                    self.gold += 7 * self.depth;
                    self.message = format!("{} gold pieces.", 7 * self.depth);
                }
                if self.map[ny][nx] == Tile::Stairs {
                    self.message = "There is a staircase down here.".to_string();
                }
                true
            }
            _ => {
                self.message = "It's solid stone.".to_string();
                false
            }
        }
    }

    fn end_turn(&mut self, io: &mut GameIo) -> Result<Option<HowDone>, Interrupted> {
        if self.map[self.py][self.px] == Tile::Trap {
            self.hp = 0;
            self.message = "You fall into a spiked pit! You die...".to_string();
            self.more(io)?;
            return Ok(Some(HowDone::Died));
        }

        self.turn += 1;
        self.nutrition -= 1;
        self.move_monster(io);
        if self.hp <= 0 {
            self.message = "You are killed by a lichen. You die...".to_string();
            self.more(io)?;
            return Ok(Some(HowDone::Died));
        }
        if self.turn % 20 == 0 {
            io.rng().reseed_random();
        }
        Ok(None)
    }

    fn move_monster(&mut self, io: &mut GameIo) {
        // A lichen touch stuns until the next turn.
        self.conditions.remove(Conditions::STUN);
        let Some(mut monster) = self.monster else {
            return;
        };
        let adjacent = monster.x.abs_diff(self.px) <= 1 && monster.y.abs_diff(self.py) <= 1;
        if adjacent {
            if io.rng().rn2(3) == 0 {
                self.hp -= i64::from(io.rng().rnd(2));
                self.conditions.insert(Conditions::STUN);
                self.message = "The lichen touches you!".to_string();
            }
            return;
        }
        let (_, dx, dy) = MOVES[io.rng().rn2(MOVES.len() as i32) as usize];
        let nx = (monster.x as i32 + dx) as usize;
        let ny = (monster.y as i32 + dy) as usize;
        if self.map[ny][nx] == Tile::Floor && (nx, ny) != (self.px, self.py) {
            monster.x = nx;
            monster.y = ny;
            self.monster = Some(monster);
        }
    }

    fn generate_level(&mut self, io: &mut GameIo) {
        self.map = [[Tile::Stone; DUNGEON_COLS]; DUNGEON_ROWS];
        let rng = io.rng();
        let left = 3 + rng.rn2_lgen(30) as usize;
        let top = 2 + rng.rn2_lgen(6) as usize;
        let right = left + 13 + rng.rn2_lgen(10) as usize;
        let bottom = top + 6 + rng.rn2_lgen(4) as usize;

        for x in left..=right {
            self.map[top][x] = Tile::HWall;
            self.map[bottom][x] = Tile::HWall;
        }
        for y in top + 1..bottom {
            self.map[y][left] = Tile::VWall;
            self.map[y][right] = Tile::VWall;
            for x in left + 1..right {
                self.map[y][x] = Tile::Floor;
            }
        }

        let pick = |rng: &mut RngSet, map: &[[Tile; DUNGEON_COLS]; DUNGEON_ROWS]| loop {
            let x = left + 1 + rng.rn2_lgen((right - left - 1) as i32) as usize;
            let y = top + 1 + rng.rn2_lgen((bottom - top - 1) as i32) as usize;
            if map[y][x] == Tile::Floor {
                return (x, y);
            }
        };

        let (sx, sy) = pick(rng, &self.map);
        self.map[sy][sx] = Tile::Stairs;
        let (tx, ty) = pick(rng, &self.map);
        self.map[ty][tx] = Tile::Trap;
        let (px, py) = pick(rng, &self.map);
        self.px = px;
        self.py = py;
        let gold = loop {
            let spot = pick(rng, &self.map);
            if spot != (px, py) {
                break spot;
            }
        };
        self.gold_at = Some(gold);

        let x = left + 1 + rng.rn2((right - left - 1) as i32) as usize;
        let y = top + 1 + rng.rn2((bottom - top - 1) as i32) as usize;
        self.monster = (self.map[y][x] == Tile::Floor && (x, y) != (px, py))
            .then_some(Monster { x, y, hp: 4 });
    }

    /// Character and colour shown at a map cell.
    fn cell(&self, x: usize, y: usize) -> (u8, u8) {
        if (x, y) == (self.px, self.py) {
            return (b'@', 15);
        }
        if let Some(m) = self.monster {
            if (m.x, m.y) == (x, y) {
                return (b'F', 10);
            }
        }
        if self.gold_at == Some((x, y)) {
            return (b'$', 11);
        }
        match self.map[y][x] {
            Tile::Stone => (b' ', 0),
            Tile::HWall => (b'-', 7),
            Tile::VWall => (b'|', 7),
            Tile::Floor => (b'.', 7),
            Tile::Stairs => (b'>', 7),
            Tile::Trap => (b'^', 5),
        }
    }

    fn glyph(&self, x: usize, y: usize) -> (i16, String) {
        match self.cell(x, y).0 {
            b'@' => (GLYPH_PLAYER, format!("human monk called {}", self.name)),
            b'F' => (GLYPH_LICHEN, "lichen".to_string()),
            b'$' => (GLYPH_GOLD, "gold piece".to_string()),
            b'-' => (GLYPH_HWALL, "wall".to_string()),
            b'|' => (GLYPH_VWALL, "wall".to_string()),
            b'.' => (GLYPH_FLOOR, "floor of a room".to_string()),
            b'>' => (GLYPH_STAIRS, "staircase down".to_string()),
            b'^' => (GLYPH_TRAP, "spiked pit".to_string()),
            _ => (GLYPH_STONE, String::new()),
        }
    }

    fn status_lines(&self) -> [String; 2] {
        [
            format!(
                "{} the Candidate   St:16 Dx:10 Co:12 In:8 Wi:14 Ch:7 Neutral",
                self.name
            ),
            format!(
                "Dlvl:{} $:{} HP:{}({}) Pw:5(5) AC:4 Xp:1/{} T:{}",
                self.depth,
                self.gold,
                self.hp.max(0),
                START_HP,
                self.exp,
                self.turn
            ),
        ]
    }

    fn inventory(&self) -> Vec<(u8, i16, u8, String)> {
        let mut items = Vec::new();
        if self.gold > 0 {
            items.push((b'$', GLYPH_GOLD, 12, format!("{} gold pieces", self.gold)));
        }
        items.extend(
            INVENTORY
                .iter()
                .filter(|&&(letter, ..)| !(self.ration_eaten && letter == RATION_LETTER))
                .map(|&(letter, glyph, class, text)| (letter, glyph, class, text.to_string())),
        );
        items
    }

    fn render(&self, io: &mut GameIo) {
        let mut out = String::from("\x1b[H\x1b[2J");
        out.push_str(&self.message);
        if self.prompt == Prompt::More {
            out.push_str("--More--");
        }
        for y in 0..DUNGEON_ROWS {
            let _ = write!(out, "\x1b[{};1H", y + 2);
            let mut current = 0u8;
            for x in 0..DUNGEON_COLS {
                let (ch, color) = self.cell(x, y);
                if color != current {
                    out.push_str(&sgr(color));
                    current = color;
                }
                out.push(char::from(ch));
            }
            out.push_str("\x1b[0m");
        }
        for (i, line) in self.status_lines().iter().enumerate() {
            let _ = write!(out, "\x1b[{};1H{}", DUNGEON_ROWS + 2 + i, line);
        }
        if self.prompt == Prompt::Menu {
            for (i, (letter, _, _, text)) in self.inventory().iter().enumerate() {
                let _ = write!(out, "\x1b[{};30H\x1b[K{} - {}", i + 2, char::from(*letter), text);
            }
            out.push_str("(end) ");
        }
        match self.prompt {
            Prompt::None => {
                let _ = write!(out, "\x1b[{};{}H", self.py + 2, self.px + 1);
            }
            Prompt::More | Prompt::YesNo | Prompt::GetLine => {
                let col = self.message.len() + if self.prompt == Prompt::More { 9 } else { 2 };
                let _ = write!(out, "\x1b[1;{}H", col.min(80));
            }
            Prompt::Menu => {}
        }
        emit(io, &out);
    }
}

impl GameView for Game {
    fn observe(&self, obs: &mut Observation) {
        for y in 0..DUNGEON_ROWS {
            for x in 0..DUNGEON_COLS {
                let (ch, color) = self.cell(x, y);
                let (glyph, description) = self.glyph(x, y);
                obs.chars[(y, x)] = ch;
                obs.colors[(y, x)] = color;
                obs.glyphs[(y, x)] = glyph;
                if !description.is_empty() {
                    obs.set_screen_description(y, x, &description);
                }
            }
        }

        let b = &mut obs.blstats;
        b[bl::X] = self.px as i64;
        b[bl::Y] = self.py as i64;
        b[bl::STR25] = 16;
        b[bl::STR125] = 16;
        b[bl::DEX] = 10;
        b[bl::CON] = 12;
        b[bl::INT] = 8;
        b[bl::WIS] = 14;
        b[bl::CHA] = 7;
        b[bl::SCORE] = self.gold + 4 * self.exp + 50 * (self.deepest - 1);
        b[bl::HP] = self.hp.max(0);
        b[bl::HPMAX] = START_HP;
        b[bl::DEPTH] = self.depth;
        b[bl::GOLD] = self.gold;
        b[bl::ENE] = 5;
        b[bl::ENEMAX] = 5;
        b[bl::AC] = 4;
        b[bl::XP] = 1;
        b[bl::EXP] = self.exp;
        b[bl::TIME] = self.turn;
        b[bl::HUNGER] = i64::from(self.nutrition < 150);
        b[bl::DLEVEL] = self.depth;
        b[bl::CONDITION] = self.conditions.bits();

        obs.set_message(&self.message);

        let in_yn = i32::from(self.prompt == Prompt::YesNo);
        let in_getlin = i32::from(self.prompt == Prompt::GetLine);
        let waiting = i32::from(matches!(self.prompt, Prompt::More | Prompt::Menu));
        obs.misc = [in_yn, in_getlin, waiting];
        obs.internal[internal::DEEPEST_LEVEL] = self.deepest as i32;
        obs.internal[internal::IN_YN_FUNCTION] = in_yn;
        obs.internal[internal::IN_GETLIN] = in_getlin;
        obs.internal[internal::XWAITFORSPACE] = waiting;
        obs.internal[internal::STAIRS_DOWN] = i32::from(self.map[self.py][self.px] == Tile::Stairs);
        obs.internal[internal::NUTRITION] = self.nutrition as i32;
        obs.program_state[program_state::IN_MOVELOOP] = i32::from(self.in_moveloop);
        obs.program_state[program_state::SOMETHING_WORTH_SAVING] = i32::from(self.in_moveloop);

        for (slot, (letter, glyph, class, text)) in self.inventory().iter().enumerate() {
            obs.set_inventory_slot(slot, *glyph, *letter, *class, text);
        }

        obs.in_normal_game = self.in_moveloop;
    }
}

fn sgr(color: u8) -> String {
    if color == 0 {
        "\x1b[0m".to_string()
    } else {
        format!("\x1b[{};3{}m", u8::from(color & 8 != 0), color & 7)
    }
}

fn emit(io: &mut GameIo, text: &str) {
    let _ = io.write_all(text.as_bytes());
}

// ============================================================================
// Episode helpers
// ============================================================================

/// Settings with fixed seeds and nothing touching the filesystem.
pub fn seeded_settings(core: u64, disp: u64) -> EpisodeSettings {
    EpisodeSettings {
        hackdir: std::env::temp_dir().join("nle-test-hackdir"),
        seeds: SeedConfig::fixed(core, disp),
        ..EpisodeSettings::default()
    }
}

/// Small-stack configuration so tests can run many episodes at once.
pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        stack_size: 1024 * 1024,
        thread_name: "nle-test-program".to_string(),
        ..BridgeConfig::default()
    }
}

pub fn toy_episode(settings: EpisodeSettings) -> Episode {
    Episode::with_config(test_config(), settings, || ToyDungeon).unwrap()
}

/// Reset and dismiss the welcome screen.
pub fn started_episode(core: u64, disp: u64) -> Episode {
    let mut episode = toy_episode(seeded_settings(core, disp));
    let obs = episode.reset().unwrap();
    assert_eq!(obs.misc[misc::XWAITFORSPACE], 1);
    episode.step(ENTER).unwrap();
    assert!(episode.in_normal_game());
    episode
}

pub fn key(c: char) -> i32 {
    c as i32
}

/// Locate the first map cell showing `ch`.
pub fn find_char(obs: &Observation, ch: u8) -> Option<(usize, usize)> {
    (0..DUNGEON_ROWS)
        .flat_map(|y| (0..DUNGEON_COLS).map(move |x| (x, y)))
        .find(|&(x, y)| obs.chars[(y, x)] == ch)
}

/// First key of a shortest walk from the player to `target`.
///
/// Walls, stone and traps block the walk unless the trap is the target.
/// Monsters do not block; walking into one attacks it.
pub fn next_step(obs: &Observation, target: (usize, usize)) -> Option<i32> {
    let (px, py) = obs.player_position();
    let start = (px as usize, py as usize);
    if start == target {
        return None;
    }

    let mut first_key = [[None::<u8>; DUNGEON_COLS]; DUNGEON_ROWS];
    let mut seen = [[false; DUNGEON_COLS]; DUNGEON_ROWS];
    let mut queue = VecDeque::from([start]);
    seen[start.1][start.0] = true;

    while let Some((x, y)) = queue.pop_front() {
        for &(key, dx, dy) in &MOVES {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= DUNGEON_COLS as i32 || ny >= DUNGEON_ROWS as i32 {
                continue;
            }
            let next = (nx as usize, ny as usize);
            if seen[next.1][next.0] {
                continue;
            }
            let walkable = matches!(obs.chars[(next.1, next.0)], b'.' | b'>' | b'$' | b'F');
            if !walkable && next != target {
                continue;
            }
            seen[next.1][next.0] = true;
            let key = if (x, y) == start { Some(key) } else { first_key[y][x] };
            if next == target {
                return key.map(i32::from);
            }
            first_key[next.1][next.0] = key;
            queue.push_back(next);
        }
    }
    None
}

/// Walk the player onto `target`, fighting anything in the way.
///
/// Dismisses `--More--` prompts on the way and stops early when the
/// episode ends. Returns the number of steps taken.
pub fn walk_to(episode: &mut Episode, target: (usize, usize)) -> usize {
    let mut steps = 0;
    while steps < 300 && !episode.is_done() {
        let Some(obs) = episode.observation() else {
            break;
        };
        let action = if obs.misc[misc::XWAITFORSPACE] == 1 {
            ENTER
        } else {
            match next_step(obs, target) {
                Some(key) => key,
                None => break,
            }
        };
        episode.step(action).unwrap();
        steps += 1;
    }
    steps
}
