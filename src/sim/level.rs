/// Level loader.
///
/// ## Sources (priority order):
///   1. A file named on the command line
///   2. `levels_dir/NNN` (three-digit level number)
///   3. The built-in embedded level
///
/// ## Format:
///   16 map rows of at most 28 characters. Short rows are padded with
///   empty cells.
///
/// ## Tile legend:
///   '#' = Brick (diggable)       '@' = Solid (indestructible)
///   'H' = Ladder                 '-' = Rope
///   '$' = Gold                   '&' = Runner spawn
///   '0' = Guard spawn            'S' = Hidden ladder
///   'X' = False brick (empty)    ' ' = Empty

use std::path::{Path, PathBuf};

use crate::config::SimConfig;
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;
use crate::error::{LevelError, SimError};
use crate::sim::world::World;

pub const MAP_WIDTH: usize = 28;
pub const MAP_HEIGHT: usize = 16;

/// A parsed level, before any runtime state exists.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub grid: Grid,
    pub runner: (i32, i32),
    pub guards: Vec<(i32, i32)>,
    pub gold: Vec<(i32, i32)>,
}

impl LevelDef {
    pub fn into_world(self, name: &str, config: &SimConfig) -> Result<World, SimError> {
        World::new(name, self.grid, self.runner, &self.guards, &self.gold, config)
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Parse level text. Trailing blank lines past the map are ignored.
pub fn parse_level(text: &str) -> Result<LevelDef, LevelError> {
    let mut rows: Vec<&str> = text.lines().collect();
    while rows.len() > MAP_HEIGHT && rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.len() != MAP_HEIGHT {
        return Err(LevelError::RowCount { found: rows.len(), expected: MAP_HEIGHT });
    }

    let mut tiles = vec![vec![Tile::Empty; MAP_WIDTH]; MAP_HEIGHT];
    let mut hidden = vec![];
    let mut runner = None;
    let mut guards = vec![];
    let mut gold = vec![];

    for (y, row) in rows.iter().enumerate() {
        let len = row.chars().count();
        if len > MAP_WIDTH {
            return Err(LevelError::TooWide { row: y, len, max: MAP_WIDTH });
        }
        for (x, ch) in row.chars().enumerate() {
            let pos = (x as i32, y as i32);
            tiles[y][x] = match ch {
                ' ' | 'X' => Tile::Empty,
                '#' => Tile::Brick,
                '@' => Tile::Solid,
                'H' => Tile::Ladder,
                '-' => Tile::Rope,
                '$' => {
                    gold.push(pos);
                    Tile::Empty
                }
                '0' => {
                    guards.push(pos);
                    Tile::Empty
                }
                '&' => {
                    if runner.replace(pos).is_some() {
                        return Err(LevelError::DuplicateRunner { row: y, col: x });
                    }
                    Tile::Empty
                }
                'S' => {
                    hidden.push((x, y));
                    Tile::Empty
                }
                _ => return Err(LevelError::BadTile { ch, row: y, col: x }),
            };
        }
    }

    let runner = runner.ok_or(LevelError::MissingRunner)?;
    let mut grid = Grid::from_tiles(tiles);
    for (x, y) in hidden {
        grid.mark_hidden_ladder(x, y);
    }
    Ok(LevelDef { grid, runner, guards, gold })
}

pub fn load_level_file(path: &Path) -> Result<LevelDef, LevelError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
    parse_level(&text)
}

/// Path of numbered level `n` inside the levels directory.
pub fn level_path(dir: &Path, n: u32) -> PathBuf {
    dir.join(format!("{n:03}"))
}

/// Resolve a command-line level argument: a plain number selects a file in
/// the levels directory, anything else is a path. No argument gives the
/// embedded level.
pub fn load_world(arg: Option<&str>, config: &SimConfig) -> Result<World, SimError> {
    let Some(arg) = arg else {
        log::info!("no level given; using the embedded level");
        return embedded_level()?.into_world(EMBEDDED_NAME, config);
    };
    let path = match arg.parse::<u32>() {
        Ok(n) => level_path(&config.levels_dir, n),
        Err(_) => PathBuf::from(arg),
    };
    log::info!("loading level {}", path.display());
    let def = load_level_file(&path)?;
    def.into_world(&path.display().to_string(), config)
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback level
// ══════════════════════════════════════════════════════════════

pub const EMBEDDED_NAME: &str = "Quarry";

const EMBEDDED_ROWS: [&str; MAP_HEIGHT] = [
    "                    S       ",
    "   $                S       ",
    "#######H########    S       ",
    "       H-----------HS  $    ",
    "       H      ##   H#######H",
    "   0   H      ##   H   0   H",
    "###H######H########H######H#",
    "   H      H        H      H ",
    "   H  $   H----    H   $  H ",
    "#######H###   #########H####",
    "       H               H    ",
    "   $   H     0         H $  ",
    "###########H#######H########",
    "           H       H        ",
    "     &     H   $   H    0   ",
    "@@@@@@@@@@@@@@@@@@@@@@@@@@@@",
];

pub fn embedded_level() -> Result<LevelDef, LevelError> {
    parse_level(&EMBEDDED_ROWS.join("\n"))
}
