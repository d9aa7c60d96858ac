/// The tile grid: two tile layers per cell, composed at query time.
///
///   - `base`    : the level as loaded. Only mutated by `reveal_hidden_ladders`.
///   - `current` : the effective terrain (base + runtime changes such as holes).
///
/// A cell whose current type is `Empty` while its base type is `Brick` is an
/// active hole. Out-of-range reads behave as `Solid`: the map edge is a wall
/// and the row below the map is a floor.

use super::tile::Tile;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Cell {
    pub base: Tile,
    pub current: Tile,
}

impl Cell {
    pub fn new(tile: Tile) -> Self {
        Cell { base: tile, current: tile }
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
    hidden_ladders: Vec<(usize, usize)>,
}

impl Grid {
    /// Build a grid from rows of tiles. Every row must have the same length.
    pub fn from_tiles(rows: Vec<Vec<Tile>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let cells = rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::new).collect())
            .collect();
        Grid { width, height, cells, hidden_ladders: Vec::new() }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Index of the bottom row.
    pub fn bottom(&self) -> i32 {
        self.height as i32 - 1
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&self.cells[y as usize][x as usize])
    }

    /// Effective tile at (x, y).
    pub fn current(&self, x: i32, y: i32) -> Tile {
        self.cell(x, y).map_or(Tile::Solid, |c| c.current)
    }

    /// Tile at (x, y) as loaded.
    pub fn base(&self, x: i32, y: i32) -> Tile {
        self.cell(x, y).map_or(Tile::Solid, |c| c.base)
    }

    pub fn tile_is(&self, x: i32, y: i32, t: Tile) -> bool {
        self.current(x, y) == t
    }

    /// Active hole: a brick currently dug out.
    pub fn is_hole(&self, x: i32, y: i32) -> bool {
        self.cell(x, y)
            .is_some_and(|c| c.current == Tile::Empty && c.base == Tile::Brick)
    }

    /// Same as `tile_is`, but an active hole still reads as `Brick`.
    ///
    /// Route scanning uses this so that guards never plan a route through a
    /// pit they could fall into.
    pub fn tile_is_ignoring_holes(&self, x: i32, y: i32, t: Tile) -> bool {
        if t == Tile::Brick {
            return self.tile_is(x, y, t) || self.is_hole(x, y);
        }
        self.tile_is(x, y, t)
    }

    /// Can the runner or a guard step into (x, y)?
    pub fn can_occupy(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some_and(|c| c.current.is_walkable())
    }

    /// Does (x, y) have something to stand on below it?
    /// Holes do not count; the bottom row always does.
    pub fn has_floor_below(&self, x: i32, y: i32) -> bool {
        y == self.bottom() || self.current(x, y + 1).is_floor()
    }

    pub fn set_current(&mut self, x: i32, y: i32, t: Tile) {
        if self.in_bounds(x, y) {
            self.cells[y as usize][x as usize].current = t;
        }
    }

    /// Revert (x, y) to its base tile.
    pub fn restore(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            let cell = &mut self.cells[y as usize][x as usize];
            cell.current = cell.base;
        }
    }

    /// Back to the level as loaded: holes refill and revealed ladders are
    /// hidden again.
    pub fn reset(&mut self) {
        for &(x, y) in &self.hidden_ladders {
            self.cells[y][x] = Cell::new(Tile::Empty);
        }
        for cell in self.cells.iter_mut().flatten() {
            cell.current = cell.base;
        }
    }

    pub fn mark_hidden_ladder(&mut self, x: usize, y: usize) {
        self.hidden_ladders.push((x, y));
    }

    pub fn hidden_ladders(&self) -> &[(usize, usize)] {
        &self.hidden_ladders
    }

    /// Turn every hidden ladder cell into a real ladder. Returns how many
    /// cells changed.
    pub fn reveal_hidden_ladders(&mut self) -> usize {
        let mut revealed = 0;
        for &(x, y) in &self.hidden_ladders {
            let cell = &mut self.cells[y][x];
            if cell.base != Tile::Ladder {
                *cell = Cell::new(Tile::Ladder);
                revealed += 1;
            }
        }
        revealed
    }
}
