/// Guard AI: greedy route scanning toward the runner.
///
/// No search: each call traces a handful of straight routes from the guard's
/// cell and rates where each one ends relative to the runner.
///
/// Priority:
///   1. **Climb-out**: a guard leaving its hole keeps going up.
///   2. **Free fall**: nothing to stand on means fall.
///   3. **Same-row chase**: runner on this row and a walkable line to it.
///   4. **Four-way scan**: rate down, up, left and right; lowest wins,
///      ties go to the earlier of that order.
///
/// Ratings (lower is better):
///   - ends on the runner's row: horizontal distance from the start column
///   - ends above the runner:    100 + rows between
///   - ends below the runner:    200 + rows between
///   - no route:                 255
///
/// Scans read holes as bricks, so a guard never plans a route through a pit.
/// The same-row chase reads base tiles instead and walks straight over holes.

use super::entity::{Body, Direction, Guard, GuardState};
use super::grid::Grid;
use super::physics::MOVE_DY;
use super::tile::Tile;

pub type Rating = u32;

pub const RATING_MAX: Rating = 255;
const ABOVE_RUNNER: Rating = 100;
const BELOW_RUNNER: Rating = 200;

/// Pick the next move for `guard`. `guards` may include `guard` itself.
pub fn scan(grid: &Grid, guard: &Guard, runner: &Body, guards: &[Guard]) -> Direction {
    if guard.state == GuardState::ClimbOut {
        return Direction::Up;
    }
    if !guard.leaving_hole && is_falling(grid, guard, guards) {
        return Direction::Fall;
    }
    if let Some(dir) = chase_on_row(grid, &guard.body, runner) {
        return dir;
    }

    let ctx = Ctx { grid, runner_y: runner.y };
    let Body { x, y, .. } = guard.body;
    let open = |x: i32, y: i32| !grid.current(x, y).is_wall();

    let mut best = RATING_MAX;
    let mut dir = Direction::Stay;
    let mut consider = |rating: Rating, d: Direction| {
        if rating < best {
            best = rating;
            dir = d;
        }
    };
    if !guard.leaving_hole && y < grid.bottom() {
        consider(ctx.rate_down(x, y, x), Direction::Down);
    }
    if open(x, y - 1) {
        consider(ctx.rate_up(x, y, x), Direction::Up);
    }
    consider(ctx.rate_horizontal(x, y, -1), Direction::Left);
    consider(ctx.rate_horizontal(x, y, 1), Direction::Right);
    dir
}

/// Nothing holds the guard up: not on a ladder, not hanging on a rope near
/// its middle, and the cell below is neither footing nor another guard.
pub fn is_falling(grid: &Grid, guard: &Guard, guards: &[Guard]) -> bool {
    let Body { x, y, ty, .. } = guard.body;
    let half = MOVE_DY / 2;
    let here = grid.current(x, y);
    if here.is_climbable() || (here.is_hangable() && ty > -half && ty <= half) {
        return false;
    }
    if ty < 0 {
        return true;
    }
    y < grid.bottom()
        && !grid.current(x, y + 1).is_floor()
        && !guards.iter().any(|g| g.id != guard.id && g.body.x == x && g.body.y == y + 1)
}

/// Direct chase along a shared row.
///
/// Walks base tiles toward the runner's column, stepping on while the cell
/// is climbable or has footing below. Walls in between are not checked.
/// Returns `None` when the line breaks or the very first step would hit a
/// wall, leaving the decision to the four-way scan.
fn chase_on_row(grid: &Grid, guard: &Body, runner: &Body) -> Option<Direction> {
    if guard.y != runner.y {
        return None;
    }
    let y = guard.y;
    let (dx, dir) = if guard.x < runner.x {
        (1, Direction::Right)
    } else if guard.x > runner.x {
        (-1, Direction::Left)
    } else if guard.tx < runner.tx {
        (1, Direction::Right)
    } else if guard.tx > runner.tx {
        (-1, Direction::Left)
    } else {
        return Some(Direction::Stay);
    };
    if grid.current(guard.x + dx, y).is_wall() {
        return None;
    }

    let mut x = guard.x;
    while x != runner.x {
        let here = grid.base(x, y);
        if here.is_climbable() || here.is_hangable() || grid.base(x, y + 1).is_floor() {
            x += dx;
        } else {
            return None;
        }
    }
    Some(dir)
}

struct Ctx<'a> {
    grid: &'a Grid,
    runner_y: i32,
}

impl Ctx<'_> {
    fn has(&self, x: i32, y: i32, t: Tile) -> bool {
        self.grid.tile_is_ignoring_holes(x, y, t)
    }

    /// Brick or solid; a hole counts as brick.
    fn blocked(&self, x: i32, y: i32) -> bool {
        self.has(x, y, Tile::Brick) || self.has(x, y, Tile::Solid)
    }

    /// Could a guard at row `y` step sideways into column `nx`?
    fn can_turn_into(&self, nx: i32, y: i32) -> bool {
        self.has(nx, y + 1, Tile::Brick)
            || self.has(nx, y + 1, Tile::Solid)
            || self.has(nx, y + 1, Tile::Ladder)
            || self.has(nx, y, Tile::Rope)
    }

    fn can_turn(&self, x: i32, y: i32) -> bool {
        let last = self.grid.width() as i32 - 1;
        (x > 0 && self.can_turn_into(x - 1, y)) || (x < last && self.can_turn_into(x + 1, y))
    }

    fn rate(&self, x: i32, y: i32, startx: i32) -> Rating {
        if y == self.runner_y {
            (startx - x).unsigned_abs()
        } else if y > self.runner_y {
            BELOW_RUNNER + (y - self.runner_y) as Rating
        } else {
            ABOVE_RUNNER + (self.runner_y - y) as Rating
        }
    }

    /// Drop straight down from (x, y) and rate where the fall ends. Stops
    /// early at the first row past the runner's where a turn opens up.
    fn rate_down(&self, x: i32, mut y: i32, startx: i32) -> Rating {
        if y < self.grid.bottom() && self.blocked(x, y + 1) {
            return RATING_MAX;
        }
        // The row under the map reads as solid, which ends the loop.
        while !self.blocked(x, y + 1) {
            if !self.has(x, y, Tile::Empty) && self.can_turn(x, y) && y >= self.runner_y {
                break;
            }
            y += 1;
        }
        self.rate(x, y, startx)
    }

    /// Climb the ladder at (x, y) and rate where the climb ends. Stops
    /// early at the first row at or above the runner's where a turn opens up.
    fn rate_up(&self, x: i32, mut y: i32, startx: i32) -> Rating {
        if !self.has(x, y, Tile::Ladder) {
            return RATING_MAX;
        }
        while y > 0 && self.has(x, y, Tile::Ladder) {
            y -= 1;
            if self.can_turn(x, y) && y <= self.runner_y {
                break;
            }
        }
        self.rate(x, y, startx)
    }

    /// Walk sideways from (x, y) one column at a time, rating the best
    /// up or down route from each column reached. The walk ends at a wall,
    /// at the map edge, or after the first column with nothing to hold on to.
    fn rate_horizontal(&self, mut x: i32, y: i32, dx: i32) -> Rating {
        let startx = x;
        let last = self.grid.width() as i32 - 1;
        let mut rating = RATING_MAX;
        loop {
            if (dx < 0 && x == 0) || (dx > 0 && x == last) {
                break;
            }
            let nx = x + dx;
            if self.blocked(nx, y) {
                break;
            }
            let climb = self.has(nx, y, Tile::Ladder) || self.has(nx, y, Tile::Rope);
            let walk = y == self.grid.bottom()
                || self.has(nx, y + 1, Tile::Brick)
                || self.has(nx, y + 1, Tile::Solid)
                || self.has(nx, y + 1, Tile::Ladder);
            x = nx;
            let r = self.rate_down(x, y, startx).min(self.rate_up(x, y, startx));
            // `<=` keeps the farther column on a tie; the value is the same.
            if r <= rating {
                rating = r;
            }
            if !climb && !walk {
                break;
            }
        }
        rating
    }
}
