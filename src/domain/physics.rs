/// Sub-tile movement: one move primitive shared by the runner and guards.
///
/// ## Offsets
///
/// An entity sits in a cell `(x, y)` with an offset `(tx, ty)` toward its
/// neighbours. Each step adds `MOVE_DX` / `MOVE_DY` to the offset. Once the
/// offset passes half a tile the cell coordinate moves and the offset wraps
/// to the other side, so the entity stays on the same spot on screen.
///
/// ## Move rules
///
/// ┌───────────┬──────────────────────────────────────────────┬───────────────────────────┐
/// │ Direction │ Rejected when                                │ Resulting motion           │
/// ├───────────┼──────────────────────────────────────────────┼───────────────────────────┤
/// │ Left/Right│ heading past centre into an unoccupiable cell │ Climb* on rope, else walk │
/// │ Up        │ above centre and not on a ladder, or cell     │ UpDown                    │
/// │           │ above unoccupiable (climb-out: see below)     │                           │
/// │ Down      │ at/below centre and cell below unoccupiable   │ entity hook               │
/// │ Fall      │ never                                        │ entity hook (landing)     │
/// └───────────┴──────────────────────────────────────────────┴───────────────────────────┘
///
/// A rejected move changes nothing: position, offset and state stay as they were.
///
/// Entity differences live behind the `Mobile` trait. Guards use the hooks
/// for hole trapping and gold carrying; the runner only decides how it lands.

use super::entity::{
    Body, Direction, Facing, Gold, Guard, GuardState, Runner, RunnerState, TILE_H, TILE_W,
};
use super::gold::{self, GoldEvent};
use super::grid::Grid;
use super::tile::Tile;

/// Horizontal step per tick.
pub const MOVE_DX: i32 = 8;
/// Vertical step per tick.
pub const MOVE_DY: i32 = 9;

/// Entity-neutral result of a move; each entity maps it onto its own states.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Motion {
    Walk(Facing),
    Climb(Facing),
    UpDown,
    Fall(Facing),
    Trapped(Facing),
    Stop,
    /// Keep the current state.
    Hold,
}

/// What a move may touch besides the entity itself.
pub struct MoveCtx<'a> {
    pub grid: &'a Grid,
    pub gold: &'a mut [Gold],
    pub events: &'a mut Vec<GoldEvent>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    Horizontal,
    Vertical,
}

pub trait Mobile {
    fn body(&self) -> Body;
    fn body_mut(&mut self) -> &mut Body;
    fn facing(&self) -> Facing;
    /// Switch to the state for `motion`.
    fn apply(&mut self, motion: Motion);
    /// Advance the movement animation by one tick.
    fn animate(&mut self);

    /// Row of the hole being climbed out of, if climbing out.
    fn climbing_out_of(&self) -> Option<i32> {
        None
    }

    /// Motion for a successful step down at `body`.
    fn descent(&self, grid: &Grid, body: &Body) -> Motion;

    /// Called once the body has moved into a new cell; `from` is the cell
    /// it left.
    fn crossed(&mut self, _ctx: &mut MoveCtx<'_>, _axis: Axis, _from: (i32, i32)) {}

    /// Final say on a downward step (`Down` or `Fall`) after it is committed.
    fn settle(&mut self, ctx: &mut MoveCtx<'_>, dir: Direction, motion: Motion) -> Motion;
}

/// Move `m` one step in `dir`. Returns false if the move was rejected.
pub fn advance<M: Mobile>(m: &mut M, ctx: &mut MoveCtx<'_>, dir: Direction) -> bool {
    let grid = ctx.grid;
    let mut b = m.body();
    let mut crossed = None;

    let motion = match dir {
        Direction::Stay => return false,
        Direction::Left | Direction::Right => {
            let (dx, facing) = match dir {
                Direction::Left => (-1, Facing::Left),
                _ => (1, Facing::Right),
            };
            b.tx += dx * MOVE_DX;
            b.ty = 0;
            if b.tx * dx > TILE_W / 2 {
                b.x += dx;
                b.tx -= dx * TILE_W;
                crossed = Some(Axis::Horizontal);
            }
            if b.tx * dx > 0 && !grid.can_occupy(b.x + dx, b.y) {
                return false;
            }
            if grid.tile_is(b.x, b.y, Tile::Rope) {
                Motion::Climb(facing)
            } else {
                Motion::Walk(facing)
            }
        }
        Direction::Up => {
            b.ty -= MOVE_DY;
            b.tx = 0;
            if b.ty < -(TILE_H / 2) {
                b.y -= 1;
                b.ty += TILE_H;
                crossed = Some(Axis::Vertical);
            }
            match m.climbing_out_of() {
                Some(row) if row == b.y && grid.is_hole(b.x, b.y) => {
                    if !grid.can_occupy(b.x, b.y - 1) {
                        return false;
                    }
                    Motion::Hold
                }
                // Out of the hole: from here on a regular climber.
                Some(_) => Motion::UpDown,
                None => {
                    let on_ladder = grid.tile_is(b.x, b.y, Tile::Ladder);
                    if b.ty < 0 && (!on_ladder || !grid.can_occupy(b.x, b.y - 1)) {
                        return false;
                    }
                    Motion::UpDown
                }
            }
        }
        Direction::Down | Direction::Fall => {
            b.ty += MOVE_DY;
            b.tx = 0;
            if b.ty > TILE_H / 2 {
                b.y += 1;
                b.ty -= TILE_H;
                crossed = Some(Axis::Vertical);
            }
            if dir == Direction::Down {
                if b.ty >= 0 && !grid.can_occupy(b.x, b.y + 1) {
                    return false;
                }
                m.descent(grid, &b)
            } else {
                Motion::Fall(m.facing())
            }
        }
    };

    let from = m.body();
    *m.body_mut() = b;
    if let Some(axis) = crossed {
        m.crossed(ctx, axis, (from.x, from.y));
    }
    let motion = match dir {
        Direction::Down | Direction::Fall => m.settle(ctx, dir, motion),
        _ => motion,
    };
    m.animate();
    m.apply(motion);
    true
}

// ══════════════════════════════════════════════════════════════
// Guard
// ══════════════════════════════════════════════════════════════

impl Mobile for Guard {
    fn body(&self) -> Body {
        self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn facing(&self) -> Facing {
        Guard::facing(self)
    }

    fn apply(&mut self, motion: Motion) {
        let state = match motion {
            Motion::Walk(Facing::Left) => GuardState::Left,
            Motion::Walk(Facing::Right) => GuardState::Right,
            Motion::Climb(Facing::Left) => GuardState::ClimbLeft,
            Motion::Climb(Facing::Right) => GuardState::ClimbRight,
            Motion::UpDown => GuardState::UpDown,
            Motion::Fall(Facing::Left) => GuardState::FallLeft,
            Motion::Fall(Facing::Right) => GuardState::FallRight,
            Motion::Trapped(Facing::Left) => GuardState::TrapLeft,
            Motion::Trapped(Facing::Right) => GuardState::TrapRight,
            Motion::Stop => GuardState::Stopped,
            Motion::Hold => return,
        };
        self.set_state(state);
    }

    fn animate(&mut self) {
        self.anim.tick();
    }

    fn climbing_out_of(&self) -> Option<i32> {
        if self.state != GuardState::ClimbOut {
            return None;
        }
        // A climbing-out guard always remembers its hole; fall back to the
        // current row so the climb still ends.
        Some(self.hole_row.unwrap_or(self.body.y))
    }

    fn descent(&self, grid: &Grid, b: &Body) -> Motion {
        if !grid.tile_is(b.x, b.y, Tile::Ladder) && !grid.tile_is(b.x, b.y + 1, Tile::Ladder) {
            Motion::Fall(self.facing())
        } else {
            Motion::UpDown
        }
    }

    fn crossed(&mut self, ctx: &mut MoveCtx<'_>, axis: Axis, from: (i32, i32)) {
        if axis == Axis::Horizontal {
            self.leaving_hole = false;
            self.hole_row = None;
        }
        if let Some(ev) = gold::on_cell_crossed(self, ctx.gold, ctx.grid, from) {
            ctx.events.push(ev);
        }
    }

    fn settle(&mut self, ctx: &mut MoveCtx<'_>, dir: Direction, motion: Motion) -> Motion {
        let grid = ctx.grid;
        let Body { x, y, ty, .. } = self.body;
        if ty < 0 && grid.is_hole(x, y) {
            self.hole_row = Some(y);
        }
        if ty >= 0 {
            if grid.is_hole(x, y) && self.hole_row == Some(y) {
                self.leaving_hole = true;
                self.body.ty = 0;
                if let Some(ev) = gold::drop_trapped(self, ctx.gold, grid) {
                    ctx.events.push(ev);
                }
                return Motion::Trapped(self.facing());
            }
            if dir == Direction::Fall && !grid.can_occupy(x, y + 1) {
                self.body.ty = 0;
            }
        }
        motion
    }
}

// ══════════════════════════════════════════════════════════════
// Runner
// ══════════════════════════════════════════════════════════════

impl Runner {
    pub fn facing(&self) -> Facing {
        match self.state {
            RunnerState::Left | RunnerState::FallLeft | RunnerState::ClimbLeft | RunnerState::DigLeft => {
                Facing::Left
            }
            _ => Facing::Right,
        }
    }
}

impl Mobile for Runner {
    fn body(&self) -> Body {
        self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn facing(&self) -> Facing {
        Runner::facing(self)
    }

    fn apply(&mut self, motion: Motion) {
        let state = match motion {
            Motion::Walk(Facing::Left) => RunnerState::Left,
            Motion::Walk(Facing::Right) => RunnerState::Right,
            Motion::Climb(Facing::Left) => RunnerState::ClimbLeft,
            Motion::Climb(Facing::Right) => RunnerState::ClimbRight,
            Motion::UpDown => RunnerState::UpDown,
            Motion::Fall(Facing::Left) => RunnerState::FallLeft,
            Motion::Fall(Facing::Right) => RunnerState::FallRight,
            Motion::Stop => RunnerState::Stopped,
            Motion::Trapped(_) | Motion::Hold => return,
        };
        self.set_state(state);
    }

    fn animate(&mut self) {
        self.anim.tick();
    }

    fn descent(&self, grid: &Grid, b: &Body) -> Motion {
        if grid.tile_is(b.x, b.y, Tile::Rope) && !grid.tile_is(b.x, b.y + 1, Tile::Ladder) {
            Motion::Fall(self.facing())
        } else {
            Motion::UpDown
        }
    }

    fn settle(&mut self, ctx: &mut MoveCtx<'_>, dir: Direction, motion: Motion) -> Motion {
        if dir != Direction::Fall {
            return motion;
        }
        let grid = ctx.grid;
        let Body { x, y, ty, .. } = self.body;
        // Grab a rope only when falling onto it from above, not when letting go of it.
        if grid.tile_is(x, y, Tile::Rope) && ty > 0 && ty < MOVE_DY {
            self.body.ty = 0;
            return Motion::Climb(self.facing());
        }
        if ty >= 0 && !grid.tile_is(x, y + 1, Tile::Empty) && !grid.tile_is(x, y + 1, Tile::Rope) {
            self.body.ty = 0;
            return Motion::Stop;
        }
        motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::GoldStatus;
    use crate::domain::grid::tests::grid_from;

    fn step<M: Mobile>(m: &mut M, grid: &Grid, gold: &mut [Gold], dir: Direction) -> bool {
        let mut events = Vec::new();
        let mut ctx = MoveCtx { grid, gold, events: &mut events };
        advance(m, &mut ctx, dir)
    }

    fn step_events(g: &mut Guard, grid: &Grid, gold: &mut [Gold], dir: Direction) -> Vec<GoldEvent> {
        let mut events = Vec::new();
        let mut ctx = MoveCtx { grid, gold, events: &mut events };
        advance(g, &mut ctx, dir);
        events
    }

    // ── Horizontal ──

    #[test]
    fn walking_right_crosses_cell_after_three_steps() {
        let grid = grid_from(&["   ", "###"]);
        let mut g = Guard::new(0, 0, 0);
        assert!(step(&mut g, &grid, &mut [], Direction::Right));
        assert_eq!((g.body.x, g.body.tx), (0, 8));
        step(&mut g, &grid, &mut [], Direction::Right);
        assert_eq!((g.body.x, g.body.tx), (0, 16));
        step(&mut g, &grid, &mut [], Direction::Right);
        assert_eq!((g.body.x, g.body.tx), (1, -16));
        assert_eq!(g.state, GuardState::Right);
    }

    #[test]
    fn wall_rejects_whole_step() {
        let grid = grid_from(&[" # ", "###"]);
        let mut g = Guard::new(0, 0, 0);
        g.set_state(GuardState::UpDown);
        assert!(!step(&mut g, &grid, &mut [], Direction::Right));
        assert_eq!(g.body, Body::at(0, 0));
        assert_eq!(g.state, GuardState::UpDown);
    }

    #[test]
    fn stepping_back_to_centre_ignores_wall_ahead() {
        let grid = grid_from(&[" # ", "###"]);
        let mut g = Guard::new(0, 0, 0);
        g.body.tx = -16;
        assert!(step(&mut g, &grid, &mut [], Direction::Right));
        assert_eq!(g.body.tx, -8);
    }

    #[test]
    fn map_edge_rejects_step() {
        let grid = grid_from(&["  ", "##"]);
        let mut g = Guard::new(0, 0, 0);
        assert!(!step(&mut g, &grid, &mut [], Direction::Left));
    }

    #[test]
    fn rope_makes_climb_state() {
        let grid = grid_from(&["---", "   "]);
        let mut g = Guard::new(0, 1, 0);
        step(&mut g, &grid, &mut [], Direction::Left);
        assert_eq!(g.state, GuardState::ClimbLeft);
        let mut r = Runner::new(1, 0);
        step(&mut r, &grid, &mut [], Direction::Right);
        assert_eq!(r.state, RunnerState::ClimbRight);
    }

    #[test]
    fn horizontal_crossing_clears_hole_flags() {
        let grid = grid_from(&["   ", "###"]);
        let mut g = Guard::new(0, 1, 0);
        g.leaving_hole = true;
        g.hole_row = Some(1);
        g.body.tx = 16;
        step(&mut g, &grid, &mut [], Direction::Right);
        assert_eq!(g.body.x, 2);
        assert!(!g.leaving_hole);
        assert_eq!(g.hole_row, None);
    }

    // ── Vertical ──

    #[test]
    fn up_needs_a_ladder() {
        let grid = grid_from(&["   ", " H ", "###"]);
        let mut g = Guard::new(0, 0, 1);
        assert!(!step(&mut g, &grid, &mut [], Direction::Up));
        let mut g = Guard::new(0, 1, 1);
        assert!(step(&mut g, &grid, &mut [], Direction::Up));
        assert_eq!(g.body.ty, -9);
        assert_eq!(g.state, GuardState::UpDown);
    }

    #[test]
    fn up_blocked_by_brick_above() {
        let grid = grid_from(&[" # ", " H ", "###"]);
        let mut r = Runner::new(1, 1);
        assert!(!step(&mut r, &grid, &mut [], Direction::Up));
        assert_eq!(r.body.ty, 0);
    }

    #[test]
    fn climbing_ladder_commits_row() {
        let grid = grid_from(&[" H ", " H ", "###"]);
        let mut g = Guard::new(0, 1, 1);
        for _ in 0..3 {
            assert!(step(&mut g, &grid, &mut [], Direction::Up));
        }
        assert_eq!((g.body.y, g.body.ty), (0, 17));
    }

    #[test]
    fn down_off_ladder_into_air_is_a_fall() {
        let grid = grid_from(&[" H ", "   ", "###"]);
        let mut g = Guard::new(0, 1, 0);
        assert!(step(&mut g, &grid, &mut [], Direction::Down));
        assert_eq!(g.state, GuardState::UpDown);
        let grid = grid_from(&[" - ", "   ", "###"]);
        let mut g = Guard::new(0, 1, 0);
        step(&mut g, &grid, &mut [], Direction::Down);
        assert_eq!(g.state, GuardState::FallLeft);
    }

    #[test]
    fn down_rejected_onto_floor() {
        let grid = grid_from(&[" H ", "###"]);
        let mut g = Guard::new(0, 1, 0);
        assert!(!step(&mut g, &grid, &mut [], Direction::Down));
    }

    // ── Falling ──

    #[test]
    fn guard_lands_with_zero_offset() {
        let grid = grid_from(&["   ", "   ", "###"]);
        let mut g = Guard::new(0, 1, 0);
        g.set_state(GuardState::Right);
        for _ in 0..10 {
            step(&mut g, &grid, &mut [], Direction::Fall);
        }
        assert_eq!((g.body.y, g.body.ty), (1, 0));
        assert_eq!(g.state, GuardState::FallRight);
    }

    #[test]
    fn runner_lands_and_stops() {
        let grid = grid_from(&["   ", "   ", "###"]);
        let mut r = Runner::new(1, 0);
        for _ in 0..10 {
            step(&mut r, &grid, &mut [], Direction::Fall);
        }
        assert_eq!((r.body.y, r.body.ty), (1, 0));
        assert_eq!(r.state, RunnerState::Stopped);
    }

    #[test]
    fn runner_grabs_rope_when_falling_onto_it() {
        let grid = grid_from(&["   ", " - ", "   ", "###"]);
        let mut r = Runner::new(1, 0);
        r.set_state(RunnerState::Left);
        let mut grabbed = false;
        for _ in 0..6 {
            step(&mut r, &grid, &mut [], Direction::Fall);
            if r.state == RunnerState::ClimbLeft {
                grabbed = true;
                break;
            }
        }
        assert!(grabbed);
        assert_eq!((r.body.y, r.body.ty), (1, 0));
    }

    // ── Hole trapping ──

    fn fall_into_hole(g: &mut Guard, grid: &Grid, gold: &mut [Gold]) -> Vec<GoldEvent> {
        let mut events = Vec::new();
        for _ in 0..12 {
            events.extend(step_events(g, grid, gold, Direction::Fall));
            if g.state.is_trapped() {
                break;
            }
        }
        events
    }

    #[test]
    fn falling_into_flagged_hole_traps() {
        let grid = grid_from(&["   ", "#o#", "###"]);
        let mut g = Guard::new(0, 1, 0);
        g.set_state(GuardState::Right);
        fall_into_hole(&mut g, &grid, &mut []);
        assert_eq!(g.state, GuardState::TrapRight);
        assert_eq!(g.body, Body::at(1, 1));
        assert_eq!(g.hole_row, Some(1));
        assert!(g.leaving_hole);
    }

    #[test]
    fn trap_drops_gold_above_hole() {
        let grid = grid_from(&["   ", "#o#", "###"]);
        let mut gold = vec![Gold::new(5, 5)];
        gold[0].status = GoldStatus::Carried(0);
        let mut g = Guard::new(0, 1, 0);
        g.gold = Some(0);
        g.gold_holds = 30;
        let events = fall_into_hole(&mut g, &grid, &mut gold);
        assert_eq!(g.state, GuardState::TrapLeft);
        assert_eq!(g.gold, None);
        assert!(events.contains(&GoldEvent::Dropped { gold: 0, x: 1, y: 0 }));
        assert!(gold[0].visible());
    }

    #[test]
    fn spent_countdown_does_not_drop_gold_into_hole() {
        let grid = grid_from(&["   ", "#o#", "###"]);
        let mut gold = vec![Gold::new(5, 5)];
        gold[0].status = GoldStatus::Carried(0);
        let mut g = Guard::new(0, 1, 0);
        g.gold = Some(0);
        g.gold_holds = 0;
        let events = fall_into_hole(&mut g, &grid, &mut gold);
        assert!(g.state.is_trapped());
        // (1, 0) has no floor below, so the gold stays carried until the
        // trap puts it above the hole.
        assert_eq!(events, vec![GoldEvent::Dropped { gold: 0, x: 1, y: 0 }]);
        assert_eq!((gold[0].x, gold[0].y), (1, 0));
        assert_eq!(gold[0].status, GoldStatus::Lying);
        assert_eq!(g.gold_holds, -2);
    }

    #[test]
    fn hole_not_flagged_does_not_trap() {
        let grid = grid_from(&["#o#", "###"]);
        // Already inside the hole cell at centre without having fallen in.
        let mut g = Guard::new(0, 1, 0);
        g.body.ty = -4;
        step(&mut g, &grid, &mut [], Direction::Fall);
        assert!(!g.state.is_trapped());
        assert_eq!(g.body.ty, 0);
    }

    #[test]
    fn climb_out_rises_then_becomes_updown() {
        let grid = grid_from(&["   ", "#o#", "###"]);
        let mut g = Guard::new(0, 1, 1);
        g.hole_row = Some(1);
        g.leaving_hole = true;
        g.set_state(GuardState::ClimbOut);
        assert!(step(&mut g, &grid, &mut [], Direction::Up));
        assert_eq!(g.state, GuardState::ClimbOut);
        step(&mut g, &grid, &mut [], Direction::Up);
        step(&mut g, &grid, &mut [], Direction::Up);
        assert_eq!(g.body.y, 0);
        assert_eq!(g.state, GuardState::UpDown);
        assert!(g.leaving_hole);
    }

    #[test]
    fn climb_out_blocked_by_brick_above() {
        let grid = grid_from(&["###", "#o#", "###"]);
        let mut g = Guard::new(0, 1, 1);
        g.hole_row = Some(1);
        g.set_state(GuardState::ClimbOut);
        assert!(!step(&mut g, &grid, &mut [], Direction::Up));
        assert_eq!(g.body, Body::at(1, 1));
    }

    // ── Gold countdown on crossings ──

    #[test]
    fn carried_gold_counts_down_per_crossing() {
        let grid = grid_from(&["    ", "####"]);
        let mut gold = vec![Gold::new(0, 0)];
        gold[0].status = GoldStatus::Carried(0);
        let mut g = Guard::new(0, 0, 0);
        g.gold = Some(0);
        g.gold_holds = 1;
        let mut events = Vec::new();
        // Crossings happen on the 3rd and 8th step.
        for _ in 0..8 {
            events.extend(step_events(&mut g, &grid, &mut gold, Direction::Right));
        }
        // First crossing spends the countdown, the second drops the gold in
        // the cell being left.
        assert_eq!(g.body.x, 2);
        assert_eq!(events, vec![GoldEvent::Dropped { gold: 0, x: 1, y: 0 }]);
        assert_eq!(g.gold_holds, -1);
    }
}
