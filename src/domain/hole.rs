/// Dug holes.
///
/// Digging empties the brick's current type at once. The hole then runs
/// two phases:
///   1. **Open**: a plain pit. Guards fall in and get trapped.
///   2. **Closing**: the brick grows back; still passable.
///
/// When both phases are spent the cell reverts to brick. Anything still
/// inside is walled in.

use super::entity::{Body, Facing, Gold};
use super::gold::gold_at;
use super::grid::Grid;
use super::tile::Tile;

#[derive(Clone, Debug)]
pub struct Hole {
    pub x: i32,
    pub y: i32,
    pub open_remaining: u32,
    pub close_remaining: u32,
}

impl Hole {
    pub fn new(x: i32, y: i32, open_ticks: u32, close_ticks: u32) -> Self {
        Hole { x, y, open_remaining: open_ticks, close_remaining: close_ticks }
    }

    pub fn is_active(&self) -> bool {
        self.open_remaining > 0 || self.close_remaining > 0
    }

    pub fn is_closing(&self) -> bool {
        self.open_remaining == 0 && self.close_remaining > 0
    }

    /// 0.0 when closing starts, 1.0 when sealed.
    pub fn close_progress(&self, total_close: u32) -> f32 {
        if total_close == 0 {
            return 1.0;
        }
        1.0 - (self.close_remaining as f32 / total_close as f32)
    }

    /// Advance one tick. Returns true if the hole just expired.
    pub fn tick(&mut self) -> bool {
        if self.open_remaining > 0 {
            self.open_remaining -= 1;
        } else if self.close_remaining > 0 {
            self.close_remaining -= 1;
        }
        !self.is_active()
    }
}

/// Brick the runner at `body` would dig on `side`, if any.
///
/// The target is the brick diagonally below. The cell beside the runner
/// must be empty and hold no gold.
pub fn dig_target(grid: &Grid, gold: &[Gold], body: &Body, side: Facing) -> Option<(i32, i32)> {
    let sx = match side {
        Facing::Left => body.x - 1,
        Facing::Right => body.x + 1,
    };
    let y = body.y;
    if !grid.current(sx, y + 1).is_diggable() || !grid.tile_is(sx, y, Tile::Empty) {
        return None;
    }
    if gold_at(gold, sx, y).is_some() {
        return None;
    }
    Some((sx, y + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::tests::grid_from;

    #[test]
    fn two_phase_lifecycle() {
        let mut h = Hole::new(5, 3, 3, 2);
        assert!(h.is_active());
        assert!(!h.is_closing());

        assert!(!h.tick());
        assert!(!h.tick());
        assert!(!h.tick());
        assert!(h.is_closing());
        assert_eq!(h.close_remaining, 2);

        assert!(!h.tick());
        assert!(h.tick());
        assert!(!h.is_active());
    }

    #[test]
    fn close_progress_runs_zero_to_one() {
        let mut h = Hole::new(0, 0, 0, 10);
        assert!(h.close_progress(10).abs() < 0.01);
        for _ in 0..5 {
            h.tick();
        }
        assert!((h.close_progress(10) - 0.5).abs() < 0.01);
        assert!((Hole::new(0, 0, 5, 0).close_progress(0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn digs_brick_diagonally_below() {
        let grid = grid_from(&["   ", "###"]);
        let body = Body::at(1, 0);
        assert_eq!(dig_target(&grid, &[], &body, Facing::Left), Some((0, 1)));
        assert_eq!(dig_target(&grid, &[], &body, Facing::Right), Some((2, 1)));
    }

    #[test]
    fn no_dig_into_solid_or_under_ladder() {
        let grid = grid_from(&["H  ", "#@@"]);
        let body = Body::at(1, 0);
        assert_eq!(dig_target(&grid, &[], &body, Facing::Left), None);
        assert_eq!(dig_target(&grid, &[], &body, Facing::Right), None);
    }

    #[test]
    fn no_dig_under_gold_or_at_edge() {
        let grid = grid_from(&["  ", "##"]);
        let gold = vec![Gold::new(1, 0)];
        assert_eq!(dig_target(&grid, &gold, &Body::at(0, 0), Facing::Right), None);
        assert_eq!(dig_target(&grid, &gold, &Body::at(0, 0), Facing::Left), None);
    }

    #[test]
    fn no_dig_twice() {
        let grid = grid_from(&["   ", "o##"]);
        assert_eq!(dig_target(&grid, &[], &Body::at(1, 0), Facing::Left), None);
    }
}
