/// Carried-gold coupling between guards and gold pieces.
///
/// A guard picks up a visible gold piece by standing near the centre of its
/// cell, then carries it for a random number of cell crossings. When the
/// countdown reaches zero the gold is dropped in the first cell the guard
/// leaves that is empty, not an open hole, and has a floor below. A trapped guard drops its gold into the cell
/// above the hole or, if that cell is taken, loses it for good.
///
/// Guard and gold point at each other (`Guard::gold`, `GoldStatus::Carried`);
/// every function here updates both sides together.

use std::ops::RangeInclusive;

use rand::Rng;

use super::entity::{Body, Gold, GoldStatus, Guard};
use super::grid::Grid;
use super::tile::Tile;

/// Grace period after a regular drop: one crossing.
const DROP_GRACE: i32 = -1;
/// Grace period after a trapped drop: two crossings.
const TRAPPED_DROP_GRACE: i32 = -2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GoldEvent {
    PickedUp { gold: usize, guard: usize },
    Dropped { gold: usize, x: i32, y: i32 },
    Discarded { gold: usize },
}

/// Visible gold lying at (x, y).
pub fn gold_at(gold: &[Gold], x: i32, y: i32) -> Option<usize> {
    gold.iter().position(|g| g.visible() && g.x == x && g.y == y)
}

/// Pick up gold under an empty-handed guard.
pub fn try_pickup<R: Rng>(
    guard: &mut Guard,
    gold: &mut [Gold],
    holds: &RangeInclusive<i32>,
    rng: &mut R,
) -> Option<GoldEvent> {
    if guard.gold.is_some() || guard.gold_holds != 0 || !guard.body.near_centre() {
        return None;
    }
    let idx = gold_at(gold, guard.body.x, guard.body.y)?;
    gold[idx].status = GoldStatus::Carried(guard.id);
    guard.gold = Some(idx);
    guard.gold_holds = rng.gen_range(holds.clone());
    Some(GoldEvent::PickedUp { gold: idx, guard: guard.id })
}

/// Called each time a guard crosses from cell `(x, y)` into a neighbour.
///
/// Counts the hold countdown down (or the grace period up) and drops the
/// gold in the cell being left once the countdown is spent and that cell
/// can hold it.
pub fn on_cell_crossed(
    guard: &mut Guard,
    gold: &mut [Gold],
    grid: &Grid,
    (x, y): (i32, i32),
) -> Option<GoldEvent> {
    if guard.gold_holds < 0 {
        guard.gold_holds += 1;
        return None;
    }
    if guard.gold_holds > 0 {
        guard.gold_holds -= 1;
        return None;
    }
    let idx = guard.gold?;
    if !grid.tile_is(x, y, Tile::Empty) || grid.is_hole(x, y) || !grid.has_floor_below(x, y) {
        return None;
    }
    place(&mut gold[idx], x, y);
    guard.gold = None;
    guard.gold_holds = DROP_GRACE;
    Some(GoldEvent::Dropped { gold: idx, x, y })
}

/// Trapped guards let go of their gold at once: into the cell above the
/// hole if it is empty, otherwise the gold is discarded.
pub fn drop_trapped(guard: &mut Guard, gold: &mut [Gold], grid: &Grid) -> Option<GoldEvent> {
    let idx = guard.gold.take()?;
    let Body { x, y, .. } = guard.body;
    guard.gold_holds = TRAPPED_DROP_GRACE;
    if grid.tile_is(x, y - 1, Tile::Empty) {
        place(&mut gold[idx], x, y - 1);
        Some(GoldEvent::Dropped { gold: idx, x, y: y - 1 })
    } else {
        gold[idx].status = GoldStatus::Discarded;
        Some(GoldEvent::Discarded { gold: idx })
    }
}

/// Lose carried gold for good (guard walled in and reborn elsewhere).
pub fn discard(guard: &mut Guard, gold: &mut [Gold]) -> Option<GoldEvent> {
    let idx = guard.gold.take()?;
    guard.gold_holds = 0;
    gold[idx].status = GoldStatus::Discarded;
    Some(GoldEvent::Discarded { gold: idx })
}

fn place(gold: &mut Gold, x: i32, y: i32) {
    gold.x = x;
    gold.y = y;
    gold.status = GoldStatus::Lying;
}
