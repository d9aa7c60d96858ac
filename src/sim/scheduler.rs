/// Guard scheduling.
///
/// Guards move slower than the runner. Each tick a policy table, indexed by
/// guard count and a six-tick phase, says how many guards move; a
/// round-robin cursor says which. Trapped and reborn guards still use up
/// their slot.
///
/// After the scheduled moves every guard gets a second pass:
///   1. trap / reborn timers (trapped → climbing out, reborn → falling)
///   2. gold pickup
///   3. walled-in check: a guard standing in brick is reborn elsewhere

use rand::seq::SliceRandom;

use crate::domain::ai;
use crate::domain::entity::{Body, Direction, GuardState};
use crate::domain::gold::{self, gold_at};
use crate::domain::physics::{self, MoveCtx};
use crate::domain::tile::Tile;
use crate::error::SimError;

use super::event::SimEvent;
use super::world::World;

pub const MAX_GUARDS: usize = 11;
const PHASES: usize = 6;

/// Guards moved per tick, by guard count (row) and phase (column).
const POLICY: [[usize; PHASES]; MAX_GUARDS + 1] = [
    [0, 0, 0, 0, 0, 0],
    [0, 1, 1, 0, 1, 1],
    [1, 1, 1, 1, 1, 1],
    [1, 2, 1, 1, 2, 1],
    [1, 2, 2, 1, 2, 2],
    [2, 2, 2, 2, 2, 2],
    [2, 2, 3, 2, 2, 3],
    [2, 3, 3, 2, 3, 3],
    [3, 3, 3, 3, 3, 3],
    [3, 3, 4, 3, 3, 4],
    [3, 4, 4, 3, 4, 4],
    [4, 4, 4, 4, 4, 4],
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduler {
    phase: usize,
    cursor: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::new()
    }
}

impl Scheduler {
    /// The first tick runs phase 0 and starts at guard 1.
    pub fn new() -> Self {
        Scheduler { phase: PHASES - 1, cursor: 0 }
    }

    /// Guard indices to move this tick, in order.
    pub fn dispatch(&mut self, nguards: usize) -> Vec<usize> {
        self.phase = (self.phase + 1) % PHASES;
        let quota = POLICY[nguards.min(MAX_GUARDS)][self.phase];
        let mut picked = Vec::with_capacity(quota);
        for _ in 0..quota {
            self.cursor += 1;
            if self.cursor >= nguards {
                self.cursor = 0;
            }
            picked.push(self.cursor);
        }
        picked
    }
}

/// Move the scheduled guards, then run the second pass over all guards.
pub fn scheduler_tick(world: &mut World, events: &mut Vec<SimEvent>) -> Result<(), SimError> {
    let n = world.guards.len();
    for idx in world.scheduler.dispatch(n) {
        if world.guards[idx].state.is_waiting() {
            continue;
        }
        let dir = ai::scan(&world.grid, &world.guards[idx], &world.runner.body, &world.guards);
        if dir == Direction::Stay {
            continue;
        }
        let mut gold_events = Vec::new();
        let mut ctx = MoveCtx { grid: &world.grid, gold: &mut world.gold, events: &mut gold_events };
        physics::advance(&mut world.guards[idx], &mut ctx, dir);
        let guard = &world.guards[idx];
        if guard.state.is_trapped() {
            let Body { x, y, .. } = guard.body;
            log::debug!("guard {} trapped at ({x}, {y})", guard.id);
            events.push(SimEvent::GuardTrapped { id: guard.id, x, y });
        }
        events.extend(gold_events.into_iter().map(SimEvent::from));
    }

    for idx in 0..n {
        let guard = &mut world.guards[idx];
        if guard.state.is_trapped() {
            if guard.anim.tick() {
                guard.set_state(GuardState::ClimbOut);
                log::debug!("guard {} climbing out", guard.id);
                events.push(SimEvent::GuardClimbingOut { id: guard.id });
            }
        } else if guard.state == GuardState::Reborn && guard.anim.tick() {
            guard.set_state(GuardState::FallRight);
            events.push(SimEvent::GuardReleased { id: guard.id });
        }

        if let Some(ev) = gold::try_pickup(guard, &mut world.gold, &world.gold_holds, &mut world.rng) {
            events.push(ev.into());
        }

        let Body { x, y, .. } = guard.body;
        if guard.state != GuardState::Reborn && world.grid.tile_is(x, y, Tile::Brick) {
            reborn(world, idx, events)?;
        }
    }
    Ok(())
}

/// Respawn a walled-in guard on a random free cell, scanning rows from the
/// top (row 0 is skipped) with a fresh column shuffle per row.
fn reborn(world: &mut World, idx: usize, events: &mut Vec<SimEvent>) -> Result<(), SimError> {
    let width = world.grid.width() as i32;
    let height = world.grid.height() as i32;
    let id = world.guards[idx].id;

    let mut spot = None;
    'rows: for y in 1..height {
        let mut columns: Vec<i32> = (0..width).collect();
        columns.shuffle(&mut world.rng);
        for x in columns {
            if is_free(world, idx, x, y) {
                spot = Some((x, y));
                break 'rows;
            }
        }
    }
    let (x, y) = spot.ok_or(SimError::NoRebornCell { guard: id })?;

    let guard = &mut world.guards[idx];
    guard.body = Body::at(x, y);
    guard.leaving_hole = false;
    guard.hole_row = None;
    guard.set_state(GuardState::Reborn);
    if let Some(ev) = gold::discard(guard, &mut world.gold) {
        log::info!("guard {id} walled in with gold; gold discarded");
        events.push(ev.into());
    }
    guard.gold_holds = 0;
    log::debug!("guard {id} reborn at ({x}, {y})");
    events.push(SimEvent::GuardReborn { id, x, y });
    Ok(())
}

fn is_free(world: &World, idx: usize, x: i32, y: i32) -> bool {
    world.grid.tile_is(x, y, Tile::Empty)
        && !world.grid.is_hole(x, y)
        && gold_at(&world.gold, x, y).is_none()
        && (world.runner.body.x, world.runner.body.y) != (x, y)
        && !world
            .guards
            .iter()
            .enumerate()
            .any(|(i, g)| i != idx && g.body.x == x && g.body.y == y)
}
