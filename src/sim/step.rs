/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Hole timers (expired holes turn back into brick)
///   2. Runner movement
///   3. Guard scheduling, moves and timers
///   4. Runner gold pickup
///   5. Hidden ladders appear once no gold is left, collected or discarded
///   6. Runner death: walled in, or caught by a guard
///   7. Level clear: top row reached with no gold left
///
/// Guards see the runner's position from this tick, and each guard sees the
/// guards moved before it.

use crate::domain::entity::{Body, GoldStatus, TILE_H};
use crate::domain::gold::gold_at;
use crate::domain::tile::Tile;
use crate::error::SimError;

use super::event::SimEvent;
use super::runner::{tick_runner, Command};
use super::scheduler::scheduler_tick;
use super::world::{Phase, World};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, cmd: Option<Command>) -> Result<Vec<SimEvent>, SimError> {
    if world.phase != Phase::Playing {
        return Ok(vec![]);
    }

    let mut events = Vec::new();
    world.tick += 1;

    resolve_holes(world, &mut events);
    tick_runner(world, cmd, &mut events);
    scheduler_tick(world, &mut events)?;
    resolve_gold_pickup(world, &mut events);
    resolve_ladders(world, &mut events);
    if resolve_runner_death(world, &mut events) {
        return Ok(events);
    }
    resolve_clear(world, &mut events);

    Ok(events)
}

// ══════════════════════════════════════════════════════════════
// Holes
// ══════════════════════════════════════════════════════════════

fn resolve_holes(world: &mut World, events: &mut Vec<SimEvent>) {
    let grid = &mut world.grid;
    world.holes.retain_mut(|hole| {
        if !hole.tick() {
            return true;
        }
        grid.restore(hole.x, hole.y);
        log::debug!("hole at ({}, {}) filled", hole.x, hole.y);
        events.push(SimEvent::HoleFilled { x: hole.x, y: hole.y });
        false
    });
}

// ══════════════════════════════════════════════════════════════
// Gold
// ══════════════════════════════════════════════════════════════

fn resolve_gold_pickup(world: &mut World, events: &mut Vec<SimEvent>) {
    let Body { x, y, .. } = world.runner.body;
    if !world.runner.body.near_centre() {
        return;
    }
    let Some(idx) = gold_at(&world.gold, x, y) else {
        return;
    };
    world.gold[idx].status = GoldStatus::Collected;
    world.runner.gold_collected += 1;
    events.push(SimEvent::GoldCollected { gold: idx, x, y });
}

/// Gold lost by a guard counts as gone, so the last discard can also
/// open the way out.
fn resolve_ladders(world: &mut World, events: &mut Vec<SimEvent>) {
    if world.ladders_revealed || world.gold_left() != 0 {
        return;
    }
    world.ladders_revealed = true;
    let revealed = world.grid.reveal_hidden_ladders();
    log::info!("no gold left; {revealed} ladder cells revealed");
    events.push(SimEvent::AllGoldCollected);
}

// ══════════════════════════════════════════════════════════════
// Win / lose
// ══════════════════════════════════════════════════════════════

fn resolve_runner_death(world: &mut World, events: &mut Vec<SimEvent>) -> bool {
    let Body { x, y, .. } = world.runner.body;
    let walled_in = world.grid.tile_is(x, y, Tile::Brick);
    let caught = world.guard_in(x, y).is_some();
    if !walled_in && !caught {
        return false;
    }
    log::info!("runner died at ({x}, {y}): {}", if walled_in { "walled in" } else { "caught" });
    world.phase = Phase::Dead;
    events.push(SimEvent::RunnerKilled);
    true
}

fn resolve_clear(world: &mut World, events: &mut Vec<SimEvent>) {
    let body = world.runner.body;
    if body.y == 0 && body.ty.abs() <= TILE_H / 4 && world.gold_left() == 0 {
        log::info!("level {:?} cleared in {} ticks", world.name, world.tick);
        world.phase = Phase::Cleared;
        events.push(SimEvent::LevelCleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::domain::entity::GuardState;
    use crate::domain::grid::tests::grid_from;
    use crate::domain::grid::Grid;
    use crate::domain::hole::Hole;

    fn world(grid: Grid, runner: (i32, i32), guards: &[(i32, i32)], gold: &[(i32, i32)]) -> World {
        let config = SimConfig { seed: Some(9), ..SimConfig::default() };
        World::new("test", grid, runner, guards, gold, &config).unwrap()
    }

    #[test]
    fn stopped_world_does_nothing() {
        let mut w = world(grid_from(&["   ", "###"]), (1, 0), &[], &[]);
        w.phase = Phase::Dead;
        assert!(step(&mut w, Some(Command::Left)).unwrap().is_empty());
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn expired_hole_refills() {
        let mut w = world(grid_from(&["   ", "#o#", "###"]), (0, 0), &[], &[(2, 0)]);
        w.holes.push(Hole::new(1, 1, 1, 1));
        step(&mut w, None).unwrap();
        assert!(w.grid.is_hole(1, 1));
        let events = step(&mut w, None).unwrap();
        assert!(events.contains(&SimEvent::HoleFilled { x: 1, y: 1 }));
        assert!(w.grid.tile_is(1, 1, Tile::Brick));
        assert!(w.holes.is_empty());
    }

    #[test]
    fn runner_in_refilled_hole_dies() {
        let mut w = world(grid_from(&["   ", "#o#", "###"]), (1, 1), &[], &[(2, 0)]);
        w.holes.push(Hole::new(1, 1, 0, 1));
        let events = step(&mut w, None).unwrap();
        assert!(events.contains(&SimEvent::RunnerKilled));
        assert_eq!(w.phase, Phase::Dead);
    }

    #[test]
    fn guard_in_refilled_hole_is_reborn() {
        let mut w = world(grid_from(&["    ", "    ", "#o##", "####"]), (3, 1), &[(1, 2)], &[]);
        w.guards[0].set_state(GuardState::TrapLeft);
        w.holes.push(Hole::new(1, 2, 0, 1));
        let events = step(&mut w, None).unwrap();
        assert!(events.iter().any(|e| matches!(e, SimEvent::GuardReborn { id: 0, .. })));
        assert_eq!(w.guards[0].state, GuardState::Reborn);
    }

    #[test]
    fn runner_collects_gold_and_reveals_ladders() {
        let mut grid = grid_from(&["   ", "   ", "###"]);
        grid.mark_hidden_ladder(0, 0);
        grid.mark_hidden_ladder(0, 1);
        let mut w = world(grid, (1, 1), &[], &[(2, 1)]);
        let mut events = Vec::new();
        for _ in 0..5 {
            events.extend(step(&mut w, Some(Command::Right)).unwrap());
        }
        assert!(events.contains(&SimEvent::GoldCollected { gold: 0, x: 2, y: 1 }));
        assert!(events.contains(&SimEvent::AllGoldCollected));
        assert_eq!(w.runner.gold_collected, 1);
        assert!(w.grid.tile_is(0, 0, Tile::Ladder));
        assert!(w.grid.tile_is(0, 1, Tile::Ladder));
    }

    #[test]
    fn discarded_gold_is_not_needed() {
        let mut w = world(grid_from(&["   ", "###"]), (1, 0), &[], &[(2, 0), (0, 0)]);
        w.gold[1].status = GoldStatus::Discarded;
        let mut events = Vec::new();
        for _ in 0..5 {
            events.extend(step(&mut w, Some(Command::Right)).unwrap());
        }
        assert!(events.contains(&SimEvent::AllGoldCollected));
    }

    #[test]
    fn last_gold_discarded_by_guard_reveals_ladders() {
        let mut grid = grid_from(&["    ", "    ", "####"]);
        grid.mark_hidden_ladder(0, 0);
        let mut w = world(grid, (3, 1), &[(1, 1)], &[(2, 0)]);
        w.gold[0].status = GoldStatus::Carried(0);
        w.guards[0].gold = Some(0);
        w.guards[0].gold_holds = 12;
        w.grid.set_current(1, 1, Tile::Brick);

        let mut events = Vec::new();
        for _ in 0..3 {
            events.extend(step(&mut w, None).unwrap());
        }
        assert!(events.contains(&SimEvent::GoldDiscarded { gold: 0 }));
        assert_eq!(w.gold_left(), 0);
        assert_eq!(w.runner.gold_collected, 0);
        assert!(events.contains(&SimEvent::AllGoldCollected));
        assert!(w.grid.tile_is(0, 0, Tile::Ladder));
    }

    #[test]
    fn level_without_gold_reveals_ladders_at_once() {
        let mut grid = grid_from(&["   ", "   ", "###"]);
        grid.mark_hidden_ladder(0, 0);
        let mut w = world(grid, (2, 1), &[], &[]);
        let events = step(&mut w, None).unwrap();
        assert_eq!(events, vec![SimEvent::AllGoldCollected]);
        assert!(w.grid.tile_is(0, 0, Tile::Ladder));
        assert!(step(&mut w, None).unwrap().is_empty());
    }

    #[test]
    fn level_clears_on_top_row_without_gold() {
        let mut w = world(grid_from(&["   ", "###"]), (1, 0), &[], &[]);
        let events = step(&mut w, None).unwrap();
        assert_eq!(events, vec![SimEvent::AllGoldCollected, SimEvent::LevelCleared]);
        assert_eq!(w.phase, Phase::Cleared);
    }

    #[test]
    fn guard_catches_runner() {
        let mut w = world(grid_from(&["    ", "####"]), (1, 0), &[(0, 0)], &[(3, 0)]);
        w.guards[0].body.tx = 16;
        // A single guard moves on the second tick; its step crosses into the runner's cell.
        let mut killed = false;
        for _ in 0..2 {
            killed |= step(&mut w, None).unwrap().contains(&SimEvent::RunnerKilled);
        }
        assert!(killed);
        assert_eq!(w.phase, Phase::Dead);
    }
}
