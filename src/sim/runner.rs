/// Runner control: player commands through the shared move primitive.
///
/// Per tick, first match wins:
///   1. digging: wait for the dig animation, then stand facing the hole
///   2. no support (or already falling): fall
///   3. apply the player's command, if any

use crate::domain::entity::{Body, Direction, Facing, RunnerState};
use crate::domain::hole::{dig_target, Hole};
use crate::domain::physics::{self, MoveCtx};
use crate::domain::tile::Tile;

use super::event::SimEvent;
use super::world::World;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Left,
    Right,
    Up,
    Down,
    DigLeft,
    DigRight,
}

pub fn tick_runner(world: &mut World, cmd: Option<Command>, events: &mut Vec<SimEvent>) {
    let runner = &mut world.runner;
    if runner.state.is_digging() {
        if runner.anim.tick() {
            let done = match runner.state {
                RunnerState::DigLeft => RunnerState::Left,
                _ => RunnerState::Right,
            };
            runner.set_state(done);
        }
        return;
    }

    let dir = if must_fall(world) {
        Direction::Fall
    } else {
        match cmd {
            None => return,
            Some(Command::Left) => Direction::Left,
            Some(Command::Right) => Direction::Right,
            Some(Command::Up) => Direction::Up,
            Some(Command::Down) => Direction::Down,
            Some(Command::DigLeft) => return dig(world, Facing::Left, events),
            Some(Command::DigRight) => return dig(world, Facing::Right, events),
        }
    };

    // The runner carries no gold; its gold pickup happens in the step.
    let mut gold_events = Vec::new();
    let mut ctx = MoveCtx { grid: &world.grid, gold: &mut world.gold, events: &mut gold_events };
    physics::advance(&mut world.runner, &mut ctx, dir);
}

/// Keep falling once started; start when nothing is underneath. A guard
/// standing in the cell below (typically trapped in a hole) holds the
/// runner up.
fn must_fall(world: &World) -> bool {
    let runner = &world.runner;
    if runner.state.is_falling() {
        return true;
    }
    let Body { x, y, .. } = runner.body;
    let grid = &world.grid;
    grid.tile_is(x, y + 1, Tile::Empty)
        && !grid.tile_is(x, y, Tile::Rope)
        && !grid.tile_is(x, y, Tile::Ladder)
        && world.guard_in(x, y + 1).is_none()
}

fn dig(world: &mut World, side: Facing, events: &mut Vec<SimEvent>) {
    let Some((x, y)) = dig_target(&world.grid, &world.gold, &world.runner.body, side) else {
        return;
    };
    world.grid.set_current(x, y, Tile::Empty);
    world
        .holes
        .push(Hole::new(x, y, world.speed.hole_open_ticks, world.speed.hole_close_ticks));
    let runner = &mut world.runner;
    runner.body.tx = 0;
    runner.set_state(match side {
        Facing::Left => RunnerState::DigLeft,
        Facing::Right => RunnerState::DigRight,
    });
    log::debug!("hole dug at ({x}, {y})");
    events.push(SimEvent::HoleDug { x, y });
}
