/// World: the complete state of a running level.
///
/// Two tile layers live in `grid` (see `domain::grid`); the base layer is the
/// level as loaded, so a restart resets the grid in place.

use std::ops::RangeInclusive;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{SimConfig, SpeedConfig};
use crate::domain::entity::{Gold, GoldStatus, Guard, Runner};
use crate::domain::grid::Grid;
use crate::domain::hole::Hole;
use crate::error::SimError;

use super::scheduler::{Scheduler, MAX_GUARDS};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Dead,
    Cleared,
}

#[derive(Clone, Debug)]
pub struct World {
    pub name: String,
    pub grid: Grid,
    pub runner: Runner,
    pub guards: Vec<Guard>,
    pub gold: Vec<Gold>,
    pub holes: Vec<Hole>,
    pub scheduler: Scheduler,
    pub rng: ChaCha8Rng,
    pub speed: SpeedConfig,
    pub gold_holds: RangeInclusive<i32>,
    pub phase: Phase,
    pub tick: u64,
    pub ladders_revealed: bool,
}

impl World {
    pub fn new(
        name: &str,
        grid: Grid,
        runner: (i32, i32),
        guards: &[(i32, i32)],
        gold: &[(i32, i32)],
        config: &SimConfig,
    ) -> Result<Self, SimError> {
        if guards.len() > MAX_GUARDS {
            return Err(SimError::TooManyGuards { count: guards.len(), max: MAX_GUARDS });
        }
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(World {
            name: name.to_string(),
            grid,
            runner: Runner::new(runner.0, runner.1),
            guards: guards.iter().enumerate().map(|(id, &(x, y))| Guard::new(id, x, y)).collect(),
            gold: gold.iter().map(|&(x, y)| Gold::new(x, y)).collect(),
            holes: Vec::new(),
            scheduler: Scheduler::new(),
            rng,
            speed: config.speed.clone(),
            gold_holds: config.gold.holds(),
            phase: Phase::Playing,
            tick: 0,
            ladders_revealed: false,
        })
    }

    /// Put everything back where the level started. The RNG keeps running.
    pub fn restart(&mut self) {
        self.grid.reset();
        self.runner.reset();
        for guard in &mut self.guards {
            *guard = Guard::new(guard.id, guard.spawn.0, guard.spawn.1);
        }
        for gold in &mut self.gold {
            gold.reset();
        }
        self.holes.clear();
        self.scheduler = Scheduler::new();
        self.phase = Phase::Playing;
        self.tick = 0;
        self.ladders_revealed = false;
        log::info!("level {:?} restarted", self.name);
    }

    /// Gold the runner still has to collect: lying around or carried.
    pub fn gold_left(&self) -> usize {
        self.gold
            .iter()
            .filter(|g| matches!(g.status, GoldStatus::Lying | GoldStatus::Carried(_)))
            .count()
    }

    /// Index of a guard standing in (x, y).
    pub fn guard_in(&self, x: i32, y: i32) -> Option<usize> {
        self.guards.iter().position(|g| g.body.x == x && g.body.y == y)
    }

    pub fn hole_at(&self, x: i32, y: i32) -> Option<&Hole> {
        self.holes.iter().find(|h| h.x == x && h.y == y)
    }
}
