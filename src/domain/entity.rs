/// Entities: Runner, Guard, Gold.
///
/// Positions are a grid cell plus a sub-tile offset `(tx, ty)` measured in
/// pixels of a 40x44 tile. The offset stays within half a tile of zero:
/// crossing the half-tile line commits the cell move and wraps the offset.

use super::anim::{Animation, AnimationClock};

/// Tile size in offset units.
pub const TILE_W: i32 = 40;
pub const TILE_H: i32 = 44;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// A discrete move decision.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Down,
    Fall,
    Left,
    Right,
    Up,
    /// Stay put this tick.
    Stay,
}

/// Cell + sub-tile offset.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Body {
    pub x: i32,
    pub y: i32,
    pub tx: i32,
    pub ty: i32,
}

impl Body {
    pub fn at(x: i32, y: i32) -> Self {
        Body { x, y, tx: 0, ty: 0 }
    }

    /// Is the body close enough to the centre of its cell to touch
    /// whatever lies there (gold, the top-row exit)?
    pub fn near_centre(&self) -> bool {
        self.tx.abs() <= TILE_W / 4 && self.ty.abs() <= TILE_H / 4
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GuardState {
    Left,
    Right,
    FallLeft,
    FallRight,
    ClimbLeft,
    ClimbRight,
    UpDown,
    Stopped,
    TrapLeft,
    TrapRight,
    ClimbOut,
    Reborn,
}

impl GuardState {
    pub fn looking_right(self) -> bool {
        matches!(self, GuardState::ClimbRight | GuardState::FallRight | GuardState::Right)
    }

    pub fn is_trapped(self) -> bool {
        matches!(self, GuardState::TrapLeft | GuardState::TrapRight)
    }

    /// States the scheduler skips: timers drive them instead of the scanner.
    pub fn is_waiting(self) -> bool {
        self.is_trapped() || self == GuardState::Reborn
    }
}

/// Animation for a guard state. `None` means keep the current one.
pub fn guard_animation(state: GuardState) -> Option<Animation> {
    let anim = match state {
        GuardState::Left => Animation::GuardLeft,
        GuardState::Right => Animation::GuardRight,
        GuardState::FallLeft => Animation::GuardFallLeft,
        GuardState::FallRight => Animation::GuardFallRight,
        GuardState::ClimbLeft => Animation::GuardClimbLeft,
        GuardState::ClimbRight => Animation::GuardClimbRight,
        GuardState::UpDown | GuardState::ClimbOut => Animation::GuardUpDown,
        GuardState::TrapLeft => Animation::GuardTrapLeft,
        GuardState::TrapRight => Animation::GuardTrapRight,
        GuardState::Reborn => Animation::GuardReborn,
        GuardState::Stopped => return None,
    };
    Some(anim)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunnerState {
    Left,
    Right,
    FallLeft,
    FallRight,
    ClimbLeft,
    ClimbRight,
    UpDown,
    Stopped,
    DigLeft,
    DigRight,
}

impl RunnerState {
    pub fn is_falling(self) -> bool {
        matches!(self, RunnerState::FallLeft | RunnerState::FallRight)
    }

    pub fn is_digging(self) -> bool {
        matches!(self, RunnerState::DigLeft | RunnerState::DigRight)
    }
}

/// Animation for a runner state. `None` means keep the current one.
pub fn runner_animation(state: RunnerState) -> Option<Animation> {
    let anim = match state {
        RunnerState::Left => Animation::RunnerLeft,
        RunnerState::Right => Animation::RunnerRight,
        RunnerState::FallLeft => Animation::RunnerFallLeft,
        RunnerState::FallRight => Animation::RunnerFallRight,
        RunnerState::ClimbLeft => Animation::RunnerClimbLeft,
        RunnerState::ClimbRight => Animation::RunnerClimbRight,
        RunnerState::UpDown => Animation::RunnerUpDown,
        RunnerState::DigLeft => Animation::RunnerDigLeft,
        RunnerState::DigRight => Animation::RunnerDigRight,
        RunnerState::Stopped => return None,
    };
    Some(anim)
}

#[derive(Clone, Debug)]
pub struct Runner {
    pub body: Body,
    pub spawn: (i32, i32),
    pub state: RunnerState,
    pub anim: AnimationClock,
    pub gold_collected: usize,
}

impl Runner {
    pub fn new(x: i32, y: i32) -> Self {
        Runner {
            body: Body::at(x, y),
            spawn: (x, y),
            state: RunnerState::Right,
            anim: AnimationClock::new(Animation::RunnerRight),
            gold_collected: 0,
        }
    }

    /// Back to the spawn cell; used after a death.
    pub fn reset(&mut self) {
        *self = Runner::new(self.spawn.0, self.spawn.1);
    }

    /// Change state, rewinding the animation unless stopping.
    pub fn set_state(&mut self, state: RunnerState) {
        if self.state == state {
            return;
        }
        if let Some(anim) = runner_animation(state) {
            self.anim.switch(anim);
        }
        self.state = state;
    }
}

#[derive(Clone, Debug)]
pub struct Guard {
    pub id: usize,
    pub body: Body,
    pub spawn: (i32, i32),
    pub state: GuardState,
    pub anim: AnimationClock,
    /// Set when the guard got trapped; cleared once it walks off into
    /// another column. While set the guard never moves or falls down.
    pub leaving_hole: bool,
    /// Row of the hole the guard is falling into, trapped in, or climbing out of.
    pub hole_row: Option<i32>,
    /// Index into the world's gold list.
    pub gold: Option<usize>,
    /// Cell crossings left before dropping carried gold. Negative values are
    /// a grace period after a drop during which nothing is picked up.
    pub gold_holds: i32,
}

impl Guard {
    pub fn new(id: usize, x: i32, y: i32) -> Self {
        Guard {
            id,
            body: Body::at(x, y),
            spawn: (x, y),
            state: GuardState::Left,
            anim: AnimationClock::new(Animation::GuardLeft),
            leaving_hole: false,
            hole_row: None,
            gold: None,
            gold_holds: 0,
        }
    }

    /// Change state, rewinding the animation unless stopping.
    pub fn set_state(&mut self, state: GuardState) {
        if self.state == state {
            return;
        }
        if let Some(anim) = guard_animation(state) {
            self.anim.switch(anim);
        }
        self.state = state;
    }

    pub fn facing(&self) -> Facing {
        if self.state.looking_right() { Facing::Right } else { Facing::Left }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GoldStatus {
    /// Visible on the map.
    Lying,
    /// Held by the guard with this id.
    Carried(usize),
    /// Picked up by the runner.
    Collected,
    /// Lost for good; the runner needs one gold less.
    Discarded,
}

#[derive(Clone, Debug)]
pub struct Gold {
    pub x: i32,
    pub y: i32,
    pub spawn: (i32, i32),
    pub status: GoldStatus,
}

impl Gold {
    pub fn new(x: i32, y: i32) -> Self {
        Gold { x, y, spawn: (x, y), status: GoldStatus::Lying }
    }

    pub fn visible(&self) -> bool {
        self.status == GoldStatus::Lying
    }

    pub fn reset(&mut self) {
        *self = Gold::new(self.spawn.0, self.spawn.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_starts_facing_left() {
        let g = Guard::new(0, 3, 4);
        assert_eq!(g.state, GuardState::Left);
        assert_eq!(g.facing(), Facing::Left);
        assert_eq!(g.body, Body::at(3, 4));
        assert_eq!(g.hole_row, None);
    }

    #[test]
    fn facing_follows_state() {
        let mut g = Guard::new(0, 0, 0);
        g.set_state(GuardState::ClimbRight);
        assert_eq!(g.facing(), Facing::Right);
        g.set_state(GuardState::UpDown);
        assert_eq!(g.facing(), Facing::Left);
    }

    #[test]
    fn stopping_keeps_animation() {
        let mut g = Guard::new(0, 0, 0);
        g.set_state(GuardState::ClimbRight);
        g.set_state(GuardState::Stopped);
        assert_eq!(g.anim.animation, Animation::GuardClimbRight);
        assert_eq!(guard_animation(GuardState::Stopped), None);
    }

    #[test]
    fn climb_out_reuses_updown_animation() {
        assert_eq!(guard_animation(GuardState::ClimbOut), Some(Animation::GuardUpDown));
        assert_eq!(guard_animation(GuardState::TrapLeft), Some(Animation::GuardTrapLeft));
    }

    #[test]
    fn waiting_states() {
        assert!(GuardState::TrapLeft.is_waiting());
        assert!(GuardState::TrapRight.is_waiting());
        assert!(GuardState::Reborn.is_waiting());
        assert!(!GuardState::ClimbOut.is_waiting());
    }

    #[test]
    fn runner_reset_returns_to_spawn() {
        let mut r = Runner::new(2, 3);
        r.body = Body { x: 7, y: 1, tx: 8, ty: 0 };
        r.set_state(RunnerState::FallLeft);
        r.gold_collected = 3;
        r.reset();
        assert_eq!(r.body, Body::at(2, 3));
        assert_eq!(r.state, RunnerState::Right);
        assert_eq!(r.gold_collected, 0);
    }

    #[test]
    fn near_centre_uses_quarter_tile() {
        assert!(Body { x: 0, y: 0, tx: 10, ty: -11 }.near_centre());
        assert!(!Body { x: 0, y: 0, tx: 11, ty: 0 }.near_centre());
        assert!(!Body { x: 0, y: 0, tx: 0, ty: 12 }.near_centre());
    }

    #[test]
    fn gold_visibility_follows_status() {
        let mut g = Gold::new(1, 1);
        assert!(g.visible());
        g.status = GoldStatus::Carried(0);
        assert!(!g.visible());
        g.reset();
        assert!(g.visible());
    }
}
