/// Animation clocks.
///
/// The simulation never looks at sprite content, only at *when* an
/// animation wraps around. Trapped guards climb out when the shake
/// animation wraps; reborn guards start falling when the reborn
/// animation wraps; a dig ends when the dig animation wraps.
///
/// Each animation is a list of sprite hold counts. A sprite with hold `n`
/// stays on screen for `n + 1` ticks.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Animation {
    GuardLeft,
    GuardRight,
    GuardUpDown,
    GuardClimbLeft,
    GuardClimbRight,
    GuardFallLeft,
    GuardFallRight,
    GuardTrapLeft,
    GuardTrapRight,
    GuardReborn,
    RunnerLeft,
    RunnerRight,
    RunnerUpDown,
    RunnerClimbLeft,
    RunnerClimbRight,
    RunnerFallLeft,
    RunnerFallRight,
    RunnerDigLeft,
    RunnerDigRight,
}

impl Animation {
    pub fn holds(self) -> &'static [u32] {
        match self {
            Animation::GuardLeft | Animation::GuardRight => &[2, 2, 2],
            Animation::RunnerLeft | Animation::RunnerRight => &[2, 2, 2],
            Animation::GuardUpDown | Animation::RunnerUpDown => &[1, 1],
            Animation::GuardClimbLeft | Animation::GuardClimbRight => &[1, 2, 2],
            Animation::RunnerClimbLeft | Animation::RunnerClimbRight => &[1, 2, 2],
            Animation::GuardFallLeft | Animation::GuardFallRight => &[1],
            Animation::RunnerFallLeft | Animation::RunnerFallRight => &[1],
            Animation::GuardTrapLeft | Animation::GuardTrapRight => &[51, 3, 3, 3, 3, 3],
            Animation::GuardReborn => &[6, 2],
            Animation::RunnerDigLeft | Animation::RunnerDigRight => &[11],
        }
    }

    /// Ticks from reset until `AnimationClock::tick` reports a wrap.
    pub fn duration(self) -> u32 {
        self.holds().iter().map(|h| h + 1).sum()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AnimationClock {
    pub animation: Animation,
    sprite: usize,
    hold: u32,
}

impl AnimationClock {
    pub fn new(animation: Animation) -> Self {
        AnimationClock { animation, sprite: 0, hold: animation.holds()[0] }
    }

    /// Switch to `animation` and rewind it.
    pub fn switch(&mut self, animation: Animation) {
        *self = AnimationClock::new(animation);
    }

    /// Advance one tick. Returns true if the animation just wrapped.
    pub fn tick(&mut self) -> bool {
        if self.hold > 0 {
            self.hold -= 1;
            return false;
        }
        let holds = self.animation.holds();
        self.sprite += 1;
        if self.sprite >= holds.len() {
            self.sprite = 0;
            self.hold = holds[0];
            return true;
        }
        self.hold = holds[self.sprite];
        false
    }
}
