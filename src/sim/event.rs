/// Events emitted during a simulation step.
/// The front end consumes these for the status line; tests use them to
/// observe transitions.

use crate::domain::gold::GoldEvent;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    GoldCollected { gold: usize, x: i32, y: i32 },
    GoldCarried { gold: usize, guard: usize },
    GoldDropped { gold: usize, x: i32, y: i32 },
    /// Gold lost for good; the runner needs one less.
    GoldDiscarded { gold: usize },
    AllGoldCollected,
    HoleDug { x: i32, y: i32 },
    HoleFilled { x: i32, y: i32 },
    GuardTrapped { id: usize, x: i32, y: i32 },
    GuardClimbingOut { id: usize },
    GuardReborn { id: usize, x: i32, y: i32 },
    GuardReleased { id: usize },
    RunnerKilled,
    LevelCleared,
}

impl From<GoldEvent> for SimEvent {
    fn from(ev: GoldEvent) -> Self {
        match ev {
            GoldEvent::PickedUp { gold, guard } => SimEvent::GoldCarried { gold, guard },
            GoldEvent::Dropped { gold, x, y } => SimEvent::GoldDropped { gold, x, y },
            GoldEvent::Discarded { gold } => SimEvent::GoldDiscarded { gold },
        }
    }
}
