/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Brick,  // Floor + Diggable
    Solid,  // Floor only
    Ladder, // Climbable, also a floor from above
    Rope,   // Hangable (horizontal bar)
}

impl Tile {
    /// Can an entity stand on top of this tile?
    pub fn is_floor(self) -> bool {
        matches!(self, Tile::Brick | Tile::Solid | Tile::Ladder)
    }

    /// Is this a wall? Walls block every kind of movement.
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Brick | Tile::Solid)
    }

    pub fn is_diggable(self) -> bool {
        matches!(self, Tile::Brick)
    }

    pub fn is_climbable(self) -> bool {
        matches!(self, Tile::Ladder)
    }

    pub fn is_hangable(self) -> bool {
        matches!(self, Tile::Rope)
    }

    /// Can an entity occupy a cell of this type?
    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Empty | Tile::Ladder | Tile::Rope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_are_floors_but_not_walkable() {
        for t in [Tile::Brick, Tile::Solid] {
            assert!(t.is_floor());
            assert!(t.is_wall());
            assert!(!t.is_walkable());
        }
    }

    #[test]
    fn ladder_is_floor_and_walkable() {
        assert!(Tile::Ladder.is_floor());
        assert!(Tile::Ladder.is_walkable());
        assert!(!Tile::Ladder.is_wall());
    }

    #[test]
    fn rope_is_not_a_floor() {
        assert!(!Tile::Rope.is_floor());
        assert!(Tile::Rope.is_hangable());
        assert!(Tile::Rope.is_walkable());
    }

    #[test]
    fn only_brick_is_diggable() {
        assert!(Tile::Brick.is_diggable());
        assert!(!Tile::Solid.is_diggable());
        assert!(!Tile::Empty.is_diggable());
    }
}
