//! Compass directions and the turn classification between consecutive path segments.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Cardinal directions a path segment can point toward.
///
/// North points along +Z and East along +X on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Travel toward increasing Z.
    North,
    /// Travel toward increasing X.
    East,
    /// Travel toward decreasing Z.
    South,
    /// Travel toward decreasing X.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting from North.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Heading in degrees measured clockwise from North.
    #[must_use]
    pub const fn angle(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::East => 90.0,
            Self::South => 180.0,
            Self::West => 270.0,
        }
    }

    /// Rotation about the vertical axis that turns a North-facing pose toward this direction.
    #[must_use]
    pub fn rotation(self) -> Quat {
        Quat::from_rotation_y(self.angle().to_radians())
    }

    /// Offset of half a tile toward this direction.
    #[must_use]
    pub const fn half_vector(self) -> Vec3 {
        match self {
            Self::North => Vec3::new(0.0, 0.0, 0.5),
            Self::East => Vec3::new(0.5, 0.0, 0.0),
            Self::South => Vec3::new(0.0, 0.0, -0.5),
            Self::West => Vec3::new(-0.5, 0.0, 0.0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[((self.index() + 2) % 4) as usize]
    }

    /// Classifies the turn required to go from travelling along `self` to travelling along `next`.
    #[must_use]
    pub const fn direction_change_to(self, next: Direction) -> DirectionChange {
        let current = self.index();
        let next = next.index();
        if current == next {
            DirectionChange::None
        } else if (current + 1) % 4 == next {
            DirectionChange::TurnRight
        } else if (current + 3) % 4 == next {
            DirectionChange::TurnLeft
        } else {
            DirectionChange::TurnAround
        }
    }

    const fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }
}

/// Turn performed when a unit crosses from one path segment into the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectionChange {
    /// Both segments point the same way.
    None,
    /// The next segment lies 90 degrees clockwise.
    TurnRight,
    /// The next segment lies 90 degrees counter-clockwise.
    TurnLeft,
    /// The next segment reverses the direction of travel.
    TurnAround,
}
