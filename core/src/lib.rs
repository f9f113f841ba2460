#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Defence simulation.
//!
//! This crate defines the vocabulary that connects the session loop, the
//! entity systems and the board collaborator. Adapters feed [`Command`]
//! values into the session once per tick, the session advances its pooled
//! entities along the board's [`PathGraph`], and reports what happened
//! through [`Event`] values. Entities never reach back into the session:
//! they describe follow-up work by pushing requests into caller-provided
//! output buffers.

mod direction;
mod pool;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use direction::{Direction, DirectionChange};
pub use pool::{SlotId, SlotPool};

/// Discrete input commands routed into the session loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Pauses a running session or resumes a paused one.
    TogglePause,
    /// Pauses the session.
    Pause,
    /// Resumes the session at the configured play speed.
    Resume,
    /// Changes the play speed used while the session is running.
    SetPlaySpeed {
        /// Requested time scale, clamped to the supported range.
        speed: f32,
    },
    /// Toggles the board's grid overlay.
    ToggleGrid,
    /// Toggles the board's path overlay.
    TogglePaths,
    /// Selects the tower kind placed by alternate primary touches.
    SelectTower {
        /// Tower kind to build from now on.
        kind: TowerKind,
    },
    /// Primary touch: toggles a wall, or a tower when `alternate` is held.
    PrimaryTouch {
        /// Ray cast from the pointer into the scene.
        ray: Ray,
        /// Whether the alternate modifier was held.
        alternate: bool,
    },
    /// Secondary touch: toggles a spawn point, or the destination when `alternate` is held.
    SecondaryTouch {
        /// Ray cast from the pointer into the scene.
        ray: Ray,
        /// Whether the alternate modifier was held.
        alternate: bool,
    },
    /// Restarts the session immediately.
    BeginNewGame,
}

/// Events reported by the session after processing a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A hostile unit was placed on a spawn tile.
    EnemySpawned {
        /// Pool handle of the spawned unit.
        enemy: EnemyHandle,
        /// Spawn tile chosen for the unit.
        tile: TileId,
    },
    /// A hostile unit completed its path and cost the player one health.
    EnemyReachedDestination,
    /// The scenario ran out of waves with no hostile units left.
    Victory,
    /// The player ran out of health.
    Defeat,
    /// The session was reset to its starting state.
    NewGame,
}

/// Ray expressed in board space, used to pick tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Point the ray starts from.
    pub origin: Vec3,
    /// Direction the ray travels in. Need not be normalised.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray.
    #[must_use]
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray pointing straight down onto the provided ground position.
    #[must_use]
    pub fn looking_down_at(x: f32, z: f32) -> Self {
        Self::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    /// Point where the ray crosses the ground plane, if it ever does.
    #[must_use]
    pub fn ground_point(&self) -> Option<Vec3> {
        if self.direction.y.abs() <= f32::EPSILON {
            return None;
        }
        let distance = -self.origin.y / self.direction.y;
        if distance < 0.0 {
            return None;
        }
        Some(self.origin + self.direction * distance)
    }
}

/// Identifier of a tile owned by the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of an enemy factory registered with the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactoryId(u32);

impl FactoryId {
    /// Creates a new factory identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the factory in the session's factory list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Pool handle of a hostile unit: the owning factory and its slot inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyHandle {
    factory: FactoryId,
    slot: SlotId,
}

impl EnemyHandle {
    /// Creates a handle for `slot` inside `factory`.
    #[must_use]
    pub const fn new(factory: FactoryId, slot: SlotId) -> Self {
        Self { factory, slot }
    }

    /// Factory that owns the unit.
    #[must_use]
    pub const fn factory(&self) -> FactoryId {
        self.factory
    }

    /// Slot holding the unit inside its factory.
    #[must_use]
    pub const fn slot(&self) -> SlotId {
        self.slot
    }
}

/// Sizes of hostile units a factory can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Small, fast and fragile.
    Small,
    /// Baseline unit.
    Medium,
    /// Large, slow and sturdy.
    Large,
}

/// Types of towers that can be built on the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Continuous beam damaging a single target.
    #[default]
    Laser,
    /// Lobs shells that explode on impact.
    Mortar,
}

/// Request to spawn one hostile unit, emitted by the scenario cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Factory that should provide the unit.
    pub factory: FactoryId,
    /// Kind of unit to spawn.
    pub kind: EnemyKind,
}

impl SpawnRequest {
    /// Creates a new spawn request.
    #[must_use]
    pub const fn new(factory: FactoryId, kind: EnemyKind) -> Self {
        Self { factory, kind }
    }
}

/// Read-only accessors into the board's path graph.
///
/// Tiles not on any route report no next tile.
pub trait PathGraph {
    /// World-space anchor of the tile.
    fn tile_position(&self, tile: TileId) -> Vec3;

    /// World-space point where a unit leaves the tile toward the next one.
    fn exit_point(&self, tile: TileId) -> Vec3;

    /// Direction of travel across the tile.
    fn path_direction(&self, tile: TileId) -> Direction;

    /// Next tile on the current route, `None` for the destination.
    fn next_tile_on_path(&self, tile: TileId) -> Option<TileId>;
}
