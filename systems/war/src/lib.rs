#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Short-lived war entities: mortar shells and the explosions they leave behind.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tile_defence_core::{SlotId, SlotPool};

/// Downward acceleration applied to shells in flight.
pub const GRAVITY: f32 = 9.81;

/// Shortest flight a shell can take, keeping point-blank shots visible.
const MIN_FLIGHT_TIME: f32 = 0.25;

/// Tunables of the war factory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarConfig {
    /// Horizontal distance a shell covers per second.
    pub shell_speed: f32,
    /// Seconds an explosion stays on the board.
    pub explosion_duration: f32,
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            shell_speed: 4.0,
            explosion_duration: 0.5,
        }
    }
}

/// Impact reported by a shell when it lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detonation {
    /// Impact point.
    pub position: Vec3,
    /// Radius of the blast sphere.
    pub blast_radius: f32,
    /// Damage dealt to every target inside the blast.
    pub damage: f32,
}

/// Ballistic projectile flying from a tower toward a target point.
#[derive(Clone, Debug, Default)]
pub struct Shell {
    launch_point: Vec3,
    target_point: Vec3,
    launch_velocity: Vec3,
    position: Vec3,
    age: f32,
    flight_time: f32,
    blast_radius: f32,
    damage: f32,
}

impl Shell {
    /// Aims the shell so that it lands on `target_point` under gravity.
    pub fn initialize(
        &mut self,
        launch_point: Vec3,
        target_point: Vec3,
        blast_radius: f32,
        damage: f32,
        horizontal_speed: f32,
    ) {
        let offset = target_point - launch_point;
        let horizontal = Vec3::new(offset.x, 0.0, offset.z).length();
        let flight_time = if horizontal_speed > 0.0 {
            (horizontal / horizontal_speed).max(MIN_FLIGHT_TIME)
        } else {
            MIN_FLIGHT_TIME
        };

        self.launch_point = launch_point;
        self.target_point = target_point;
        self.launch_velocity = offset / flight_time + Vec3::Y * (0.5 * GRAVITY * flight_time);
        self.position = launch_point;
        self.age = 0.0;
        self.flight_time = flight_time;
        self.blast_radius = blast_radius;
        self.damage = damage;
    }

    /// Moves the shell along its arc. Returns `false` once it has landed.
    pub fn game_update(&mut self, dt: f32, out: &mut Vec<Detonation>) -> bool {
        self.age += dt;
        if self.age >= self.flight_time {
            self.position = self.target_point;
            out.push(Detonation {
                position: self.target_point,
                blast_radius: self.blast_radius,
                damage: self.damage,
            });
            return false;
        }

        self.position = self.launch_point + self.launch_velocity * self.age
            - Vec3::Y * (0.5 * GRAVITY * self.age * self.age);
        true
    }

    /// Current position along the arc.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Seconds between launch and impact.
    #[must_use]
    pub fn flight_time(&self) -> f32 {
        self.flight_time
    }
}

/// Expanding, fading blast left by a shell.
#[derive(Clone, Debug, Default)]
pub struct Explosion {
    position: Vec3,
    blast_radius: f32,
    age: f32,
    duration: f32,
}

impl Explosion {
    /// Places the explosion and restarts its lifetime.
    pub fn initialize(&mut self, position: Vec3, blast_radius: f32, duration: f32) {
        self.position = position;
        self.blast_radius = blast_radius;
        self.age = 0.0;
        self.duration = duration;
    }

    /// Ages the explosion. Returns `false` once it has faded out.
    pub fn game_update(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.age < self.duration
    }

    /// Centre of the blast.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Visual diameter of the blast.
    #[must_use]
    pub fn scale(&self) -> f32 {
        2.0 * self.blast_radius
    }

    /// Opacity fading linearly from 1 to 0 over the lifetime.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.duration).clamp(0.0, 1.0)
    }
}

/// Pool handle of a war entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WarHandle {
    /// Shell stored in the given slot.
    Shell(SlotId),
    /// Explosion stored in the given slot.
    Explosion(SlotId),
}

/// Shared pool of shells and explosions.
#[derive(Debug, Default)]
pub struct WarFactory {
    config: WarConfig,
    shells: SlotPool<Shell>,
    explosions: SlotPool<Explosion>,
}

impl WarFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new(config: WarConfig) -> Self {
        Self {
            config,
            shells: SlotPool::new(),
            explosions: SlotPool::new(),
        }
    }

    /// Tunables the factory hands to the entities it creates.
    #[must_use]
    pub fn config(&self) -> &WarConfig {
        &self.config
    }

    /// Hands out a pooled shell for the caller to aim.
    pub fn shell(&mut self) -> (WarHandle, &mut Shell) {
        let (slot, shell) = self.shells.acquire_mut(|_| Shell::default());
        (WarHandle::Shell(slot), shell)
    }

    /// Hands out a pooled explosion for the caller to place.
    pub fn explosion(&mut self) -> (WarHandle, &mut Explosion) {
        let (slot, explosion) = self.explosions.acquire_mut(|_| Explosion::default());
        (WarHandle::Explosion(slot), explosion)
    }

    /// Advances one active entity, reclaiming it once it reports completion.
    pub fn game_update(&mut self, handle: WarHandle, dt: f32, out: &mut Vec<Detonation>) -> bool {
        let active = match handle {
            WarHandle::Shell(slot) => match self.shells.get_mut(slot) {
                Some(shell) => shell.game_update(dt, out),
                None => return false,
            },
            WarHandle::Explosion(slot) => match self.explosions.get_mut(slot) {
                Some(explosion) => explosion.game_update(dt),
                None => return false,
            },
        };
        if !active {
            self.reclaim(handle);
        }
        active
    }

    /// Returns an entity to its pool.
    pub fn reclaim(&mut self, handle: WarHandle) {
        match handle {
            WarHandle::Shell(slot) => self.shells.release(slot),
            WarHandle::Explosion(slot) => self.explosions.release(slot),
        }
    }

    /// Resolves an active shell.
    #[must_use]
    pub fn shell_at(&self, slot: SlotId) -> Option<&Shell> {
        self.shells.get(slot)
    }

    /// Resolves an active explosion.
    #[must_use]
    pub fn explosion_at(&self, slot: SlotId) -> Option<&Explosion> {
        self.explosions.get(slot)
    }

    /// Number of shells and explosions currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.shells.active_count() + self.explosions.active_count()
    }
}
