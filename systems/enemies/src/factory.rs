//! Pooled allocation of enemies.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tile_defence_core::{EnemyHandle, EnemyKind, Event, FactoryId, PathGraph, SlotPool};

use crate::{
    animator::AnimationConfig,
    enemy::{Enemy, TargetPoint, TARGET_POINT_RADIUS},
};

/// Inclusive range a spawn-time value is sampled from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl FloatRange {
    /// Creates a range spanning `min..=max`.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range that always yields `value`.
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Draws a value uniformly from the range.
    pub fn random_value(&self, rng: &mut impl Rng) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Spawn-time ranges for one kind of enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Visual scale.
    pub scale: FloatRange,
    /// Linear speed in tiles per second.
    pub speed: FloatRange,
    /// Lateral offset from the path centre line.
    pub path_offset: FloatRange,
    /// Starting health.
    pub health: FloatRange,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            scale: FloatRange::constant(1.0),
            speed: FloatRange::constant(1.0),
            path_offset: FloatRange::new(-0.4, 0.4),
            health: FloatRange::constant(100.0),
        }
    }
}

/// Configuration of a single enemy factory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Ranges used for [`EnemyKind::Small`].
    pub small: EnemyConfig,
    /// Ranges used for [`EnemyKind::Medium`].
    pub medium: EnemyConfig,
    /// Ranges used for [`EnemyKind::Large`].
    pub large: EnemyConfig,
    /// Clip timings shared by every enemy of the factory.
    pub animation: AnimationConfig,
}

impl FactoryConfig {
    /// Ranges applied to enemies of the provided kind.
    #[must_use]
    pub fn for_kind(&self, kind: EnemyKind) -> &EnemyConfig {
        match kind {
            EnemyKind::Small => &self.small,
            EnemyKind::Medium => &self.medium,
            EnemyKind::Large => &self.large,
        }
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        let medium = EnemyConfig::default();
        Self {
            small: EnemyConfig {
                scale: FloatRange::constant(0.5),
                speed: FloatRange::new(1.4, 1.8),
                health: FloatRange::constant(40.0),
                ..medium
            },
            medium,
            large: EnemyConfig {
                scale: FloatRange::constant(1.6),
                speed: FloatRange::new(0.5, 0.7),
                health: FloatRange::constant(300.0),
                ..medium
            },
            animation: AnimationConfig::default(),
        }
    }
}

/// Pool owning every enemy it ever created, active or not.
#[derive(Debug)]
pub struct EnemyFactory {
    id: FactoryId,
    config: FactoryConfig,
    pool: SlotPool<Enemy>,
    rng: ChaCha8Rng,
}

impl EnemyFactory {
    /// Creates an empty factory whose spawn-time sampling is seeded with `seed`.
    #[must_use]
    pub fn new(id: FactoryId, config: FactoryConfig, seed: u64) -> Self {
        Self {
            id,
            config,
            pool: SlotPool::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Identifier under which the session knows this factory.
    #[must_use]
    pub fn id(&self) -> FactoryId {
        self.id
    }

    /// Configuration the factory samples from.
    #[must_use]
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Hands out an initialised enemy of the requested kind, reusing a pooled one when possible.
    pub fn get(&mut self, kind: EnemyKind) -> EnemyHandle {
        let ranges = *self.config.for_kind(kind);
        let scale = ranges.scale.random_value(&mut self.rng);
        let speed = ranges.speed.random_value(&mut self.rng);
        let path_offset = ranges.path_offset.random_value(&mut self.rng);
        let health = ranges.health.random_value(&mut self.rng);

        let factory = self.id;
        let animation = self.config.animation;
        let (slot, enemy) = self.pool.acquire_mut(|slot| {
            let mut enemy = Enemy::new(animation);
            enemy.set_origin_factory(EnemyHandle::new(factory, slot));
            enemy.set_target_point(TargetPoint::new(TARGET_POINT_RADIUS));
            enemy
        });
        enemy.initialize(scale, speed, path_offset, health);
        log::debug!(
            "factory {} issued {kind:?} in slot {} (speed {speed:.2}, offset {path_offset:.2})",
            factory.get(),
            slot.get()
        );
        EnemyHandle::new(factory, slot)
    }

    /// Returns an enemy to the pool without touching its state.
    pub fn reclaim(&mut self, handle: EnemyHandle) {
        debug_assert_eq!(handle.factory(), self.id, "Wrong factory!");
        if handle.factory() == self.id {
            self.pool.release(handle.slot());
        }
    }

    /// Stops the enemy's animation and returns it to the pool.
    pub fn recycle(&mut self, handle: EnemyHandle) {
        if let Some(enemy) = self.pool.get_mut(handle.slot()) {
            enemy.stop();
        }
        self.reclaim(handle);
    }

    /// Advances one active enemy, recycling it once it reports completion.
    pub fn game_update<P>(
        &mut self,
        handle: EnemyHandle,
        dt: f32,
        path: &P,
        out: &mut Vec<Event>,
    ) -> bool
    where
        P: PathGraph + ?Sized,
    {
        let Some(enemy) = self.pool.get_mut(handle.slot()) else {
            return false;
        };
        if enemy.game_update(dt, path, out) {
            return true;
        }
        self.recycle(handle);
        false
    }

    /// Resolves an active enemy.
    #[must_use]
    pub fn enemy(&self, handle: EnemyHandle) -> Option<&Enemy> {
        if handle.factory() != self.id {
            return None;
        }
        self.pool.get(handle.slot())
    }

    /// Resolves an active enemy for mutation.
    #[must_use]
    pub fn enemy_mut(&mut self, handle: EnemyHandle) -> Option<&mut Enemy> {
        if handle.factory() != self.id {
            return None;
        }
        self.pool.get_mut(handle.slot())
    }

    /// Number of enemies currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Number of enemies ever created by this factory.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}
