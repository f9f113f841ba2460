//! Tower state and per-tick firing logic.

use glam::{Vec3, Vec3Swizzles};
use serde::{Deserialize, Serialize};
use tile_defence_core::{EnemyHandle, TowerKind};
use tile_defence_game::TargetField;

/// Height of a tower's turret above its tile.
const TURRET_HEIGHT: f32 = 0.5;

/// Launch progress kept when a mortar is ready but finds nothing to shoot.
const READY_LAUNCH_PROGRESS: f32 = 0.999;

/// Tunables of laser towers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    /// Ground distance within which targets are acquired and tracked.
    pub range: f32,
    /// Damage dealt to the tracked target per second.
    pub damage_per_second: f32,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            range: 1.5,
            damage_per_second: 10.0,
        }
    }
}

/// Tunables of mortar towers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortarConfig {
    /// Ground distance within which targets are acquired.
    pub range: f32,
    /// Shells fired per second while a target is in range.
    pub shots_per_second: f32,
    /// Radius of the blast of every shell.
    pub blast_radius: f32,
    /// Damage dealt to every target inside a blast.
    pub damage: f32,
}

impl Default for MortarConfig {
    fn default() -> Self {
        Self {
            range: 3.5,
            shots_per_second: 1.0,
            blast_radius: 1.0,
            damage: 10.0,
        }
    }
}

/// Tower built on a tile.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    kind: TowerKind,
    turret: Vec3,
    target: Option<EnemyHandle>,
    launch_progress: f32,
}

impl Tower {
    pub(crate) fn new(kind: TowerKind, anchor: Vec3) -> Self {
        Self {
            kind,
            turret: anchor + Vec3::Y * TURRET_HEIGHT,
            target: None,
            launch_progress: 0.0,
        }
    }

    pub(crate) fn kind(&self) -> TowerKind {
        self.kind
    }

    pub(crate) fn target(&self) -> Option<EnemyHandle> {
        self.target
    }

    pub(crate) fn game_update(
        &mut self,
        dt: f32,
        laser: &LaserConfig,
        mortar: &MortarConfig,
        field: &mut dyn TargetField,
    ) {
        match self.kind {
            TowerKind::Laser => self.update_laser(dt, laser, field),
            TowerKind::Mortar => self.update_mortar(dt, mortar, field),
        }
    }

    fn update_laser(&mut self, dt: f32, config: &LaserConfig, field: &mut dyn TargetField) {
        let tracked = self
            .target
            .filter(|target| self.tracks(&*field, *target, config.range));
        self.target = tracked.or_else(|| field.acquire_target(self.turret, config.range));
        if let Some(target) = self.target {
            field.apply_damage(target, config.damage_per_second * dt);
        }
    }

    fn tracks(&self, field: &dyn TargetField, target: EnemyHandle, range: f32) -> bool {
        field
            .target_position(target)
            .map_or(false, |position| {
                position.xz().distance(self.turret.xz()) <= range
            })
    }

    fn update_mortar(&mut self, dt: f32, config: &MortarConfig, field: &mut dyn TargetField) {
        self.launch_progress += config.shots_per_second * dt;
        while self.launch_progress >= 1.0 {
            let aim = field
                .acquire_target(self.turret, config.range)
                .and_then(|target| field.target_position(target));
            let Some(aim) = aim else {
                self.launch_progress = READY_LAUNCH_PROGRESS;
                break;
            };
            field.launch_shell(self.turret, aim, config.blast_radius, config.damage);
            self.launch_progress -= 1.0;
        }
    }
}
