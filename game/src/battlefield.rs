//! Borrowed view over the session's live entities used by towers and blasts.

use glam::{Vec3, Vec3Swizzles};
use tile_defence_core::EnemyHandle;
use tile_defence_system_enemies::{Enemy, EnemyFactory};
use tile_defence_system_war::{Detonation, WarFactory, WarHandle};

use crate::{board::TargetField, collection::GameBehaviorCollection};

/// Split borrow of the session fields the board may touch during its update.
pub(crate) struct Battlefield<'a> {
    pub(crate) factories: &'a mut [EnemyFactory],
    pub(crate) enemies: &'a GameBehaviorCollection<EnemyHandle>,
    pub(crate) war_factory: &'a mut WarFactory,
    pub(crate) non_enemies: &'a mut GameBehaviorCollection<WarHandle>,
}

impl Battlefield<'_> {
    fn enemy(&self, handle: EnemyHandle) -> Option<&Enemy> {
        self.factories
            .get(handle.factory().index())
            .and_then(|factory| factory.enemy(handle))
    }

    fn enemy_mut(&mut self, handle: EnemyHandle) -> Option<&mut Enemy> {
        self.factories
            .get_mut(handle.factory().index())
            .and_then(|factory| factory.enemy_mut(handle))
    }

    /// Registers an explosion at the impact point and damages every valid target inside the blast.
    pub(crate) fn detonate(&mut self, detonation: Detonation) {
        let duration = self.war_factory.config().explosion_duration;
        let (handle, explosion) = self.war_factory.explosion();
        explosion.initialize(detonation.position, detonation.blast_radius, duration);
        self.non_enemies.add(handle);

        let enemies = self.enemies;
        for target in enemies.iter() {
            let Some(enemy) = self.enemy_mut(target) else {
                continue;
            };
            if !enemy.is_valid_target() {
                continue;
            }
            let reach = detonation.blast_radius + enemy.target_radius();
            if enemy.target_position().distance(detonation.position) <= reach {
                enemy.apply_damage(detonation.damage);
            }
        }
    }
}

impl TargetField for Battlefield<'_> {
    fn acquire_target(&self, center: Vec3, range: f32) -> Option<EnemyHandle> {
        let mut best: Option<(EnemyHandle, f32)> = None;
        for handle in self.enemies.iter() {
            let Some(enemy) = self.enemy(handle) else {
                continue;
            };
            if !enemy.is_valid_target() {
                continue;
            }
            let distance = enemy.target_position().xz().distance(center.xz());
            if distance > range + enemy.target_radius() {
                continue;
            }
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((handle, distance));
            }
        }
        best.map(|(handle, _)| handle)
    }

    fn target_position(&self, target: EnemyHandle) -> Option<Vec3> {
        self.enemy(target)
            .filter(|enemy| enemy.is_valid_target())
            .map(Enemy::target_position)
    }

    fn apply_damage(&mut self, target: EnemyHandle, amount: f32) {
        if let Some(enemy) = self.enemy_mut(target) {
            enemy.apply_damage(amount);
        }
    }

    fn launch_shell(&mut self, launch: Vec3, target: Vec3, blast_radius: f32, damage: f32) {
        let speed = self.war_factory.config().shell_speed;
        let (handle, shell) = self.war_factory.shell();
        shell.initialize(launch, target, blast_radius, damage, speed);
        self.non_enemies.add(handle);
    }
}
