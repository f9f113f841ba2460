//! Collaborator contracts between the session and the board it plays on.

use glam::Vec3;
use tile_defence_core::{EnemyHandle, PathGraph, Ray, TileId, TowerKind};

/// Tile board driven by the session.
///
/// The session only routes commands here; every tile rule (what may be
/// built where, how routes react to a new destination) lives in the
/// implementation.
pub trait Board: PathGraph {
    /// Number of registered spawn points.
    fn spawn_point_count(&self) -> usize;

    /// Spawn point stored at `index`, if there is one.
    fn spawn_point(&self, index: usize) -> Option<TileId>;

    /// Tile hit by the provided ray.
    fn tile_at(&self, ray: &Ray) -> Option<TileId>;

    /// Builds or removes a wall.
    fn toggle_wall(&mut self, tile: TileId);

    /// Builds, replaces or removes a tower of the given kind.
    fn toggle_tower(&mut self, tile: TileId, kind: TowerKind);

    /// Registers or removes a spawn point.
    fn toggle_spawn_point(&mut self, tile: TileId);

    /// Moves or restores the destination.
    fn toggle_destination(&mut self, tile: TileId);

    /// Whether the grid overlay is visible.
    fn show_grid(&self) -> bool;

    /// Shows or hides the grid overlay.
    fn set_show_grid(&mut self, show: bool);

    /// Whether the path overlay is visible.
    fn show_paths(&self) -> bool;

    /// Shows or hides the path overlay.
    fn set_show_paths(&mut self, show: bool);

    /// Removes everything the player placed and restores the default layout.
    fn clear(&mut self);

    /// Runs per-tick bookkeeping such as tower targeting and firing.
    fn game_update(&mut self, dt: f32, field: &mut dyn TargetField);
}

/// View of the live entities handed to the board while its towers act.
pub trait TargetField {
    /// Closest valid target whose hit volume reaches within `range` of `center` on the ground plane.
    fn acquire_target(&self, center: Vec3, range: f32) -> Option<EnemyHandle>;

    /// Current target point of `target`, or `None` once it stopped being a valid target.
    fn target_position(&self, target: EnemyHandle) -> Option<Vec3>;

    /// Deals `amount` damage to `target`. Must not be negative.
    fn apply_damage(&mut self, target: EnemyHandle, amount: f32);

    /// Fires a shell from `launch` that explodes at `target`.
    fn launch_shell(&mut self, launch: Vec3, target: Vec3, blast_radius: f32, damage: f32);
}
