//! Path-following hostile unit.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};
use tile_defence_core::{Direction, DirectionChange, EnemyHandle, Event, PathGraph, TileId};

use crate::animator::{AnimationConfig, Clip, EnemyAnimator};

/// Radius of an enemy's hit volume at unit scale.
pub const TARGET_POINT_RADIUS: f32 = 0.25;

/// Smallest turn-around radius used when deriving the angular speed.
const MIN_TURN_AROUND_RADIUS: f32 = 0.2;

/// Sphere towers and explosions test against when looking for targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPoint {
    radius: f32,
    enabled: bool,
}

impl TargetPoint {
    /// Creates a disabled hit volume with the provided unscaled radius.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            radius,
            enabled: false,
        }
    }

    /// Unscaled radius of the volume.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether the volume currently accepts hits.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Hostile unit that walks the board's path graph one tile segment at a time.
///
/// Each segment runs from `position_from` to `position_to`, or rotates around
/// a pivot for turns, with `progress` normalised into `[0, 1)` per segment.
#[derive(Clone, Debug)]
pub struct Enemy {
    origin: Option<EnemyHandle>,
    target_point: Option<TargetPoint>,
    animator: EnemyAnimator,
    tile_from: Option<TileId>,
    tile_to: Option<TileId>,
    position_from: Vec3,
    position_to: Vec3,
    position: Vec3,
    rotation: Quat,
    model_offset: Vec3,
    direction: Direction,
    direction_change: DirectionChange,
    direction_angle_from: f32,
    direction_angle_to: f32,
    path_offset: f32,
    speed: f32,
    scale: f32,
    health: f32,
    progress: f32,
    progress_factor: f32,
}

impl Enemy {
    /// Creates an unbound, uninitialised enemy.
    #[must_use]
    pub fn new(animation: AnimationConfig) -> Self {
        Self {
            origin: None,
            target_point: None,
            animator: EnemyAnimator::new(animation),
            tile_from: None,
            tile_to: None,
            position_from: Vec3::ZERO,
            position_to: Vec3::ZERO,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            model_offset: Vec3::ZERO,
            direction: Direction::North,
            direction_change: DirectionChange::None,
            direction_angle_from: 0.0,
            direction_angle_to: 0.0,
            path_offset: 0.0,
            speed: 0.0,
            scale: 1.0,
            health: 0.0,
            progress: 0.0,
            progress_factor: 0.0,
        }
    }

    /// Binds the unit to the factory slot that owns it. Binding twice is an invariant violation.
    pub fn set_origin_factory(&mut self, origin: EnemyHandle) {
        debug_assert!(self.origin.is_none(), "Redefined origin factory");
        if self.origin.is_none() {
            self.origin = Some(origin);
        }
    }

    /// Factory slot the unit returns to when recycled.
    #[must_use]
    pub fn origin_factory(&self) -> Option<EnemyHandle> {
        self.origin
    }

    /// Attaches the unit's hit volume. Attaching twice is an invariant violation.
    pub fn set_target_point(&mut self, target_point: TargetPoint) {
        debug_assert!(self.target_point.is_none(), "Redefined target point");
        if self.target_point.is_none() {
            self.target_point = Some(target_point);
        }
    }

    /// Hit volume attached to the unit.
    #[must_use]
    pub fn target_point(&self) -> Option<&TargetPoint> {
        self.target_point.as_ref()
    }

    /// Sets the per-life constants and starts the intro clip with the hit volume disabled.
    pub fn initialize(&mut self, scale: f32, speed: f32, path_offset: f32, health: f32) {
        self.scale = scale;
        self.health = 100.0 * scale;
        self.speed = speed;
        self.path_offset = path_offset;
        self.health = health;
        self.animator.play_intro();
        self.set_targetable(false);
    }

    /// Places the unit on `tile` and prepares its intro segment toward the tile's exit.
    ///
    /// The tile must have a next tile on its path.
    pub fn spawn_on<P>(&mut self, tile: TileId, path: &P)
    where
        P: PathGraph + ?Sized,
    {
        debug_assert!(
            path.next_tile_on_path(tile).is_some(),
            "Nowhere to go from tile {}",
            tile.get()
        );
        self.tile_from = Some(tile);
        self.tile_to = path.next_tile_on_path(tile);
        self.prepare_intro(path, tile);
        self.progress = 0.0;
    }

    /// Advances the unit by `dt` seconds. Returns `false` once the unit should be recycled.
    pub fn game_update<P>(&mut self, dt: f32, path: &P, out: &mut Vec<Event>) -> bool
    where
        P: PathGraph + ?Sized,
    {
        self.animator.game_update(dt);
        let clip = self.animator.current_clip();
        if clip == Clip::Intro {
            if !self.animator.is_done() {
                return true;
            }
            let rate = self.animator.config().move_animation_speed * self.speed / self.scale;
            self.animator.play_move(rate);
            self.set_targetable(true);
        } else if clip >= Clip::Outro {
            return !self.animator.is_done();
        }

        if self.health <= 0.0 {
            self.animator.play_dying();
            self.set_targetable(false);
            return true;
        }

        self.progress += dt * self.progress_factor;
        while self.progress >= 1.0 {
            if self.tile_to.is_none() {
                out.push(Event::EnemyReachedDestination);
                self.animator.play_outro();
                self.set_targetable(false);
                return true;
            }
            self.progress = (self.progress - 1.0) / self.progress_factor;
            self.prepare_next_state(path);
            self.progress *= self.progress_factor;
        }

        if self.direction_change == DirectionChange::None {
            self.position = self.position_from.lerp(self.position_to, self.progress);
        } else {
            let angle = self.direction_angle_from
                + (self.direction_angle_to - self.direction_angle_from) * self.progress;
            self.rotation = Quat::from_rotation_y(angle.to_radians());
        }
        true
    }

    /// Subtracts `damage` from the unit's health. Negative damage is an invariant violation.
    pub fn apply_damage(&mut self, damage: f32) {
        debug_assert!(damage >= 0.0, "Negative damage applied");
        self.health -= damage;
    }

    /// Halts any in-flight animation ahead of returning to the pool.
    pub fn stop(&mut self) {
        self.animator.stop();
    }

    /// Whether towers and explosions may currently hit the unit.
    #[must_use]
    pub fn is_valid_target(&self) -> bool {
        self.animator.current_clip() == Clip::Move
            && self.target_point.map_or(false, |point| point.is_enabled())
    }

    /// World-space centre of the unit's model.
    #[must_use]
    pub fn target_position(&self) -> Vec3 {
        self.position() + self.rotation() * self.model_offset()
    }

    /// Radius of the hit volume after applying the unit's scale.
    #[must_use]
    pub fn target_radius(&self) -> f32 {
        self.target_point
            .map_or(0.0, |point| point.radius() * self.scale)
    }

    /// Remaining health. May be negative until the next update.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Visual scale assigned at initialisation.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Linear speed in tiles per second.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Lateral offset from the path centre line.
    #[must_use]
    pub fn path_offset(&self) -> f32 {
        self.path_offset
    }

    /// Clip currently playing.
    #[must_use]
    pub fn current_clip(&self) -> Clip {
        self.animator.current_clip()
    }

    /// Animator driving the unit's visible state.
    #[must_use]
    pub fn animator(&self) -> &EnemyAnimator {
        &self.animator
    }

    /// Pivot or interpolated position of the current segment frame.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Heading of the current segment frame.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Lateral model offset inside the segment frame.
    #[must_use]
    pub fn model_offset(&self) -> Vec3 {
        self.model_offset
    }

    /// Tile the current segment started on.
    #[must_use]
    pub fn tile_from(&self) -> Option<TileId> {
        self.tile_from
    }

    /// Tile the current segment leads into, `None` on the final approach.
    #[must_use]
    pub fn tile_to(&self) -> Option<TileId> {
        self.tile_to
    }

    /// Direction of travel of the current segment.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Turn performed by the current segment.
    #[must_use]
    pub fn direction_change(&self) -> DirectionChange {
        self.direction_change
    }

    /// Heading interpolation bounds of the current segment, in degrees.
    #[must_use]
    pub fn direction_angles(&self) -> (f32, f32) {
        (self.direction_angle_from, self.direction_angle_to)
    }

    /// Normalised progress through the current segment.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Rate converting elapsed seconds into segment progress.
    #[must_use]
    pub fn progress_factor(&self) -> f32 {
        self.progress_factor
    }

    fn set_targetable(&mut self, enabled: bool) {
        if let Some(point) = self.target_point.as_mut() {
            point.enabled = enabled;
        }
    }

    fn prepare_next_state<P>(&mut self, path: &P)
    where
        P: PathGraph + ?Sized,
    {
        let Some(tile) = self.tile_to else {
            return;
        };
        self.tile_from = Some(tile);
        self.tile_to = path.next_tile_on_path(tile);
        self.position_from = self.position_to;
        if self.tile_to.is_none() {
            self.prepare_outro(path, tile);
            return;
        }

        self.position_to = path.exit_point(tile);
        let next_direction = path.path_direction(tile);
        self.direction_change = self.direction.direction_change_to(next_direction);
        self.direction = next_direction;
        self.direction_angle_from = self.direction_angle_to;
        match self.direction_change {
            DirectionChange::None => self.prepare_forward(),
            DirectionChange::TurnRight => self.prepare_turn_right(),
            DirectionChange::TurnLeft => self.prepare_turn_left(),
            DirectionChange::TurnAround => self.prepare_turn_around(),
        }
    }

    fn prepare_forward(&mut self) {
        self.rotation = self.direction.rotation();
        self.direction_angle_to = self.direction.angle();
        self.model_offset = Vec3::new(self.path_offset, 0.0, 0.0);
        self.progress_factor = self.speed;
    }

    fn prepare_turn_right(&mut self) {
        self.direction_angle_to = self.direction_angle_from + 90.0;
        self.model_offset = Vec3::new(self.path_offset - 0.5, 0.0, 0.0);
        self.position = self.position_from + self.direction.half_vector();
        self.progress_factor = self.speed / (FRAC_PI_2 * (0.5 - self.path_offset));
    }

    fn prepare_turn_left(&mut self) {
        self.direction_angle_to = self.direction_angle_from - 90.0;
        self.model_offset = Vec3::new(self.path_offset + 0.5, 0.0, 0.0);
        self.position = self.position_from + self.direction.half_vector();
        self.progress_factor = self.speed / (FRAC_PI_2 * (0.5 + self.path_offset));
    }

    fn prepare_turn_around(&mut self) {
        let half_turn = if self.path_offset < 0.0 { 180.0 } else { -180.0 };
        self.direction_angle_to = self.direction_angle_from + half_turn;
        self.model_offset = Vec3::new(self.path_offset, 0.0, 0.0);
        self.position = self.position_from;
        self.progress_factor =
            self.speed / (PI * self.path_offset.abs().max(MIN_TURN_AROUND_RADIUS));
    }

    fn prepare_intro<P>(&mut self, path: &P, tile: TileId)
    where
        P: PathGraph + ?Sized,
    {
        self.position_from = path.tile_position(tile);
        self.position = self.position_from;
        self.position_to = path.exit_point(tile);
        self.direction = path.path_direction(tile);
        self.direction_change = DirectionChange::None;
        self.direction_angle_from = self.direction.angle();
        self.direction_angle_to = self.direction_angle_from;
        self.rotation = self.direction.rotation();
        self.model_offset = Vec3::new(self.path_offset, 0.0, 0.0);
        self.progress_factor = 2.0 * self.speed;
    }

    fn prepare_outro<P>(&mut self, path: &P, tile: TileId)
    where
        P: PathGraph + ?Sized,
    {
        self.position_to = path.tile_position(tile);
        self.direction_change = DirectionChange::None;
        self.direction_angle_to = self.direction.angle();
        self.model_offset = Vec3::new(self.path_offset, 0.0, 0.0);
        self.rotation = self.direction.rotation();
        self.progress_factor = 2.0 * self.speed;
    }
}
