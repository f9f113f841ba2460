use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use proptest::prelude::*;
use tile_defence_core::{
    Direction, DirectionChange, EnemyHandle, Event, FactoryId, PathGraph, SlotId, TileId,
};
use tile_defence_system_enemies::{AnimationConfig, Clip, Enemy, TargetPoint};

/// Path graph laid out by walking one tile per direction; the last tile is the destination.
struct Track {
    positions: Vec<Vec3>,
    directions: Vec<Direction>,
}

impl Track {
    fn from_directions(directions: &[Direction]) -> Self {
        let mut positions = Vec::with_capacity(directions.len() + 1);
        let mut position = Vec3::ZERO;
        positions.push(position);
        for direction in directions {
            position += direction.half_vector() * 2.0;
            positions.push(position);
        }
        let mut directions = directions.to_vec();
        let last = *directions.last().expect("track needs at least one step");
        directions.push(last);
        Self {
            positions,
            directions,
        }
    }

    fn straight(tiles: usize) -> Self {
        Self::from_directions(&vec![Direction::North; tiles - 1])
    }

    fn index(&self, tile: TileId) -> usize {
        tile.get() as usize
    }

    fn destination(&self) -> TileId {
        TileId::new((self.positions.len() - 1) as u32)
    }
}

impl PathGraph for Track {
    fn tile_position(&self, tile: TileId) -> Vec3 {
        self.positions[self.index(tile)]
    }

    fn exit_point(&self, tile: TileId) -> Vec3 {
        let index = self.index(tile);
        if tile == self.destination() {
            return self.positions[index];
        }
        self.positions[index] + self.directions[index].half_vector()
    }

    fn path_direction(&self, tile: TileId) -> Direction {
        self.directions[self.index(tile)]
    }

    fn next_tile_on_path(&self, tile: TileId) -> Option<TileId> {
        (tile != self.destination()).then(|| TileId::new(tile.get() + 1))
    }
}

fn animation(intro_duration: f32) -> AnimationConfig {
    AnimationConfig {
        move_animation_speed: 1.0,
        intro_duration,
        outro_duration: 1.0,
        dying_duration: 1.0,
    }
}

fn spawn(track: &Track, config: AnimationConfig, speed: f32, path_offset: f32) -> Enemy {
    let mut enemy = Enemy::new(config);
    enemy.set_origin_factory(EnemyHandle::new(FactoryId::new(0), SlotId::new(0)));
    enemy.set_target_point(TargetPoint::new(0.25));
    enemy.initialize(1.0, speed, path_offset, 10.0);
    enemy.spawn_on(TileId::new(0), track);
    enemy
}

fn reached(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::EnemyReachedDestination))
        .count()
}

/// Traversal time of every segment of a track for a unit with the given lane offset.
fn expected_travel_time(directions: &[Direction], speed: f32, path_offset: f32) -> f32 {
    let mut length = 0.5 + 0.5;
    for pair in directions.windows(2) {
        length += match pair[0].direction_change_to(pair[1]) {
            DirectionChange::None => 1.0,
            DirectionChange::TurnRight => FRAC_PI_2 * (0.5 - path_offset),
            DirectionChange::TurnLeft => FRAC_PI_2 * (0.5 + path_offset),
            DirectionChange::TurnAround => PI * path_offset.abs().max(0.2),
        };
    }
    length / speed
}

#[test]
fn straight_unit_path_takes_three_moving_seconds() {
    let track = Track::straight(4);
    let mut enemy = spawn(&track, animation(1.0), 1.0, 0.0);
    let mut events = Vec::new();
    let dt = 0.25;

    let mut arrival_tick = None;
    let mut intro_done_tick = None;
    for tick in 1..=15 {
        assert!(enemy.game_update(dt, &track, &mut events));
        if intro_done_tick.is_none() && enemy.current_clip() == Clip::Move {
            intro_done_tick = Some(tick);
        }
        if arrival_tick.is_none() && reached(&events) == 1 {
            arrival_tick = Some(tick);
        }
    }

    let intro_done = intro_done_tick.expect("intro should finish");
    let arrival = arrival_tick.expect("unit should arrive");
    assert_eq!(intro_done, 4);
    assert_eq!(((arrival - intro_done + 1) as f32) * dt, 3.0);
    assert_eq!(enemy.current_clip(), Clip::Outro);
    assert!(!enemy.is_valid_target());
}

#[test]
fn move_clip_rate_scales_with_speed_over_scale() {
    let track = Track::straight(4);
    let config = AnimationConfig {
        move_animation_speed: 2.0,
        ..animation(0.5)
    };
    let mut enemy = Enemy::new(config);
    enemy.set_origin_factory(EnemyHandle::new(FactoryId::new(0), SlotId::new(0)));
    enemy.set_target_point(TargetPoint::new(0.25));
    enemy.initialize(0.5, 1.5, 0.25, 10.0);
    enemy.spawn_on(TileId::new(0), &track);

    let mut events = Vec::new();
    assert!(enemy.game_update(0.5, &track, &mut events));
    assert_eq!(enemy.current_clip(), Clip::Move);
    assert_eq!(enemy.animator().clip_speed(), 2.0 * 1.5 / 0.5);
    assert!(enemy.animator().is_playing());

    let pose = enemy.position() + enemy.rotation() * enemy.model_offset();
    assert_eq!(enemy.target_position(), pose);

    enemy.stop();
    assert!(!enemy.animator().is_playing());
}

#[test]
fn destination_is_reported_once_across_the_outro() {
    let track = Track::straight(3);
    let mut enemy = spawn(&track, animation(0.0), 2.0, 0.0);
    let mut events = Vec::new();

    let mut updates = 0;
    while enemy.game_update(0.1, &track, &mut events) {
        updates += 1;
        assert!(updates < 1_000, "unit never finished");
    }

    assert_eq!(reached(&events), 1);
    assert_eq!(enemy.current_clip(), Clip::Outro);
}

#[test]
fn intro_keeps_the_unit_untargetable_and_still() {
    let track = Track::straight(3);
    let mut enemy = spawn(&track, animation(1.0), 1.0, 0.0);
    let mut events = Vec::new();

    assert!(enemy.game_update(0.5, &track, &mut events));
    assert_eq!(enemy.current_clip(), Clip::Intro);
    assert!(!enemy.is_valid_target());
    assert_eq!(enemy.position(), track.tile_position(TileId::new(0)));

    assert!(enemy.game_update(0.5, &track, &mut events));
    assert_eq!(enemy.current_clip(), Clip::Move);
    assert!(enemy.is_valid_target());
    assert!(enemy.position().z > 0.0, "unit should start moving");
}

#[test]
fn overkill_damage_triggers_dying_before_any_motion() {
    let track = Track::straight(5);
    let mut enemy = spawn(&track, animation(0.0), 1.0, 0.0);
    let mut events = Vec::new();
    assert!(enemy.game_update(0.25, &track, &mut events));
    assert_eq!(enemy.current_clip(), Clip::Move);

    enemy.apply_damage(15.0);
    assert_eq!(enemy.health(), -5.0);

    let before = enemy.position();
    assert!(enemy.game_update(0.25, &track, &mut events));
    assert_eq!(enemy.current_clip(), Clip::Dying);
    assert_eq!(enemy.position(), before);
    assert!(!enemy.is_valid_target());

    let mut updates = 0;
    while enemy.game_update(0.25, &track, &mut events) {
        assert_eq!(enemy.position(), before, "dying units never advance");
        updates += 1;
    }
    assert_eq!(updates, 3);
    assert_eq!(reached(&events), 0);
}

#[test]
fn zero_health_dies_on_the_same_tick() {
    let track = Track::straight(5);
    let mut enemy = spawn(&track, animation(0.0), 1.0, 0.0);
    let mut events = Vec::new();
    assert!(enemy.game_update(0.25, &track, &mut events));

    enemy.apply_damage(10.0);
    assert_eq!(enemy.health(), 0.0);
    let before = enemy.position();
    assert!(enemy.game_update(0.25, &track, &mut events));
    assert_eq!(enemy.current_clip(), Clip::Dying);
    assert_eq!(enemy.position(), before);
}

#[test]
fn right_turn_follows_an_arc_around_the_tile_corner() {
    let track = Track::from_directions(&[Direction::North, Direction::East, Direction::East]);
    let path_offset = 0.1;
    let mut enemy = spawn(&track, animation(0.0), 1.0, path_offset);
    let mut events = Vec::new();
    let pivot = track.exit_point(TileId::new(0)) + Direction::East.half_vector();

    let mut turn_samples = 0;
    while enemy.game_update(1.0 / 64.0, &track, &mut events) {
        if enemy.direction_change() == DirectionChange::TurnRight {
            let radius = enemy.target_position().distance(pivot);
            assert!(
                (radius - (0.5 - path_offset)).abs() < 1e-4,
                "radius {radius} drifted off the arc"
            );
            turn_samples += 1;
        }
    }
    assert!(turn_samples > 0, "unit never turned");
}

#[test]
fn turn_around_pivots_in_place() {
    let track = Track::from_directions(&[Direction::East, Direction::West, Direction::West]);
    let mut enemy = spawn(&track, animation(0.0), 1.0, -0.3);
    let mut events = Vec::new();
    let entry = track.exit_point(TileId::new(0));

    let mut saw_turn = false;
    while enemy.game_update(1.0 / 64.0, &track, &mut events) {
        if enemy.direction_change() == DirectionChange::TurnAround {
            saw_turn = true;
            assert_eq!(enemy.position(), entry);
            let (from, to) = enemy.direction_angles();
            assert_eq!(to - from, 180.0, "negative offsets reverse clockwise");
        }
    }
    assert!(saw_turn);
}

#[test]
#[should_panic(expected = "Nowhere to go")]
fn spawning_on_the_destination_is_rejected() {
    let track = Track::straight(2);
    let mut enemy = Enemy::new(animation(0.0));
    enemy.initialize(1.0, 1.0, 0.0, 10.0);
    enemy.spawn_on(track.destination(), &track);
}

#[test]
#[should_panic(expected = "Redefined origin factory")]
fn origin_factory_cannot_be_rebound() {
    let mut enemy = Enemy::new(animation(0.0));
    enemy.set_origin_factory(EnemyHandle::new(FactoryId::new(0), SlotId::new(0)));
    enemy.set_origin_factory(EnemyHandle::new(FactoryId::new(1), SlotId::new(0)));
}

#[test]
#[should_panic(expected = "Redefined target point")]
fn target_point_cannot_be_rebound() {
    let mut enemy = Enemy::new(animation(0.0));
    enemy.set_target_point(TargetPoint::new(0.25));
    enemy.set_target_point(TargetPoint::new(0.5));
}

#[test]
#[should_panic(expected = "Negative damage")]
fn negative_damage_is_rejected() {
    let mut enemy = Enemy::new(animation(0.0));
    enemy.initialize(1.0, 1.0, 0.0, 10.0);
    enemy.apply_damage(-1.0);
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::East),
        Just(Direction::South),
        Just(Direction::West),
    ]
}

proptest! {
    #[test]
    fn travel_time_matches_path_length(
        directions in prop::collection::vec(direction_strategy(), 1..8),
        speed in 0.5f32..2.0,
        path_offset in -0.4f32..0.4,
    ) {
        let track = Track::from_directions(&directions);
        let mut enemy = spawn(&track, animation(0.0), speed, path_offset);
        let mut events = Vec::new();
        let dt = 1.0 / 128.0;

        let mut ticks = 0u32;
        while reached(&events) == 0 {
            prop_assert!(enemy.game_update(dt, &track, &mut events));
            ticks += 1;
            prop_assert!(ticks < 100_000, "unit never arrived");
        }

        let expected = expected_travel_time(&directions, speed, path_offset);
        let elapsed = ticks as f32 * dt;
        prop_assert!(
            elapsed >= expected - 1e-3 && elapsed < expected + dt + 1e-3,
            "elapsed {} expected {}", elapsed, expected
        );
    }

    #[test]
    fn headings_stay_continuous_between_segments(
        directions in prop::collection::vec(direction_strategy(), 2..10),
        path_offset in -0.4f32..0.4,
    ) {
        let track = Track::from_directions(&directions);
        let mut enemy = spawn(&track, animation(0.0), 1.0, path_offset);
        let mut events = Vec::new();

        let mut segment = enemy.tile_from();
        let mut angles = enemy.direction_angles();
        while enemy.game_update(1.0 / 128.0, &track, &mut events) {
            if enemy.tile_to().is_none() {
                break;
            }
            if enemy.tile_from() != segment {
                let expected_tile = segment.map(|tile| TileId::new(tile.get() + 1));
                prop_assert_eq!(enemy.tile_from(), expected_tile, "skipped a segment");
                let (from, _) = enemy.direction_angles();
                prop_assert_eq!(from, angles.1);
                segment = enemy.tile_from();
            }
            angles = enemy.direction_angles();
        }
    }
}
