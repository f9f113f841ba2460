use std::time::Duration;

use tile_defence_board::{BoardConfig, GridCell, LaserConfig, TrackBoard};
use tile_defence_core::{Command, EnemyKind, Event, FactoryId, PathGraph, Ray, TowerKind};
use tile_defence_game::{Board, Game, GameConfig};
use tile_defence_system_scenario::{EnemySpawnSequence, EnemyWave, GameScenario};

const TICK: Duration = Duration::from_millis(100);

fn straight_board(laser: LaserConfig) -> BoardConfig {
    BoardConfig {
        columns: 7,
        rows: 3,
        route: vec![GridCell::new(0, 1), GridCell::new(6, 1)],
        laser,
        ..BoardConfig::default()
    }
}

fn medium_units(amount: u32) -> GameConfig {
    GameConfig {
        scenario: GameScenario {
            waves: vec![EnemyWave {
                spawn_sequences: vec![EnemySpawnSequence::new(
                    FactoryId::new(0),
                    EnemyKind::Medium,
                    amount,
                    1.0,
                )],
            }],
            cycles: 1,
            cycle_speed_up: 0.0,
        },
        ..GameConfig::default()
    }
}

fn count(events: &[Event], wanted: Event) -> usize {
    events.iter().filter(|event| **event == wanted).count()
}

#[test]
fn units_walk_the_route_and_cost_health_at_the_destination() {
    let board = TrackBoard::new(straight_board(LaserConfig::default())).expect("valid board");
    let destination = board.destination();
    let mut game = Game::new(medium_units(1), board).expect("valid config");

    let mut events = Vec::new();
    let mut ticks = 0;
    while count(&events, Event::EnemyReachedDestination) == 0 {
        game.tick(TICK, &[], &mut events);
        ticks += 1;
        assert!(ticks < 200, "unit never arrived");
    }

    assert_eq!(game.player_health(), 9);
    let handle = game.enemies().iter().next().expect("unit plays its outro");
    let enemy = game.enemy(handle).expect("unit is active");
    assert_eq!(enemy.tile_from(), Some(destination));
    let offset = enemy.position().distance(game.board().tile_position(destination));
    assert!(offset < 0.2, "unit stopped {offset} away from the destination");
}

#[test]
fn a_lethal_laser_wins_the_scenario_without_losses() {
    let laser = LaserConfig {
        damage_per_second: 1_000.0,
        ..LaserConfig::default()
    };
    let board = TrackBoard::new(straight_board(laser)).expect("valid board");
    let mut game = Game::new(medium_units(3), board).expect("valid config");

    let mut events = Vec::new();
    game.tick(
        TICK,
        &[
            Command::SelectTower {
                kind: TowerKind::Laser,
            },
            Command::PrimaryTouch {
                ray: Ray::looking_down_at(0.0, -1.0),
                alternate: true,
            },
        ],
        &mut events,
    );
    let tower_tile = game
        .board()
        .tile(GridCell::new(3, 0))
        .expect("tile on board");
    assert_eq!(game.board().tower(tower_tile), Some(TowerKind::Laser));

    let mut ticks = 0;
    while count(&events, Event::Victory) == 0 {
        game.tick(TICK, &[], &mut events);
        ticks += 1;
        assert!(ticks < 400, "scenario never completed");
    }

    assert_eq!(count(&events, Event::EnemyReachedDestination), 0);
    let spawned = events
        .iter()
        .take_while(|event| **event != Event::Victory)
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    assert_eq!(spawned, 3);
    assert_eq!(game.board().tower_count(), 0, "victory clears the board");
}

#[test]
fn units_past_a_pulled_in_destination_walk_back_to_it() {
    let config = BoardConfig {
        columns: 9,
        route: vec![GridCell::new(0, 1), GridCell::new(8, 1)],
        ..straight_board(LaserConfig::default())
    };
    let board = TrackBoard::new(config).expect("valid board");
    let mut game = Game::new(medium_units(1), board).expect("valid config");

    let mut events = Vec::new();
    let mut ticks = 0;
    loop {
        game.tick(TICK, &[], &mut events);
        ticks += 1;
        assert!(ticks < 200, "unit never walked past column 5");
        let column = game
            .enemies()
            .iter()
            .next()
            .and_then(|handle| game.enemy(handle))
            .and_then(|enemy| enemy.tile_from())
            .map(|tile| game.board().cell(tile).column);
        if column.is_some_and(|column| column >= 5) {
            break;
        }
    }

    game.tick(
        TICK,
        &[Command::SecondaryTouch {
            ray: Ray::looking_down_at(-2.0, 0.0),
            alternate: true,
        }],
        &mut events,
    );
    let destination = game.board().tile(GridCell::new(2, 1)).expect("tile on board");
    assert_eq!(game.board().destination(), destination);
    assert_eq!(count(&events, Event::EnemyReachedDestination), 0);

    while count(&events, Event::EnemyReachedDestination) == 0 {
        game.tick(TICK, &[], &mut events);
        ticks += 1;
        assert!(ticks < 400, "unit never reached the moved destination");
    }

    assert_eq!(game.player_health(), 9);
    let handle = game.enemies().iter().next().expect("unit plays its outro");
    let enemy = game.enemy(handle).expect("unit is active");
    assert_eq!(enemy.tile_from(), Some(destination));
}

#[test]
fn secondary_touches_edit_spawns_and_destination() {
    let board = TrackBoard::new(straight_board(LaserConfig::default())).expect("valid board");
    let mut game = Game::new(medium_units(1), board).expect("valid config");
    let second = game.board().tile(GridCell::new(1, 1)).expect("tile on board");
    let middle = game.board().tile(GridCell::new(4, 1)).expect("tile on board");

    let mut events = Vec::new();
    game.tick(
        TICK,
        &[
            Command::SecondaryTouch {
                ray: Ray::looking_down_at(-2.0, 0.0),
                alternate: false,
            },
            Command::SecondaryTouch {
                ray: Ray::looking_down_at(1.0, 0.0),
                alternate: true,
            },
        ],
        &mut events,
    );

    assert_eq!(game.board().spawn_point_count(), 2);
    assert_eq!(game.board().spawn_point(1), Some(second));
    assert_eq!(game.board().destination(), middle);
}

#[test]
fn board_config_reads_from_toml() {
    let config: BoardConfig = toml::from_str(
        r#"
        columns = 5
        rows = 4
        route = [{ column = 0, row = 0 }, { column = 4, row = 0 }, { column = 4, row = 3 }]

        [laser]
        range = 2.0
        "#,
    )
    .expect("valid toml");

    assert_eq!(config.route.len(), 3);
    assert_eq!(config.laser.range, 2.0);
    assert_eq!(config.laser.damage_per_second, 10.0);
    assert!(config.show_grid);
    let board = TrackBoard::new(config).expect("valid board");
    assert_eq!(board.active_route().len(), 8);
}
