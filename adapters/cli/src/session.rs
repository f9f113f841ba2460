//! Fixed-step headless session.

use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use tile_defence_board::TrackBoard;
use tile_defence_core::{Command, Event, PathGraph, Ray};
use tile_defence_game::Game;

use crate::settings::{Settings, TowerPlacement};

/// Tallies of the events a session produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) ticks: u64,
    pub(crate) spawned: usize,
    pub(crate) leaked: usize,
    pub(crate) victories: usize,
    pub(crate) defeats: usize,
    pub(crate) new_games: usize,
    pub(crate) final_health: i32,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EnemySpawned { .. } => self.spawned += 1,
            Event::EnemyReachedDestination => self.leaked += 1,
            Event::Victory => self.victories += 1,
            Event::Defeat => self.defeats += 1,
            Event::NewGame => self.new_games += 1,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks:        {}", self.ticks)?;
        writeln!(f, "spawned:      {}", self.spawned)?;
        writeln!(f, "leaked:       {}", self.leaked)?;
        writeln!(f, "victories:    {}", self.victories)?;
        writeln!(f, "defeats:      {}", self.defeats)?;
        writeln!(f, "new games:    {}", self.new_games)?;
        write!(f, "final health: {}", self.final_health)
    }
}

/// Plays `ticks` steps of `step` each on a board built from `settings`.
///
/// Towers are rebuilt at the start and after every reset, since a new game
/// clears the board.
pub(crate) fn run(settings: Settings, step: Duration, ticks: u64) -> Result<Summary> {
    let board = TrackBoard::new(settings.board).context("invalid board settings")?;
    let placements = placement_commands(&board, &settings.towers)?;
    let mut game = Game::new(settings.game, board).context("invalid game settings")?;

    let mut summary = Summary::default();
    let mut events = Vec::new();
    let mut pending: &[Command] = &placements;
    for _ in 0..ticks {
        events.clear();
        game.tick(step, pending, &mut events);
        summary.ticks += 1;

        pending = &[];
        for event in &events {
            summary.record(event);
            if *event == Event::NewGame {
                pending = &placements;
            }
        }
    }

    summary.final_health = game.player_health();
    log::info!(
        "played {} ticks with {} towers: {} victories, {} defeats",
        summary.ticks,
        game.board().tower_count(),
        summary.victories,
        summary.defeats
    );
    Ok(summary)
}

fn placement_commands(board: &TrackBoard, towers: &[TowerPlacement]) -> Result<Vec<Command>> {
    let mut commands = Vec::with_capacity(towers.len() * 2);
    for tower in towers {
        let tile = board.tile(tower.cell()).with_context(|| {
            format!(
                "tower at column {} row {} is outside the board",
                tower.column, tower.row
            )
        })?;
        if board.active_route().contains(&tile) {
            log::warn!(
                "tower at column {} row {} sits on the route and will be ignored",
                tower.column,
                tower.row
            );
        }
        let anchor = board.tile_position(tile);
        commands.push(Command::SelectTower { kind: tower.kind });
        commands.push(Command::PrimaryTouch {
            ray: Ray::looking_down_at(anchor.x, anchor.z),
            alternate: true,
        });
    }
    Ok(commands)
}
