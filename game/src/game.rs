//! The session loop.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tile_defence_core::{
    Command, EnemyHandle, EnemyKind, Event, FactoryId, SpawnRequest, TileId, TowerKind,
};
use tile_defence_system_enemies::{Enemy, EnemyFactory};
use tile_defence_system_scenario::ScenarioState;
use tile_defence_system_war::{Detonation, Explosion, Shell, WarFactory, WarHandle};

use crate::{
    battlefield::Battlefield,
    board::Board,
    collection::GameBehaviorCollection,
    config::{ConfigError, GameConfig, MAX_PLAY_SPEED, MIN_PLAY_SPEED},
};

/// Time scale of a paused session.
pub const PAUSED_TIME_SCALE: f32 = 0.0;

const FACTORY_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Owns every live entity of a session and advances them once per tick.
#[derive(Debug)]
pub struct Game<B> {
    config: GameConfig,
    board: B,
    enemy_factories: Vec<EnemyFactory>,
    war_factory: WarFactory,
    active_scenario: ScenarioState,
    enemies: GameBehaviorCollection<EnemyHandle>,
    non_enemies: GameBehaviorCollection<WarHandle>,
    player_health: i32,
    selected_tower: TowerKind,
    time_scale: f32,
    play_speed: f32,
    rng: ChaCha8Rng,
    spawn_requests: Vec<SpawnRequest>,
    enemy_events: Vec<Event>,
    detonations: Vec<Detonation>,
}

impl<B: Board> Game<B> {
    /// Validates `config` and starts a running session on `board`.
    pub fn new(config: GameConfig, board: B) -> Result<Self, ConfigError> {
        config.validate()?;

        let enemy_factories = config
            .factories
            .iter()
            .enumerate()
            .map(|(index, factory)| {
                let id = FactoryId::new(index as u32);
                let seed = config
                    .seed
                    .wrapping_add((index as u64 + 1).wrapping_mul(FACTORY_SEED_STRIDE));
                EnemyFactory::new(id, *factory, seed)
            })
            .collect();

        Ok(Self {
            board,
            enemy_factories,
            war_factory: WarFactory::new(config.war),
            active_scenario: config.scenario.begin(),
            enemies: GameBehaviorCollection::new(),
            non_enemies: GameBehaviorCollection::new(),
            player_health: config.session.starting_player_health,
            selected_tower: TowerKind::default(),
            time_scale: config.session.play_speed,
            play_speed: config.session.play_speed,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            spawn_requests: Vec::new(),
            enemy_events: Vec::new(),
            detonations: Vec::new(),
            config,
        })
    }

    /// Advances the session by `dt` seconds of real time after applying `commands`.
    ///
    /// Scenario progress happens before enemies move, enemies move before
    /// shells and explosions, and the board acts last on the final positions.
    pub fn tick(&mut self, dt: Duration, commands: &[Command], out: &mut Vec<Event>) {
        let mut restart = false;
        for command in commands {
            restart |= self.apply_command(*command);
        }
        if self.time_scale > PAUSED_TIME_SCALE {
            self.time_scale = self.play_speed;
        }

        if self.player_health <= 0 && self.config.session.starting_player_health > 0 {
            log::info!("Defeat!");
            out.push(Event::Defeat);
            self.begin_new_game(out);
        }
        if restart {
            self.begin_new_game(out);
        }

        let dt = dt.as_secs_f32() * self.time_scale;
        if self.active_scenario.is_finished() && self.enemies.is_empty() {
            log::info!("Victory!");
            out.push(Event::Victory);
            self.begin_new_game(out);
            self.progress_scenario(dt, out);
        }
        self.progress_scenario(dt, out);

        self.update_enemies(dt, out);
        self.update_non_enemies(dt);

        let Self {
            board,
            enemy_factories,
            enemies,
            war_factory,
            non_enemies,
            ..
        } = self;
        let mut field = Battlefield {
            factories: enemy_factories,
            enemies,
            war_factory,
            non_enemies,
        };
        board.game_update(dt, &mut field);
    }

    /// Returns `true` when the command asks for a new game.
    fn apply_command(&mut self, command: Command) -> bool {
        match command {
            Command::TogglePause => {
                self.time_scale = if self.time_scale > PAUSED_TIME_SCALE {
                    PAUSED_TIME_SCALE
                } else {
                    self.play_speed
                };
            }
            Command::Pause => self.time_scale = PAUSED_TIME_SCALE,
            Command::Resume => self.time_scale = self.play_speed,
            Command::SetPlaySpeed { speed } => {
                if speed.is_finite() {
                    self.play_speed = speed.clamp(MIN_PLAY_SPEED, MAX_PLAY_SPEED);
                }
            }
            Command::ToggleGrid => {
                let show = !self.board.show_grid();
                self.board.set_show_grid(show);
            }
            Command::TogglePaths => {
                let show = !self.board.show_paths();
                self.board.set_show_paths(show);
            }
            Command::SelectTower { kind } => self.selected_tower = kind,
            Command::PrimaryTouch { ray, alternate } => {
                if let Some(tile) = self.board.tile_at(&ray) {
                    if alternate {
                        self.board.toggle_tower(tile, self.selected_tower);
                    } else {
                        self.board.toggle_wall(tile);
                    }
                }
            }
            Command::SecondaryTouch { ray, alternate } => {
                if let Some(tile) = self.board.tile_at(&ray) {
                    if alternate {
                        self.board.toggle_destination(tile);
                    } else {
                        self.board.toggle_spawn_point(tile);
                    }
                }
            }
            Command::BeginNewGame => return true,
        }
        false
    }

    fn progress_scenario(&mut self, dt: f32, out: &mut Vec<Event>) {
        let mut requests = std::mem::take(&mut self.spawn_requests);
        let _ = self
            .active_scenario
            .progress(&self.config.scenario, dt, &mut requests);
        for request in requests.drain(..) {
            if let Some((enemy, tile)) = self.spawn_on_random_point(request.factory, request.kind)
            {
                out.push(Event::EnemySpawned { enemy, tile });
            }
        }
        self.spawn_requests = requests;
    }

    fn update_enemies(&mut self, dt: f32, out: &mut Vec<Event>) {
        let Self {
            board,
            enemy_factories,
            enemies,
            enemy_events,
            ..
        } = self;
        enemies.game_update(|handle| match enemy_factories.get_mut(handle.factory().index()) {
            Some(factory) => factory.game_update(handle, dt, &*board, enemy_events),
            None => false,
        });

        let mut events = std::mem::take(&mut self.enemy_events);
        for event in events.drain(..) {
            if event == Event::EnemyReachedDestination {
                self.enemy_reached_destination();
            }
            out.push(event);
        }
        self.enemy_events = events;
    }

    fn update_non_enemies(&mut self, dt: f32) {
        let Self {
            enemy_factories,
            enemies,
            war_factory,
            non_enemies,
            detonations,
            ..
        } = self;
        non_enemies.game_update(|handle| war_factory.game_update(handle, dt, detonations));

        let mut field = Battlefield {
            factories: enemy_factories,
            enemies,
            war_factory,
            non_enemies,
        };
        for detonation in detonations.drain(..) {
            field.detonate(detonation);
        }
    }

    /// Clears every entity and player-placed structure and restarts the scenario.
    ///
    /// Calling it repeatedly leaves the same state as calling it once.
    pub fn begin_new_game(&mut self, out: &mut Vec<Event>) {
        let Self {
            enemy_factories,
            enemies,
            war_factory,
            non_enemies,
            ..
        } = self;
        enemies.clear(|handle| {
            if let Some(factory) = enemy_factories.get_mut(handle.factory().index()) {
                factory.recycle(handle);
            }
        });
        non_enemies.clear(|handle| war_factory.reclaim(handle));

        self.board.clear();
        self.active_scenario = self.config.scenario.begin();
        self.player_health = self.config.session.starting_player_health;
        self.spawn_requests.clear();
        self.enemy_events.clear();
        self.detonations.clear();

        log::info!("new game with {} player health", self.player_health);
        out.push(Event::NewGame);
    }

    /// Places a unit from `factory` on a random spawn point and starts updating it.
    ///
    /// Returns `None` when the board has no spawn point or the factory is unknown.
    pub fn spawn_enemy(&mut self, factory: FactoryId, kind: EnemyKind) -> Option<EnemyHandle> {
        self.spawn_on_random_point(factory, kind).map(|(enemy, _)| enemy)
    }

    fn spawn_on_random_point(
        &mut self,
        factory: FactoryId,
        kind: EnemyKind,
    ) -> Option<(EnemyHandle, TileId)> {
        let count = self.board.spawn_point_count();
        if count == 0 {
            log::warn!("dropping {kind:?} spawn: board has no spawn points");
            return None;
        }
        let Some(enemy_factory) = self.enemy_factories.get_mut(factory.index()) else {
            log::warn!("dropping {kind:?} spawn: unknown factory {}", factory.get());
            return None;
        };
        let index = self.rng.gen_range(0..count);
        let Some(tile) = self.board.spawn_point(index) else {
            log::warn!("dropping {kind:?} spawn: spawn point {index} is missing");
            return None;
        };

        let handle = enemy_factory.get(kind);
        if let Some(enemy) = enemy_factory.enemy_mut(handle) {
            enemy.spawn_on(tile, &self.board);
        }
        self.enemies.add(handle);
        log::debug!("spawned {kind:?} on tile {}", tile.get());
        Some((handle, tile))
    }

    /// Hands out a pooled shell, already registered for updates, for the caller to aim.
    pub fn spawn_shell(&mut self) -> &mut Shell {
        let (handle, shell) = self.war_factory.shell();
        self.non_enemies.add(handle);
        shell
    }

    /// Hands out a pooled explosion, already registered for updates, for the caller to place.
    pub fn spawn_explosion(&mut self) -> &mut Explosion {
        let (handle, explosion) = self.war_factory.explosion();
        self.non_enemies.add(handle);
        explosion
    }

    /// Costs the player one health.
    pub fn enemy_reached_destination(&mut self) {
        self.player_health -= 1;
    }

    /// Remaining player health.
    #[must_use]
    pub fn player_health(&self) -> i32 {
        self.player_health
    }

    /// Factor applied to real time before it reaches the entities.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Time scale restored when the session resumes.
    #[must_use]
    pub fn play_speed(&self) -> f32 {
        self.play_speed
    }

    /// Whether entity time is frozen.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.time_scale <= PAUSED_TIME_SCALE
    }

    /// Tower kind built by alternate primary touches.
    #[must_use]
    pub fn selected_tower(&self) -> TowerKind {
        self.selected_tower
    }

    /// Handles of the active hostile units.
    #[must_use]
    pub fn enemies(&self) -> &GameBehaviorCollection<EnemyHandle> {
        &self.enemies
    }

    /// Handles of the active shells and explosions.
    #[must_use]
    pub fn non_enemies(&self) -> &GameBehaviorCollection<WarHandle> {
        &self.non_enemies
    }

    /// Resolves an active hostile unit.
    #[must_use]
    pub fn enemy(&self, handle: EnemyHandle) -> Option<&Enemy> {
        self.enemy_factories
            .get(handle.factory().index())
            .and_then(|factory| factory.enemy(handle))
    }

    /// Factory registered under `id`.
    #[must_use]
    pub fn enemy_factory(&self, id: FactoryId) -> Option<&EnemyFactory> {
        self.enemy_factories.get(id.index())
    }

    /// Pool of shells and explosions.
    #[must_use]
    pub fn war_factory(&self) -> &WarFactory {
        &self.war_factory
    }

    /// Cursor of the running scenario.
    #[must_use]
    pub fn scenario_state(&self) -> &ScenarioState {
        &self.active_scenario
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Board the session plays on.
    #[must_use]
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Board the session plays on, for direct edits between ticks.
    #[must_use]
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }
}
