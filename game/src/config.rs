//! Session configuration and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tile_defence_core::EnemyKind;
use tile_defence_system_enemies::{EnemyConfig, FactoryConfig, FloatRange};
use tile_defence_system_scenario::GameScenario;
use tile_defence_system_war::WarConfig;

/// Slowest play speed a running session may use.
pub const MIN_PLAY_SPEED: f32 = 1.0;
/// Fastest play speed a running session may use.
pub const MAX_PLAY_SPEED: f32 = 10.0;

/// Player-facing tunables of a session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Health restored on every new game. Zero disables defeat.
    pub starting_player_health: i32,
    /// Time scale used while the session is running.
    pub play_speed: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_player_health: 10,
            play_speed: 1.0,
        }
    }
}

/// Everything a [`Game`](crate::Game) needs besides its board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player-facing tunables.
    pub session: SessionConfig,
    /// Enemy factories, addressed by their position in this list.
    pub factories: Vec<FactoryConfig>,
    /// Shell and explosion tunables.
    pub war: WarConfig,
    /// Waves played by every new game.
    pub scenario: GameScenario,
    /// Seed of every random choice the session makes.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            factories: vec![FactoryConfig::default()],
            war: WarConfig::default(),
            scenario: GameScenario::default(),
            seed: 0x7d1e_defe,
        }
    }
}

/// Reasons a [`GameConfig`] is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Starting health below zero.
    #[error("starting player health {0} must not be negative")]
    NegativeStartingHealth(i32),
    /// Play speed outside the supported range.
    #[error("play speed {0} must be between 1 and 10")]
    PlaySpeedOutOfRange(f32),
    /// Scenario with no sequences to play.
    #[error("scenario must contain at least one spawn sequence")]
    EmptyScenario,
    /// Sequence referencing a factory that does not exist.
    #[error("wave {wave} sequence {sequence} references unknown factory {factory}")]
    UnknownFactory {
        /// Index of the wave.
        wave: usize,
        /// Index of the sequence inside the wave.
        sequence: usize,
        /// Referenced factory.
        factory: u32,
    },
    /// Sequence with a negative cooldown.
    #[error("wave {wave} sequence {sequence} has negative cooldown {cooldown}")]
    NegativeCooldown {
        /// Index of the wave.
        wave: usize,
        /// Index of the sequence inside the wave.
        sequence: usize,
        /// Offending cooldown.
        cooldown: f32,
    },
    /// Endless scenario that never lets time pass.
    #[error("endless scenarios need at least one spawning sequence with a positive cooldown")]
    EndlessScenarioWithoutDuration,
    /// Spawn-time range that is unordered or outside its allowed bounds.
    #[error("factory {factory} {kind:?} {field} range {min}..={max} is invalid")]
    InvalidRange {
        /// Index of the factory.
        factory: usize,
        /// Kind whose ranges are affected.
        kind: EnemyKind,
        /// Name of the sampled value.
        field: &'static str,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
}

impl GameConfig {
    /// Checks the configuration for values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        if session.starting_player_health < 0 {
            return Err(ConfigError::NegativeStartingHealth(
                session.starting_player_health,
            ));
        }
        if !(MIN_PLAY_SPEED..=MAX_PLAY_SPEED).contains(&session.play_speed) {
            return Err(ConfigError::PlaySpeedOutOfRange(session.play_speed));
        }

        for (index, factory) in self.factories.iter().enumerate() {
            for kind in [EnemyKind::Small, EnemyKind::Medium, EnemyKind::Large] {
                validate_ranges(index, kind, factory.for_kind(kind))?;
            }
        }

        self.validate_scenario()
    }

    fn validate_scenario(&self) -> Result<(), ConfigError> {
        let scenario = &self.scenario;
        let mut sequences = 0;
        let mut consumed_time = 0.0;
        for (wave_index, wave) in scenario.waves.iter().enumerate() {
            for (sequence_index, sequence) in wave.spawn_sequences.iter().enumerate() {
                sequences += 1;
                if sequence.factory.index() >= self.factories.len() {
                    return Err(ConfigError::UnknownFactory {
                        wave: wave_index,
                        sequence: sequence_index,
                        factory: sequence.factory.get(),
                    });
                }
                if sequence.cooldown < 0.0 {
                    return Err(ConfigError::NegativeCooldown {
                        wave: wave_index,
                        sequence: sequence_index,
                        cooldown: sequence.cooldown,
                    });
                }
                if sequence.amount > 0 {
                    consumed_time += sequence.cooldown;
                }
            }
        }

        if sequences == 0 {
            return Err(ConfigError::EmptyScenario);
        }
        if scenario.cycles == 0 && consumed_time <= 0.0 {
            return Err(ConfigError::EndlessScenarioWithoutDuration);
        }
        Ok(())
    }
}

fn validate_ranges(factory: usize, kind: EnemyKind, config: &EnemyConfig) -> Result<(), ConfigError> {
    let check = |field: &'static str, range: FloatRange, valid: fn(f32) -> bool| {
        if range.min <= range.max && valid(range.min) && valid(range.max) {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                factory,
                kind,
                field,
                min: range.min,
                max: range.max,
            })
        }
    };
    check("scale", config.scale, |value| value > 0.0)?;
    check("speed", config.speed, |value| value > 0.0)?;
    check("health", config.health, |value| value > 0.0)?;
    check("path_offset", config.path_offset, |value| {
        value > -0.5 && value < 0.5
    })
}
