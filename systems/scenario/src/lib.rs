#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scenario data and the cursor that turns elapsed time into spawn requests.
//!
//! A [`GameScenario`] is a list of [`EnemyWave`]s, each a list of
//! [`EnemySpawnSequence`]s. Progress flows downward: the scenario cursor
//! hands its scaled time to the active wave, the wave to its active
//! sequence, and any time left over once a level completes carries into
//! the next one, so a single large step can finish several sequences.

use serde::{Deserialize, Serialize};
use tile_defence_core::{EnemyKind, FactoryId, SpawnRequest};

/// Spawns `amount` units of one kind, `cooldown` seconds apart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawnSequence {
    /// Factory providing the units.
    pub factory: FactoryId,
    /// Kind of unit to request.
    pub kind: EnemyKind,
    /// Number of units to request.
    #[serde(default = "default_amount")]
    pub amount: u32,
    /// Seconds between consecutive requests.
    #[serde(default = "default_cooldown")]
    pub cooldown: f32,
}

fn default_amount() -> u32 {
    1
}

fn default_cooldown() -> f32 {
    1.0
}

impl EnemySpawnSequence {
    /// Creates a new sequence.
    #[must_use]
    pub const fn new(factory: FactoryId, kind: EnemyKind, amount: u32, cooldown: f32) -> Self {
        Self {
            factory,
            kind,
            amount,
            cooldown,
        }
    }
}

/// Spawn sequences played one after another.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyWave {
    /// Sequences in playback order.
    pub spawn_sequences: Vec<EnemySpawnSequence>,
}

/// Complete list of waves, optionally repeated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameScenario {
    /// Waves in playback order.
    pub waves: Vec<EnemyWave>,
    /// How often the waves are played. Zero repeats them forever.
    pub cycles: u32,
    /// Time scale added after every completed cycle.
    pub cycle_speed_up: f32,
}

impl Default for GameScenario {
    fn default() -> Self {
        let factory = FactoryId::new(0);
        let wave = |sequences: &[(EnemyKind, u32, f32)]| EnemyWave {
            spawn_sequences: sequences
                .iter()
                .map(|&(kind, amount, cooldown)| {
                    EnemySpawnSequence::new(factory, kind, amount, cooldown)
                })
                .collect(),
        };
        Self {
            waves: vec![
                wave(&[(EnemyKind::Medium, 10, 1.0)]),
                wave(&[(EnemyKind::Small, 12, 0.5), (EnemyKind::Medium, 6, 1.0)]),
                wave(&[(EnemyKind::Large, 3, 3.0), (EnemyKind::Small, 20, 0.25)]),
            ],
            cycles: 1,
            cycle_speed_up: 0.5,
        }
    }
}

impl GameScenario {
    /// Starts a fresh cursor at the first wave.
    #[must_use]
    pub fn begin(&self) -> ScenarioState {
        ScenarioState {
            cycle: 0,
            index: 0,
            time_scale: 1.0,
            wave: self
                .waves
                .first()
                .map(WaveState::begin)
                .unwrap_or_default(),
            finished: self.waves.is_empty(),
        }
    }
}

/// Position of a running scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioState {
    cycle: u32,
    index: usize,
    time_scale: f32,
    wave: WaveState,
    finished: bool,
}

impl ScenarioState {
    /// Advances the cursor by `dt` seconds, pushing every spawn that came due into `out`.
    ///
    /// Returns `false` once every cycle completed.
    pub fn progress(
        &mut self,
        scenario: &GameScenario,
        dt: f32,
        out: &mut Vec<SpawnRequest>,
    ) -> bool {
        if self.finished {
            return false;
        }
        let Some(wave) = scenario.waves.get(self.index) else {
            self.finished = true;
            return false;
        };

        let mut remaining = self.wave.progress(wave, self.time_scale * dt, out);
        while remaining >= 0.0 {
            self.index += 1;
            if self.index >= scenario.waves.len() {
                self.cycle += 1;
                if scenario.cycles > 0 && self.cycle >= scenario.cycles {
                    log::debug!("scenario completed after {} cycles", self.cycle);
                    self.finished = true;
                    return false;
                }
                self.index = 0;
                self.time_scale += scenario.cycle_speed_up;
                log::debug!(
                    "scenario cycle {} begins at time scale {:.2}",
                    self.cycle,
                    self.time_scale
                );
            }
            let Some(wave) = scenario.waves.get(self.index) else {
                self.finished = true;
                return false;
            };
            self.wave = WaveState::begin(wave);
            remaining = self.wave.progress(wave, remaining, out);
        }
        true
    }

    /// Whether the most recent progress found no waves left.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of completed cycles.
    #[must_use]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Index of the active wave.
    #[must_use]
    pub fn wave_index(&self) -> usize {
        self.index
    }

    /// Scale applied to elapsed time before it reaches the waves.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct WaveState {
    index: usize,
    sequence: SequenceState,
}

impl WaveState {
    fn begin(wave: &EnemyWave) -> Self {
        Self {
            index: 0,
            sequence: wave
                .spawn_sequences
                .first()
                .map(SequenceState::begin)
                .unwrap_or_default(),
        }
    }

    /// Returns the time left over once the wave completes, or a negative value while it runs.
    fn progress(&mut self, wave: &EnemyWave, dt: f32, out: &mut Vec<SpawnRequest>) -> f32 {
        let Some(sequence) = wave.spawn_sequences.get(self.index) else {
            return dt;
        };
        let mut remaining = self.sequence.progress(sequence, dt, out);
        while remaining >= 0.0 {
            self.index += 1;
            let Some(sequence) = wave.spawn_sequences.get(self.index) else {
                return remaining;
            };
            self.sequence = SequenceState::begin(sequence);
            remaining = self.sequence.progress(sequence, remaining, out);
        }
        -1.0
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct SequenceState {
    count: u32,
    cooldown: f32,
}

impl SequenceState {
    fn begin(sequence: &EnemySpawnSequence) -> Self {
        Self {
            count: 0,
            cooldown: sequence.cooldown,
        }
    }

    fn progress(
        &mut self,
        sequence: &EnemySpawnSequence,
        dt: f32,
        out: &mut Vec<SpawnRequest>,
    ) -> f32 {
        self.cooldown += dt;
        while self.cooldown >= sequence.cooldown {
            self.cooldown -= sequence.cooldown;
            if self.count >= sequence.amount {
                return self.cooldown;
            }
            self.count += 1;
            out.push(SpawnRequest::new(sequence.factory, sequence.kind));
        }
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_spawns_immediately_then_every_cooldown() {
        let sequence = EnemySpawnSequence::new(FactoryId::new(0), EnemyKind::Small, 3, 1.0);
        let mut state = SequenceState::begin(&sequence);
        let mut out = Vec::new();

        assert!(state.progress(&sequence, 0.0, &mut out) < 0.0);
        assert_eq!(out.len(), 1);
        assert!(state.progress(&sequence, 2.0, &mut out) < 0.0);
        assert_eq!(out.len(), 3);

        let leftover = state.progress(&sequence, 1.5, &mut out);
        assert_eq!(out.len(), 3);
        assert!((leftover - 0.5).abs() < 1e-6, "leftover {leftover}");
    }

    #[test]
    fn empty_wave_completes_without_consuming_time() {
        let mut state = WaveState::begin(&EnemyWave::default());
        let mut out = Vec::new();
        assert_eq!(state.progress(&EnemyWave::default(), 0.75, &mut out), 0.75);
        assert!(out.is_empty());
    }
}
