//! Visible-state clip machine driving an enemy's lifecycle.

use serde::{Deserialize, Serialize};

/// Animation clips an enemy can play.
///
/// Ordering matters: every clip from [`Clip::Outro`] onward ends the unit's life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Clip {
    /// Walking along the path. Never finishes on its own.
    Move,
    /// Appearing on the spawn tile.
    Intro,
    /// Leaving the board after reaching the destination.
    Outro,
    /// Collapsing after running out of health.
    Dying,
}

/// Durations and rates of the enemy clips, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Playback rate of the move clip at unit speed and scale.
    pub move_animation_speed: f32,
    /// Length of the intro clip.
    pub intro_duration: f32,
    /// Length of the outro clip.
    pub outro_duration: f32,
    /// Length of the dying clip.
    pub dying_duration: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            move_animation_speed: 1.0,
            intro_duration: 1.0,
            outro_duration: 1.0,
            dying_duration: 1.5,
        }
    }
}

/// Clip player advanced explicitly once per tick.
#[derive(Clone, Debug)]
pub struct EnemyAnimator {
    config: AnimationConfig,
    clip: Clip,
    clip_time: f32,
    clip_speed: f32,
    playing: bool,
}

impl EnemyAnimator {
    /// Creates a stopped animator.
    #[must_use]
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            clip: Clip::Intro,
            clip_time: 0.0,
            clip_speed: 1.0,
            playing: false,
        }
    }

    /// Clip durations the animator was configured with.
    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Starts the intro clip from the beginning.
    pub fn play_intro(&mut self) {
        self.play(Clip::Intro, 1.0);
    }

    /// Starts looping the move clip at the provided playback rate.
    pub fn play_move(&mut self, speed: f32) {
        self.play(Clip::Move, speed);
    }

    /// Starts the outro clip.
    pub fn play_outro(&mut self) {
        self.play(Clip::Outro, 1.0);
    }

    /// Starts the dying clip.
    pub fn play_dying(&mut self) {
        self.play(Clip::Dying, 1.0);
    }

    /// Halts playback immediately.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Advances the current clip by `dt` seconds.
    pub fn game_update(&mut self, dt: f32) {
        if self.is_playing() {
            self.clip_time += dt * self.clip_speed();
        }
    }

    /// Clip currently selected.
    #[must_use]
    pub fn current_clip(&self) -> Clip {
        self.clip
    }

    /// Time elapsed inside the current clip.
    #[must_use]
    pub fn clip_time(&self) -> f32 {
        self.clip_time
    }

    /// Playback rate of the current clip.
    #[must_use]
    pub fn clip_speed(&self) -> f32 {
        self.clip_speed
    }

    /// Whether the animator is advancing its clip.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the current clip ran to completion.
    #[must_use]
    pub fn is_done(&self) -> bool {
        match self.clip {
            Clip::Move => false,
            Clip::Intro => self.clip_time >= self.config.intro_duration,
            Clip::Outro => self.clip_time >= self.config.outro_duration,
            Clip::Dying => self.clip_time >= self.config.dying_duration,
        }
    }

    fn play(&mut self, clip: Clip, speed: f32) {
        self.clip = clip;
        self.clip_time = 0.0;
        self.clip_speed = speed;
        self.playing = true;
    }
}
