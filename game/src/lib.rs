#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session loop of the Tile Defence simulation.
//!
//! [`Game`] owns the enemy factories, the war factory, the scenario cursor
//! and two [`GameBehaviorCollection`]s of live entities. Each call to
//! [`Game::tick`] routes the queued commands to the [`Board`], checks for
//! defeat and victory, progresses the scenario, advances every entity once
//! and finally lets the board's towers act through a [`TargetField`].

mod battlefield;
mod board;
mod collection;
mod config;
mod game;

pub use board::{Board, TargetField};
pub use collection::GameBehaviorCollection;
pub use config::{ConfigError, GameConfig, SessionConfig, MAX_PLAY_SPEED, MIN_PLAY_SPEED};
pub use game::{Game, PAUSED_TIME_SCALE};
