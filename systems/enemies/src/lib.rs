#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Hostile units that follow the board's path graph.
//!
//! An [`Enemy`] walks from its spawn tile to the destination one tile
//! segment per step, straight or around circular turn arcs, while its
//! [`EnemyAnimator`] steps through intro, move and terminal clips. Enemies
//! live in an [`EnemyFactory`] pool; the session only keeps their handles.

mod animator;
mod enemy;
mod factory;

pub use animator::{AnimationConfig, Clip, EnemyAnimator};
pub use enemy::{Enemy, TargetPoint, TARGET_POINT_RADIUS};
pub use factory::{EnemyConfig, EnemyFactory, FactoryConfig, FloatRange};
