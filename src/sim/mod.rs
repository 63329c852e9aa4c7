//! Board simulation
//!
//! All gameplay logic lives here:
//! - Entities stepped and drawn in insertion order
//! - Seeded RNG only
//! - No platform dependencies; drawing and sound go through `Surface` and `AudioPort`

pub mod board;
pub mod collision;
pub mod entity;
pub mod level;

pub use board::{Board, GameAssets, LevelOutcome};
pub use collision::Aabb;
pub use entity::{
    Alien, AlienFlock, Entity, EntityId, EntityKind, FLOCK_NAME, Missile, Player, Shield,
    SpawnOptions,
};
pub use level::{LevelGrid, LevelSet, alien_sprite_name};
