//! Canvas Invaders - A sprite-sheet Space Invaders clone
//!
//! Core modules:
//! - `sim`: Board simulation (entities, collisions, level layout)
//! - `ui`: Menu and screen states layered above the board
//! - `game`: Frame driver that swaps boards and screens
//! - `atlas`, `audio`, `surface`, `input`: Collaborators the core draws, plays and reads through
//! - `config`: Data-driven game tuning

pub mod atlas;
pub mod audio;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod sim;
pub mod surface;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::GameConfig;
pub use error::EngineError;
pub use game::{Game, GameCallbacks, Transition};

/// Game configuration constants
pub mod consts {
    /// Default drawing surface size (pixels)
    pub const SURFACE_WIDTH: f32 = 500.0;
    pub const SURFACE_HEIGHT: f32 = 500.0;

    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player horizontal speed (pixels/s)
    pub const PLAYER_SPEED: f32 = 100.0;
    /// Steps before the first shot is allowed
    pub const PLAYER_INITIAL_RELOAD: i32 = 20;
    /// Steps between player shots
    pub const PLAYER_RELOAD: i32 = 10;
    /// Player missiles allowed in flight at once
    pub const MAX_PLAYER_MISSILES: u32 = 3;

    /// Missile vertical speed (pixels/s, sign picks direction)
    pub const MISSILE_SPEED: f32 = 100.0;

    /// Chance a frontmost alien fires when it commits a move
    pub const ALIEN_FIRE_CHANCE: f64 = 0.10;
    /// Accumulated drift (pixels) before an alien commits a move
    pub const ALIEN_MOVE_THRESHOLD: f32 = 10.0;
    /// Flock starting speed; also the descent per direction flip
    pub const FLOCK_SPEED: f32 = 10.0;
    /// Extra horizontal pitch between aliens in a level grid
    pub const ALIEN_GRID_GAP: f32 = 10.0;

    /// Hits a shield block absorbs before it is destroyed
    pub const SHIELD_HIT_POINTS: u8 = 1;

    /// Simultaneous sound channels
    pub const AUDIO_CHANNELS: usize = 10;

    /// First level loaded by "Play"
    pub const START_LEVEL: u32 = 1;
}
