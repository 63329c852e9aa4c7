//! Game configuration
//!
//! Tuning values for the board simulation and frame driver. The web build
//! picks up an override stored in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EngineError;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Surface ===
    /// Drawing surface width (pixels)
    pub width: f32,
    /// Drawing surface height (pixels)
    pub height: f32,

    // === Frame driver ===
    /// Upper bound on a single step's dt (seconds)
    pub max_frame_dt: f32,
    /// Level index loaded when a game starts
    pub start_level: u32,

    // === Player ===
    pub player_speed: f32,
    pub player_initial_reload: i32,
    pub player_reload: i32,
    pub max_player_missiles: u32,

    // === Missiles / aliens ===
    pub missile_speed: f32,
    /// Probability (0.0 - 1.0) that a frontmost alien fires on a committed move
    pub alien_fire_chance: f64,
    pub alien_move_threshold: f32,
    pub flock_speed: f32,

    // === Shields ===
    pub shield_hit_points: u8,

    // === Audio ===
    pub audio_channels: usize,

    /// Seed for alien fire decisions
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: SURFACE_WIDTH,
            height: SURFACE_HEIGHT,

            max_frame_dt: MAX_FRAME_DT,
            start_level: START_LEVEL,

            player_speed: PLAYER_SPEED,
            player_initial_reload: PLAYER_INITIAL_RELOAD,
            player_reload: PLAYER_RELOAD,
            max_player_missiles: MAX_PLAYER_MISSILES,

            missile_speed: MISSILE_SPEED,
            alien_fire_chance: ALIEN_FIRE_CHANCE,
            alien_move_threshold: ALIEN_MOVE_THRESHOLD,
            flock_speed: FLOCK_SPEED,

            shield_hit_points: SHIELD_HIT_POINTS,

            audio_channels: AUDIO_CHANNELS,

            seed: 0x5eed,
        }
    }
}

impl GameConfig {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "canvas_invaders_config";

    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "surface must have a positive size, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.max_frame_dt > 0.0) {
            return Err(EngineError::InvalidConfig(
                "max_frame_dt must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alien_fire_chance) {
            return Err(EngineError::InvalidConfig(format!(
                "alien_fire_chance must be within 0..=1, got {}",
                self.alien_fire_chance
            )));
        }
        if self.shield_hit_points == 0 {
            return Err(EngineError::InvalidConfig(
                "shield_hit_points must be at least 1".to_string(),
            ));
        }
        if self.audio_channels == 0 {
            return Err(EngineError::InvalidConfig(
                "audio_channels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Native builds always run on defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
