//! Engine error taxonomy
//!
//! Only spawn and startup paths return errors. Per-frame stepping, collision
//! and rendering are total.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A sprite name with no atlas entry was requested
    #[error("sprite not found: {name}")]
    SpriteNotFound { name: String },

    /// An audio clip or the sprite sheet failed to load
    #[error("failed to load {asset}: {reason}")]
    AssetLoad { asset: String, reason: String },

    /// A board was requested for a level with no layout
    #[error("level {level} is not defined")]
    LevelNotFound { level: u32 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn sprite_not_found(name: impl Into<String>) -> Self {
        Self::SpriteNotFound { name: name.into() }
    }

    pub fn asset_load(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetLoad {
            asset: asset.into(),
            reason: reason.into(),
        }
    }
}
