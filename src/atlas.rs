//! Sprite atlas
//!
//! Maps sprite names to regions of one sheet image. Each entry also names the
//! entity variant spawned for it, so which entity a name produces is decided
//! by data, not code.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::surface::{Rect, Surface};

/// Built-in sprite table for `images/sprites.png`
const BUILTIN_SPRITES: &str = include_str!("../assets/sprites.json");
/// Default sheet location relative to the page
pub const BUILTIN_SHEET_PATH: &str = "images/sprites.png";

/// Entity variant spawned for a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteKind {
    Player,
    Alien,
    Missile,
    Shield,
}

/// Atlas entry: source region, animation frames and entity variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteInfo {
    pub sx: f32,
    pub sy: f32,
    pub w: f32,
    pub h: f32,
    /// Animation frames laid out left to right from `sx`
    #[serde(default = "default_frames")]
    pub frames: u32,
    pub kind: SpriteKind,
}

fn default_frames() -> u32 {
    1
}

impl SpriteInfo {
    /// Source rectangle of an animation frame
    pub fn frame_rect(&self, frame: u32) -> Rect {
        Rect::new(self.sx + frame as f32 * self.w, self.sy, self.w, self.h)
    }
}

/// Handle to the loaded sheet image
#[derive(Debug, Clone)]
pub struct SheetImage {
    pub path: String,
    /// Decoded image; absent until the browser finishes loading it
    #[cfg(target_arch = "wasm32")]
    pub element: Option<web_sys::HtmlImageElement>,
}

impl SheetImage {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            #[cfg(target_arch = "wasm32")]
            element: None,
        }
    }
}

/// Name-indexed sprite regions plus the sheet they live on
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    sprites: HashMap<String, SpriteInfo>,
    pub image: SheetImage,
}

impl SpriteSheet {
    pub fn new(image: SheetImage, sprites: HashMap<String, SpriteInfo>) -> Self {
        Self { sprites, image }
    }

    /// Parse a `{ name: { sx, sy, w, h, frames?, kind } }` table
    pub fn from_json(image: SheetImage, json: &str) -> Result<Self, EngineError> {
        let sprites: HashMap<String, SpriteInfo> = serde_json::from_str(json)?;
        Ok(Self::new(image, sprites))
    }

    /// The sheet shipped with the game
    pub fn builtin() -> Result<Self, EngineError> {
        Self::from_json(SheetImage::new(BUILTIN_SHEET_PATH), BUILTIN_SPRITES)
    }

    pub fn get(&self, name: &str) -> Option<&SpriteInfo> {
        self.sprites.get(name)
    }

    /// Like `get`, but unknown names are an error
    pub fn require(&self, name: &str) -> Result<&SpriteInfo, EngineError> {
        self.get(name)
            .ok_or_else(|| EngineError::sprite_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sprites.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Blit a sprite frame at (x, y); unknown names are skipped with a warning
    pub fn draw(&self, surface: &mut dyn Surface, name: &str, x: f32, y: f32, frame: u32) {
        let Some(info) = self.get(name) else {
            log::warn!("Sprite not found: {}", name);
            return;
        };
        let src = info.frame_rect(frame);
        let dst = Rect::new(x, y, info.w, info.h);
        surface.draw_image(&self.image, src, dst);
    }
}
