//! Level layouts
//!
//! A level is a grid of small integers: 0 leaves the cell empty, any other
//! value `v` places an `alien{v}` sprite at that row/column.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::atlas::SpriteSheet;
use crate::error::EngineError;

/// Built-in levels
const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

/// One level's alien grid, row-major
pub type LevelGrid = Vec<Vec<u8>>;

/// Sprite name for an alien grid cell value
pub fn alien_sprite_name(cell: u8) -> String {
    format!("alien{cell}")
}

/// Level index -> layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelSet {
    levels: BTreeMap<u32, LevelGrid>,
}

impl LevelSet {
    pub fn new(levels: BTreeMap<u32, LevelGrid>) -> Self {
        Self { levels }
    }

    /// Parse `{ "1": [[...], ...], "2": ... }`
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn builtin() -> Result<Self, EngineError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn grid(&self, level: u32) -> Option<&LevelGrid> {
        self.levels.get(&level)
    }

    pub fn contains(&self, level: u32) -> bool {
        self.levels.contains_key(&level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Check that every non-zero cell names a sprite the atlas has
    pub fn validate(&self, sheet: &SpriteSheet) -> Result<(), EngineError> {
        for grid in self.levels.values() {
            for &cell in grid.iter().flatten() {
                if cell != 0 {
                    sheet.require(&alien_sprite_name(cell))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_parse_and_validate() {
        let levels = LevelSet::builtin().unwrap();
        assert!(levels.contains(1));
        assert!(!levels.contains(0));
        levels.validate(&SpriteSheet::builtin().unwrap()).unwrap();
    }

    #[test]
    fn test_validate_rejects_unknown_alien_type() {
        let levels = LevelSet::from_json(r#"{ "1": [[0, 7]] }"#).unwrap();
        let err = levels.validate(&SpriteSheet::builtin().unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::SpriteNotFound { ref name } if name == "alien7"));
    }
}
