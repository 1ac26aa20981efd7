//! File layouts for RON content
//!
//! Each content file is a single struct whose fields name the tables it
//! contributes. Every field defaults to empty, so one file may carry any
//! subset of the tables.

use hexrealm_core::{EnemyBand, EnemyDef, ItemTemplate, RarityBand, RarityTier, TerrainDef};
use serde::Deserialize;

/// Top-level layout of a content file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentFile {
    pub terrain: Vec<TerrainDef>,
    pub enemies: Vec<EnemyDef>,
    pub enemy_bands: Vec<EnemyBand>,
    pub items: Vec<ItemTemplate>,
    pub rarities: Vec<RarityTier>,
    pub rarity_bands: Vec<RarityBand>,
}

impl ContentFile {
    pub fn is_empty(&self) -> bool {
        self.terrain.is_empty()
            && self.enemies.is_empty()
            && self.enemy_bands.is_empty()
            && self.items.is_empty()
            && self.rarities.is_empty()
            && self.rarity_bands.is_empty()
    }
}
