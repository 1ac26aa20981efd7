//! Tile models for database storage.

use crate::error::Result;
use hexrealm_core::{DefId, GameId, Hex, Ownership, Tile};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Primary key of a tile: `"<game>:<q>:<r>"`.
pub fn tile_key(game: GameId, coord: Hex) -> String {
    format!("{}:{}:{}", game.raw(), coord.q, coord.r)
}

/// Stored map tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredTile {
    #[primary_key]
    pub key: String,
    /// Owning game, for per-game scans.
    #[secondary_key]
    pub game_id: u64,
    pub q: i32,
    pub r: i32,
    pub terrain: String,
    /// Serialized ownership.
    pub ownership: Vec<u8>,
    pub explored: bool,
}

impl StoredTile {
    pub fn from_tile(tile: &Tile) -> Result<Self> {
        Ok(Self {
            key: tile_key(tile.game, tile.coord),
            game_id: tile.game.raw(),
            q: tile.coord.q,
            r: tile.coord.r,
            terrain: tile.terrain.as_str().to_string(),
            ownership: bincode::serialize(&tile.ownership)?,
            explored: tile.explored,
        })
    }

    pub fn ownership(&self) -> Result<Ownership> {
        Ok(bincode::deserialize(&self.ownership)?)
    }

    pub fn to_tile(&self) -> Result<Tile> {
        Ok(Tile::new(
            GameId::new(self.game_id),
            Hex::new(self.q, self.r),
            DefId::new(self.terrain.clone()),
            self.ownership()?,
            self.explored,
        ))
    }
}
