//! Storage collaborator contracts
//!
//! The engine owns no state between calls. Everything it needs is read from a
//! [`TileStore`] at the start of an operation and written back at the end.

use crate::catalog::ResourceMap;
use crate::item::Item;
use crate::tile::Tile;
use crate::write_set::{CommitResult, WriteSet};
use crate::{GameId, Hex, ItemId, Result};

/// Durable per-game, per-coordinate tile records
pub trait TileStore {
    fn get_tile(&self, game: GameId, coord: Hex) -> Result<Option<Tile>>;

    /// All tiles of a game; empty if no map exists yet
    fn list_tiles(&self, game: GameId) -> Result<Vec<Tile>>;

    /// Insert or overwrite a single tile record
    fn upsert_tile(&self, tile: &Tile) -> Result<()>;

    /// Delete every tile of `game` and insert `tiles` in one exclusive transaction
    fn replace_tiles(&self, game: GameId, tiles: Vec<Tile>) -> Result<()>;

    /// Insert `tiles` only if `game` has none, checked in the same transaction
    ///
    /// Returns `false`, writing nothing, when a map already exists.
    fn insert_tiles_if_empty(&self, game: GameId, tiles: Vec<Tile>) -> Result<bool>;

    /// Apply a unit of work atomically
    ///
    /// Fails with [`crate::Error::StorageConflict`] without applying anything
    /// if a guarded tile no longer has the expected ownership.
    fn commit(&self, write_set: &WriteSet) -> Result<CommitResult>;

    /// Load the tiles adjacent to `coord` that exist on the map
    fn neighbors(&self, game: GameId, coord: Hex) -> Result<Vec<Tile>> {
        let mut tiles = Vec::with_capacity(6);
        for hex in coord.neighbors() {
            if let Some(tile) = self.get_tile(game, hex)? {
                tiles.push(tile);
            }
        }
        Ok(tiles)
    }
}

/// Items and resources credited to a game
pub trait Inventory {
    fn items(&self, game: GameId) -> Result<Vec<Item>>;

    fn set_equipped(&self, game: GameId, item: ItemId, equipped: bool) -> Result<Item>;

    fn resources(&self, game: GameId) -> Result<ResourceMap>;
}
