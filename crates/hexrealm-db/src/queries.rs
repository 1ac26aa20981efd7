//! Per-game scans over the secondary `game_id` keys.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use hexrealm_core::{GameId, Item, Tile};

impl Store {
    /// All tiles of a game.
    pub fn tiles_for_game(&self, game: GameId) -> Result<Vec<Tile>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredTile>(StoredTileKey::game_id)?;
        let iter = scan.start_with(game.raw())?;
        let tiles: std::result::Result<Vec<StoredTile>, _> = iter.collect();
        let tiles = tiles.map_err(|e| Error::Database(e.to_string()))?;
        tiles.iter().map(StoredTile::to_tile).collect()
    }

    /// Count tiles of a game without decoding them.
    pub fn count_tiles(&self, game: GameId) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredTile>(StoredTileKey::game_id)?;
        let iter = scan.start_with(game.raw())?;
        Ok(iter.count())
    }

    /// All inventory items of a game, oldest first.
    pub fn items_for_game(&self, game: GameId) -> Result<Vec<Item>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredItem>(StoredItemKey::game_id)?;
        let iter = scan.start_with(game.raw())?;
        let items: std::result::Result<Vec<StoredItem>, _> = iter.collect();
        let items = items.map_err(|e| Error::Database(e.to_string()))?;
        let mut items = items
            .iter()
            .map(StoredItem::to_item)
            .collect::<Result<Vec<_>>>()?;
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    /// Ledger rows of a game.
    pub fn resources_for_game(&self, game: GameId) -> Result<Vec<StoredResource>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().secondary::<StoredResource>(StoredResourceKey::game_id)?;
        let iter = scan.start_with(game.raw())?;
        let rows: std::result::Result<Vec<StoredResource>, _> = iter.collect();
        rows.map_err(|e| Error::Database(e.to_string()))
    }
}
