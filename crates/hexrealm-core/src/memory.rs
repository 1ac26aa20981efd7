//! In-process store backed by per-game locks
//!
//! Each game's tiles, hero, items and resources sit behind one mutex, so a
//! commit or a regeneration has exclusive access to the whole game for its
//! duration while different games proceed in parallel.

use crate::catalog::ResourceMap;
use crate::item::Item;
use crate::progression::{GameProgression, HeroProgress, LevelUp};
use crate::store::{Inventory, TileStore};
use crate::tile::Tile;
use crate::write_set::{CommitResult, PendingWrite, WriteSet};
use crate::{Error, GameId, Hex, ItemId, Result};
use chrono::Utc;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

#[derive(Debug)]
struct GameRecord {
    hero: HeroProgress,
    tiles: IndexMap<Hex, Tile>,
    items: Vec<Item>,
    resources: ResourceMap,
}

/// Thread-safe in-memory implementation of every storage collaborator
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<GameId, Arc<Mutex<GameRecord>>>>,
    next_item: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a game with a fresh hero; replaces nothing if it already exists
    pub fn create_game(&self, game: GameId, hero_name: impl Into<String>) -> Result<()> {
        let mut games = self
            .games
            .write()
            .map_err(|_| Error::Storage("game table lock poisoned".to_string()))?;
        games.entry(game).or_insert_with(|| {
            Arc::new(Mutex::new(GameRecord {
                hero: HeroProgress::new(hero_name),
                tiles: IndexMap::new(),
                items: Vec::new(),
                resources: ResourceMap::new(),
            }))
        });
        Ok(())
    }

    fn record(&self, game: GameId) -> Result<Arc<Mutex<GameRecord>>> {
        let games = self
            .games
            .read()
            .map_err(|_| Error::Storage("game table lock poisoned".to_string()))?;
        games.get(&game).cloned().ok_or(Error::NotFound(game))
    }

    fn with_game<T>(
        &self,
        game: GameId,
        f: impl FnOnce(&mut GameRecord) -> Result<T>,
    ) -> Result<T> {
        let record = self.record(game)?;
        let mut guard: MutexGuard<'_, GameRecord> = record
            .lock()
            .map_err(|_| Error::Storage(format!("{} lock poisoned", game)))?;
        f(&mut guard)
    }
}

/// Key a tile set by coordinate, rejecting tiles of another game
fn tile_table(game: GameId, tiles: Vec<Tile>) -> Result<IndexMap<Hex, Tile>> {
    let mut table = IndexMap::with_capacity(tiles.len());
    for tile in tiles {
        if tile.game != game {
            return Err(Error::Storage(format!(
                "tile {} belongs to {}, not {}",
                tile.coord, tile.game, game
            )));
        }
        table.insert(tile.coord, tile);
    }
    Ok(table)
}

impl TileStore for MemoryStore {
    fn get_tile(&self, game: GameId, coord: Hex) -> Result<Option<Tile>> {
        self.with_game(game, |rec| Ok(rec.tiles.get(&coord).cloned()))
    }

    fn list_tiles(&self, game: GameId) -> Result<Vec<Tile>> {
        self.with_game(game, |rec| Ok(rec.tiles.values().cloned().collect()))
    }

    fn upsert_tile(&self, tile: &Tile) -> Result<()> {
        self.with_game(tile.game, |rec| {
            rec.tiles.insert(tile.coord, tile.clone());
            Ok(())
        })
    }

    fn replace_tiles(&self, game: GameId, tiles: Vec<Tile>) -> Result<()> {
        let fresh = tile_table(game, tiles)?;
        self.with_game(game, |rec| {
            let removed = rec.tiles.len();
            rec.tiles = fresh;
            tracing::debug!(%game, removed, inserted = rec.tiles.len(), "replaced tile set");
            Ok(())
        })
    }

    fn insert_tiles_if_empty(&self, game: GameId, tiles: Vec<Tile>) -> Result<bool> {
        let fresh = tile_table(game, tiles)?;
        self.with_game(game, |rec| {
            if !rec.tiles.is_empty() {
                return Ok(false);
            }
            rec.tiles = fresh;
            tracing::debug!(%game, inserted = rec.tiles.len(), "inserted first tile set");
            Ok(true)
        })
    }

    fn commit(&self, write_set: &WriteSet) -> Result<CommitResult> {
        let game = write_set.game();
        let next_item = &self.next_item;
        self.with_game(game, |rec| {
            for (coord, expected) in write_set.guards() {
                match rec.tiles.get(&coord) {
                    Some(tile) if &tile.ownership == expected => {}
                    _ => {
                        tracing::debug!(%game, %coord, "guard failed, aborting commit");
                        return Err(Error::StorageConflict(coord));
                    }
                }
            }

            let mut result = CommitResult::new();
            for write in write_set.iter() {
                match write {
                    PendingWrite::Conquer { coord, .. } => {
                        if let Some(tile) = rec.tiles.get_mut(coord) {
                            tile.conquer();
                        }
                    }
                    PendingWrite::SetOwnership { coord, ownership, .. } => {
                        if let Some(tile) = rec.tiles.get_mut(coord) {
                            tile.ownership = ownership.clone();
                            if !tile.explored {
                                tile.reveal();
                                result.revealed.push(*coord);
                            }
                        }
                    }
                    PendingWrite::Reveal { coord } => {
                        if let Some(tile) = rec.tiles.get_mut(coord) {
                            if !tile.explored {
                                tile.reveal();
                                result.revealed.push(*coord);
                            }
                        }
                    }
                    PendingWrite::GrantExperience { amount } => {
                        result.level_up = Some(rec.hero.add_experience(*amount));
                    }
                    PendingWrite::CreditResources { resources } => {
                        for (resource, amount) in resources {
                            *rec.resources.entry(resource.clone()).or_insert(0) += amount;
                        }
                    }
                    PendingWrite::CreateItem { item } => {
                        let id = ItemId(next_item.fetch_add(1, Ordering::Relaxed) + 1);
                        let item = item.clone().into_item(id, game, Utc::now());
                        rec.items.push(item.clone());
                        result.items.push(item);
                    }
                }
            }
            Ok(result)
        })
    }
}

impl GameProgression for MemoryStore {
    fn hero(&self, game: GameId) -> Result<Option<HeroProgress>> {
        match self.with_game(game, |rec| Ok(rec.hero.clone())) {
            Ok(hero) => Ok(Some(hero)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn add_experience(&self, game: GameId, amount: u64) -> Result<LevelUp> {
        self.with_game(game, |rec| Ok(rec.hero.add_experience(amount)))
    }
}

impl Inventory for MemoryStore {
    fn items(&self, game: GameId) -> Result<Vec<Item>> {
        self.with_game(game, |rec| Ok(rec.items.clone()))
    }

    fn set_equipped(&self, game: GameId, item: ItemId, equipped: bool) -> Result<Item> {
        self.with_game(game, |rec| {
            let found = rec
                .items
                .iter_mut()
                .find(|i| i.id == item)
                .ok_or(Error::ItemNotFound(item))?;
            found.equipped = equipped;
            Ok(found.clone())
        })
    }

    fn resources(&self, game: GameId) -> Result<ResourceMap> {
        self.with_game(game, |rec| Ok(rec.resources.clone()))
    }
}
