//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use chrono::Utc;
use hexrealm_core::{
    CommitResult, DefId, GameId, GameProgression, HeroProgress, Hex, Inventory, Item, ItemId,
    LevelUp, PendingWrite, ResourceMap, Tile, TileStore, WriteSet,
};
use native_db::*;
use std::path::Path;
use std::sync::LazyLock;

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredTile>().unwrap();
    models.define::<StoredHero>().unwrap();
    models.define::<StoredItem>().unwrap();
    models.define::<StoredResource>().unwrap();
    models.define::<StoredSequence>().unwrap();
    models
});

/// Database store for persistent map state.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Register a game with a fresh level-1 hero. An existing hero is kept.
    pub fn create_game(&self, game: GameId, hero_name: impl Into<String>) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let existing: Option<StoredHero> = rw.get().primary(game.raw())?;
        if existing.is_none() {
            rw.upsert(StoredHero::from_hero(game, &HeroProgress::new(hero_name)))?;
        }
        rw.commit()?;
        Ok(())
    }

    fn load_hero(&self, game: GameId) -> Result<Option<HeroProgress>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredHero> = r.get().primary(game.raw())?;
        Ok(stored.map(|h| h.to_hero()))
    }

    fn require_game(&self, game: GameId) -> Result<()> {
        match self.load_hero(game)? {
            Some(_) => Ok(()),
            None => Err(Error::GameNotFound(game)),
        }
    }

    fn load_tile(&self, game: GameId, coord: Hex) -> Result<Option<Tile>> {
        self.require_game(game)?;
        let r = self.db.r_transaction()?;
        let stored: Option<StoredTile> = r.get().primary(tile_key(game, coord))?;
        stored.map(|s| s.to_tile()).transpose()
    }

    fn save_tile(&self, tile: &Tile) -> Result<()> {
        self.require_game(tile.game)?;
        let stored = StoredTile::from_tile(tile)?;
        let rw = self.db.rw_transaction()?;
        rw.upsert(stored)?;
        rw.commit()?;
        Ok(())
    }

    /// Swap the whole tile set of a game in one transaction.
    ///
    /// With `only_if_empty` the existing set is left alone when it has any
    /// tile, and `false` is returned.
    fn swap_tiles(&self, game: GameId, tiles: Vec<Tile>, only_if_empty: bool) -> Result<bool> {
        let fresh = tiles
            .iter()
            .map(|tile| {
                if tile.game != game {
                    return Err(Error::Corrupt(format!(
                        "tile {} belongs to {}, not {}",
                        tile.coord, tile.game, game
                    )));
                }
                StoredTile::from_tile(tile)
            })
            .collect::<Result<Vec<_>>>()?;

        let rw = self.db.rw_transaction()?;
        let hero: Option<StoredHero> = rw.get().primary(game.raw())?;
        if hero.is_none() {
            return Err(Error::GameNotFound(game));
        }

        let existing: Vec<StoredTile> = {
            let scan = rw.scan().secondary::<StoredTile>(StoredTileKey::game_id)?;
            let iter = scan.start_with(game.raw())?;
            let tiles: std::result::Result<Vec<StoredTile>, _> = iter.collect();
            tiles.map_err(|e| Error::Database(e.to_string()))?
        };
        if only_if_empty && !existing.is_empty() {
            return Ok(false);
        }
        let removed = existing.len();
        for tile in existing {
            rw.remove(tile)?;
        }

        let inserted = fresh.len();
        for tile in fresh {
            rw.insert(tile)?;
        }
        rw.commit()?;
        tracing::debug!(%game, removed, inserted, "replaced tile set");
        Ok(true)
    }

    /// Apply a unit of work in one transaction.
    ///
    /// Guards are checked inside the transaction; on a mismatch the
    /// transaction is dropped uncommitted.
    fn apply(&self, write_set: &WriteSet) -> Result<CommitResult> {
        let game = write_set.game();
        let rw = self.db.rw_transaction()?;

        let hero: Option<StoredHero> = rw.get().primary(game.raw())?;
        let mut hero = hero.ok_or(Error::GameNotFound(game))?.to_hero();

        for (coord, expected) in write_set.guards() {
            let stored: Option<StoredTile> = rw.get().primary(tile_key(game, coord))?;
            let current = stored.map(|s| s.ownership()).transpose()?;
            if current.as_ref() != Some(expected) {
                tracing::debug!(%game, %coord, "guard failed, aborting commit");
                return Err(Error::Conflict(coord));
            }
        }

        let mut result = CommitResult::new();
        let mut hero_changed = false;
        for write in write_set.iter() {
            match write {
                PendingWrite::Conquer { coord, .. } => {
                    let stored: Option<StoredTile> = rw.get().primary(tile_key(game, *coord))?;
                    if let Some(stored) = stored {
                        let mut tile = stored.to_tile()?;
                        tile.conquer();
                        rw.upsert(StoredTile::from_tile(&tile)?)?;
                    }
                }
                PendingWrite::SetOwnership { coord, ownership, .. } => {
                    let stored: Option<StoredTile> = rw.get().primary(tile_key(game, *coord))?;
                    if let Some(stored) = stored {
                        let mut tile = stored.to_tile()?;
                        tile.ownership = ownership.clone();
                        if !tile.explored {
                            tile.reveal();
                            result.revealed.push(*coord);
                        }
                        rw.upsert(StoredTile::from_tile(&tile)?)?;
                    }
                }
                PendingWrite::Reveal { coord } => {
                    let stored: Option<StoredTile> = rw.get().primary(tile_key(game, *coord))?;
                    if let Some(stored) = stored.filter(|s| !s.explored) {
                        let mut tile = stored.to_tile()?;
                        tile.reveal();
                        rw.upsert(StoredTile::from_tile(&tile)?)?;
                        result.revealed.push(*coord);
                    }
                }
                PendingWrite::GrantExperience { amount } => {
                    result.level_up = Some(hero.add_experience(*amount));
                    hero_changed = true;
                }
                PendingWrite::CreditResources { resources } => {
                    for (resource, amount) in resources {
                        let key = resource_key(game, resource);
                        let stored: Option<StoredResource> = rw.get().primary(key.clone())?;
                        let balance = stored.map(|s| s.amount).unwrap_or(0) + amount;
                        rw.upsert(StoredResource {
                            key,
                            game_id: game.raw(),
                            resource: resource.as_str().to_string(),
                            amount: balance,
                        })?;
                    }
                }
                PendingWrite::CreateItem { item } => {
                    let seq: Option<StoredSequence> =
                        rw.get().primary(StoredSequence::ITEMS.to_string())?;
                    let next = seq.map(|s| s.last).unwrap_or(0) + 1;
                    rw.upsert(StoredSequence {
                        name: StoredSequence::ITEMS.to_string(),
                        last: next,
                    })?;
                    let item = item.clone().into_item(ItemId::new(next), game, Utc::now());
                    rw.insert(StoredItem::from_item(&item))?;
                    result.items.push(item);
                }
            }
        }

        if hero_changed {
            rw.upsert(StoredHero::from_hero(game, &hero))?;
        }
        rw.commit()?;
        Ok(result)
    }

    fn grant_experience(&self, game: GameId, amount: u64) -> Result<LevelUp> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredHero> = rw.get().primary(game.raw())?;
        let mut hero = stored.ok_or(Error::GameNotFound(game))?.to_hero();
        let level_up = hero.add_experience(amount);
        rw.upsert(StoredHero::from_hero(game, &hero))?;
        rw.commit()?;
        Ok(level_up)
    }

    fn toggle_equipped(&self, game: GameId, item: ItemId, equipped: bool) -> Result<Item> {
        let rw = self.db.rw_transaction()?;
        let stored: Option<StoredItem> = rw.get().primary(item.raw())?;
        let mut stored = stored
            .filter(|s| s.game_id == game.raw())
            .ok_or(Error::ItemNotFound(item))?;
        stored.equipped = equipped;
        let item = stored.to_item()?;
        rw.upsert(stored)?;
        rw.commit()?;
        Ok(item)
    }
}

impl TileStore for Store {
    fn get_tile(&self, game: GameId, coord: Hex) -> hexrealm_core::Result<Option<Tile>> {
        Ok(self.load_tile(game, coord)?)
    }

    fn list_tiles(&self, game: GameId) -> hexrealm_core::Result<Vec<Tile>> {
        self.require_game(game)?;
        Ok(self.tiles_for_game(game)?)
    }

    fn upsert_tile(&self, tile: &Tile) -> hexrealm_core::Result<()> {
        Ok(self.save_tile(tile)?)
    }

    fn replace_tiles(&self, game: GameId, tiles: Vec<Tile>) -> hexrealm_core::Result<()> {
        self.swap_tiles(game, tiles, false)?;
        Ok(())
    }

    fn insert_tiles_if_empty(&self, game: GameId, tiles: Vec<Tile>) -> hexrealm_core::Result<bool> {
        Ok(self.swap_tiles(game, tiles, true)?)
    }

    fn commit(&self, write_set: &WriteSet) -> hexrealm_core::Result<CommitResult> {
        Ok(self.apply(write_set)?)
    }
}

impl GameProgression for Store {
    fn hero(&self, game: GameId) -> hexrealm_core::Result<Option<HeroProgress>> {
        Ok(self.load_hero(game)?)
    }

    fn add_experience(&self, game: GameId, amount: u64) -> hexrealm_core::Result<LevelUp> {
        Ok(self.grant_experience(game, amount)?)
    }
}

impl Inventory for Store {
    fn items(&self, game: GameId) -> hexrealm_core::Result<Vec<Item>> {
        self.require_game(game)?;
        Ok(self.items_for_game(game)?)
    }

    fn set_equipped(
        &self,
        game: GameId,
        item: ItemId,
        equipped: bool,
    ) -> hexrealm_core::Result<Item> {
        Ok(self.toggle_equipped(game, item, equipped)?)
    }

    fn resources(&self, game: GameId) -> hexrealm_core::Result<ResourceMap> {
        self.require_game(game)?;
        let mut ledger = ResourceMap::new();
        for row in self.resources_for_game(game)? {
            ledger.insert(DefId::new(row.resource), row.amount);
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexrealm_core::{EngineConfig, MapEngine, Ownership};
    use std::sync::Arc;

    const GAME: GameId = GameId(1);

    fn neutral(strength: u8) -> Ownership {
        Ownership::Neutral {
            enemy: DefId::new("goblins"),
            strength,
        }
    }

    fn seeded_store() -> Store {
        let store = Store::in_memory().unwrap();
        store.create_game(GAME, "Aria").unwrap();
        let tiles = vec![
            Tile::new(GAME, Hex::ORIGIN, "plains".into(), Ownership::Player, true),
            Tile::new(GAME, Hex::new(1, 0), "forest".into(), neutral(1), true),
            Tile::new(GAME, Hex::new(2, 0), "forest".into(), neutral(1), false),
        ];
        store.replace_tiles(GAME, tiles).unwrap();
        store
    }

    #[test]
    fn test_unknown_game() {
        let store = Store::in_memory().unwrap();
        assert!(store.hero(GameId(9)).unwrap().is_none());
        assert!(matches!(
            store.list_tiles(GameId(9)),
            Err(hexrealm_core::Error::NotFound(GameId(9)))
        ));
    }

    #[test]
    fn test_create_game_keeps_existing_hero() {
        let store = Store::in_memory().unwrap();
        store.create_game(GAME, "Aria").unwrap();
        store.add_experience(GAME, 50).unwrap();
        store.create_game(GAME, "Other").unwrap();
        let hero = store.hero(GAME).unwrap().unwrap();
        assert_eq!(hero.name, "Aria");
        assert_eq!(hero.experience, 50);
    }

    #[test]
    fn test_tile_roundtrip() {
        let store = seeded_store();
        let tile = store.get_tile(GAME, Hex::new(1, 0)).unwrap().unwrap();
        assert_eq!(tile.ownership, neutral(1));
        assert!(tile.explored);
        assert!(store.get_tile(GAME, Hex::new(7, 7)).unwrap().is_none());
        assert_eq!(store.neighbors(GAME, Hex::new(1, 0)).unwrap().len(), 2);
    }

    #[test]
    fn test_replace_is_scoped_to_game() {
        let store = seeded_store();
        store.create_game(GameId(2), "Bram").unwrap();
        store
            .replace_tiles(
                GameId(2),
                vec![Tile::new(
                    GameId(2),
                    Hex::ORIGIN,
                    "plains".into(),
                    Ownership::Player,
                    true,
                )],
            )
            .unwrap();
        store
            .replace_tiles(
                GAME,
                vec![Tile::new(GAME, Hex::ORIGIN, "forest".into(), Ownership::Player, true)],
            )
            .unwrap();
        assert_eq!(store.list_tiles(GAME).unwrap().len(), 1);
        assert_eq!(store.list_tiles(GameId(2)).unwrap().len(), 1);
        assert_eq!(store.count_tiles(GAME).unwrap(), 1);
    }

    #[test]
    fn test_failed_replace_keeps_previous_tiles() {
        let store = seeded_store();
        let before = store.list_tiles(GAME).unwrap();
        let tiles = vec![
            Tile::new(GAME, Hex::ORIGIN, "plains".into(), Ownership::Player, true),
            Tile::new(GameId(2), Hex::new(0, 1), "plains".into(), Ownership::Unclaimed, false),
        ];
        assert!(matches!(
            store.replace_tiles(GAME, tiles),
            Err(hexrealm_core::Error::Storage(_))
        ));
        assert_eq!(store.list_tiles(GAME).unwrap(), before);
        assert_eq!(store.count_tiles(GAME).unwrap(), 3);
    }

    #[test]
    fn test_insert_if_empty_keeps_existing_map() {
        let store = seeded_store();
        let before = store.list_tiles(GAME).unwrap();
        let origin = Tile::new(GAME, Hex::ORIGIN, "forest".into(), Ownership::Player, true);
        assert!(!store.insert_tiles_if_empty(GAME, vec![origin]).unwrap());
        assert_eq!(store.list_tiles(GAME).unwrap(), before);

        store.create_game(GameId(2), "Bram").unwrap();
        let origin = Tile::new(GameId(2), Hex::ORIGIN, "forest".into(), Ownership::Player, true);
        assert!(store.insert_tiles_if_empty(GameId(2), vec![origin]).unwrap());
        assert_eq!(store.count_tiles(GameId(2)).unwrap(), 1);
    }

    #[test]
    fn test_set_ownership_is_guarded() {
        let store = seeded_store();
        let mut ws = WriteSet::new(GAME);
        ws.push(PendingWrite::SetOwnership {
            coord: Hex::new(2, 0),
            expected: neutral(1),
            ownership: Ownership::Player,
        });
        assert_eq!(store.commit(&ws).unwrap().revealed, vec![Hex::new(2, 0)]);
        let tile = store.get_tile(GAME, Hex::new(2, 0)).unwrap().unwrap();
        assert!(tile.ownership.is_player());
        assert!(tile.explored);

        assert!(matches!(
            store.commit(&ws),
            Err(hexrealm_core::Error::StorageConflict(_))
        ));
    }

    #[test]
    fn test_commit_applies_everything() {
        let store = seeded_store();
        let mut ws = WriteSet::new(GAME);
        ws.push(PendingWrite::Conquer {
            coord: Hex::new(1, 0),
            expected: neutral(1),
        });
        ws.push(PendingWrite::Reveal { coord: Hex::new(2, 0) });
        ws.push(PendingWrite::GrantExperience { amount: 130 });
        ws.push(PendingWrite::CreditResources {
            resources: ResourceMap::from([(DefId::new("gold"), 20), (DefId::new("wood"), 5)]),
        });
        ws.push(PendingWrite::CreateItem {
            item: hexrealm_core::NewItem::new("iron_sword", "common"),
        });

        let result = store.commit(&ws).unwrap();
        assert_eq!(result.revealed, vec![Hex::new(2, 0)]);
        assert_eq!(result.level_up.unwrap().level, 2);
        assert_eq!(result.items[0].id, ItemId(1));

        assert!(store.get_tile(GAME, Hex::new(1, 0)).unwrap().unwrap().ownership.is_player());
        let hero = store.hero(GAME).unwrap().unwrap();
        assert_eq!((hero.level, hero.experience), (2, 30));
        let ledger = store.resources(GAME).unwrap();
        assert_eq!(ledger.get(&DefId::new("gold")), Some(&20));

        // credits accumulate
        store.commit(&ws_credit(7)).unwrap();
        assert_eq!(store.resources(GAME).unwrap().get(&DefId::new("gold")), Some(&27));
    }

    fn ws_credit(gold: i64) -> WriteSet {
        let mut ws = WriteSet::new(GAME);
        ws.push(PendingWrite::CreditResources {
            resources: ResourceMap::from([(DefId::new("gold"), gold)]),
        });
        ws
    }

    #[test]
    fn test_conflict_rolls_back() {
        let store = seeded_store();
        let mut ws = WriteSet::new(GAME);
        ws.push(PendingWrite::Reveal { coord: Hex::new(2, 0) });
        ws.push(PendingWrite::Conquer {
            coord: Hex::new(1, 0),
            expected: neutral(5),
        });
        ws.push(PendingWrite::GrantExperience { amount: 500 });

        assert!(matches!(
            store.commit(&ws),
            Err(hexrealm_core::Error::StorageConflict(_))
        ));
        assert!(!store.get_tile(GAME, Hex::new(2, 0)).unwrap().unwrap().explored);
        assert_eq!(store.hero(GAME).unwrap().unwrap().level, 1);
    }

    #[test]
    fn test_item_ids_and_equip() {
        let store = seeded_store();
        let mut ws = WriteSet::new(GAME);
        ws.push(PendingWrite::CreateItem {
            item: hexrealm_core::NewItem::new("iron_sword", "rare"),
        });
        ws.push(PendingWrite::CreateItem {
            item: hexrealm_core::NewItem::new("iron_helmet", "common"),
        });
        let items = store.commit(&ws).unwrap().items;
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![ItemId(1), ItemId(2)]);

        let equipped = store.set_equipped(GAME, ItemId(2), true).unwrap();
        assert!(equipped.equipped);
        assert_eq!(store.items(GAME).unwrap().iter().filter(|i| i.equipped).count(), 1);

        store.create_game(GameId(2), "Bram").unwrap();
        assert!(matches!(
            store.set_equipped(GameId(2), ItemId(1), true),
            Err(hexrealm_core::Error::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_engine_over_database() {
        let store = Store::in_memory().unwrap();
        store.create_game(GAME, "Aria").unwrap();
        let catalog = Arc::new(hexrealm_script::builtin_catalog().unwrap());
        let engine = MapEngine::new(store, catalog, EngineConfig::default().with_seed(3));

        assert_eq!(engine.generate_map(GAME, Some(2)).unwrap().tile_count, 19);
        let target = Hex::new(1, 0);
        let power = engine.get_tile(GAME, target).unwrap().enemy.unwrap().power;
        let report = engine.attack_tile(GAME, target, power).unwrap();
        assert!(report.is_victory());
        assert!(matches!(
            engine.attack_tile(GAME, target, power),
            Err(hexrealm_core::Error::InvalidTarget(_))
        ));
        assert_eq!(engine.get_tile(GAME, target).unwrap().ownership, "player");
        assert!(engine.resources(GAME).unwrap().get(&DefId::new("gold")).is_some());
    }
}
