//! Map-engine entry points
//!
//! [`MapEngine`] is the transport-agnostic facade over generation, fog of war
//! and conquest. It holds only read-only content, configuration and the
//! random source; all game state is reloaded from the store on every call.

use crate::catalog::{Catalog, ResourceMap, TerrainDef};
use crate::config::EngineConfig;
use crate::conquest::{BattleReport, ConquestResolver};
use crate::generator::WorldMapGenerator;
use crate::item::ItemView;
use crate::progression::GameProgression;
use crate::rng::GameRng;
use crate::store::{Inventory, TileStore};
use crate::tile::{Occupation, Ownership, Tile, TileView};
use crate::write_set::{PendingWrite, WriteSet};
use crate::{DefId, Error, GameId, Hex, ItemId, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Result of a map generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeneratedMap {
    pub tile_count: usize,
    pub radius: u32,
}

/// A full map as sent to clients
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub game: GameId,
    pub tile_count: usize,
    pub tiles: Vec<TileView>,
    pub terrain_catalog: IndexMap<DefId, TerrainDef>,
}

/// Facade tying the store, catalog and configuration together
pub struct MapEngine<S> {
    store: S,
    catalog: Arc<Catalog>,
    config: EngineConfig,
    rng: Mutex<GameRng>,
}

impl<S> MapEngine<S>
where
    S: TileStore + GameProgression,
{
    pub fn new(store: S, catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        let rng = Mutex::new(GameRng::new(config.seed));
        Self {
            store,
            catalog,
            config,
            rng,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A private generator for one operation, so the shared lock is held briefly
    fn fork_rng(&self) -> Result<GameRng> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| Error::Storage("random source lock poisoned".to_string()))?;
        Ok(rng.fork())
    }

    fn ensure_game(&self, game: GameId) -> Result<()> {
        match self.store.hero(game)? {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(game)),
        }
    }

    fn load_tile(&self, game: GameId, coord: Hex) -> Result<Tile> {
        self.store
            .get_tile(game, coord)?
            .ok_or(Error::TileNotFound { game, coord })
    }

    fn roll_map(&self, game: GameId, radius: u32) -> Result<Vec<Tile>> {
        let mut rng = self.fork_rng()?;
        Ok(WorldMapGenerator::new(&self.catalog).generate(game, radius, &mut rng))
    }

    /// Generate (or regenerate) the world map of a game
    ///
    /// Any existing tiles are replaced in one exclusive store call.
    pub fn generate_map(&self, game: GameId, radius: Option<u32>) -> Result<GeneratedMap> {
        self.ensure_game(game)?;
        let radius = radius.unwrap_or(self.config.default_radius);
        let tiles = self.roll_map(game, radius)?;
        let tile_count = tiles.len();
        self.store.replace_tiles(game, tiles)?;
        tracing::info!(%game, radius, tile_count, "world map generated");
        Ok(GeneratedMap { tile_count, radius })
    }

    /// The whole map, generated with the default radius on first access
    ///
    /// The first map is inserted only if the store still holds no tiles at
    /// write time, so a map created by a concurrent request is kept.
    pub fn get_map(&self, game: GameId) -> Result<MapView> {
        self.ensure_game(game)?;
        let mut tiles = self.store.list_tiles(game)?;
        if tiles.is_empty() {
            let radius = self.config.default_radius;
            let fresh = self.roll_map(game, radius)?;
            let tile_count = fresh.len();
            if self.store.insert_tiles_if_empty(game, fresh)? {
                tracing::info!(%game, radius, tile_count, "world map generated");
            } else {
                tracing::debug!(%game, "map appeared concurrently, keeping it");
            }
            tiles = self.store.list_tiles(game)?;
        }
        let tiles: Vec<TileView> = tiles.iter().map(|t| t.view(&self.catalog)).collect();
        Ok(MapView {
            game,
            tile_count: tiles.len(),
            tiles,
            terrain_catalog: self.catalog.terrain_table().clone(),
        })
    }

    pub fn get_tile(&self, game: GameId, coord: Hex) -> Result<TileView> {
        Ok(self.load_tile(game, coord)?.view(&self.catalog))
    }

    /// Existing neighbors of a coordinate, between zero and six
    pub fn get_neighbors(&self, game: GameId, coord: Hex) -> Result<Vec<TileView>> {
        Ok(self
            .store
            .neighbors(game, coord)?
            .iter()
            .map(|t| t.view(&self.catalog))
            .collect())
    }

    /// Tiles within `distance` of `center`
    pub fn get_tiles_in_range(
        &self,
        game: GameId,
        center: Hex,
        distance: u32,
    ) -> Result<Vec<TileView>> {
        Ok(self
            .store
            .list_tiles(game)?
            .iter()
            .filter(|t| center.distance(t.coord) <= distance)
            .map(|t| t.view(&self.catalog))
            .collect())
    }

    /// Lift the fog on a single tile; idempotent
    pub fn explore_tile(&self, game: GameId, coord: Hex) -> Result<TileView> {
        let tile = self.load_tile(game, coord)?;
        if !tile.explored {
            let mut write_set = WriteSet::new(game);
            write_set.push(PendingWrite::Reveal { coord });
            self.store.commit(&write_set)?;
        }
        Ok(self.load_tile(game, coord)?.view(&self.catalog))
    }

    /// Administrative ownership override
    ///
    /// Accepts `"player"`, `"enemy"`/`"neutral"`, `"none"` or no value. Setting
    /// an enemy on a tile without one rolls a garrison for its distance. The
    /// write is guarded on the ownership read here; if the tile changed hands
    /// in between, nothing is written and [`Error::StorageConflict`] is returned.
    pub fn set_occupation(
        &self,
        game: GameId,
        coord: Hex,
        value: Option<&str>,
    ) -> Result<TileView> {
        let occupation = Occupation::parse(value)?;
        let tile = self.load_tile(game, coord)?;
        let ownership = match occupation {
            Occupation::Player => Ownership::Player,
            Occupation::None => Ownership::Unclaimed,
            Occupation::Enemy => match &tile.ownership {
                neutral @ Ownership::Neutral { .. } => neutral.clone(),
                _ => {
                    let mut rng = self.fork_rng()?;
                    WorldMapGenerator::new(&self.catalog).garrison(coord, &mut rng)
                }
            },
        };
        let mut write_set = WriteSet::new(game);
        write_set.push(PendingWrite::SetOwnership {
            coord,
            expected: tile.ownership,
            ownership,
        });
        self.store.commit(&write_set)?;
        tracing::debug!(%game, %coord, %occupation, "occupation overridden");
        Ok(self.load_tile(game, coord)?.view(&self.catalog))
    }

    /// Attack a neutral tile adjacent to player territory
    pub fn attack_tile(&self, game: GameId, coord: Hex, player_power: i64) -> Result<BattleReport> {
        let mut rng = self.fork_rng()?;
        ConquestResolver::new(&self.store, &self.catalog, &self.config.combat).attack(
            game,
            coord,
            player_power,
            &mut rng,
        )
    }

    /// The static terrain table
    pub fn terrain_catalog(&self) -> &IndexMap<DefId, TerrainDef> {
        self.catalog.terrain_table()
    }
}

impl<S> MapEngine<S>
where
    S: TileStore + GameProgression + Inventory,
{
    /// Inventory of a game with effective stats resolved
    pub fn inventory(&self, game: GameId) -> Result<Vec<ItemView>> {
        Ok(self
            .store
            .items(game)?
            .iter()
            .map(|i| i.view(&self.catalog))
            .collect())
    }

    pub fn equip_item(&self, game: GameId, item: ItemId, equipped: bool) -> Result<ItemView> {
        Ok(self.store.set_equipped(game, item, equipped)?.view(&self.catalog))
    }

    pub fn resources(&self, game: GameId) -> Result<ResourceMap> {
        self.store.resources(game)
    }
}
