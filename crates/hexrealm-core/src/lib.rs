//! Hexrealm Core - hex-map world engine
//!
//! This crate provides the domain model and rules of a hex-grid conquest map:
//! - Axial coordinates and bounded hexagonal grids (`Hex`, `HexGrid`)
//! - Static content tables for terrain, enemies, items and rarities (`Catalog`)
//! - Seeded procedural generation with distance-banded garrisons
//! - Fog of war and administrative ownership overrides
//! - Adjacency-gated conquest committed as one guarded unit of work
//! - Hero experience curve and loot drops
//!
//! ## Storage
//!
//! The engine is stateless between calls. Persistence is abstracted behind
//! [`TileStore`], [`GameProgression`] and [`Inventory`]; [`MemoryStore`]
//! implements all three in process, and `hexrealm-db` provides a durable
//! implementation.
//!
//! ```ignore
//! let store = MemoryStore::new();
//! store.create_game(GameId(1), "Aria")?;
//! let engine = MapEngine::new(store, Arc::new(catalog), EngineConfig::default());
//! engine.generate_map(GameId(1), Some(3))?;
//! let report = engine.attack_tile(GameId(1), Hex::new(1, 0), 40)?;
//! ```

pub mod catalog;
pub mod config;
pub mod conquest;
pub mod engine;
mod error;
pub mod generator;
pub mod hex;
mod identity;
pub mod item;
mod memory;
pub mod progression;
mod rng;
pub mod store;
pub mod tile;
pub mod write_set;

#[cfg(test)]
mod fixtures;

pub use catalog::{
    Catalog, EnemyBand, EnemyDef, ItemTemplate, RarityBand, RarityTier, ResourceMap, Slot,
    TerrainDef,
};
pub use config::{CombatConfig, EngineConfig};
pub use conquest::{BattleReport, ConquestResolver, Outcome, Rewards};
pub use engine::{GeneratedMap, MapEngine, MapView};
pub use error::{Error, Result};
pub use generator::WorldMapGenerator;
pub use hex::{Hex, HexGrid, DIRECTIONS};
pub use identity::{DefId, GameId, ItemId};
pub use item::{Item, ItemView, NewItem};
pub use memory::MemoryStore;
pub use progression::{xp_needed_for_level, GameProgression, HeroProgress, LevelUp};
pub use rng::{GameRng, WeightedTable};
pub use store::{Inventory, TileStore};
pub use tile::{EnemyView, Occupation, Ownership, Tile, TileView, MAX_STRENGTH};
pub use write_set::{CommitResult, PendingWrite, WriteSet};
