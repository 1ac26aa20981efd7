//! Hero, inventory and ledger models for database storage.

use crate::error::{Error, Result};
use chrono::DateTime;
use hexrealm_core::{DefId, GameId, HeroProgress, Item, ItemId};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// Stored hero; its presence marks the game as existing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredHero {
    #[primary_key]
    pub game_id: u64,
    pub name: String,
    pub level: u32,
    pub experience: u64,
}

impl StoredHero {
    pub fn from_hero(game: GameId, hero: &HeroProgress) -> Self {
        Self {
            game_id: game.raw(),
            name: hero.name.clone(),
            level: hero.level,
            experience: hero.experience,
        }
    }

    pub fn to_hero(&self) -> HeroProgress {
        HeroProgress {
            name: self.name.clone(),
            level: self.level,
            experience: self.experience,
        }
    }
}

/// Stored inventory item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredItem {
    #[primary_key]
    pub id: u64,
    #[secondary_key]
    pub game_id: u64,
    pub template: String,
    pub rarity: String,
    pub equipped: bool,
    /// Acquisition time, milliseconds since the Unix epoch.
    pub acquired_at: i64,
}

impl StoredItem {
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.raw(),
            game_id: item.game.raw(),
            template: item.template.as_str().to_string(),
            rarity: item.rarity.as_str().to_string(),
            equipped: item.equipped,
            acquired_at: item.acquired_at.timestamp_millis(),
        }
    }

    pub fn to_item(&self) -> Result<Item> {
        let acquired_at = DateTime::from_timestamp_millis(self.acquired_at).ok_or_else(|| {
            Error::Corrupt(format!("item {} timestamp {}", self.id, self.acquired_at))
        })?;
        Ok(Item {
            id: ItemId::new(self.id),
            game: GameId::new(self.game_id),
            template: DefId::new(self.template.clone()),
            rarity: DefId::new(self.rarity.clone()),
            equipped: self.equipped,
            acquired_at,
        })
    }
}

/// Primary key of a ledger row: `"<game>:<resource>"`.
pub fn resource_key(game: GameId, resource: &DefId) -> String {
    format!("{}:{}", game.raw(), resource)
}

/// Stored resource balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 4, version = 1)]
#[native_db]
pub struct StoredResource {
    #[primary_key]
    pub key: String,
    #[secondary_key]
    pub game_id: u64,
    pub resource: String,
    pub amount: i64,
}

/// Monotonic id sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 5, version = 1)]
#[native_db]
pub struct StoredSequence {
    #[primary_key]
    pub name: String,
    pub last: u64,
}

impl StoredSequence {
    pub const ITEMS: &'static str = "items";
}
