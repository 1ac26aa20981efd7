//! Static game content: terrain, enemies, item templates and rarity tiers
//!
//! A [`Catalog`] is loaded once at startup (see `hexrealm-script`) and shared
//! read-only for the life of the process. Strength bands decide which enemy
//! archetypes may appear at a given difficulty and which rarities may drop.

use crate::rng::{GameRng, WeightedTable};
use crate::{DefId, Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resource id → amount, in insertion order
pub type ResourceMap = IndexMap<DefId, i64>;

/// Definition of a terrain kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainDef {
    pub id: DefId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Hex color for map rendering
    #[serde(default = "default_color")]
    pub color: String,
    /// Per-resource production bonus
    #[serde(default)]
    pub resource_bonuses: ResourceMap,
    #[serde(default)]
    pub defense_bonus: i32,
    #[serde(default = "default_movement_cost")]
    pub movement_cost: u32,
    /// Relative frequency during map generation
    pub weight: u32,
}

fn default_color() -> String {
    "#CCCCCC".to_string()
}

fn default_movement_cost() -> u32 {
    1
}

impl TerrainDef {
    pub fn new(id: impl Into<DefId>, name: impl Into<String>, weight: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            color: default_color(),
            resource_bonuses: ResourceMap::new(),
            defense_bonus: 0,
            movement_cost: 1,
            weight,
        }
    }

    pub fn with_bonus(mut self, resource: impl Into<DefId>, amount: i64) -> Self {
        self.resource_bonuses.insert(resource.into(), amount);
        self
    }
}

/// Definition of an enemy archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDef {
    pub id: DefId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_power: i64,
    pub power_per_level: i64,
    #[serde(default = "default_loot_multiplier")]
    pub loot_multiplier: f64,
}

fn default_loot_multiplier() -> f64 {
    1.0
}

impl EnemyDef {
    pub fn new(
        id: impl Into<DefId>,
        name: impl Into<String>,
        base_power: i64,
        power_per_level: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            base_power,
            power_per_level,
            loot_multiplier: 1.0,
        }
    }

    /// Combat power of this archetype at the given strength
    pub fn power(&self, strength: u8) -> i64 {
        self.base_power + i64::from(strength) * self.power_per_level
    }
}

/// Equipment slot an item occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Weapon,
    Armor,
    Helmet,
    Boots,
    Amulet,
    Ring,
}

impl Slot {
    pub fn display_name(&self) -> &'static str {
        match self {
            Slot::Weapon => "Weapon",
            Slot::Armor => "Armor",
            Slot::Helmet => "Helmet",
            Slot::Boots => "Boots",
            Slot::Amulet => "Amulet",
            Slot::Ring => "Ring",
        }
    }
}

/// Template for equipment that can drop from conquered tiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: DefId,
    pub name: String,
    pub slot: Slot,
    #[serde(default)]
    pub description: String,
    pub base_stats: IndexMap<String, i64>,
}

/// A rarity tier; catalogs keep these ordered common → legendary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityTier {
    pub id: DefId,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    pub stat_multiplier: f64,
}

/// Enemy archetypes eligible from a minimum strength upwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBand {
    pub min_strength: u8,
    pub enemies: Vec<DefId>,
}

/// Rarity weights in effect from a minimum strength upwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityBand {
    pub min_strength: u8,
    pub weights: Vec<(DefId, u32)>,
}

/// Picks the band with the highest `min_strength` not above `strength`
fn band_for<B>(bands: &[B], strength: u8, min_of: impl Fn(&B) -> u8) -> Option<&B> {
    bands
        .iter()
        .filter(|b| min_of(b) <= strength)
        .max_by_key(|b| min_of(b))
}

/// Read-only content tables shared by the generator and the resolver
#[derive(Debug, Clone)]
pub struct Catalog {
    terrain: IndexMap<DefId, TerrainDef>,
    enemies: IndexMap<DefId, EnemyDef>,
    items: IndexMap<DefId, ItemTemplate>,
    rarities: IndexMap<DefId, RarityTier>,
    enemy_bands: Vec<EnemyBand>,
    rarity_bands: Vec<RarityBand>,
    terrain_table: WeightedTable<DefId>,
    item_ids: Vec<DefId>,
}

impl Catalog {
    /// Assemble and validate a catalog
    ///
    /// Every band must reference known ids, the bands must cover strength 1
    /// upwards, and weights, multipliers and movement costs must be in range.
    pub fn new(
        terrain: Vec<TerrainDef>,
        enemies: Vec<EnemyDef>,
        items: Vec<ItemTemplate>,
        rarities: Vec<RarityTier>,
        mut enemy_bands: Vec<EnemyBand>,
        mut rarity_bands: Vec<RarityBand>,
    ) -> Result<Self> {
        let terrain = index_unique(terrain, |t| &t.id, "terrain")?;
        let enemies = index_unique(enemies, |e| &e.id, "enemy")?;
        let items = index_unique(items, |i| &i.id, "item template")?;
        let rarities = index_unique(rarities, |r| &r.id, "rarity")?;

        if terrain.is_empty() {
            return Err(Error::InvalidCatalog("no terrain defined".to_string()));
        }
        for def in terrain.values() {
            if def.weight == 0 {
                return Err(Error::InvalidCatalog(format!("terrain {} has zero weight", def.id)));
            }
            if def.movement_cost == 0 {
                return Err(Error::InvalidCatalog(format!(
                    "terrain {} has zero movement cost",
                    def.id
                )));
            }
        }
        for def in enemies.values() {
            if def.loot_multiplier < 0.0 || !def.loot_multiplier.is_finite() {
                return Err(Error::InvalidCatalog(format!(
                    "enemy {} has a negative loot multiplier",
                    def.id
                )));
            }
        }
        for tier in rarities.values() {
            if tier.stat_multiplier < 1.0 || !tier.stat_multiplier.is_finite() {
                return Err(Error::InvalidCatalog(format!(
                    "rarity {} multiplier is below 1.0",
                    tier.id
                )));
            }
        }

        enemy_bands.sort_by_key(|b| b.min_strength);
        rarity_bands.sort_by_key(|b| b.min_strength);

        if enemy_bands.first().map(|b| b.min_strength > 1).unwrap_or(true) {
            return Err(Error::InvalidCatalog(
                "enemy bands must start at strength 1 or lower".to_string(),
            ));
        }
        for band in &enemy_bands {
            if band.enemies.is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "enemy band {} is empty",
                    band.min_strength
                )));
            }
            if let Some(missing) = band.enemies.iter().find(|id| !enemies.contains_key(*id)) {
                return Err(Error::DefinitionNotFound(missing.clone()));
            }
        }

        if !items.is_empty() {
            if rarity_bands.first().map(|b| b.min_strength > 1).unwrap_or(true) {
                return Err(Error::InvalidCatalog(
                    "rarity bands must start at strength 1 or lower".to_string(),
                ));
            }
            for band in &rarity_bands {
                if band.weights.iter().all(|(_, w)| *w == 0) {
                    return Err(Error::InvalidCatalog(format!(
                        "rarity band {} has no weight",
                        band.min_strength
                    )));
                }
                if let Some((missing, _)) =
                    band.weights.iter().find(|(id, _)| !rarities.contains_key(id))
                {
                    return Err(Error::DefinitionNotFound(missing.clone()));
                }
            }
        }

        let terrain_table = WeightedTable::new(terrain.values().map(|t| (t.id.clone(), t.weight)));
        let item_ids = items.keys().cloned().collect();

        Ok(Self {
            terrain,
            enemies,
            items,
            rarities,
            enemy_bands,
            rarity_bands,
            terrain_table,
            item_ids,
        })
    }

    pub fn terrain(&self, id: &DefId) -> Option<&TerrainDef> {
        self.terrain.get(id)
    }

    pub fn terrains(&self) -> impl Iterator<Item = &TerrainDef> {
        self.terrain.values()
    }

    /// Full terrain table in definition order
    pub fn terrain_table(&self) -> &IndexMap<DefId, TerrainDef> {
        &self.terrain
    }

    pub fn enemy(&self, id: &DefId) -> Option<&EnemyDef> {
        self.enemies.get(id)
    }

    pub fn enemies(&self) -> impl Iterator<Item = &EnemyDef> {
        self.enemies.values()
    }

    pub fn item(&self, id: &DefId) -> Option<&ItemTemplate> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemTemplate> {
        self.items.values()
    }

    pub fn rarity(&self, id: &DefId) -> Option<&RarityTier> {
        self.rarities.get(id)
    }

    /// Rarity tiers, common first
    pub fn rarities(&self) -> impl Iterator<Item = &RarityTier> {
        self.rarities.values()
    }

    /// Weighted draw of a terrain id
    pub fn sample_terrain(&self, rng: &mut GameRng) -> &DefId {
        // validated non-empty with positive weights
        self.terrain_table
            .sample(rng)
            .unwrap_or_else(|| &self.terrain_table.entries()[0])
    }

    /// Enemy archetypes allowed at `strength`
    pub fn enemy_band(&self, strength: u8) -> &EnemyBand {
        band_for(&self.enemy_bands, strength, |b| b.min_strength).unwrap_or(&self.enemy_bands[0])
    }

    /// Uniform draw from the enemy band for `strength`
    pub fn sample_enemy(&self, strength: u8, rng: &mut GameRng) -> &DefId {
        let band = self.enemy_band(strength);
        rng.pick(&band.enemies).unwrap_or(&band.enemies[0])
    }

    /// Rarity weights in effect at `strength`
    pub fn rarity_band(&self, strength: u8) -> Option<&RarityBand> {
        band_for(&self.rarity_bands, strength, |b| b.min_strength).or(self.rarity_bands.first())
    }

    /// Weighted rarity draw for loot from an enemy of `strength`
    pub fn sample_rarity(&self, strength: u8, rng: &mut GameRng) -> Option<&DefId> {
        let band = self.rarity_band(strength)?;
        let table = WeightedTable::new(band.weights.iter().map(|(id, w)| (id, *w)));
        table.sample(rng).copied()
    }

    /// Uniform draw of an item template
    pub fn sample_item(&self, rng: &mut GameRng) -> Option<&ItemTemplate> {
        rng.pick(&self.item_ids).and_then(|id| self.items.get(id))
    }
}

fn index_unique<T>(
    defs: Vec<T>,
    id_of: impl Fn(&T) -> &DefId,
    what: &str,
) -> Result<IndexMap<DefId, T>> {
    let mut map = IndexMap::with_capacity(defs.len());
    for def in defs {
        let id = id_of(&def).clone();
        if map.contains_key(&id) {
            return Err(Error::InvalidCatalog(format!("duplicate {} definition: {}", what, id)));
        }
        map.insert(id, def);
    }
    Ok(map)
}
