//! Attack resolution: validation, battle outcome, rewards and loot
//!
//! An attack is resolved in three phases:
//!
//! 1. **Read** the target and its neighbors from the store and validate
//!    (tile exists, is neutral, touches player territory).
//! 2. **Compute** the outcome. Winning is a plain threshold,
//!    `player_power >= enemy_power`; randomness only decides loot.
//! 3. **Write** every effect of a victory as one [`WriteSet`]. The conquest
//!    write is guarded by the ownership read in phase 1, so if another attack
//!    took the tile in between, the whole set is dropped and the caller sees
//!    [`Error::InvalidTarget`].

use crate::catalog::{Catalog, ResourceMap};
use crate::config::CombatConfig;
use crate::item::{Item, NewItem};
use crate::progression::{GameProgression, HeroProgress};
use crate::rng::GameRng;
use crate::store::TileStore;
use crate::tile::{Ownership, Tile};
use crate::write_set::{PendingWrite, WriteSet};
use crate::{DefId, Error, GameId, Hex, Result};
use serde::Serialize;

/// Win or lose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// Gold and resources granted for a victory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rewards {
    pub gold: u64,
    pub resources: ResourceMap,
}

impl Rewards {
    /// Gold plus every resource as one ledger credit
    pub fn as_credit(&self) -> ResourceMap {
        let mut credit = ResourceMap::new();
        credit.insert(DefId::new("gold"), self.gold as i64);
        for (resource, amount) in &self.resources {
            *credit.entry(resource.clone()).or_insert(0) += *amount;
        }
        credit
    }
}

/// Everything an attack produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleReport {
    pub outcome: Outcome,
    /// The target after resolution
    pub tile: Tile,
    pub player_power: i64,
    pub enemy_power: i64,
    /// `enemy_power - player_power` on defeat, zero on victory
    pub power_deficit: i64,
    pub rewards: Rewards,
    pub xp_gained: u64,
    pub levels_gained: u32,
    pub hero_level: u32,
    pub hero_xp: u64,
    pub hero_xp_needed: u64,
    /// Neighbors uncovered by the conquest
    pub revealed: Vec<Hex>,
    pub dropped_item: Option<Item>,
}

impl BattleReport {
    pub fn is_victory(&self) -> bool {
        self.outcome == Outcome::Victory
    }
}

/// Combat power of the garrison holding `ownership`
pub fn enemy_power(catalog: &Catalog, ownership: &Ownership) -> Result<i64> {
    match ownership {
        Ownership::Neutral { enemy, strength } => catalog
            .enemy(enemy)
            .map(|def| def.power(*strength))
            .ok_or_else(|| Error::DefinitionNotFound(enemy.clone())),
        _ => Ok(0),
    }
}

/// `floor(enemy_power * xp_per_power + strength * xp_per_strength)`
pub fn experience_for(combat: &CombatConfig, enemy_power: i64, strength: u8) -> u64 {
    let xp =
        enemy_power as f64 * combat.xp_per_power + f64::from(strength) * combat.xp_per_strength;
    xp.max(0.0).floor() as u64
}

/// Gold and resource amounts scaled by the archetype's loot multiplier
pub fn rewards_for(combat: &CombatConfig, enemy_power: i64, loot_multiplier: f64) -> Rewards {
    let power = enemy_power.max(0) as f64;
    let gold = (power * combat.gold_per_power * loot_multiplier).floor() as u64;
    let each = (power * combat.resource_per_power * loot_multiplier).floor() as i64;
    let resources = combat
        .reward_resources
        .iter()
        .map(|id| (id.clone(), each))
        .collect();
    Rewards { gold, resources }
}

/// Validates and resolves attacks against neutral tiles
pub struct ConquestResolver<'a, S> {
    store: &'a S,
    catalog: &'a Catalog,
    combat: &'a CombatConfig,
}

impl<'a, S> ConquestResolver<'a, S>
where
    S: TileStore + GameProgression,
{
    pub fn new(store: &'a S, catalog: &'a Catalog, combat: &'a CombatConfig) -> Self {
        Self {
            store,
            catalog,
            combat,
        }
    }

    /// Attack the tile at `coord` with the given hero power
    pub fn attack(
        &self,
        game: GameId,
        coord: Hex,
        player_power: i64,
        rng: &mut GameRng,
    ) -> Result<BattleReport> {
        let tile = self
            .store
            .get_tile(game, coord)?
            .ok_or(Error::TileNotFound { game, coord })?;

        let Ownership::Neutral { enemy, strength } = &tile.ownership else {
            return Err(Error::InvalidTarget(coord));
        };
        let strength = *strength;

        let neighbors = self.store.neighbors(game, coord)?;
        if !neighbors.iter().any(|n| n.ownership.is_player()) {
            return Err(Error::NotAdjacentToTerritory(coord));
        }

        let enemy_def = self
            .catalog
            .enemy(enemy)
            .ok_or_else(|| Error::DefinitionNotFound(enemy.clone()))?;
        let enemy_power = enemy_def.power(strength);

        if player_power < enemy_power {
            tracing::debug!(%game, %coord, player_power, enemy_power, "attack repelled");
            let hero = self.hero(game)?;
            return Ok(BattleReport {
                outcome: Outcome::Defeat,
                tile,
                player_power,
                enemy_power,
                power_deficit: enemy_power - player_power,
                rewards: Rewards::default(),
                xp_gained: 0,
                levels_gained: 0,
                hero_level: hero.level,
                hero_xp: hero.experience,
                hero_xp_needed: hero.xp_needed(),
                revealed: Vec::new(),
                dropped_item: None,
            });
        }

        let xp_gained = experience_for(self.combat, enemy_power, strength);
        let rewards = rewards_for(self.combat, enemy_power, enemy_def.loot_multiplier);
        let drop = self.roll_drop(enemy_power, strength, rng);

        let mut write_set = WriteSet::new(game);
        write_set.push(PendingWrite::Conquer {
            coord,
            expected: tile.ownership.clone(),
        });
        for neighbor in neighbors.iter().filter(|n| !n.explored) {
            write_set.push(PendingWrite::Reveal { coord: neighbor.coord });
        }
        write_set.push(PendingWrite::GrantExperience { amount: xp_gained });
        write_set.push(PendingWrite::CreditResources {
            resources: rewards.as_credit(),
        });
        if let Some(item) = drop {
            write_set.push(PendingWrite::CreateItem { item });
        }

        let committed = match self.store.commit(&write_set) {
            Ok(committed) => committed,
            Err(Error::StorageConflict(_)) => {
                tracing::info!(%game, %coord, "lost conquest race");
                return Err(Error::InvalidTarget(coord));
            }
            Err(e) => return Err(e),
        };

        let mut conquered = tile;
        conquered.conquer();

        let (levels_gained, hero_level, hero_xp, hero_xp_needed) = match committed.level_up {
            Some(up) => (up.levels_gained, up.level, up.experience, up.xp_needed),
            None => {
                let hero = self.hero(game)?;
                (0, hero.level, hero.experience, hero.xp_needed())
            }
        };

        tracing::info!(
            %game,
            %coord,
            enemy_power,
            xp_gained,
            gold = rewards.gold,
            dropped = committed.items.len(),
            "tile conquered"
        );

        Ok(BattleReport {
            outcome: Outcome::Victory,
            tile: conquered,
            player_power,
            enemy_power,
            power_deficit: 0,
            rewards,
            xp_gained,
            levels_gained,
            hero_level,
            hero_xp,
            hero_xp_needed,
            revealed: committed.revealed,
            dropped_item: committed.items.into_iter().next(),
        })
    }

    /// Roll for an item; rarity odds come from the garrison's strength band
    fn roll_drop(&self, enemy_power: i64, strength: u8, rng: &mut GameRng) -> Option<NewItem> {
        if !rng.chance(self.combat.drop_chance(enemy_power)) {
            return None;
        }
        let rarity = self.catalog.sample_rarity(strength, rng)?.clone();
        let template = self.catalog.sample_item(rng)?;
        Some(NewItem::new(template.id.clone(), rarity))
    }

    fn hero(&self, game: GameId) -> Result<HeroProgress> {
        self.store.hero(game)?.ok_or(Error::NotFound(game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_catalog;
    use crate::memory::MemoryStore;
    use crate::store::Inventory;

    const GAME: GameId = GameId(1);

    fn goblins(strength: u8) -> Ownership {
        Ownership::Neutral {
            enemy: DefId::new("goblins"),
            strength,
        }
    }

    /// Origin owned; (1,0) goblins str 2 (power 20); (2,0) and (2,-1) hidden;
    /// (3,0) isolated goblins
    fn setup() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_game(GAME, "Aria").unwrap();
        let tiles = vec![
            Tile::new(GAME, Hex::ORIGIN, "plains".into(), Ownership::Player, true),
            Tile::new(GAME, Hex::new(1, 0), "forest".into(), goblins(2), true),
            Tile::new(GAME, Hex::new(2, 0), "forest".into(), goblins(4), false),
            Tile::new(GAME, Hex::new(2, -1), "plains".into(), goblins(4), false),
            Tile::new(GAME, Hex::new(1, -1), "plains".into(), goblins(1), true),
            Tile::new(GAME, Hex::new(4, 0), "plains".into(), goblins(1), false),
        ];
        store.replace_tiles(GAME, tiles).unwrap();
        store
    }

    fn attack(store: &MemoryStore, coord: Hex, power: i64) -> Result<BattleReport> {
        let catalog = test_catalog();
        let combat = CombatConfig::default();
        ConquestResolver::new(store, &catalog, &combat).attack(
            GAME,
            coord,
            power,
            &mut GameRng::new(5),
        )
    }

    #[test]
    fn test_missing_tile() {
        let store = setup();
        assert!(matches!(
            attack(&store, Hex::new(5, 5), 1_000),
            Err(Error::TileNotFound { .. })
        ));
    }

    #[test]
    fn test_owned_tile_is_invalid_target() {
        let store = setup();
        let before = store.list_tiles(GAME).unwrap();
        assert!(matches!(attack(&store, Hex::ORIGIN, 1_000), Err(Error::InvalidTarget(_))));
        assert_eq!(store.list_tiles(GAME).unwrap(), before);
    }

    #[test]
    fn test_not_adjacent() {
        let store = setup();
        let before = store.list_tiles(GAME).unwrap();
        assert!(matches!(
            attack(&store, Hex::new(4, 0), 1_000),
            Err(Error::NotAdjacentToTerritory(_))
        ));
        assert_eq!(store.list_tiles(GAME).unwrap(), before);
    }

    #[test]
    fn test_exact_power_wins() {
        let store = setup();
        // goblins: 10 + 2 * 5
        let report = attack(&store, Hex::new(1, 0), 20).unwrap();
        assert!(report.is_victory());
        assert_eq!(report.enemy_power, 20);
        assert!(report.tile.ownership.is_player());
    }

    #[test]
    fn test_victory_effects() {
        let store = setup();
        let report = attack(&store, Hex::new(1, 0), 100).unwrap();

        // floor(20 * 0.5 + 2 * 10)
        assert_eq!(report.xp_gained, 30);
        assert_eq!(report.rewards.gold, 40);
        assert_eq!(report.rewards.resources.get(&DefId::new("wood")), Some(&10));
        assert_eq!(report.rewards.resources.get(&DefId::new("food")), Some(&10));

        let tile = store.get_tile(GAME, Hex::new(1, 0)).unwrap().unwrap();
        assert_eq!(tile.ownership, Ownership::Player);
        assert!(tile.explored);

        for coord in [Hex::new(2, 0), Hex::new(2, -1)] {
            let neighbor = store.get_tile(GAME, coord).unwrap().unwrap();
            assert!(neighbor.explored);
            assert!(neighbor.ownership.is_neutral());
        }
        let mut revealed = report.revealed.clone();
        revealed.sort();
        assert_eq!(revealed, vec![Hex::new(2, -1), Hex::new(2, 0)]);

        let hero = store.hero(GAME).unwrap().unwrap();
        assert_eq!(hero.experience, 30);
        assert_eq!(report.hero_xp, 30);
        assert_eq!(store.resources(GAME).unwrap().get(&DefId::new("gold")), Some(&40));
        assert_eq!(store.items(GAME).unwrap().len(), usize::from(report.dropped_item.is_some()));
    }

    #[test]
    fn test_defeat_changes_nothing() {
        let store = setup();
        let before = store.list_tiles(GAME).unwrap();
        let report = attack(&store, Hex::new(1, 0), 19).unwrap();
        assert_eq!(report.outcome, Outcome::Defeat);
        assert_eq!(report.power_deficit, 1);
        assert_eq!(report.xp_gained, 0);
        assert!(report.dropped_item.is_none());
        assert_eq!(store.list_tiles(GAME).unwrap(), before);
        assert_eq!(store.hero(GAME).unwrap().unwrap().experience, 0);
        assert!(store.items(GAME).unwrap().is_empty());
    }

    #[test]
    fn test_repeat_attack_is_invalid_target() {
        let store = setup();
        attack(&store, Hex::new(1, 0), 100).unwrap();
        assert!(matches!(attack(&store, Hex::new(1, 0), 100), Err(Error::InvalidTarget(_))));
        assert_eq!(store.hero(GAME).unwrap().unwrap().experience, 30);
    }

    #[test]
    fn test_conquest_extends_territory() {
        let store = setup();
        assert!(matches!(
            attack(&store, Hex::new(2, 0), 1_000),
            Err(Error::NotAdjacentToTerritory(_))
        ));
        attack(&store, Hex::new(1, 0), 1_000).unwrap();
        assert!(attack(&store, Hex::new(2, 0), 1_000).unwrap().is_victory());
    }

    #[test]
    fn test_level_up_reported() {
        let store = setup();
        // strength 4 goblins: power 30, xp floor(15 + 40) = 55; plus 30 from (1,0)
        attack(&store, Hex::new(1, 0), 1_000).unwrap();
        let report = attack(&store, Hex::new(2, 0), 1_000).unwrap();
        assert_eq!(report.xp_gained, 55);
        assert_eq!(report.levels_gained, 0);
        let report = attack(&store, Hex::new(2, -1), 1_000).unwrap();
        assert_eq!(report.levels_gained, 1);
        assert_eq!(report.hero_level, 2);
        assert_eq!(report.hero_xp, 40);
        assert_eq!(report.hero_xp_needed, 282);
    }

    #[test]
    fn test_rewards_scale_with_loot_multiplier() {
        let combat = CombatConfig::default();
        let rewards = rewards_for(&combat, 100, 1.5);
        assert_eq!(rewards.gold, 300);
        assert_eq!(rewards.resources.get(&DefId::new("wood")), Some(&75));
        let credit = rewards.as_credit();
        assert_eq!(credit.get(&DefId::new("gold")), Some(&300));
        assert_eq!(credit.len(), 3);
    }

    #[test]
    fn test_drops_follow_rarity_band() {
        let catalog = test_catalog();
        let combat = CombatConfig::default();
        let store = setup();
        let resolver = ConquestResolver::new(&store, &catalog, &combat);
        let mut rng = GameRng::new(8);
        let mut drops = 0;
        for _ in 0..500 {
            if let Some(item) = resolver.roll_drop(20, 1, &mut rng) {
                assert_eq!(item.rarity.as_str(), "common");
                drops += 1;
            }
        }
        // drop chance 0.32
        assert!((100..220).contains(&drops), "drops = {}", drops);
    }
}
