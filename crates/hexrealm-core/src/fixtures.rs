//! Small hand-built catalog shared by unit tests

use crate::catalog::{
    Catalog, EnemyBand, EnemyDef, ItemTemplate, RarityBand, RarityTier, Slot, TerrainDef,
};
use crate::DefId;
use indexmap::IndexMap;

pub(crate) fn test_catalog() -> Catalog {
    let terrain = vec![
        TerrainDef::new("plains", "Plains", 20).with_bonus("food", 2),
        TerrainDef::new("forest", "Forest", 18).with_bonus("wood", 3),
        TerrainDef {
            defense_bonus: 3,
            movement_cost: 3,
            ..TerrainDef::new("mountain", "Mountain", 10)
                .with_bonus("stone", 2)
                .with_bonus("iron", 1)
        },
    ];

    let enemies = vec![
        EnemyDef::new("goblins", "Goblin Camp", 10, 5),
        EnemyDef {
            loot_multiplier: 0.8,
            ..EnemyDef::new("wolves", "Wolf Pack", 12, 6)
        },
        EnemyDef {
            loot_multiplier: 1.2,
            ..EnemyDef::new("bandits", "Bandit Hideout", 15, 7)
        },
        EnemyDef {
            loot_multiplier: 3.0,
            ..EnemyDef::new("dragons", "Dragon Lair", 50, 20)
        },
    ];

    let items = vec![
        ItemTemplate {
            id: DefId::new("iron_sword"),
            name: "Iron Sword".to_string(),
            slot: Slot::Weapon,
            description: String::new(),
            base_stats: IndexMap::from([
                ("attack".to_string(), 10),
                ("physical_attack".to_string(), 5),
            ]),
        },
        ItemTemplate {
            id: DefId::new("iron_helmet"),
            name: "Iron Helmet".to_string(),
            slot: Slot::Helmet,
            description: String::new(),
            base_stats: IndexMap::from([("defense".to_string(), 5), ("hp".to_string(), 20)]),
        },
    ];

    let rarities = vec![
        rarity("common", 1.0),
        rarity("rare", 2.0),
        rarity("legendary", 3.0),
    ];

    let enemy_bands = vec![
        EnemyBand {
            min_strength: 1,
            enemies: vec!["goblins".into(), "wolves".into()],
        },
        EnemyBand {
            min_strength: 2,
            enemies: vec!["goblins".into(), "bandits".into()],
        },
        EnemyBand {
            min_strength: 8,
            enemies: vec!["dragons".into()],
        },
    ];

    let rarity_bands = vec![
        RarityBand {
            min_strength: 0,
            weights: vec![("common".into(), 1)],
        },
        RarityBand {
            min_strength: 5,
            weights: vec![("common".into(), 60), ("rare".into(), 30), ("legendary".into(), 10)],
        },
    ];

    Catalog::new(terrain, enemies, items, rarities, enemy_bands, rarity_bands)
        .expect("fixture catalog is valid")
}

fn rarity(id: &str, stat_multiplier: f64) -> RarityTier {
    RarityTier {
        id: DefId::new(id),
        name: id.to_string(),
        color: "#FFFFFF".to_string(),
        stat_multiplier,
    }
}
