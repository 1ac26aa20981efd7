//! Skirmish Demo
//!
//! Generates a small world, then attacks every reachable neutral tile with a
//! fixed army power until nothing more can be taken.
//!
//! Usage: `skirmish [DB_PATH]`. Without a path the game lives in memory.
//! Set `HEXREALM_CONFIG` to a RON file to override engine settings and
//! `RUST_LOG` to adjust log output.

use hexrealm_core::{GameId, Hex, MapEngine, Outcome, TileView};
use hexrealm_db::Store;
use indexmap::IndexMap;
use std::sync::Arc;

const GAME: GameId = GameId(1);
const ARMY_POWER: i64 = 45;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("=== Hexrealm Skirmish ===\n");

    let config = match std::env::var("HEXREALM_CONFIG") {
        Ok(path) => hexrealm_script::load_config(path)?,
        Err(_) => Default::default(),
    };
    let store = match std::env::args().nth(1) {
        Some(path) => Store::open(path)?,
        None => Store::in_memory()?,
    };
    store.create_game(GAME, "Aria")?;

    let catalog = Arc::new(hexrealm_script::builtin_catalog()?);
    let engine = MapEngine::new(store, catalog, config);

    let generated = engine.generate_map(GAME, Some(3))?;
    println!("Generated {} tiles (radius {})\n", generated.tile_count, generated.radius);

    let mut round = 1;
    loop {
        let targets = frontier(&engine)?;
        if targets.is_empty() {
            break;
        }
        println!("Round {}: {} targets in reach", round, targets.len());

        let mut conquered = 0;
        for target in targets {
            let coord = Hex::new(target.q, target.r);
            let report = engine.attack_tile(GAME, coord, ARMY_POWER)?;
            let enemy = target.enemy.map(|e| e.name).unwrap_or_default();
            match report.outcome {
                Outcome::Victory => {
                    conquered += 1;
                    println!(
                        "  {} {:<20} won  (+{} xp, +{} gold{})",
                        coord,
                        enemy,
                        report.xp_gained,
                        report.rewards.gold,
                        report
                            .dropped_item
                            .as_ref()
                            .map(|i| format!(", found {} {}", i.rarity, i.template))
                            .unwrap_or_default()
                    );
                }
                Outcome::Defeat => {
                    println!("  {} {:<20} lost (short by {})", coord, enemy, report.power_deficit);
                }
            }
        }
        if conquered == 0 {
            break;
        }
        round += 1;
    }

    let map = engine.get_map(GAME)?;
    let owned = map.tiles.iter().filter(|t| t.ownership == "player").count();
    let hero = hexrealm_core::GameProgression::hero(engine.store(), GAME)?
        .ok_or("hero disappeared")?;
    println!("\nTerritory: {} of {} tiles", owned, map.tile_count);
    println!(
        "Hero {}: level {} ({}/{} xp, {}%)",
        hero.name,
        hero.level,
        hero.experience,
        hero.xp_needed(),
        hero.xp_progress()
    );

    println!("Resources:");
    for (resource, amount) in engine.resources(GAME)? {
        println!("  {:<12} {}", resource.as_str(), amount);
    }
    println!("Inventory:");
    for item in engine.inventory(GAME)? {
        println!("  [{}] {} {}", item.rarity_name, item.name, format_stats(&item.stats));
    }

    Ok(())
}

/// Explored neutral tiles bordering player territory
fn frontier(engine: &MapEngine<Store>) -> hexrealm_core::Result<Vec<TileView>> {
    let map = engine.get_map(GAME)?;
    let mut targets = Vec::new();
    for tile in map.tiles.into_iter().filter(|t| t.ownership == "neutral" && t.explored) {
        let neighbors = engine.get_neighbors(GAME, Hex::new(tile.q, tile.r))?;
        if neighbors.iter().any(|n| n.ownership == "player") {
            targets.push(tile);
        }
    }
    Ok(targets)
}

fn format_stats(stats: &IndexMap<String, i64>) -> String {
    stats
        .iter()
        .map(|(stat, value)| format!("{} +{}", stat, value))
        .collect::<Vec<_>>()
        .join(", ")
}
