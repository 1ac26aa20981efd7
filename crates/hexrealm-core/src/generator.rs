//! Procedural world generation
//!
//! Terrain is a weighted draw per cell and carries no gameplay state. The
//! starting town sits on the origin; every other cell is held by a neutral
//! garrison whose strength grows with distance from the town. Only the ring
//! around the town is visible at the start.

use crate::catalog::Catalog;
use crate::hex::{coordinates_in_radius, Hex};
use crate::rng::GameRng;
use crate::tile::{Ownership, Tile, MAX_STRENGTH};
use crate::GameId;

/// Garrison strength for a cell at `distance` from the origin
///
/// `max(1, d/2)` plus a random bonus of up to `min(2, d/3)`, clamped to
/// `[1, MAX_STRENGTH]`.
pub fn roll_strength(distance: u32, rng: &mut GameRng) -> u8 {
    let base = (distance / 2).max(1);
    let spread = (distance / 3).min(2);
    let bonus = rng.range_i64(0, i64::from(spread)) as u32;
    (base + bonus).clamp(1, u32::from(MAX_STRENGTH)) as u8
}

/// Builds the full tile set of a new map
#[derive(Debug, Clone, Copy)]
pub struct WorldMapGenerator<'a> {
    catalog: &'a Catalog,
}

impl<'a> WorldMapGenerator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Generate one tile per coordinate of a map with the given radius
    pub fn generate(&self, game: GameId, radius: u32, rng: &mut GameRng) -> Vec<Tile> {
        let tiles: Vec<Tile> = coordinates_in_radius(radius)
            .map(|coord| self.tile_at(game, coord, rng))
            .collect();
        tracing::debug!(%game, radius, tiles = tiles.len(), "generated world map");
        tiles
    }

    fn tile_at(&self, game: GameId, coord: Hex, rng: &mut GameRng) -> Tile {
        let terrain = self.catalog.sample_terrain(rng).clone();
        if coord == Hex::ORIGIN {
            return Tile::new(game, coord, terrain, Ownership::Player, true);
        }
        let distance = Hex::ORIGIN.distance(coord);
        let ownership = self.garrison(coord, rng);
        Tile::new(game, coord, terrain, ownership, distance == 1)
    }

    /// A neutral garrison appropriate to the cell's distance from the origin
    pub fn garrison(&self, coord: Hex, rng: &mut GameRng) -> Ownership {
        let strength = roll_strength(Hex::ORIGIN.distance(coord), rng);
        let enemy = self.catalog.sample_enemy(strength, rng).clone();
        Ownership::Neutral { enemy, strength }
    }
}
