//! Map tiles, their ownership state and client-facing snapshots

use crate::catalog::{Catalog, ResourceMap};
use crate::{DefId, Error, GameId, Hex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strength ceiling for neutral garrisons
pub const MAX_STRENGTH: u8 = 10;

/// Who holds a tile
///
/// The enemy garrison lives inside the `Neutral` variant so a tile can never
/// carry an enemy while owned by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    Unclaimed,
    Neutral { enemy: DefId, strength: u8 },
    Player,
}

impl Ownership {
    pub fn is_player(&self) -> bool {
        matches!(self, Ownership::Player)
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Ownership::Neutral { .. })
    }

    /// Garrison strength; zero when no enemy holds the tile
    pub fn strength(&self) -> u8 {
        match self {
            Ownership::Neutral { strength, .. } => *strength,
            _ => 0,
        }
    }

    pub fn enemy(&self) -> Option<&DefId> {
        match self {
            Ownership::Neutral { enemy, .. } => Some(enemy),
            _ => None,
        }
    }

    /// Short label used in snapshots and storage
    pub fn label(&self) -> &'static str {
        match self {
            Ownership::Unclaimed => "unclaimed",
            Ownership::Neutral { .. } => "neutral",
            Ownership::Player => "player",
        }
    }
}

/// A single hex of a game's world map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub game: GameId,
    pub coord: Hex,
    /// Fixed at generation
    pub terrain: DefId,
    pub ownership: Ownership,
    /// Once true never reverts
    pub explored: bool,
}

impl Tile {
    pub fn new(
        game: GameId,
        coord: Hex,
        terrain: DefId,
        ownership: Ownership,
        explored: bool,
    ) -> Self {
        Self {
            game,
            coord,
            terrain,
            ownership,
            explored,
        }
    }

    /// Mark the tile visible; never clears the flag
    pub fn reveal(&mut self) {
        self.explored = true;
    }

    /// Neutral → Player transition, clearing the garrison
    pub fn conquer(&mut self) {
        self.ownership = Ownership::Player;
        self.explored = true;
    }

    /// Client-facing view with catalog data resolved
    pub fn view(&self, catalog: &Catalog) -> TileView {
        let terrain = catalog.terrain(&self.terrain);
        let enemy = match &self.ownership {
            Ownership::Neutral { enemy, strength } => Some(match catalog.enemy(enemy) {
                Some(def) => EnemyView {
                    id: enemy.clone(),
                    name: def.name.clone(),
                    description: def.description.clone(),
                    strength: *strength,
                    power: def.power(*strength),
                },
                None => EnemyView {
                    id: enemy.clone(),
                    name: enemy.to_string(),
                    description: String::new(),
                    strength: *strength,
                    power: 0,
                },
            }),
            _ => None,
        };

        TileView {
            q: self.coord.q,
            r: self.coord.r,
            terrain: self.terrain.clone(),
            terrain_name: terrain
                .map(|t| t.name.clone())
                .unwrap_or_else(|| self.terrain.to_string()),
            description: terrain.map(|t| t.description.clone()).unwrap_or_default(),
            color: terrain
                .map(|t| t.color.clone())
                .unwrap_or_else(|| "#CCCCCC".to_string()),
            defense_bonus: terrain.map(|t| t.defense_bonus).unwrap_or(0),
            movement_cost: terrain.map(|t| t.movement_cost).unwrap_or(1),
            resource_bonuses: terrain.map(|t| t.resource_bonuses.clone()).unwrap_or_default(),
            ownership: self.ownership.label(),
            explored: self.explored,
            enemy,
        }
    }
}

/// Enemy garrison as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: DefId,
    pub name: String,
    pub description: String,
    pub strength: u8,
    pub power: i64,
}

/// Snapshot of a tile for transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub q: i32,
    pub r: i32,
    pub terrain: DefId,
    pub terrain_name: String,
    pub description: String,
    pub color: String,
    pub defense_bonus: i32,
    pub movement_cost: u32,
    pub resource_bonuses: ResourceMap,
    pub ownership: &'static str,
    pub explored: bool,
    pub enemy: Option<EnemyView>,
}

/// Administrative ownership override accepted by `set_occupation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupation {
    Player,
    Enemy,
    None,
}

impl Occupation {
    /// Parse the optional wire value; absent means [`Occupation::None`]
    pub fn parse(value: Option<&str>) -> crate::Result<Self> {
        match value {
            None => Ok(Occupation::None),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for Occupation {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "player" => Ok(Occupation::Player),
            "enemy" | "neutral" => Ok(Occupation::Enemy),
            "none" => Ok(Occupation::None),
            other => Err(Error::InvalidOccupationValue(other.to_string())),
        }
    }
}

impl fmt::Display for Occupation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupation::Player => write!(f, "player"),
            Occupation::Enemy => write!(f, "enemy"),
            Occupation::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_catalog;

    fn neutral_tile() -> Tile {
        Tile::new(
            GameId(1),
            Hex::new(1, 0),
            DefId::new("mountain"),
            Ownership::Neutral {
                enemy: DefId::new("goblins"),
                strength: 3,
            },
            false,
        )
    }

    #[test]
    fn test_conquer_clears_enemy() {
        let mut tile = neutral_tile();
        assert_eq!(tile.ownership.strength(), 3);
        tile.conquer();
        assert!(tile.ownership.is_player());
        assert!(tile.ownership.enemy().is_none());
        assert_eq!(tile.ownership.strength(), 0);
        assert!(tile.explored);
    }

    #[test]
    fn test_view_resolves_catalog() {
        let catalog = test_catalog();
        let view = neutral_tile().view(&catalog);
        assert_eq!(view.terrain_name, "Mountain");
        assert_eq!(view.defense_bonus, 3);
        assert_eq!(view.movement_cost, 3);
        assert_eq!(view.resource_bonuses.get(&DefId::new("stone")), Some(&2));
        assert_eq!(view.ownership, "neutral");
        let enemy = view.enemy.expect("neutral tile shows its enemy");
        assert_eq!(enemy.name, "Goblin Camp");
        assert_eq!(enemy.power, 25);
    }

    #[test]
    fn test_occupation_parse() {
        assert_eq!(Occupation::parse(None).unwrap(), Occupation::None);
        assert_eq!(Occupation::parse(Some("player")).unwrap(), Occupation::Player);
        assert_eq!(Occupation::parse(Some("enemy")).unwrap(), Occupation::Enemy);
        assert_eq!(Occupation::parse(Some("neutral")).unwrap(), Occupation::Enemy);
        assert!(matches!(
            Occupation::parse(Some("pirates")),
            Err(Error::InvalidOccupationValue(v)) if v == "pirates"
        ));
    }

    #[test]
    fn test_ownership_ron_roundtrip() {
        let ownership = neutral_tile().ownership;
        let text = ron::to_string(&ownership).expect("serialize");
        let back: Ownership = ron::from_str(&text).expect("deserialize");
        assert_eq!(back, ownership);
    }
}
