//! Deferred writes committed as a single unit of work
//!
//! The conquest resolver never mutates storage directly. It reads tiles,
//! computes the outcome, and collects every mutation into a [`WriteSet`]. The
//! store applies the whole set inside one transaction: either every write lands
//! or none does.
//!
//! # Guards
//!
//! [`PendingWrite::Conquer`] and [`PendingWrite::SetOwnership`] carry the
//! ownership observed when the write was planned. The store compares it with
//! the current record at commit time and aborts the whole set with
//! [`crate::Error::StorageConflict`] on a mismatch, so two racing attacks on the
//! same tile can never both be granted rewards.

use crate::catalog::ResourceMap;
use crate::item::{Item, NewItem};
use crate::progression::LevelUp;
use crate::tile::Ownership;
use crate::{GameId, Hex};
use serde::{Deserialize, Serialize};

/// A pending mutation of one game's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PendingWrite {
    /// Transfer a tile to the player, provided it still has `expected` ownership
    Conquer {
        coord: Hex,
        /// Ownership observed when the write was planned
        expected: Ownership,
    },

    /// Overwrite a tile's ownership and reveal it, provided it still has `expected`
    SetOwnership {
        coord: Hex,
        /// Ownership observed when the write was planned
        expected: Ownership,
        ownership: Ownership,
    },

    /// Set a tile's explored flag; ownership is untouched
    Reveal {
        coord: Hex,
    },

    /// Grant hero experience, applying level-ups
    GrantExperience {
        amount: u64,
    },

    /// Add to the game's resource ledger
    CreditResources {
        resources: ResourceMap,
    },

    /// Add an item to the game's inventory
    CreateItem {
        item: NewItem,
    },
}

/// A collection of pending writes for one game, applied atomically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteSet {
    game: GameId,
    /// The pending writes in order
    writes: Vec<PendingWrite>,
}

impl WriteSet {
    /// Create a new empty WriteSet for a game
    pub fn new(game: GameId) -> Self {
        Self {
            game,
            writes: Vec::new(),
        }
    }

    pub fn game(&self) -> GameId {
        self.game
    }

    /// Add a pending write to the set
    pub fn push(&mut self, write: PendingWrite) {
        self.writes.push(write);
    }

    /// Get the number of pending writes
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Check if the WriteSet is empty
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Get an iterator over the pending writes
    pub fn iter(&self) -> impl Iterator<Item = &PendingWrite> {
        self.writes.iter()
    }

    /// Get a reference to the underlying writes
    pub fn writes(&self) -> &[PendingWrite] {
        &self.writes
    }

    /// Coordinates whose current ownership must match before anything is applied
    pub fn guards(&self) -> impl Iterator<Item = (Hex, &Ownership)> {
        self.writes.iter().filter_map(|w| match w {
            PendingWrite::Conquer { coord, expected }
            | PendingWrite::SetOwnership { coord, expected, .. } => Some((*coord, expected)),
            _ => None,
        })
    }
}

/// What a successful commit produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitResult {
    /// Present when the set granted experience
    pub level_up: Option<LevelUp>,
    /// Items created, with their assigned ids
    pub items: Vec<Item>,
    /// Tiles whose explored flag changed from false to true
    pub revealed: Vec<Hex>,
}

impl CommitResult {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefId;

    #[test]
    fn test_write_set_empty() {
        let write_set = WriteSet::new(GameId(1));
        assert!(write_set.is_empty());
        assert_eq!(write_set.len(), 0);
        assert_eq!(write_set.game(), GameId(1));
    }

    #[test]
    fn test_guards_cover_ownership_changes() {
        let mut write_set = WriteSet::new(GameId(1));
        let expected = Ownership::Neutral {
            enemy: DefId::new("goblins"),
            strength: 2,
        };
        write_set.push(PendingWrite::Conquer {
            coord: Hex::new(1, 0),
            expected: expected.clone(),
        });
        write_set.push(PendingWrite::Reveal { coord: Hex::new(2, 0) });
        write_set.push(PendingWrite::GrantExperience { amount: 40 });
        write_set.push(PendingWrite::SetOwnership {
            coord: Hex::new(0, 3),
            expected: Ownership::Unclaimed,
            ownership: Ownership::Player,
        });

        let guards: Vec<_> = write_set.guards().collect();
        assert_eq!(
            guards,
            vec![(Hex::new(1, 0), &expected), (Hex::new(0, 3), &Ownership::Unclaimed)]
        );
    }

    #[test]
    fn test_write_set_serialization() {
        let mut write_set = WriteSet::new(GameId(9));
        write_set.push(PendingWrite::Reveal { coord: Hex::new(0, 1) });
        write_set.push(PendingWrite::CreateItem {
            item: NewItem::new("iron_sword", "common"),
        });

        let serialized = ron::to_string(&write_set).expect("serialize");
        let deserialized: WriteSet = ron::from_str(&serialized).expect("deserialize");

        assert_eq!(deserialized, write_set);
    }
}
