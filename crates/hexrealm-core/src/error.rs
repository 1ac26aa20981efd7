//! Error types for hexrealm-core

use crate::{DefId, GameId, Hex};
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// The game is unknown to the progression collaborator
    #[error("Game not found: {0}")]
    NotFound(GameId),

    #[error("Tile not found: {game} at {coord}")]
    TileNotFound { game: GameId, coord: Hex },

    /// Attack on a tile that is not held by a neutral enemy
    #[error("Invalid target: tile {0} is not neutral")]
    InvalidTarget(Hex),

    #[error("Tile {0} is not adjacent to player territory")]
    NotAdjacentToTerritory(Hex),

    #[error("Invalid occupation value: {0}")]
    InvalidOccupationValue(String),

    /// A concurrent write changed a record between read and commit
    #[error("Storage conflict at {0}")]
    StorageConflict(Hex),

    #[error("Item not found: {0}")]
    ItemNotFound(crate::ItemId),

    #[error("Definition not found: {0}")]
    DefinitionNotFound(DefId),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Failure reported by a storage backend
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
