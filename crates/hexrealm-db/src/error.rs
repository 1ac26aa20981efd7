//! Error types for database operations.

use hexrealm_core::{GameId, Hex, ItemId};
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Native DB error.
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No hero record exists for the game.
    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    /// Item id unknown within the game.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// A guarded tile changed before the commit.
    #[error("Ownership of {0} changed during commit")]
    Conflict(Hex),

    /// A stored record could not be mapped back to the domain.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for hexrealm_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::GameNotFound(game) => hexrealm_core::Error::NotFound(game),
            Error::ItemNotFound(item) => hexrealm_core::Error::ItemNotFound(item),
            Error::Conflict(coord) => hexrealm_core::Error::StorageConflict(coord),
            other => hexrealm_core::Error::Storage(other.to_string()),
        }
    }
}
