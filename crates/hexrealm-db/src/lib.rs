//! Hexrealm DB - Durable storage using native_db
//!
//! Provides persistent storage for:
//! - World map tiles, keyed by game and coordinate
//! - Hero level and experience
//! - Inventory items and the resource ledger
//!
//! Every unit of work from the engine is applied inside a single read-write
//! transaction, so a guarded conquest either lands whole or not at all.

mod error;
mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use store::Store;
