//! Hexrealm Script - RON content loader
//!
//! Loads the static game content from RON files:
//! - Terrain kinds with generation weights
//! - Enemy archetypes and their strength bands
//! - Item templates, rarity tiers and rarity bands
//!
//! The content shipped with the crate is available through
//! [`builtin_catalog`]. Engine settings load with [`load_config`].

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{builtin_catalog, load_config, parse_config, ContentDefs, Loader};
pub use schema::ContentFile;
