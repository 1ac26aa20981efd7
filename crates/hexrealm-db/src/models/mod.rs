//! Database models for persistent storage.

mod progress;
mod tile;

pub use progress::*;
pub use tile::*;
