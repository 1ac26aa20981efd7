//! Hero level and experience
//!
//! Level thresholds grow as `floor(100 * level^1.5)`. Experience left over
//! after a level-up carries into the next level, so a single large grant can
//! raise several levels at once.

use crate::{GameId, Result};
use serde::{Deserialize, Serialize};

/// Experience required to advance past `level`
pub fn xp_needed_for_level(level: u32) -> u64 {
    let level = f64::from(level);
    // level^1.5, exact on perfect squares
    (100.0 * level * level.sqrt()).floor() as u64
}

/// Level state of a game's hero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroProgress {
    pub name: String,
    pub level: u32,
    /// Experience accumulated toward the next level
    pub experience: u64,
}

impl HeroProgress {
    /// A fresh level-1 hero
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 1,
            experience: 0,
        }
    }

    pub fn xp_needed(&self) -> u64 {
        xp_needed_for_level(self.level)
    }

    /// Percentage toward the next level, one decimal place
    pub fn xp_progress(&self) -> f64 {
        let needed = self.xp_needed().max(1) as f64;
        (self.experience as f64 / needed * 1000.0).round() / 10.0
    }

    /// Add experience and apply every level-up it pays for
    pub fn add_experience(&mut self, amount: u64) -> LevelUp {
        self.experience += amount;
        let mut levels_gained = 0;
        while self.experience >= self.xp_needed() {
            self.experience -= self.xp_needed();
            self.level += 1;
            levels_gained += 1;
        }
        LevelUp {
            levels_gained,
            level: self.level,
            experience: self.experience,
            xp_needed: self.xp_needed(),
        }
    }
}

/// Outcome of an experience grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub levels_gained: u32,
    pub level: u32,
    pub experience: u64,
    pub xp_needed: u64,
}

/// Owner of hero records; also the authority on which games exist
pub trait GameProgression {
    /// Hero of a game, or `None` if the game is unknown
    fn hero(&self, game: GameId) -> Result<Option<HeroProgress>>;

    /// Grant experience outside of combat
    fn add_experience(&self, game: GameId, amount: u64) -> Result<LevelUp>;
}
