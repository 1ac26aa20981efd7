//! Engine configuration
//!
//! Everything here has a default matching the shipped game balance, so a
//! RON config file only needs to name the values it overrides.

use crate::{DefId, Error, Result};
use serde::{Deserialize, Serialize};

/// Top-level engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Radius used when a map is generated without an explicit one
    #[serde(default = "default_radius")]
    pub default_radius: u32,
    /// Seed for the engine's random source
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub combat: CombatConfig,
}

fn default_radius() -> u32 {
    10
}

fn default_seed() -> u64 {
    0x5EED_0F_4E41_4D
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_radius: default_radius(),
            seed: default_seed(),
            combat: CombatConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject values that would make combat resolution misbehave
    pub fn validate(&self) -> Result<()> {
        self.combat.validate()
    }
}

/// Combat reward and loot constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatConfig {
    /// XP per point of enemy power
    #[serde(default = "default_xp_per_power")]
    pub xp_per_power: f64,
    /// XP per garrison strength level
    #[serde(default = "default_xp_per_strength")]
    pub xp_per_strength: f64,
    /// Gold per point of enemy power, before the loot multiplier
    #[serde(default = "default_gold_per_power")]
    pub gold_per_power: f64,
    /// Amount of each reward resource per point of enemy power
    #[serde(default = "default_resource_per_power")]
    pub resource_per_power: f64,
    /// Resources granted alongside gold
    #[serde(default = "default_reward_resources")]
    pub reward_resources: Vec<DefId>,
    #[serde(default = "default_drop_base")]
    pub drop_chance_base: f64,
    /// Enemy power that adds a full 1.0 to the drop chance
    #[serde(default = "default_drop_divisor")]
    pub drop_chance_divisor: f64,
    #[serde(default = "default_drop_cap")]
    pub drop_chance_cap: f64,
}

fn default_xp_per_power() -> f64 {
    0.5
}

fn default_xp_per_strength() -> f64 {
    10.0
}

fn default_gold_per_power() -> f64 {
    2.0
}

fn default_resource_per_power() -> f64 {
    0.5
}

fn default_reward_resources() -> Vec<DefId> {
    vec![DefId::new("wood"), DefId::new("food")]
}

fn default_drop_base() -> f64 {
    0.3
}

fn default_drop_divisor() -> f64 {
    1000.0
}

fn default_drop_cap() -> f64 {
    0.7
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            xp_per_power: default_xp_per_power(),
            xp_per_strength: default_xp_per_strength(),
            gold_per_power: default_gold_per_power(),
            resource_per_power: default_resource_per_power(),
            reward_resources: default_reward_resources(),
            drop_chance_base: default_drop_base(),
            drop_chance_divisor: default_drop_divisor(),
            drop_chance_cap: default_drop_cap(),
        }
    }
}

impl CombatConfig {
    /// Probability of an item drop, clamped to `[base, cap]`
    pub fn drop_chance(&self, enemy_power: i64) -> f64 {
        let raw = self.drop_chance_base + enemy_power as f64 / self.drop_chance_divisor;
        raw.max(self.drop_chance_base).min(self.drop_chance_cap)
    }

    /// Check that every rate is finite and non-negative and that the drop
    /// chance bounds form a range inside `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("xp_per_power", self.xp_per_power),
            ("xp_per_strength", self.xp_per_strength),
            ("gold_per_power", self.gold_per_power),
            ("resource_per_power", self.resource_per_power),
            ("drop_chance_base", self.drop_chance_base),
            ("drop_chance_cap", self.drop_chance_cap),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!("{} must be finite and >= 0", name)));
            }
        }
        if !(self.drop_chance_divisor.is_finite() && self.drop_chance_divisor > 0.0) {
            return Err(Error::InvalidConfig("drop_chance_divisor must be > 0".to_string()));
        }
        if self.drop_chance_base > self.drop_chance_cap || self.drop_chance_cap > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "drop chance range {}..{} is not within 0..1",
                self.drop_chance_base, self.drop_chance_cap
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_chance_clamped() {
        let combat = CombatConfig::default();
        assert_eq!(combat.drop_chance(0), 0.3);
        assert_eq!(combat.drop_chance(-500), 0.3);
        assert!((combat.drop_chance(200) - 0.5).abs() < 1e-9);
        assert_eq!(combat.drop_chance(400), 0.7);
        assert_eq!(combat.drop_chance(1_000_000), 0.7);
    }

    #[test]
    fn test_inverted_drop_bounds() {
        let combat = CombatConfig {
            drop_chance_base: 0.9,
            drop_chance_cap: 0.2,
            ..CombatConfig::default()
        };
        assert_eq!(combat.drop_chance(0), 0.2);
        assert_eq!(combat.drop_chance(5000), 0.2);
        assert!(matches!(combat.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        assert!(EngineConfig::default().validate().is_ok());

        let nan_cap = CombatConfig {
            drop_chance_cap: f64::NAN,
            ..CombatConfig::default()
        };
        assert!((nan_cap.drop_chance(100) - 0.4).abs() < 1e-9);
        assert!(matches!(nan_cap.validate(), Err(Error::InvalidConfig(_))));

        let zero_divisor = CombatConfig {
            drop_chance_divisor: 0.0,
            ..CombatConfig::default()
        };
        assert!(zero_divisor.validate().is_err());

        let negative_gold = CombatConfig {
            gold_per_power: -1.0,
            ..CombatConfig::default()
        };
        assert!(negative_gold.validate().is_err());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: EngineConfig = ron::from_str("(default_radius: 4)").expect("parse");
        assert_eq!(config.default_radius, 4);
        assert_eq!(config.seed, default_seed());
        assert_eq!(config.combat.reward_resources.len(), 2);
    }
}
