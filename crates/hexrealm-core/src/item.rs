//! Inventory items dropped by conquered garrisons

use crate::catalog::{Catalog, Slot};
use crate::{DefId, GameId, ItemId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An item owned by a game's inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub game: GameId,
    pub template: DefId,
    pub rarity: DefId,
    pub equipped: bool,
    pub acquired_at: DateTime<Utc>,
}

/// An item not yet persisted; the store assigns its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub template: DefId,
    pub rarity: DefId,
}

impl NewItem {
    pub fn new(template: impl Into<DefId>, rarity: impl Into<DefId>) -> Self {
        Self {
            template: template.into(),
            rarity: rarity.into(),
        }
    }

    /// Attach an id; new items always start unequipped
    pub fn into_item(self, id: ItemId, game: GameId, acquired_at: DateTime<Utc>) -> Item {
        Item {
            id,
            game,
            template: self.template,
            rarity: self.rarity,
            equipped: false,
            acquired_at,
        }
    }
}

/// Base stats scaled by the rarity multiplier, rounded down
pub fn effective_stats(
    catalog: &Catalog,
    template: &DefId,
    rarity: &DefId,
) -> IndexMap<String, i64> {
    let multiplier = catalog.rarity(rarity).map(|r| r.stat_multiplier).unwrap_or(1.0);
    catalog
        .item(template)
        .map(|t| {
            t.base_stats
                .iter()
                .map(|(stat, base)| (stat.clone(), (*base as f64 * multiplier).floor() as i64))
                .collect()
        })
        .unwrap_or_default()
}

impl Item {
    pub fn stats(&self, catalog: &Catalog) -> IndexMap<String, i64> {
        effective_stats(catalog, &self.template, &self.rarity)
    }

    pub fn view(&self, catalog: &Catalog) -> ItemView {
        let template = catalog.item(&self.template);
        let rarity = catalog.rarity(&self.rarity);
        ItemView {
            id: self.id,
            template: self.template.clone(),
            name: template
                .map(|t| t.name.clone())
                .unwrap_or_else(|| self.template.to_string()),
            slot: template.map(|t| t.slot),
            description: template.map(|t| t.description.clone()).unwrap_or_default(),
            rarity: self.rarity.clone(),
            rarity_name: rarity
                .map(|r| r.name.clone())
                .unwrap_or_else(|| self.rarity.to_string()),
            rarity_color: rarity
                .map(|r| r.color.clone())
                .unwrap_or_else(|| "#9e9e9e".to_string()),
            stats: self.stats(catalog),
            equipped: self.equipped,
            acquired_at: self.acquired_at,
        }
    }
}

/// Item snapshot for transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub template: DefId,
    pub name: String,
    pub slot: Option<Slot>,
    pub description: String,
    pub rarity: DefId,
    pub rarity_name: String,
    pub rarity_color: String,
    pub stats: IndexMap<String, i64>,
    pub equipped: bool,
    pub acquired_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_catalog;

    #[test]
    fn test_rarity_scales_stats() {
        let catalog = test_catalog();
        let stats = effective_stats(&catalog, &"iron_sword".into(), &"rare".into());
        assert_eq!(stats.get("attack"), Some(&20));
        assert_eq!(stats.get("physical_attack"), Some(&10));

        let common = effective_stats(&catalog, &"iron_sword".into(), &"common".into());
        assert_eq!(common.get("attack"), Some(&10));
    }

    #[test]
    fn test_new_item_starts_unequipped() {
        let item =
            NewItem::new("iron_helmet", "legendary").into_item(ItemId(3), GameId(1), Utc::now());
        assert!(!item.equipped);
        let view = item.view(&test_catalog());
        assert_eq!(view.name, "Iron Helmet");
        assert_eq!(view.slot, Some(Slot::Helmet));
        assert_eq!(view.stats.get("hp"), Some(&60));
    }
}
