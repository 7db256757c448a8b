//! Item catalog, slots and the equipped loadout.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::config::LoadoutConfig;
use crate::map::NodeType;

const DEFAULT_ITEM_DATA: &str = include_str!("../assets/items.json");

/// Equipment slot. A loadout holds exactly one item per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemSlot {
    Core,
    Engine,
    Hull,
    Scanner,
    Utility1,
    Utility2,
}

impl ItemSlot {
    pub const ALL: [Self; 6] = [
        Self::Core,
        Self::Engine,
        Self::Hull,
        Self::Scanner,
        Self::Utility1,
        Self::Utility2,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Core => 0,
            Self::Engine => 1,
            Self::Hull => 2,
            Self::Scanner => 3,
            Self::Utility1 => 4,
            Self::Utility2 => 5,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Core => "CORE",
            Self::Engine => "ENGINE",
            Self::Hull => "HULL",
            Self::Scanner => "SCANNER",
            Self::Utility1 => "UTILITY1",
            Self::Utility2 => "UTILITY2",
        }
    }
}

impl fmt::Display for ItemSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Artifact,
}

impl Rarity {
    /// Base salvage success chance before node bonuses.
    #[must_use]
    pub const fn base_chance(self) -> f64 {
        match self {
            Self::Common => 0.8,
            Self::Uncommon => 0.6,
            Self::Rare => 0.4,
            Self::Artifact => 0.35,
        }
    }
}

/// Changes to stat ceilings while an item is equipped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemEffect {
    pub max_hull_delta: i32,
    pub max_fuel_delta: f64,
}

/// Conditional rule an item switches on while equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPerk {
    /// The path's first segment costs no fuel.
    FirstSegmentFree,
    /// Anomaly success chances grow with each prior anomaly visit.
    AnomalyInsight,
    /// A failed pirate roll can be paid off with scrap.
    Codebreaker,
    /// The first pirate node of a run is treated as neutral.
    SignalBender,
    /// Wreck failures refund scrap.
    RiskRecycler,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub slot: ItemSlot,
    pub rarity: Rarity,
    #[serde(default)]
    pub description: String,
    pub node_affinity: NodeType,
    #[serde(default)]
    pub effect: Option<ItemEffect>,
    #[serde(default)]
    pub perk: Option<ItemPerk>,
}

impl Item {
    #[must_use]
    pub fn has_perk(&self, perk: ItemPerk) -> bool {
        self.perk == Some(perk)
    }
}

/// Read-only item catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ItemCatalog {
    #[serde(default)]
    pub items: Vec<Item>,
}

impl ItemCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_ITEM_DATA).unwrap_or_default()
    }

    /// Shared handle to the bundled catalog, parsed once.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        static CATALOG: OnceLock<Arc<ItemCatalog>> = OnceLock::new();
        Arc::clone(CATALOG.get_or_init(|| Arc::new(Self::load_from_static())))
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into an item catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items that usually turn up at nodes of `kind`, in catalog order.
    #[must_use]
    pub fn for_affinity(&self, kind: NodeType) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.node_affinity == kind)
            .collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadoutError {
    #[error("item `{0}` is not in the catalog")]
    UnknownItem(String),
    #[error("item `{id}` fits slot {found}, not {expected}")]
    WrongSlot {
        id: String,
        expected: ItemSlot,
        found: ItemSlot,
    },
}

/// One equipped item per slot, indexed by [`ItemSlot::index`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipLoadout {
    slots: [Item; 6],
}

impl ShipLoadout {
    /// Resolve configured ids against the catalog.
    ///
    /// # Errors
    ///
    /// Returns `LoadoutError` when an id is unknown or names an item for a
    /// different slot.
    pub fn from_config(cfg: &LoadoutConfig, catalog: &ItemCatalog) -> Result<Self, LoadoutError> {
        let mut resolved = Vec::with_capacity(ItemSlot::ALL.len());
        for (slot, id) in ItemSlot::ALL.into_iter().zip(cfg.ids()) {
            let item = catalog
                .by_id(id)
                .ok_or_else(|| LoadoutError::UnknownItem(id.to_string()))?;
            if item.slot != slot {
                return Err(LoadoutError::WrongSlot {
                    id: id.to_string(),
                    expected: slot,
                    found: item.slot,
                });
            }
            resolved.push(item.clone());
        }
        let slots: [Item; 6] = resolved
            .try_into()
            .map_err(|_| LoadoutError::UnknownItem(String::from("<incomplete loadout>")))?;
        Ok(Self { slots })
    }

    #[must_use]
    pub const fn get(&self, slot: ItemSlot) -> &Item {
        &self.slots[slot.index()]
    }

    /// Put `item` into its slot and hand back the item it replaced.
    pub fn equip(&mut self, item: Item) -> Item {
        let slot = item.slot;
        std::mem::replace(&mut self.slots[slot.index()], item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemSlot, &Item)> {
        ItemSlot::ALL.into_iter().zip(self.slots.iter())
    }

    #[must_use]
    pub fn has_perk(&self, perk: ItemPerk) -> bool {
        self.slots.iter().any(|item| item.has_perk(perk))
    }

    /// Number of equipped items carrying `perk`; stacking perks add up.
    #[must_use]
    pub fn perk_count(&self, perk: ItemPerk) -> usize {
        self.slots.iter().filter(|item| item.has_perk(perk)).count()
    }

    /// Sum of max-stat deltas across every equipped item.
    #[must_use]
    pub fn total_effect(&self) -> ItemEffect {
        self.slots
            .iter()
            .filter_map(|item| item.effect)
            .fold(ItemEffect::default(), |acc, effect| ItemEffect {
                max_hull_delta: acc.max_hull_delta.saturating_add(effect.max_hull_delta),
                max_fuel_delta: acc.max_fuel_delta + effect.max_fuel_delta,
            })
    }
}
