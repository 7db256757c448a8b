//! Encounter resolution: salvage options, success chances and roll settlement.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{ANOMALY_BONUS_PER_VISIT, MAX_SALVAGE_OPTIONS, SUCCESS_CHANCE_CAP};
use crate::items::{Item, ItemCatalog, ItemPerk, ItemSlot, ShipLoadout};
use crate::map::{MapNode, NodeType};
use crate::numbers::{u32_to_f64, usize_to_f64};
use crate::rng::pick_some;

/// One item the player may try to pull from a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalvageOption {
    pub slot: ItemSlot,
    pub item: Item,
    pub success_chance: f64,
}

/// Transient choice state for the node the ship is sitting on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalvageState {
    pub node_id: u32,
    pub node_type: NodeType,
    pub options: SmallVec<[SalvageOption; MAX_SALVAGE_OPTIONS]>,
    pub selected: Option<usize>,
    pub scrap_success_chance: f64,
}

impl SalvageState {
    #[must_use]
    pub fn selected_option(&self) -> Option<&SalvageOption> {
        self.selected.and_then(|idx| self.options.get(idx))
    }

    /// Move the tentative selection. Returns false for an out-of-range index.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }
}

/// Bonus from anomaly-reading gear: each equipped insight item adds a fixed
/// amount per prior anomaly visit. Zero away from anomalies.
#[must_use]
pub fn anomaly_bonus(node_type: NodeType, loadout: &ShipLoadout, prior_visits: u32) -> f64 {
    if node_type != NodeType::Anomaly {
        return 0.0;
    }
    let stacks = usize_to_f64(loadout.perk_count(ItemPerk::AnomalyInsight));
    ANOMALY_BONUS_PER_VISIT * u32_to_f64(prior_visits) * stacks
}

fn capped(chance: f64) -> f64 {
    chance.min(SUCCESS_CHANCE_CAP)
}

/// Build the salvage state for a freshly reached node.
///
/// Samples up to three distinct items whose affinity matches the node type.
/// With an empty pool the state carries no options and no selection, but
/// the scrap-only chance is still valid.
pub fn resolve_encounter<R: Rng + ?Sized>(
    node: &MapNode,
    loadout: &ShipLoadout,
    catalog: &ItemCatalog,
    prior_anomaly_visits: u32,
    rng: &mut R,
) -> SalvageState {
    let pool = catalog.for_affinity(node.kind);
    let bonus = anomaly_bonus(node.kind, loadout, prior_anomaly_visits);

    let options: SmallVec<[SalvageOption; MAX_SALVAGE_OPTIONS]> =
        pick_some(&pool, MAX_SALVAGE_OPTIONS, rng)
            .into_iter()
            .map(|item| SalvageOption {
                slot: item.slot,
                item: item.clone(),
                success_chance: capped(item.rarity.base_chance() + bonus),
            })
            .collect();
    let selected = if options.is_empty() { None } else { Some(0) };
    let scrap_success_chance = capped(node.kind.profile().scrap_chance + bonus);

    log::debug!(
        "Encounter opened | node:{} type:{} options:{} scrap_chance:{:.2} bonus:{:.2}",
        node.id,
        node.kind,
        options.len(),
        scrap_success_chance,
        bonus
    );

    SalvageState {
        node_id: node.id,
        node_type: node.kind,
        options,
        selected,
        scrap_success_chance,
    }
}

/// A roll equal to the chance counts as success.
#[must_use]
pub fn roll_succeeds(roll: f64, chance: f64) -> bool {
    roll <= chance
}

/// Whether a failed roll is bought off with scrap instead of a failure draw.
#[must_use]
pub fn codebreaker_pays_off(node_type: NodeType, loadout: &ShipLoadout, scrap: u32) -> bool {
    node_type == NodeType::Pirate && loadout.has_perk(ItemPerk::Codebreaker) && scrap > 0
}
