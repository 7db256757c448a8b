//! Choice-phase commands: salvage, scrap, ignore and failure acknowledgment.
use serde::{Deserialize, Serialize};

use super::{CommandError, Expedition, Phase};
use crate::config::HullBreachRule;
use crate::constants::{
    CODEBREAKER_SCRAP_COST, LOG_HULL_BREACH, LOG_PIRATE_PAYOFF, LOG_RISK_RECYCLERS,
    LOG_SITE_IGNORED, RISK_RECYCLER_SCRAP, SALVAGE_SCRAP_BONUS,
};
use crate::encounter::{SalvageState, codebreaker_pays_off, roll_succeeds};
use crate::failures::{FailureKind, draw_failure};
use crate::items::{Item, ItemPerk};
use crate::map::NodeType;
use crate::narrative::Narrator;
use crate::numbers::chance_to_percent;
use crate::result::RunOutcome;
use crate::rng::roll_unit;

/// How a choice-phase command played out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Item equipped and scrap granted.
    Salvaged { item_id: String },
    /// Site stripped for scrap.
    Stripped { reward: u32 },
    Ignored,
    /// Pirates took scrap instead of dealing damage.
    PaidOff,
    /// A failure popup now waits for acknowledgment.
    FailurePending(FailureKind),
    /// The acknowledged failure was applied.
    FailureApplied(FailureKind),
    /// The acknowledged failure breached the hull and ended the run.
    HullBreached(FailureKind),
}

impl<N: Narrator> Expedition<N> {
    fn pending_salvage(&self) -> Result<&SalvageState, CommandError> {
        self.require_phase(Phase::Choice)?;
        self.state.salvage.as_ref().ok_or(CommandError::NoEncounter)
    }

    /// Move the tentative salvage selection.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NoEncounter` without an open encounter and
    /// `CommandError::OptionOutOfRange` for a bad index.
    pub fn select_option(&mut self, index: usize) -> Result<(), CommandError> {
        let len = self.pending_salvage()?.options.len();
        let selected = self
            .state
            .salvage
            .as_mut()
            .is_some_and(|salvage| salvage.select(index));
        if selected {
            Ok(())
        } else {
            Err(CommandError::OptionOutOfRange { index, len })
        }
    }

    /// Roll for the selected salvage option.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NoEncounter` without an open encounter and
    /// `CommandError::NoSelection` when nothing is selected.
    pub fn confirm_salvage(&mut self) -> Result<Resolution, CommandError> {
        let salvage = self.pending_salvage()?;
        let option = salvage
            .selected_option()
            .cloned()
            .ok_or(CommandError::NoSelection)?;
        let (node_id, node_type) = (salvage.node_id, salvage.node_type);

        let roll = roll_unit(self.rng.salvage());
        log::debug!(
            "Salvage roll | node:{node_id} item:{} roll:{roll:.3} chance:{:.3}",
            option.item.id,
            option.success_chance
        );
        if !roll_succeeds(roll, option.success_chance) {
            return Ok(self.settle_failed_roll(node_id, node_type));
        }

        let item_id = option.item.id.clone();
        let name = option.item.name.clone();
        self.equip(option.item);
        self.state.stats.gain_scrap(SALVAGE_SCRAP_BONUS);
        self.push_log(
            Some(node_id),
            format!(
                "You salvage {name} ({}%).",
                chance_to_percent(option.success_chance)
            ),
        );
        self.state.ledger.items_salvaged = self.state.ledger.items_salvaged.saturating_add(1);
        self.await_route_decision();
        Ok(Resolution::Salvaged { item_id })
    }

    /// Roll to strip the site for scrap.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NoEncounter` without an open encounter.
    pub fn confirm_scrap(&mut self) -> Result<Resolution, CommandError> {
        let salvage = self.pending_salvage()?;
        let (node_id, node_type, chance) =
            (salvage.node_id, salvage.node_type, salvage.scrap_success_chance);

        let roll = roll_unit(self.rng.salvage());
        log::debug!("Scrap roll | node:{node_id} roll:{roll:.3} chance:{chance:.3}");
        if !roll_succeeds(roll, chance) {
            return Ok(self.settle_failed_roll(node_id, node_type));
        }

        let reward = node_type.profile().scrap_reward;
        self.state.stats.gain_scrap(reward);
        self.push_log(
            Some(node_id),
            format!("You strip the site for scrap (+{reward})."),
        );
        self.state.ledger.scrap_strips = self.state.ledger.scrap_strips.saturating_add(1);
        self.await_route_decision();
        Ok(Resolution::Stripped { reward })
    }

    /// Leave the site alone. Never rolls.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NoEncounter` without an open encounter.
    pub fn ignore_site(&mut self) -> Result<Resolution, CommandError> {
        let node_id = self.pending_salvage()?.node_id;
        self.push_log(Some(node_id), LOG_SITE_IGNORED);
        self.state.ledger.sites_ignored = self.state.ledger.sites_ignored.saturating_add(1);
        self.await_route_decision();
        Ok(Resolution::Ignored)
    }

    /// Apply the pending failure exactly once.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NoFailure` when no failure is waiting.
    pub fn acknowledge_failure(&mut self) -> Result<Resolution, CommandError> {
        self.require_phase(Phase::Choice)?;
        let popup = self.state.failure.take().ok_or(CommandError::NoFailure)?;

        self.state.stats = popup.apply(self.state.stats);
        self.state.ledger.failures_suffered = self.state.ledger.failures_suffered.saturating_add(1);
        self.push_log(None, format!("{}: {}", popup.title, popup.consequence));
        if popup.node_type == NodeType::Wreck && self.state.loadout.has_perk(ItemPerk::RiskRecycler)
        {
            self.state.stats.gain_scrap(RISK_RECYCLER_SCRAP);
            self.push_log(None, LOG_RISK_RECYCLERS);
        }
        log::debug!(
            "Failure applied | kind:{} hull:{} fuel:{:.2} scrap:{}",
            popup.kind.id(),
            self.state.stats.hull,
            self.state.stats.fuel,
            self.state.stats.scrap
        );

        if self.cfg.rules.hull_breach == HullBreachRule::EndRun && self.state.stats.is_breached() {
            self.state.stats.forfeit_scrap();
            self.push_log(None, LOG_HULL_BREACH);
            self.complete(RunOutcome::Breached);
            return Ok(Resolution::HullBreached(popup.kind));
        }

        self.await_route_decision();
        Ok(Resolution::FailureApplied(popup.kind))
    }

    /// Failed roll: the codebreaker pay-off takes precedence over a failure
    /// draw. The encounter closes either way.
    fn settle_failed_roll(&mut self, node_id: u32, node_type: NodeType) -> Resolution {
        if codebreaker_pays_off(node_type, &self.state.loadout, self.state.stats.scrap) {
            self.state.stats.lose_scrap(CODEBREAKER_SCRAP_COST);
            self.push_log(Some(node_id), LOG_PIRATE_PAYOFF);
            self.state.ledger.pirate_payoffs = self.state.ledger.pirate_payoffs.saturating_add(1);
            self.await_route_decision();
            return Resolution::PaidOff;
        }

        let popup = draw_failure(node_type, node_id, self.rng.failure());
        let kind = popup.kind;
        self.state.salvage = None;
        self.state.failure = Some(popup);
        Resolution::FailurePending(kind)
    }

    /// Swap `item` into its slot, moving max-stat deltas in one step.
    fn equip(&mut self, item: Item) {
        let slot = item.slot;
        let name = item.name.clone();
        let new_effect = item.effect;
        let old = self.state.loadout.equip(item);
        self.state
            .stats
            .apply_equip(old.effect.as_ref(), new_effect.as_ref());
        self.push_log(None, format!("Equipped {name} in {slot}."));
        log::debug!("Equipped {} in {slot} (replaced {})", name, old.id);
    }

    fn await_route_decision(&mut self) {
        self.state.salvage = None;
        self.state.decision_pending = true;
    }
}
