//! One-segment-per-tick traversal and node hit detection.
use serde::{Deserialize, Serialize};

use super::{Expedition, Phase};
use crate::constants::{
    LOG_BASE_DOCKED, LOG_EXIT_REACHED, LOG_PATH_LOST, LOG_PATH_SECURED, LOG_SIGNAL_BENDER,
    MIN_LAUNCH_POINTS,
};
use crate::encounter::resolve_encounter;
use crate::geometry::{Point, distance, distance_to_segment};
use crate::items::ItemPerk;
use crate::map::{ArrivalRule, MapNode, NodeType};
use crate::narrative::Narrator;
use crate::result::RunOutcome;

/// Why a step cannot run right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    NotResolving,
    EncounterOpen,
    FailurePending,
    DecisionPending,
    PathTooShort,
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Blocked(BlockReason),
    /// Cursor advanced without reaching a node.
    Moved { cursor: usize },
    /// A node opened an encounter; the run now waits in `Choice`.
    Encounter { node_id: u32 },
    /// A pirate node was spoofed by the signal bender; traversal continues.
    Bypassed { node_id: u32 },
    Completed(RunOutcome),
}

impl<N: Narrator> Expedition<N> {
    /// First condition that keeps the ship from moving, if any.
    #[must_use]
    pub fn block_reason(&self) -> Option<BlockReason> {
        let state = &self.state;
        if state.phase != Phase::Resolving {
            Some(BlockReason::NotResolving)
        } else if state.salvage.is_some() {
            Some(BlockReason::EncounterOpen)
        } else if state.failure.is_some() {
            Some(BlockReason::FailurePending)
        } else if state.decision_pending {
            Some(BlockReason::DecisionPending)
        } else if state.path.len() < MIN_LAUNCH_POINTS {
            Some(BlockReason::PathTooShort)
        } else {
            None
        }
    }

    #[must_use]
    pub fn can_step(&self) -> bool {
        self.block_reason().is_none()
    }

    /// Advance the ship by exactly one path point.
    ///
    /// At most one node is resolved per call. Running past the last point
    /// ends the run: secured when the path ends on BASE, lost otherwise.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(reason) = self.block_reason() {
            return StepOutcome::Blocked(reason);
        }
        self.state.ledger.steps = self.state.ledger.steps.saturating_add(1);

        let next = self.state.cursor + 1;
        if next >= self.state.path.len() {
            return self.finish_path();
        }

        let from = self.state.path[self.state.cursor];
        let to = self.state.path[next];
        let hit = self.find_hit(from, to).cloned();
        self.state.cursor = next;

        let Some(node) = hit else {
            return StepOutcome::Moved { cursor: next };
        };
        self.arrive(&node)
    }

    /// Nearest unvisited node within hit radius of segment `from -> to`.
    /// Exact ties go to the earlier node in fragment order.
    fn find_hit(&self, from: Point, to: Point) -> Option<&MapNode> {
        let radius = self.cfg.travel.hit_radius;
        let mut best: Option<(&MapNode, f64)> = None;
        for node in &self.fragment.nodes {
            if self.state.has_visited(node.id) {
                continue;
            }
            let d = distance_to_segment(node.position(), from, to);
            if d <= radius && best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((node, d));
            }
        }
        best.map(|(node, _)| node)
    }

    fn finish_path(&mut self) -> StepOutcome {
        let last_index = self.state.path.len().saturating_sub(1);
        self.state.cursor = last_index;
        let end = self.state.path[last_index];
        let base = self.fragment.base().map(|node| (node.id, node.position()));
        let home = base.filter(|(_, pos)| distance(end, *pos) <= self.cfg.travel.hit_radius);

        let outcome = if let Some((base_id, _)) = home {
            self.push_log(Some(base_id), LOG_PATH_SECURED);
            RunOutcome::Secured
        } else {
            self.state.stats.forfeit_scrap();
            self.push_log(None, LOG_PATH_LOST);
            RunOutcome::Lost
        };
        self.complete(outcome);
        StepOutcome::Completed(outcome)
    }

    fn arrive(&mut self, node: &MapNode) -> StepOutcome {
        self.state.visited.push(node.id);
        let narrative = self.narrator.describe(node);
        self.push_log(Some(node.id), narrative.title);
        self.push_log(Some(node.id), narrative.flavor);
        log::debug!(
            "Node hit | id:{} type:{} cursor:{}",
            node.id,
            node.kind,
            self.state.cursor
        );

        match node.kind.profile().arrival {
            ArrivalRule::Encounter => self.open_encounter(node),
            ArrivalRule::Hostile => {
                if self.state.loadout.has_perk(ItemPerk::SignalBender)
                    && !self.state.signal_bender_used
                {
                    self.state.signal_bender_used = true;
                    self.state.ledger.signal_bypasses =
                        self.state.ledger.signal_bypasses.saturating_add(1);
                    self.push_log(Some(node.id), LOG_SIGNAL_BENDER);
                    log::debug!("Signal bender spoofed node {}", node.id);
                    StepOutcome::Bypassed { node_id: node.id }
                } else {
                    self.open_encounter(node)
                }
            }
            ArrivalRule::Haven => {
                let message = if node.kind == NodeType::Exit {
                    LOG_EXIT_REACHED
                } else {
                    LOG_BASE_DOCKED
                };
                self.push_log(Some(node.id), message);
                self.complete(RunOutcome::Secured);
                StepOutcome::Completed(RunOutcome::Secured)
            }
        }
    }

    fn open_encounter(&mut self, node: &MapNode) -> StepOutcome {
        let prior_visits = self.state.anomaly_visits;
        let salvage = resolve_encounter(
            node,
            &self.state.loadout,
            &self.catalog,
            prior_visits,
            self.rng.encounter(),
        );
        if node.kind == NodeType::Anomaly {
            self.state.anomaly_visits = prior_visits.saturating_add(1);
        }
        self.state.salvage = Some(salvage);
        self.state.phase = Phase::Choice;
        self.state.ledger.encounters_opened = self.state.ledger.encounters_opened.saturating_add(1);
        log::debug!("Phase -> choice (node {})", node.id);
        StepOutcome::Encounter { node_id: node.id }
    }
}
