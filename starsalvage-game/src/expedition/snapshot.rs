use serde::{Deserialize, Serialize};

use super::{Expedition, LogEntry, Phase};
use crate::encounter::SalvageState;
use crate::failures::FailurePopup;
use crate::geometry::Point;
use crate::items::ShipLoadout;
use crate::map::MapFragment;
use crate::narrative::Narrator;
use crate::result::RunOutcome;
use crate::stats::RunStats;

/// Read-only view handed to a presentation layer after every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpeditionSnapshot {
    pub fragment: MapFragment,
    pub phase: Phase,
    /// Hull is clamped to `0..=max_hull` here.
    pub stats: RunStats,
    pub log: Vec<LogEntry>,
    pub path: Vec<Point>,
    pub cursor: usize,
    pub ship_position: Point,
    pub visited: Vec<u32>,
    pub salvage: Option<SalvageState>,
    pub failure: Option<FailurePopup>,
    pub decision_pending: bool,
    pub loadout: ShipLoadout,
    pub signal_bender_used: bool,
    pub anomaly_visits: u32,
    pub outcome: Option<RunOutcome>,
}

impl<N: Narrator> Expedition<N> {
    #[must_use]
    pub fn snapshot(&self) -> ExpeditionSnapshot {
        let state = &self.state;
        let mut stats = state.stats;
        stats.hull = stats.display_hull();
        ExpeditionSnapshot {
            fragment: self.fragment.clone(),
            phase: state.phase,
            stats,
            log: state.log.clone(),
            path: state.path.clone(),
            cursor: state.cursor,
            ship_position: self.ship_position(),
            visited: state.visited.clone(),
            salvage: state.salvage.clone(),
            failure: state.failure.clone(),
            decision_pending: state.decision_pending,
            loadout: state.loadout.clone(),
            signal_bender_used: state.signal_bender_used,
            anomaly_visits: state.anomaly_visits,
            outcome: state.outcome,
        }
    }
}
