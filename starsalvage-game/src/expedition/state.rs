use serde::{Deserialize, Serialize};
use std::fmt;

use crate::encounter::SalvageState;
use crate::failures::FailurePopup;
use crate::geometry::Point;
use crate::items::ShipLoadout;
use crate::result::{RunLedger, RunOutcome};
use crate::stats::RunStats;

/// Run phase. Decides which commands the expedition accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Planning,
    Resolving,
    Choice,
    Complete,
}

impl Phase {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Resolving => "resolving",
            Self::Choice => "choice",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Player-facing log line, optionally tied to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub node_id: Option<u32>,
    pub message: String,
}

impl LogEntry {
    #[must_use]
    pub fn new(node_id: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            node_id,
            message: message.into(),
        }
    }
}

/// All mutable data for the current run. Owned by one [`super::Expedition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub stats: RunStats,
    pub loadout: ShipLoadout,
    pub phase: Phase,
    pub path: Vec<Point>,
    pub cursor: usize,
    /// Node ids in visit order.
    pub visited: Vec<u32>,
    pub salvage: Option<SalvageState>,
    pub failure: Option<FailurePopup>,
    pub decision_pending: bool,
    pub anomaly_visits: u32,
    pub signal_bender_used: bool,
    /// Set by a redraw: the next launch continues from `cursor`.
    pub resume_pending: bool,
    pub ledger: RunLedger,
    pub outcome: Option<RunOutcome>,
    pub log: Vec<LogEntry>,
}

impl RunState {
    #[must_use]
    pub fn new(stats: RunStats, loadout: ShipLoadout) -> Self {
        Self {
            stats,
            loadout,
            phase: Phase::Planning,
            path: Vec::new(),
            cursor: 0,
            visited: Vec::new(),
            salvage: None,
            failure: None,
            decision_pending: false,
            anomaly_visits: 0,
            signal_bender_used: false,
            resume_pending: false,
            ledger: RunLedger::default(),
            outcome: None,
            log: Vec::new(),
        }
    }

    /// Drop the path and every piece of traversal state tied to it.
    pub(crate) fn clear_traversal(&mut self) {
        self.path.clear();
        self.cursor = 0;
        self.visited.clear();
        self.clear_transients();
        self.phase = Phase::Planning;
        self.resume_pending = false;
        self.outcome = None;
        self.ledger = RunLedger::default();
        self.log.clear();
    }

    pub(crate) fn clear_transients(&mut self) {
        self.salvage = None;
        self.failure = None;
        self.decision_pending = false;
    }

    #[must_use]
    pub fn has_visited(&self, node_id: u32) -> bool {
        self.visited.contains(&node_id)
    }

    /// Whether a popup or route prompt is waiting on the player.
    #[must_use]
    pub const fn is_blocked_on_player(&self) -> bool {
        self.salvage.is_some() || self.failure.is_some() || self.decision_pending
    }
}
