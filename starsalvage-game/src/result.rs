//! End-of-run outcome and summary
use serde::{Deserialize, Serialize};

use crate::stats::RunStats;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// Returned to Base or reached an Exit with salvage intact
    Secured,
    /// Path ended away from Base; carried scrap was forfeited
    Lost,
    /// The hull gave out under the `end_run` breach rule
    Breached,
}

impl RunOutcome {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Secured => "secured",
            Self::Lost => "lost",
            Self::Breached => "breached",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Counters accumulated while the run plays out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunLedger {
    pub steps: u32,
    pub encounters_opened: u32,
    pub items_salvaged: u32,
    pub scrap_strips: u32,
    pub sites_ignored: u32,
    pub failures_suffered: u32,
    pub pirate_payoffs: u32,
    pub signal_bypasses: u32,
    pub redraws: u32,
}

/// Snapshot of a finished (or abandoned) run for reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub outcome: Option<RunOutcome>,
    pub scrap_banked: u32,
    pub hull_left: i32,
    pub fuel_left: f64,
    pub nodes_visited: usize,
    pub ledger: RunLedger,
}

impl RunSummary {
    #[must_use]
    pub fn new(
        seed: u64,
        outcome: Option<RunOutcome>,
        stats: &RunStats,
        nodes_visited: usize,
        ledger: RunLedger,
    ) -> Self {
        let scrap_banked = match outcome {
            Some(RunOutcome::Secured) => stats.scrap,
            _ => 0,
        };
        Self {
            seed,
            outcome,
            scrap_banked,
            hull_left: stats.display_hull(),
            fuel_left: stats.fuel,
            nodes_visited,
            ledger,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }
}
