//! The run state machine.
//!
//! [`Expedition`] owns every piece of mutable run data and exposes one
//! method per player command. Map generation, encounter resolution and
//! narrative lookup are pure collaborators fed from here.
mod encounter_flow;
mod planning;
mod playback;
mod snapshot;
mod state;
mod traversal;

use std::sync::Arc;
use thiserror::Error;

pub use encounter_flow::Resolution;
pub use planning::{ExtendOutcome, LaunchReport, RouteDecision};
pub use playback::PlaybackDriver;
pub use snapshot::ExpeditionSnapshot;
pub use state::{LogEntry, Phase, RunState};
pub use traversal::{BlockReason, StepOutcome};

use crate::config::{ConfigError, ExpeditionConfig};
use crate::constants::LOG_PATH_TOO_SHORT;
use crate::geometry::Point;
use crate::items::{ItemCatalog, LoadoutError, ShipLoadout};
use crate::map::{MapFragment, generate_fragment};
use crate::narrative::{CatalogNarrator, Narrator};
use crate::result::{RunOutcome, RunSummary};
use crate::rng::RngBundle;
use crate::stats::RunStats;

/// Building an expedition failed.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid expedition config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid starting loadout: {0}")]
    Loadout(#[from] LoadoutError),
    #[error("item catalog could not be parsed: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// A command was rejected. The run is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("command needs phase {expected}, run is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("{msg} (path has {points} points)", msg = LOG_PATH_TOO_SHORT)]
    PathTooShort { points: usize },
    #[error("no encounter is open")]
    NoEncounter,
    #[error("no salvage option is selected")]
    NoSelection,
    #[error("option {index} is out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("no failure is waiting for acknowledgment")]
    NoFailure,
    #[error("no route decision is pending")]
    NoDecisionPending,
}

/// One expedition: a map fragment plus the run playing out on it.
#[derive(Debug, Clone)]
pub struct Expedition<N: Narrator = CatalogNarrator> {
    cfg: ExpeditionConfig,
    rng: RngBundle,
    catalog: Arc<ItemCatalog>,
    narrator: N,
    fragment: MapFragment,
    state: RunState,
}

impl Expedition<CatalogNarrator> {
    /// Free-running expedition on the bundled catalog.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` when the config is invalid or the starting
    /// loadout cannot be resolved.
    pub fn new(cfg: ExpeditionConfig) -> Result<Self, SetupError> {
        Self::with_parts(
            cfg,
            RngBundle::from_entropy(),
            ItemCatalog::shared(),
            CatalogNarrator,
        )
    }

    /// Reproducible expedition for an injected seed.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` when the config is invalid or the starting
    /// loadout cannot be resolved.
    pub fn with_seed(cfg: ExpeditionConfig, seed: u64) -> Result<Self, SetupError> {
        Self::with_parts(
            cfg,
            RngBundle::from_user_seed(seed),
            ItemCatalog::shared(),
            CatalogNarrator,
        )
    }

    /// Seeded expedition on alternative item content.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::Catalog` when the JSON does not parse, plus the
    /// errors of [`Expedition::with_parts`].
    pub fn with_catalog_json(
        cfg: ExpeditionConfig,
        seed: u64,
        catalog_json: &str,
    ) -> Result<Self, SetupError> {
        let catalog = ItemCatalog::from_json(catalog_json)?;
        Self::with_parts(
            cfg,
            RngBundle::from_user_seed(seed),
            Arc::new(catalog),
            CatalogNarrator,
        )
    }
}

impl<N: Narrator> Expedition<N> {
    /// Assemble an expedition from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` when the config is invalid or the starting
    /// loadout cannot be resolved against `catalog`.
    pub fn with_parts(
        cfg: ExpeditionConfig,
        mut rng: RngBundle,
        catalog: Arc<ItemCatalog>,
        narrator: N,
    ) -> Result<Self, SetupError> {
        cfg.validate()?;
        let loadout = ShipLoadout::from_config(&cfg.start.loadout, &catalog)?;
        let fragment = generate_fragment(&cfg.map, rng.map());
        let stats = fresh_stats(&cfg, &loadout);
        log::debug!("Expedition created | seed:{}", rng.seed());
        Ok(Self {
            cfg,
            rng,
            catalog,
            narrator,
            fragment,
            state: RunState::new(stats, loadout),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ExpeditionConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn fragment(&self) -> &MapFragment {
        &self.fragment
    }

    #[must_use]
    pub const fn state(&self) -> &RunState {
        &self.state
    }

    /// Mutable access for harnesses that script outcomes.
    pub const fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub const fn stats(&self) -> &RunStats {
        &self.state.stats
    }

    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        &self.state.log
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    #[must_use]
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn narrator(&self) -> &N {
        &self.narrator
    }

    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.total_draws()
    }

    /// Generate a fresh fragment and restart the run on it.
    pub fn new_map(&mut self) {
        let fragment = generate_fragment(&self.cfg.map, self.rng.map());
        self.load_fragment(fragment);
    }

    /// Restart the run on a given fragment. The loadout carries over; stats
    /// return to the configured start with the loadout's deltas applied.
    pub fn load_fragment(&mut self, fragment: MapFragment) {
        self.fragment = fragment;
        self.state.clear_traversal();
        self.state.stats = fresh_stats(&self.cfg, &self.state.loadout);
        self.state.anomaly_visits = 0;
        self.state.signal_bender_used = false;
        log::debug!("Map reset | nodes:{}", self.fragment.nodes.len());
    }

    /// Wipe the drawn path and refill fuel. Hull, loadout and run-wide perk
    /// usage carry over; carried scrap does not.
    pub fn erase_path(&mut self) {
        self.state.clear_traversal();
        self.state.stats.refuel();
        self.state.stats.forfeit_scrap();
        log::debug!("Path erased | fuel:{:.2}", self.state.stats.fuel);
    }

    /// Where the ship marker sits right now.
    #[must_use]
    pub fn ship_position(&self) -> Point {
        let path = &self.state.path;
        let Some(last) = path.last() else {
            return self.fragment.base_position();
        };
        if self.state.phase == Phase::Planning {
            return *last;
        }
        path.get(self.state.cursor).copied().unwrap_or(*last)
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::new(
            self.seed(),
            self.state.outcome,
            &self.state.stats,
            self.state.visited.len(),
            self.state.ledger,
        )
    }

    pub(crate) fn push_log(&mut self, node_id: Option<u32>, message: impl Into<String>) {
        self.state.log.push(LogEntry::new(node_id, message));
    }

    pub(crate) fn complete(&mut self, outcome: RunOutcome) {
        self.state.phase = Phase::Complete;
        self.state.outcome = Some(outcome);
        self.state.clear_transients();
        log::info!(
            "Run complete | outcome:{} scrap:{} hull:{} visited:{}",
            outcome,
            self.state.stats.scrap,
            self.state.stats.hull,
            self.state.visited.len()
        );
    }

    pub(crate) fn require_phase(&self, expected: Phase) -> Result<(), CommandError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(CommandError::WrongPhase {
                expected,
                actual: self.state.phase,
            })
        }
    }
}

fn fresh_stats(cfg: &ExpeditionConfig, loadout: &ShipLoadout) -> RunStats {
    let mut stats = cfg.start.initial_stats();
    stats.apply_equip(None, Some(&loadout.total_effect()));
    stats.hull = stats.max_hull;
    stats.refuel();
    stats
}
