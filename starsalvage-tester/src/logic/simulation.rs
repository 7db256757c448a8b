use anyhow::{Context, Result, bail};
use serde::Serialize;
use starsalvage_game::{
    Expedition, ExpeditionConfig, NodeType, Phase, PlaybackDriver, Point, Resolution,
    RouteDecision, RunSummary,
};

use crate::logic::policy::{AutopilotStrategy, EncounterChoice, PilotPolicy, RoutePlanner};

/// Configuration for one autopilot run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: AutopilotStrategy,
    pub max_steps: usize,
    pub expedition: ExpeditionConfig,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: AutopilotStrategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            max_steps: 500,
            expedition: ExpeditionConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn with_expedition(mut self, expedition: ExpeditionConfig) -> Self {
        self.expedition = expedition;
        self
    }
}

/// One resolved encounter.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub node_id: u32,
    pub node_type: NodeType,
    pub choice: &'static str,
    pub resolution: Resolution,
}

/// Everything the reports need from a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub strategy: AutopilotStrategy,
    pub summary: RunSummary,
    pub decisions: Vec<DecisionRecord>,
    pub retreated: bool,
    /// False when the step cap ran out before the run completed.
    pub completed: bool,
}

/// Headless harness that flies one expedition with a policy.
pub struct SimulationSession {
    expedition: Expedition,
    policy: Box<dyn PilotPolicy + Send>,
    planner: RoutePlanner,
    strategy: AutopilotStrategy,
    max_steps: usize,
    decisions: Vec<DecisionRecord>,
    retreated: bool,
}

impl SimulationSession {
    /// # Errors
    ///
    /// Returns an error when the expedition cannot be built from the config.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let expedition = Expedition::with_seed(config.expedition, config.seed)
            .with_context(|| format!("failed to build expedition for seed {}", config.seed))?;
        Ok(Self {
            expedition,
            policy: config.strategy.create_policy(),
            planner: RoutePlanner::new(config.seed),
            strategy: config.strategy,
            max_steps: config.max_steps,
            decisions: Vec::new(),
            retreated: false,
        })
    }

    /// Plan, launch and fly until the run completes or the step cap is hit.
    ///
    /// # Errors
    ///
    /// Returns an error when the planned route is rejected or a command the
    /// autopilot issues is refused.
    pub fn run(mut self) -> Result<RunRecord> {
        let route = self.planner.plan_loop(&self.expedition, self.policy.as_ref());
        self.draw(&route);
        self.expedition
            .launch()
            .with_context(|| format!("launch rejected for seed {}", self.expedition.seed()))?;
        log::debug!(
            "{} launched seed {} with {} points",
            self.policy.name(),
            self.expedition.seed(),
            self.expedition.state().path.len()
        );

        while self.steps_taken() < self.max_steps {
            let budget = self.max_steps - self.steps_taken();
            PlaybackDriver::run_until_blocked(&mut self.expedition, budget);
            match self.expedition.phase() {
                Phase::Complete => break,
                Phase::Choice => self.handle_choice()?,
                Phase::Planning => bail!("autopilot stalled in planning"),
                Phase::Resolving => {}
            }
        }

        let completed = self.expedition.phase() == Phase::Complete;
        Ok(RunRecord {
            seed: self.expedition.seed(),
            strategy: self.strategy,
            summary: self.expedition.summary(),
            decisions: self.decisions,
            retreated: self.retreated,
            completed,
        })
    }

    fn steps_taken(&self) -> usize {
        usize::try_from(self.expedition.state().ledger.steps).unwrap_or(usize::MAX)
    }

    fn draw(&mut self, points: &[Point]) {
        for point in points {
            let outcome = self.expedition.extend_path(*point);
            if !outcome.is_accepted() {
                log::trace!("sample {point:?} rejected: {outcome:?}");
            }
        }
    }

    fn handle_choice(&mut self) -> Result<()> {
        if let Some(salvage) = self.expedition.state().salvage.clone() {
            let choice = self.policy.choose(&self.expedition, &salvage);
            let resolution = match choice {
                EncounterChoice::Salvage(idx) => {
                    self.expedition.select_option(idx)?;
                    self.expedition.confirm_salvage()?
                }
                EncounterChoice::Scrap => self.expedition.confirm_scrap()?,
                EncounterChoice::Ignore => self.expedition.ignore_site()?,
            };
            self.decisions.push(DecisionRecord {
                node_id: salvage.node_id,
                node_type: salvage.node_type,
                choice: choice.label(),
                resolution,
            });
            return Ok(());
        }
        if self.expedition.state().failure.is_some() {
            self.expedition.acknowledge_failure()?;
            return Ok(());
        }
        if self.expedition.state().decision_pending {
            return self.decide_route();
        }
        bail!("choice phase with nothing to resolve")
    }

    fn decide_route(&mut self) -> Result<()> {
        let hull = self.expedition.stats().hull;
        let wants_home = self
            .policy
            .retreat_hull()
            .is_some_and(|threshold| hull <= threshold);
        let home = if wants_home {
            self.planner.plan_home(&self.expedition)
        } else {
            None
        };

        let Some(points) = home else {
            self.expedition.decide_route(RouteDecision::Continue)?;
            return Ok(());
        };
        self.expedition.decide_route(RouteDecision::Redraw)?;
        let kept = self.expedition.state().path.len();
        self.draw(&points);
        if self.expedition.state().path.len() == kept {
            bail!("retreat path could not be drawn");
        }
        self.expedition.launch()?;
        self.retreated = true;
        log::debug!("{} retreating home at hull {hull}", self.policy.name());
        Ok(())
    }
}
