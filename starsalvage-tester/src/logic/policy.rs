use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use starsalvage_game::{Expedition, MapNode, NodeType, Point, SalvageState};

/// What the autopilot does with an open encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterChoice {
    Salvage(usize),
    Scrap,
    Ignore,
}

impl EncounterChoice {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Salvage(_) => "salvage",
            Self::Scrap => "scrap",
            Self::Ignore => "ignore",
        }
    }
}

/// Policy interface for automated expeditions.
pub trait PilotPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Whether the route planner should fly through `node`.
    fn wants_target(&self, node: &MapNode) -> bool;

    /// Pick an action for the open encounter.
    fn choose(&mut self, expedition: &Expedition, salvage: &SalvageState) -> EncounterChoice;

    /// Hull level at or below which the pilot heads home after an encounter.
    fn retreat_hull(&self) -> Option<i32>;
}

/// Built-in autopilot strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutopilotStrategy {
    Cautious,
    Balanced,
    Greedy,
}

impl AutopilotStrategy {
    pub const ALL: [Self; 3] = [Self::Cautious, Self::Balanced, Self::Greedy];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::Balanced => "balanced",
            Self::Greedy => "greedy",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cautious => "Cautious",
            Self::Balanced => "Balanced",
            Self::Greedy => "Greedy",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cautious => "Skips pirates and anomalies, strips sites only on safe odds",
            Self::Balanced => "Salvages upgrades on decent odds, avoids pirates",
            Self::Greedy => "Visits everything and always goes for the rarest upgrade",
        }
    }

    #[must_use]
    pub fn create_policy(self) -> Box<dyn PilotPolicy + Send> {
        match self {
            Self::Cautious => Box::new(CautiousPilot),
            Self::Balanced => Box::new(BalancedPilot),
            Self::Greedy => Box::new(GreedyPilot),
        }
    }
}

impl fmt::Display for AutopilotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AutopilotStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(s.trim()))
        {
            Some(strategy) => Ok(strategy),
            None => bail!("Unknown strategy: {s}"),
        }
    }
}

/// Parse a comma-separated strategy list. `all` expands to every strategy.
pub fn parse_strategies(raw: &str) -> Result<Vec<AutopilotStrategy>> {
    let mut strategies = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if token.eq_ignore_ascii_case("all") {
            strategies.extend(AutopilotStrategy::ALL);
            continue;
        }
        strategies.push(token.parse()?);
    }
    strategies.sort_unstable();
    strategies.dedup();
    if strategies.is_empty() {
        strategies.extend(AutopilotStrategy::ALL);
    }
    Ok(strategies)
}

struct CautiousPilot;
struct BalancedPilot;
struct GreedyPilot;

impl PilotPolicy for CautiousPilot {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn wants_target(&self, node: &MapNode) -> bool {
        matches!(node.kind, NodeType::Wreck | NodeType::Beacon)
    }

    fn choose(&mut self, _expedition: &Expedition, salvage: &SalvageState) -> EncounterChoice {
        if salvage.node_type == NodeType::Pirate || salvage.scrap_success_chance < 0.85 {
            EncounterChoice::Ignore
        } else {
            EncounterChoice::Scrap
        }
    }

    fn retreat_hull(&self) -> Option<i32> {
        Some(2)
    }
}

impl PilotPolicy for BalancedPilot {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn wants_target(&self, node: &MapNode) -> bool {
        !matches!(node.kind, NodeType::Base | NodeType::Exit | NodeType::Pirate)
    }

    fn choose(&mut self, expedition: &Expedition, salvage: &SalvageState) -> EncounterChoice {
        let healthy = expedition.stats().hull > 1;
        let upgrade = upgrades(expedition, salvage)
            .filter(|(_, chance)| *chance >= 0.6)
            .max_by(|a, b| a.1.total_cmp(&b.1));
        match upgrade {
            Some((idx, _)) if healthy => EncounterChoice::Salvage(idx),
            _ if salvage.scrap_success_chance >= 0.75 => EncounterChoice::Scrap,
            _ => EncounterChoice::Ignore,
        }
    }

    fn retreat_hull(&self) -> Option<i32> {
        Some(1)
    }
}

impl PilotPolicy for GreedyPilot {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn wants_target(&self, node: &MapNode) -> bool {
        !matches!(node.kind, NodeType::Base | NodeType::Exit)
    }

    fn choose(&mut self, expedition: &Expedition, salvage: &SalvageState) -> EncounterChoice {
        upgrades(expedition, salvage)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(EncounterChoice::Scrap, |(idx, _)| EncounterChoice::Salvage(idx))
    }

    fn retreat_hull(&self) -> Option<i32> {
        None
    }
}

/// Options that would replace a different item, with their success chance.
fn upgrades<'a>(
    expedition: &'a Expedition,
    salvage: &'a SalvageState,
) -> impl Iterator<Item = (usize, f64)> + 'a {
    let loadout = &expedition.state().loadout;
    salvage
        .options
        .iter()
        .enumerate()
        .filter(move |(_, option)| loadout.get(option.slot).id != option.item.id)
        .map(|(idx, option)| (idx, option.success_chance))
}

/// Draws fuel-feasible freehand routes for the autopilot.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    rng: ChaCha20Rng,
    sample_spacing: f64,
    wobble: f64,
    fuel_margin: f64,
}

impl RoutePlanner {
    const HOP_DISTANCE: f64 = 3.0;

    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            sample_spacing: 4.0,
            wobble: 0.4,
            fuel_margin: 0.1,
        }
    }

    /// Greedy nearest-neighbour loop from BASE through wanted nodes and back,
    /// kept inside the current fuel budget.
    pub fn plan_loop(&mut self, expedition: &Expedition, policy: &dyn PilotPolicy) -> Vec<Point> {
        let fragment = expedition.fragment();
        let base = fragment.base_position();
        let budget = self.budget(expedition);

        let mut candidates: Vec<&MapNode> = fragment
            .nodes
            .iter()
            .filter(|node| node.kind != NodeType::Base && policy.wants_target(node))
            .collect();
        let mut waypoints = Vec::new();
        let mut current = base;
        let mut used = 0.0;
        loop {
            let next = candidates
                .iter()
                .enumerate()
                .map(|(idx, node)| (idx, current.distance(&node.position())))
                .filter(|(idx, leg)| {
                    let home = candidates[*idx].position().distance(&base);
                    used + leg + home <= budget
                })
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let Some((idx, leg)) = next else { break };
            let node = candidates.swap_remove(idx);
            used += leg;
            current = node.position();
            waypoints.push(current);
        }

        if waypoints.is_empty() {
            let center = expedition.config().map.center;
            let toward_center = Point::new(center, center);
            let reach = base.distance(&toward_center);
            let hop = if reach < Self::HOP_DISTANCE {
                Point::new(base.x + Self::HOP_DISTANCE, base.y)
            } else {
                base.lerp(&toward_center, Self::HOP_DISTANCE / reach)
            };
            return vec![hop, base];
        }

        let mut points = Vec::new();
        let mut from = base;
        for waypoint in waypoints.into_iter().chain(std::iter::once(base)) {
            self.sample_leg(from, waypoint, &mut points);
            from = waypoint;
        }
        points
    }

    /// Samples from the ship straight back to BASE, or `None` when the ship
    /// already sits on BASE or the remaining fuel cannot cover the leg.
    pub fn plan_home(&mut self, expedition: &Expedition) -> Option<Vec<Point>> {
        let ship = expedition.ship_position();
        let base = expedition.fragment().base_position();
        let travel = &expedition.config().travel;
        let leg = ship.distance(&base);
        if leg < travel.min_point_spacing || leg * travel.fuel_per_unit > expedition.stats().fuel {
            return None;
        }
        let mut points = Vec::new();
        self.sample_leg(ship, base, &mut points);
        Some(points)
    }

    fn budget(&self, expedition: &Expedition) -> f64 {
        let per_unit = expedition.config().travel.fuel_per_unit;
        if per_unit <= 0.0 {
            return f64::MAX;
        }
        expedition.stats().fuel / per_unit * (1.0 - self.fuel_margin)
    }

    /// Freehand samples along `from -> to`. Interior samples wobble a little;
    /// the leg end is exact so waypoints stay on their nodes.
    fn sample_leg(&mut self, from: Point, to: Point, out: &mut Vec<Point>) {
        let length = from.distance(&to);
        let pieces = (length / self.sample_spacing).ceil().max(1.0);
        let mut t = 1.0 / pieces;
        while t < 1.0 - f64::EPSILON {
            let point = from.lerp(&to, t);
            out.push(Point::new(
                point.x + self.rng.gen_range(-self.wobble..=self.wobble),
                point.y + self.rng.gen_range(-self.wobble..=self.wobble),
            ));
            t += 1.0 / pieces;
        }
        out.push(to);
    }
}
