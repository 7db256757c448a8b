//! Planning-phase commands: drawing, launching and route decisions.
use serde::{Deserialize, Serialize};

use super::{CommandError, Expedition, Phase};
use crate::constants::{
    LOG_LAUNCH_BASE, LOG_LAUNCH_WAYPOINT, LOG_OUT_OF_FUEL, LOG_REDRAW, LOG_RESUME,
    MIN_LAUNCH_POINTS,
};
use crate::geometry::{Point, distance};
use crate::items::ItemPerk;
use crate::map::NodeType;
use crate::narrative::Narrator;

/// Result of offering one sampled point to the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExtendOutcome {
    /// Point appended; `cost` fuel was spent.
    Accepted { cost: f64 },
    /// Point sits too close to the current path end.
    TooClose,
    /// Not enough fuel for the segment; nothing changed.
    OutOfFuel,
    /// The run is not planning.
    WrongPhase,
}

impl ExtendOutcome {
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReport {
    /// Node the traversal starts from. `None` when resuming after a redraw.
    pub start_node: Option<u32>,
    pub resumed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteDecision {
    Continue,
    Redraw,
}

impl<N: Narrator> Expedition<N> {
    /// Offer one freehand sample to the path.
    ///
    /// Every call is an independent accept or reject against the state at
    /// call time. An empty path is anchored at BASE before the first point.
    pub fn extend_path(&mut self, candidate: Point) -> ExtendOutcome {
        if self.state.phase != Phase::Planning {
            return ExtendOutcome::WrongPhase;
        }
        if self.state.stats.fuel <= 0.0 {
            self.notify_out_of_fuel();
            return ExtendOutcome::OutOfFuel;
        }

        let last = self
            .state
            .path
            .last()
            .copied()
            .unwrap_or_else(|| self.fragment.base_position());
        let dist = distance(last, candidate);
        if dist < self.cfg.travel.min_point_spacing {
            return ExtendOutcome::TooClose;
        }

        let first_segment = self.state.path.len() <= 1;
        let cost = if first_segment && self.state.loadout.has_perk(ItemPerk::FirstSegmentFree) {
            0.0
        } else {
            dist * self.cfg.travel.fuel_per_unit
        };
        if !self.state.stats.can_afford(cost) {
            self.notify_out_of_fuel();
            return ExtendOutcome::OutOfFuel;
        }

        if self.state.path.is_empty() {
            self.state.path.push(last);
        }
        self.state.path.push(candidate);
        self.state.stats.spend_fuel(cost);
        ExtendOutcome::Accepted { cost }
    }

    fn notify_out_of_fuel(&mut self) {
        let repeated = self
            .state
            .log
            .last()
            .is_some_and(|entry| entry.message == LOG_OUT_OF_FUEL);
        if !repeated {
            log::warn!("Path rejected: out of fuel ({:.2})", self.state.stats.fuel);
            self.push_log(None, LOG_OUT_OF_FUEL);
        }
    }

    /// Start (or resume) traversal of the drawn path.
    ///
    /// A first launch resets the cursor to 0, the visited set to the start
    /// node and the log. A launch after a redraw resumes: cursor, visited set
    /// and log are kept.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::WrongPhase` outside planning and
    /// `CommandError::PathTooShort` when fewer than two points are drawn.
    pub fn launch(&mut self) -> Result<LaunchReport, CommandError> {
        self.require_phase(Phase::Planning)?;
        let points = self.state.path.len();
        if points < MIN_LAUNCH_POINTS {
            log::warn!("Launch rejected: path has {points} points");
            return Err(CommandError::PathTooShort { points });
        }

        self.state.clear_transients();
        self.state.phase = Phase::Resolving;

        if self.state.resume_pending {
            self.state.resume_pending = false;
            self.push_log(None, LOG_RESUME);
            log::debug!("Phase -> resolving (resume at cursor {})", self.state.cursor);
            return Ok(LaunchReport {
                start_node: None,
                resumed: true,
            });
        }

        let radius = self.cfg.travel.hit_radius;
        let origin = self.state.path[0];
        let start = self
            .fragment
            .nodes
            .iter()
            .find(|node| distance(node.position(), origin) <= radius)
            .or_else(|| self.fragment.base())
            .map(|node| (node.id, node.kind));

        self.state.cursor = 0;
        self.state.visited.clear();
        self.state.log.clear();
        if let Some((id, kind)) = start {
            self.state.visited.push(id);
            let message = if kind == NodeType::Base {
                LOG_LAUNCH_BASE
            } else {
                LOG_LAUNCH_WAYPOINT
            };
            self.push_log(Some(id), message);
        }
        log::debug!("Phase -> resolving (launch from {:?})", start.map(|(id, _)| id));
        Ok(LaunchReport {
            start_node: start.map(|(id, _)| id),
            resumed: false,
        })
    }

    /// Answer the post-encounter prompt.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NoDecisionPending` when no prompt is open.
    pub fn decide_route(&mut self, decision: RouteDecision) -> Result<(), CommandError> {
        if !self.state.decision_pending || self.state.phase != Phase::Choice {
            return Err(CommandError::NoDecisionPending);
        }
        self.state.decision_pending = false;
        match decision {
            RouteDecision::Continue => {
                self.state.phase = Phase::Resolving;
                log::debug!("Phase -> resolving (continue)");
            }
            RouteDecision::Redraw => {
                self.state.phase = Phase::Planning;
                self.state.path.truncate(self.state.cursor + 1);
                self.state.resume_pending = true;
                self.state.ledger.redraws = self.state.ledger.redraws.saturating_add(1);
                self.push_log(None, LOG_REDRAW);
                log::debug!("Phase -> planning (redraw at cursor {})", self.state.cursor);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpeditionConfig;
    use crate::map::{MapFragment, MapNode};

    fn node(id: u32, x: f64, y: f64, kind: NodeType) -> MapNode {
        MapNode {
            id,
            x,
            y,
            kind,
            danger: 0,
        }
    }

    fn expedition() -> Expedition {
        let mut exp = Expedition::with_seed(ExpeditionConfig::default(), 7).unwrap();
        exp.load_fragment(MapFragment::from_nodes(vec![
            node(0, 50.0, 50.0, NodeType::Base),
            node(1, 90.0, 90.0, NodeType::Exit),
        ]));
        exp
    }

    #[test]
    fn first_point_anchors_at_base_and_charges_distance() {
        let mut exp = expedition();
        let outcome = exp.extend_path(Point::new(60.0, 50.0));
        let ExtendOutcome::Accepted { cost } = outcome else {
            panic!("expected acceptance, got {outcome:?}");
        };
        assert!((cost - 0.8).abs() < 1e-9);
        assert!((exp.stats().fuel - 7.2).abs() < 1e-9);
        assert_eq!(exp.state().path, vec![Point::new(50.0, 50.0), Point::new(60.0, 50.0)]);
    }

    #[test]
    fn near_duplicate_points_are_ignored() {
        let mut exp = expedition();
        assert!(exp.extend_path(Point::new(55.0, 50.0)).is_accepted());
        assert_eq!(exp.extend_path(Point::new(55.3, 50.0)), ExtendOutcome::TooClose);
        assert_eq!(exp.state().path.len(), 2);
    }

    #[test]
    fn unaffordable_segment_changes_nothing_and_logs_once() {
        let mut exp = expedition();
        exp.state_mut().stats.fuel = 0.5;
        assert_eq!(exp.extend_path(Point::new(60.0, 50.0)), ExtendOutcome::OutOfFuel);
        assert_eq!(exp.extend_path(Point::new(61.0, 50.0)), ExtendOutcome::OutOfFuel);
        assert!(exp.state().path.is_empty());
        assert!((exp.stats().fuel - 0.5).abs() < f64::EPSILON);
        assert_eq!(exp.log().len(), 1);
        assert_eq!(exp.log()[0].message, LOG_OUT_OF_FUEL);
    }

    #[test]
    fn long_spine_makes_first_segment_free() {
        let mut exp = expedition();
        let spine = exp.catalog().by_id("engine_long_spine").unwrap().clone();
        exp.state_mut().loadout.equip(spine);
        assert_eq!(
            exp.extend_path(Point::new(70.0, 50.0)),
            ExtendOutcome::Accepted { cost: 0.0 }
        );
        let ExtendOutcome::Accepted { cost } = exp.extend_path(Point::new(80.0, 50.0)) else {
            panic!("second segment should be accepted");
        };
        assert!((cost - 0.8).abs() < 1e-9);
    }

    #[test]
    fn drawing_outside_planning_is_rejected() {
        let mut exp = expedition();
        exp.state_mut().phase = Phase::Resolving;
        assert_eq!(exp.extend_path(Point::new(70.0, 50.0)), ExtendOutcome::WrongPhase);
    }

    #[test]
    fn launch_needs_two_points() {
        let mut exp = expedition();
        assert_eq!(exp.launch(), Err(CommandError::PathTooShort { points: 0 }));
        assert_eq!(exp.phase(), Phase::Planning);
    }

    #[test]
    fn launch_from_base_marks_it_visited() {
        let mut exp = expedition();
        exp.extend_path(Point::new(60.0, 50.0));
        let report = exp.launch().unwrap();
        assert_eq!(
            report,
            LaunchReport {
                start_node: Some(0),
                resumed: false
            }
        );
        assert_eq!(exp.phase(), Phase::Resolving);
        assert_eq!(exp.state().visited, vec![0]);
        assert_eq!(exp.state().cursor, 0);
        assert_eq!(exp.log()[0].message, LOG_LAUNCH_BASE);
        assert_eq!(exp.launch(), Err(CommandError::WrongPhase {
            expected: Phase::Planning,
            actual: Phase::Resolving
        }));
    }

    #[test]
    fn route_decision_requires_prompt() {
        let mut exp = expedition();
        assert_eq!(
            exp.decide_route(RouteDecision::Continue),
            Err(CommandError::NoDecisionPending)
        );
    }

    #[test]
    fn redraw_truncates_and_resumes_from_cursor() {
        let mut exp = expedition();
        for x in [55.0, 60.0, 65.0, 70.0] {
            exp.extend_path(Point::new(x, 50.0));
        }
        exp.launch().unwrap();
        {
            let state = exp.state_mut();
            state.cursor = 2;
            state.phase = Phase::Choice;
            state.decision_pending = true;
            state.visited.push(5);
        }
        exp.decide_route(RouteDecision::Redraw).unwrap();
        assert_eq!(exp.phase(), Phase::Planning);
        assert_eq!(exp.state().path.len(), 3);
        assert_eq!(exp.ship_position(), Point::new(60.0, 50.0));

        exp.extend_path(Point::new(60.0, 60.0));
        let report = exp.launch().unwrap();
        assert!(report.resumed);
        assert_eq!(exp.state().cursor, 2);
        assert_eq!(exp.state().visited, vec![0, 5]);
        assert_eq!(exp.state().ledger.redraws, 1);
    }
}
