//! Clock-to-step conversion for traversal playback.
use std::time::Duration;

use super::{Expedition, StepOutcome};
use crate::config::TravelConfig;
use crate::narrative::Narrator;

/// Turns elapsed wall time into traversal steps at a fixed cadence.
///
/// The driver owns no run state. Elapsed time only accumulates while the
/// expedition can step, so a popup that sat open for a minute does not
/// release a burst of steps once it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackDriver {
    interval: Duration,
    accumulated: Duration,
}

impl PlaybackDriver {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn from_config(travel: &TravelConfig) -> Self {
        Self::new(travel.step_interval())
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Feed `elapsed` wall time and take every step that became due.
    /// Returns the number of steps taken.
    pub fn advance<N: Narrator>(&mut self, expedition: &mut Expedition<N>, elapsed: Duration) -> usize {
        if !expedition.can_step() {
            self.accumulated = Duration::ZERO;
            return 0;
        }
        if self.interval.is_zero() {
            return usize::from(Self::tick(expedition));
        }

        self.accumulated = self.accumulated.saturating_add(elapsed);
        let mut taken = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            if !Self::tick(expedition) {
                self.accumulated = Duration::ZERO;
                break;
            }
            taken += 1;
            if !expedition.can_step() {
                self.accumulated = Duration::ZERO;
                break;
            }
        }
        taken
    }

    /// Step synchronously until something blocks or `max_steps` is hit.
    pub fn run_until_blocked<N: Narrator>(expedition: &mut Expedition<N>, max_steps: usize) -> usize {
        let mut taken = 0;
        while taken < max_steps && Self::tick(expedition) {
            taken += 1;
            if !expedition.can_step() {
                break;
            }
        }
        taken
    }

    fn tick<N: Narrator>(expedition: &mut Expedition<N>) -> bool {
        !matches!(expedition.step(), StepOutcome::Blocked(_))
    }
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::from_config(&TravelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpeditionConfig;
    use crate::expedition::Phase;
    use crate::geometry::Point;
    use crate::map::{MapFragment, MapNode, NodeType};

    fn node(id: u32, x: f64, y: f64, kind: NodeType) -> MapNode {
        MapNode {
            id,
            x,
            y,
            kind,
            danger: 1,
        }
    }

    fn launched(extra: Vec<MapNode>, points: &[(f64, f64)]) -> Expedition {
        let mut exp = Expedition::with_seed(ExpeditionConfig::default(), 5).unwrap();
        let mut nodes = vec![node(0, 10.0, 10.0, NodeType::Base)];
        nodes.extend(extra);
        exp.load_fragment(MapFragment::from_nodes(nodes));
        for &(x, y) in points {
            exp.extend_path(Point::new(x, y));
        }
        exp.launch().unwrap();
        exp
    }

    #[test]
    fn steps_follow_the_cadence() {
        let mut exp = launched(vec![], &[(20.0, 10.0), (30.0, 10.0), (40.0, 10.0)]);
        let mut driver = PlaybackDriver::new(Duration::from_millis(260));
        assert_eq!(driver.advance(&mut exp, Duration::from_millis(100)), 0);
        assert_eq!(driver.advance(&mut exp, Duration::from_millis(200)), 1);
        assert_eq!(exp.state().cursor, 1);
        assert_eq!(driver.advance(&mut exp, Duration::from_millis(520)), 2);
        assert_eq!(exp.state().cursor, 3);
    }

    #[test]
    fn encounter_stops_the_burst() {
        let mut exp = launched(
            vec![node(1, 20.0, 10.0, NodeType::Wreck)],
            &[(20.0, 10.0), (30.0, 10.0), (40.0, 10.0)],
        );
        let mut driver = PlaybackDriver::new(Duration::from_millis(10));
        assert_eq!(driver.advance(&mut exp, Duration::from_secs(5)), 1);
        assert_eq!(exp.phase(), Phase::Choice);
        assert_eq!(driver.advance(&mut exp, Duration::from_secs(5)), 0);
        assert_eq!(exp.state().cursor, 1);
    }

    #[test]
    fn blocked_time_does_not_bank_steps() {
        let mut exp = launched(vec![], &[(20.0, 10.0), (30.0, 10.0)]);
        exp.state_mut().decision_pending = true;
        let mut driver = PlaybackDriver::new(Duration::from_millis(100));
        assert_eq!(driver.advance(&mut exp, Duration::from_secs(10)), 0);
        exp.state_mut().decision_pending = false;
        assert_eq!(driver.advance(&mut exp, Duration::from_millis(150)), 1);
    }

    #[test]
    fn run_until_blocked_finishes_a_quiet_path() {
        let mut exp = launched(vec![], &[(30.0, 10.0), (12.0, 12.0)]);
        let taken = PlaybackDriver::run_until_blocked(&mut exp, 50);
        assert_eq!(taken, 3);
        assert_eq!(exp.phase(), Phase::Complete);
        assert_eq!(PlaybackDriver::run_until_blocked(&mut exp, 50), 0);
    }

    #[test]
    fn run_until_blocked_respects_the_cap() {
        let mut exp = launched(vec![], &[(20.0, 10.0), (30.0, 10.0), (40.0, 10.0)]);
        assert_eq!(PlaybackDriver::run_until_blocked(&mut exp, 2), 2);
        assert_eq!(exp.phase(), Phase::Resolving);
    }

    #[test]
    fn zero_interval_steps_once_per_call() {
        let mut exp = launched(vec![], &[(20.0, 10.0), (30.0, 10.0)]);
        let mut driver = PlaybackDriver::new(Duration::ZERO);
        assert_eq!(driver.advance(&mut exp, Duration::from_secs(1)), 1);
    }

    #[test]
    fn default_uses_configured_interval() {
        assert_eq!(PlaybackDriver::default().interval(), Duration::from_millis(260));
    }
}
