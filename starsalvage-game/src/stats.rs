//! Ship stats carried through a run.
use serde::{Deserialize, Serialize};

use crate::items::ItemEffect;

/// Hull, fuel and scrap for the current run.
///
/// Hull is allowed to dip below zero arithmetically; callers clamp it for
/// display with [`RunStats::display_hull`]. Fuel and scrap are floored at
/// zero whenever they are spent or lost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub hull: i32,
    pub max_hull: i32,
    pub fuel: f64,
    pub max_fuel: f64,
    pub scrap: u32,
}

impl RunStats {
    /// Hull clamped into `[0, max_hull]`.
    #[must_use]
    pub fn display_hull(&self) -> i32 {
        self.hull.clamp(0, self.max_hull.max(0))
    }

    #[must_use]
    pub const fn is_breached(&self) -> bool {
        self.hull <= 0
    }

    /// Whether `cost` can be paid without driving fuel negative.
    #[must_use]
    pub fn can_afford(&self, cost: f64) -> bool {
        self.fuel - cost >= 0.0
    }

    pub fn spend_fuel(&mut self, amount: f64) {
        self.fuel = (self.fuel - amount).max(0.0);
    }

    pub const fn damage_hull(&mut self, amount: i32) {
        self.hull = self.hull.saturating_sub(amount);
    }

    pub const fn gain_scrap(&mut self, amount: u32) {
        self.scrap = self.scrap.saturating_add(amount);
    }

    pub const fn lose_scrap(&mut self, amount: u32) {
        self.scrap = self.scrap.saturating_sub(amount);
    }

    pub const fn forfeit_scrap(&mut self) {
        self.scrap = 0;
    }

    pub const fn refuel(&mut self) {
        self.fuel = self.max_fuel;
    }

    /// Swap one item's max-stat deltas for another's.
    ///
    /// The net delta lands on the maxima in one step and current values are
    /// clamped once afterwards, so no intermediate state carries both items
    /// or exceeds a ceiling.
    pub fn apply_equip(&mut self, old: Option<&ItemEffect>, new: Option<&ItemEffect>) {
        let old = old.copied().unwrap_or_default();
        let new = new.copied().unwrap_or_default();
        self.max_hull = self
            .max_hull
            .saturating_add(new.max_hull_delta.saturating_sub(old.max_hull_delta));
        self.max_fuel += new.max_fuel_delta - old.max_fuel_delta;
        self.hull = self.hull.min(self.max_hull);
        self.fuel = self.fuel.min(self.max_fuel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> RunStats {
        RunStats {
            hull: 3,
            max_hull: 3,
            fuel: 8.0,
            max_fuel: 8.0,
            scrap: 0,
        }
    }

    fn tanks() -> ItemEffect {
        ItemEffect {
            max_hull_delta: 0,
            max_fuel_delta: 2.0,
        }
    }

    fn bulkhead() -> ItemEffect {
        ItemEffect {
            max_hull_delta: 1,
            max_fuel_delta: 0.0,
        }
    }

    #[test]
    fn display_hull_clamps_both_ends() {
        let mut stats = fresh();
        stats.damage_hull(5);
        assert_eq!(stats.hull, -2);
        assert_eq!(stats.display_hull(), 0);
        assert!(stats.is_breached());
        stats.hull = 9;
        assert_eq!(stats.display_hull(), 3);
    }

    #[test]
    fn fuel_and_scrap_floor_at_zero() {
        let mut stats = fresh();
        stats.spend_fuel(10.0);
        assert!(stats.fuel.abs() < f64::EPSILON);
        stats.lose_scrap(1);
        assert_eq!(stats.scrap, 0);
    }

    #[test]
    fn equip_then_revert_restores_maxima() {
        let mut stats = fresh();
        let before = stats;
        stats.apply_equip(None, Some(&tanks()));
        assert!((stats.max_fuel - 10.0).abs() < f64::EPSILON);
        assert!((stats.fuel - 8.0).abs() < f64::EPSILON);
        stats.apply_equip(Some(&tanks()), None);
        assert_eq!(stats.max_hull, before.max_hull);
        assert!((stats.max_fuel - before.max_fuel).abs() < f64::EPSILON);
    }

    #[test]
    fn unequip_clamps_current_to_new_ceiling() {
        let mut stats = fresh();
        stats.apply_equip(None, Some(&bulkhead()));
        stats.hull = 4;
        stats.apply_equip(Some(&bulkhead()), None);
        assert_eq!(stats.max_hull, 3);
        assert_eq!(stats.hull, 3);
    }

    #[test]
    fn swapping_items_applies_net_delta() {
        let mut stats = fresh();
        stats.apply_equip(None, Some(&tanks()));
        stats.refuel();
        stats.apply_equip(Some(&tanks()), Some(&bulkhead()));
        assert_eq!(stats.max_hull, 4);
        assert!((stats.max_fuel - 8.0).abs() < f64::EPSILON);
        assert!((stats.fuel - 8.0).abs() < f64::EPSILON);
    }
}
