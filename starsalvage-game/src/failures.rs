//! Failure outcomes for botched salvage and scrap rolls.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::map::NodeType;
use crate::stats::RunStats;

/// Every flavored failure. Each dangerous node type owns two variants; the
/// generic mishap covers node types without a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    WreckShardBurst,
    WreckCascade,
    PirateAmbush,
    PirateBoarding,
    AnomalyShear,
    AnomalyPhaseSkip,
    BeaconOvercharge,
    BeaconShoddyRepairs,
    GenericMishap,
}

impl FailureKind {
    /// Failure table for a node type.
    #[must_use]
    pub const fn table(node_type: NodeType) -> &'static [Self] {
        match node_type {
            NodeType::Wreck => &[Self::WreckShardBurst, Self::WreckCascade],
            NodeType::Pirate => &[Self::PirateAmbush, Self::PirateBoarding],
            NodeType::Anomaly => &[Self::AnomalyShear, Self::AnomalyPhaseSkip],
            NodeType::Beacon => &[Self::BeaconOvercharge, Self::BeaconShoddyRepairs],
            NodeType::Base | NodeType::Exit => &[Self::GenericMishap],
        }
    }

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::WreckShardBurst => "wreck_shard_burst",
            Self::WreckCascade => "wreck_cascade",
            Self::PirateAmbush => "pirate_ambush",
            Self::PirateBoarding => "pirate_boarding",
            Self::AnomalyShear => "anomaly_shear",
            Self::AnomalyPhaseSkip => "anomaly_phase_skip",
            Self::BeaconOvercharge => "beacon_overcharge",
            Self::BeaconShoddyRepairs => "beacon_shoddy_work",
            Self::GenericMishap => "generic_mishap",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::WreckShardBurst => "Shard Burst",
            Self::WreckCascade => "Cascade Collapse",
            Self::PirateAmbush => "Pirate Ambush",
            Self::PirateBoarding => "Boarding Attempt",
            Self::AnomalyShear => "Gravitic Shear",
            Self::AnomalyPhaseSkip => "Phase Skip",
            Self::BeaconOvercharge => "Refuel Overcharge",
            Self::BeaconShoddyRepairs => "Shoddy Repairs",
            Self::GenericMishap => "Mishap",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::WreckShardBurst => "The hull ruptures under a cloud of spinning debris.",
            Self::WreckCascade => "The wreck's spine gives way, slamming into your side.",
            Self::PirateAmbush => "A hidden wing of raiders knifes in from the dark.",
            Self::PirateBoarding => "You repel boarders, but not before they fire a few shots.",
            Self::AnomalyShear => "Sections of the ship tug in different directions at once.",
            Self::AnomalyPhaseSkip => "You flicker sideways in time, systems coughing on restart.",
            Self::BeaconOvercharge => "Cheap fuel gums up your intake lines.",
            Self::BeaconShoddyRepairs => "Dockside welders leave microfractures in your hull.",
            Self::GenericMishap => "Something rattles loose in the chaos.",
        }
    }

    #[must_use]
    pub const fn consequence(self) -> &'static str {
        match self {
            Self::WreckShardBurst | Self::BeaconShoddyRepairs | Self::GenericMishap => "-1 Hull.",
            Self::WreckCascade | Self::AnomalyShear => "-1 Hull and -1 Fuel.",
            Self::PirateAmbush => "-2 Hull.",
            Self::PirateBoarding => "-1 Hull and lose 1 Scrap.",
            Self::AnomalyPhaseSkip => "-2 Fuel.",
            Self::BeaconOvercharge => "-1 Fuel.",
        }
    }

    /// Stat transition for this failure. Hull may go negative; fuel and
    /// scrap floor at zero.
    #[must_use]
    pub fn apply(self, prev: RunStats) -> RunStats {
        let mut next = prev;
        match self {
            Self::WreckShardBurst | Self::BeaconShoddyRepairs | Self::GenericMishap => {
                next.damage_hull(1);
            }
            Self::WreckCascade | Self::AnomalyShear => {
                next.damage_hull(1);
                next.spend_fuel(1.0);
            }
            Self::PirateAmbush => next.damage_hull(2),
            Self::PirateBoarding => {
                next.damage_hull(1);
                next.lose_scrap(1);
            }
            Self::AnomalyPhaseSkip => next.spend_fuel(2.0),
            Self::BeaconOvercharge => next.spend_fuel(1.0),
        }
        next
    }
}

/// A pending failure awaiting acknowledgment. Its effect has not been
/// applied yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePopup {
    pub kind: FailureKind,
    pub node_type: NodeType,
    pub node_id: u32,
    pub title: String,
    pub description: String,
    pub consequence: String,
}

impl FailurePopup {
    #[must_use]
    pub fn new(kind: FailureKind, node_type: NodeType, node_id: u32) -> Self {
        Self {
            kind,
            node_type,
            node_id,
            title: kind.title().to_string(),
            description: kind.description().to_string(),
            consequence: kind.consequence().to_string(),
        }
    }

    #[must_use]
    pub fn apply(&self, prev: RunStats) -> RunStats {
        self.kind.apply(prev)
    }
}

/// Pick one failure for `node_type` uniformly from its table.
pub fn draw_failure<R: Rng + ?Sized>(node_type: NodeType, node_id: u32, rng: &mut R) -> FailurePopup {
    let table = FailureKind::table(node_type);
    let kind = table
        .get(rng.gen_range(0..table.len()))
        .copied()
        .unwrap_or(FailureKind::GenericMishap);
    log::debug!("Failure drawn | node:{node_id} type:{node_type} kind:{}", kind.id());
    FailurePopup::new(kind, node_type, node_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    fn stats(hull: i32, fuel: f64, scrap: u32) -> RunStats {
        RunStats {
            hull,
            max_hull: 3,
            fuel,
            max_fuel: 8.0,
            scrap,
        }
    }

    #[test]
    fn dangerous_types_have_two_distinct_variants() {
        for kind in [
            NodeType::Wreck,
            NodeType::Pirate,
            NodeType::Anomaly,
            NodeType::Beacon,
        ] {
            let table = FailureKind::table(kind);
            assert_eq!(table.len(), 2);
            assert_ne!(table[0], table[1]);
        }
    }

    #[test]
    fn apply_rules_match_consequences() {
        let base = stats(3, 5.0, 2);
        let after = FailureKind::WreckCascade.apply(base);
        assert_eq!(after.hull, 2);
        assert!((after.fuel - 4.0).abs() < f64::EPSILON);

        let after = FailureKind::PirateAmbush.apply(base);
        assert_eq!(after.hull, 1);
        assert_eq!(after.scrap, 2);

        let after = FailureKind::PirateBoarding.apply(base);
        assert_eq!((after.hull, after.scrap), (2, 1));

        let after = FailureKind::AnomalyPhaseSkip.apply(base);
        assert_eq!(after.hull, 3);
        assert!((after.fuel - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn floors_hold_for_fuel_and_scrap_but_not_hull() {
        let low = stats(1, 0.5, 0);
        let after = FailureKind::AnomalyShear.apply(low);
        assert_eq!(after.hull, 0);
        assert!(after.fuel.abs() < f64::EPSILON);
        let after = FailureKind::PirateBoarding.apply(stats(0, 1.0, 0));
        assert_eq!(after.hull, -1);
        assert_eq!(after.scrap, 0);
    }

    #[test]
    fn apply_is_pure() {
        let base = stats(3, 5.0, 2);
        let popup = FailurePopup::new(FailureKind::BeaconOvercharge, NodeType::Beacon, 3);
        assert_eq!(popup.apply(base), popup.apply(base));
        assert!((base.fuel - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn draw_covers_both_variants() {
        let mut rng = ChaCha20Rng::seed_from_u64(17);
        let mut seen = HashSet::new();
        for _ in 0..64 {
            let popup = draw_failure(NodeType::Wreck, 2, &mut rng);
            assert_eq!(popup.node_type, NodeType::Wreck);
            seen.insert(popup.kind);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn neutral_nodes_fall_back_to_mishap() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let popup = draw_failure(NodeType::Exit, 0, &mut rng);
        assert_eq!(popup.kind, FailureKind::GenericMishap);
        assert_eq!(popup.title, "Mishap");
    }
}
