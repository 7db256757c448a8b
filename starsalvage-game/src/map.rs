//! Map fragments: typed points of interest arranged on a jittered ring.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::config::MapConfig;
use crate::geometry::Point;
use crate::numbers::usize_to_f64;

/// Kind of point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Base,
    Exit,
    Wreck,
    Anomaly,
    Pirate,
    Beacon,
}

/// What happens when the ship reaches a node of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalRule {
    /// Always opens a salvage encounter.
    Encounter,
    /// Opens an encounter unless a signal bender spoofs it.
    Hostile,
    /// Ends the run with salvage secured.
    Haven,
}

/// Per-type behaviour, keyed uniformly by [`NodeType`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeProfile {
    /// Share of the spawn roll assigned to this type (BASE never spawns).
    pub spawn_weight: f64,
    /// Upper bound of this type's band in the cumulative spawn roll.
    pub spawn_ceiling: f64,
    /// Chance that stripping the site for scrap succeeds.
    pub scrap_chance: f64,
    /// Scrap granted by a successful strip.
    pub scrap_reward: u32,
    pub arrival: ArrivalRule,
    pub dangerous: bool,
}

impl NodeType {
    pub const ALL: [Self; 6] = [
        Self::Base,
        Self::Exit,
        Self::Wreck,
        Self::Anomaly,
        Self::Pirate,
        Self::Beacon,
    ];

    /// Spawn order for non-BASE nodes; cumulative weights partition a unit roll.
    pub const SPAWN_ORDER: [Self; 5] = [
        Self::Wreck,
        Self::Anomaly,
        Self::Pirate,
        Self::Beacon,
        Self::Exit,
    ];

    #[must_use]
    pub const fn profile(self) -> NodeProfile {
        match self {
            Self::Base => NodeProfile {
                spawn_weight: 0.0,
                spawn_ceiling: 0.0,
                scrap_chance: 0.8,
                scrap_reward: 1,
                arrival: ArrivalRule::Haven,
                dangerous: false,
            },
            Self::Exit => NodeProfile {
                spawn_weight: 0.15,
                spawn_ceiling: 1.0,
                scrap_chance: 0.8,
                scrap_reward: 1,
                arrival: ArrivalRule::Haven,
                dangerous: false,
            },
            Self::Wreck => NodeProfile {
                spawn_weight: 0.25,
                spawn_ceiling: 0.25,
                scrap_chance: 0.85,
                scrap_reward: 2,
                arrival: ArrivalRule::Encounter,
                dangerous: true,
            },
            Self::Anomaly => NodeProfile {
                spawn_weight: 0.20,
                spawn_ceiling: 0.45,
                scrap_chance: 0.8,
                scrap_reward: 3,
                arrival: ArrivalRule::Encounter,
                dangerous: true,
            },
            Self::Pirate => NodeProfile {
                spawn_weight: 0.20,
                spawn_ceiling: 0.65,
                scrap_chance: 0.75,
                scrap_reward: 2,
                arrival: ArrivalRule::Hostile,
                dangerous: true,
            },
            Self::Beacon => NodeProfile {
                spawn_weight: 0.20,
                spawn_ceiling: 0.85,
                scrap_chance: 0.95,
                scrap_reward: 1,
                arrival: ArrivalRule::Encounter,
                dangerous: true,
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "BASE",
            Self::Exit => "EXIT",
            Self::Wreck => "WRECK",
            Self::Anomaly => "ANOMALY",
            Self::Pirate => "PIRATE",
            Self::Beacon => "BEACON",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::Exit => "Exit",
            Self::Wreck => "Wreck",
            Self::Anomaly => "Anomaly",
            Self::Pirate => "Pirate",
            Self::Beacon => "Beacon",
        }
    }

    /// Map a unit roll onto the weighted spawn bands.
    #[must_use]
    pub fn from_spawn_roll(roll: f64) -> Self {
        Self::SPAWN_ORDER
            .into_iter()
            .find(|kind| roll < kind.profile().spawn_ceiling)
            .unwrap_or(Self::Exit)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A point of interest on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: NodeType,
    pub danger: u8,
}

impl MapNode {
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One generated map instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFragment {
    pub nodes: Vec<MapNode>,
}

impl MapFragment {
    /// Build a fragment from explicit nodes (tests and scripted maps).
    #[must_use]
    pub const fn from_nodes(nodes: Vec<MapNode>) -> Self {
        Self { nodes }
    }

    /// The BASE node, falling back to the first node.
    #[must_use]
    pub fn base(&self) -> Option<&MapNode> {
        self.nodes
            .iter()
            .find(|node| node.kind == NodeType::Base)
            .or_else(|| self.nodes.first())
    }

    /// BASE coordinates, or the field origin for an empty fragment.
    #[must_use]
    pub fn base_position(&self) -> Point {
        self.base().map(MapNode::position).unwrap_or_default()
    }

    #[must_use]
    pub fn node(&self, id: u32) -> Option<&MapNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn count_of(&self, kind: NodeType) -> usize {
        self.nodes.iter().filter(|node| node.kind == kind).count()
    }
}

/// Generate a fresh fragment: node 0 is BASE, the rest are spread around a
/// ring with a random radius and independent jitter on each axis.
pub fn generate_fragment<R: Rng + ?Sized>(cfg: &MapConfig, rng: &mut R) -> MapFragment {
    let count = cfg.node_count;
    let mut nodes = Vec::with_capacity(count);

    for index in 0..count {
        let angle = usize_to_f64(index) / usize_to_f64(count) * TAU;
        let radius = rng.gen_range(cfg.radius_min..=cfg.radius_max);
        let jitter_x = rng.gen_range(-cfg.jitter..=cfg.jitter);
        let jitter_y = rng.gen_range(-cfg.jitter..=cfg.jitter);
        let position = Point::new(
            angle.cos().mul_add(radius, cfg.center) + jitter_x,
            angle.sin().mul_add(radius, cfg.center) + jitter_y,
        )
        .clamped(cfg.field_min, cfg.field_max);

        let kind = if index == 0 {
            NodeType::Base
        } else {
            NodeType::from_spawn_roll(rng.r#gen::<f64>())
        };
        let danger = if kind.profile().dangerous {
            rng.gen_range(cfg.danger_min..=cfg.danger_max)
        } else {
            0
        };

        nodes.push(MapNode {
            id: u32::try_from(index).unwrap_or(u32::MAX),
            x: position.x,
            y: position.y,
            kind,
            danger,
        });
    }

    log::debug!(
        "Generated fragment | nodes:{} exits:{} pirates:{}",
        nodes.len(),
        nodes.iter().filter(|n| n.kind == NodeType::Exit).count(),
        nodes.iter().filter(|n| n.kind == NodeType::Pirate).count()
    );
    MapFragment { nodes }
}
