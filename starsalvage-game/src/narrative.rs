//! Flavor text for map nodes.
//!
//! The run consults a [`Narrator`] whenever the ship reaches a node. The
//! built-in [`CatalogNarrator`] serves the contract's factions, regions and
//! per-type site descriptions; hosts can swap in their own implementation.
use serde::{Deserialize, Serialize};

use crate::map::{MapNode, NodeType};

/// Title and flavor line for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeNarrative {
    pub node_type: NodeType,
    pub title: String,
    pub flavor: String,
    #[serde(default)]
    pub faction_id: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
}

impl NodeNarrative {
    fn fallback(kind: NodeType) -> Self {
        Self {
            node_type: kind,
            title: format!("{} Site", kind.as_str()),
            flavor: String::from("A charted point of interest on this contract."),
            faction_id: None,
            region_id: None,
        }
    }
}

/// Source of node descriptions. Must be deterministic for a given node and
/// must never fail.
pub trait Narrator {
    fn describe(&self, node: &MapNode) -> NodeNarrative;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Faction {
    pub id: &'static str,
    pub name: &'static str,
    pub short_description: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

struct SiteEntry {
    title: &'static str,
    flavor: &'static str,
    faction: &'static str,
    region: &'static str,
}

static FACTIONS: [Faction; 5] = [
    Faction {
        id: "vega_syndicate",
        name: "Vega Syndicate",
        short_description: "Corporate raiders who brand every haul in teal",
        color: "#43d2e8",
    },
    Faction {
        id: "rustbelt_miners",
        name: "Rustbelt Miner Union",
        short_description: "Co-ops that leave their rigs patched with orange plate",
        color: "#f69d3c",
    },
    Faction {
        id: "old_navy",
        name: "Terran Remnant Navy",
        short_description: "Retired warships in faded blue-gray livery",
        color: "#6fa2ff",
    },
    Faction {
        id: "heliophage",
        name: "Heliophage Cult",
        short_description: "Sun-worshippers who etch glyphs into reactor housings",
        color: "#d85ad9",
    },
    Faction {
        id: "beacon_guild",
        name: "Free Beacon Guild",
        short_description: "Independent relayers and refitters",
        color: "#b4f5c4",
    },
];

static REGIONS: [Region; 3] = [
    Region {
        id: "outer_belt",
        name: "Outer Belt",
        description: "Loose rubble fields and derelict convoys",
    },
    Region {
        id: "nebulae_line",
        name: "Nebulae Line",
        description: "Ionized dust lanes that hide signals",
    },
    Region {
        id: "silent_corridor",
        name: "Silent Corridor",
        description: "Abandoned patrol route patrolled only by echoes",
    },
];

const BASE_SITES: &[SiteEntry] = &[SiteEntry {
    title: "Cartographer Dock",
    flavor: "Your crew quarters and contract office tucked inside an old carrier hull.",
    faction: "beacon_guild",
    region: "outer_belt",
}];

const EXIT_SITES: &[SiteEntry] = &[SiteEntry {
    title: "Exit Gate",
    flavor: "A cracked relay gate humming with borrowed power, pointed back to port.",
    faction: "beacon_guild",
    region: "silent_corridor",
}];

const WRECK_SITES: &[SiteEntry] = &[
    SiteEntry {
        title: "Syndicate Bulk Freighter",
        flavor: "Teal cargo pods torn open; corporate seals still flicker on the hull.",
        faction: "vega_syndicate",
        region: "outer_belt",
    },
    SiteEntry {
        title: "Old Navy Frigate",
        flavor: "Blue-gray plating, compartments vented; targeting arrays still intact.",
        faction: "old_navy",
        region: "silent_corridor",
    },
    SiteEntry {
        title: "Union Mining Barge",
        flavor: "Patchwork harvest arms frozen mid-swing, hazard beacons long dead.",
        faction: "rustbelt_miners",
        region: "outer_belt",
    },
];

const ANOMALY_SITES: &[SiteEntry] = &[
    SiteEntry {
        title: "Heliophage Ritual Node",
        flavor: "Glyph-scarred panels orbit a dim sun-core; sensors fail in patterned bursts.",
        faction: "heliophage",
        region: "nebulae_line",
    },
    SiteEntry {
        title: "Gravitic Echo",
        flavor: "The wreckage rings like a bell, warping pings into ghost signals.",
        faction: "old_navy",
        region: "silent_corridor",
    },
    SiteEntry {
        title: "Miner Survey Residue",
        flavor: "Residual scanners paint the void in rust-orange grids that stutter and loop.",
        faction: "rustbelt_miners",
        region: "nebulae_line",
    },
];

const PIRATE_SITES: &[SiteEntry] = &[
    SiteEntry {
        title: "Corsair Net",
        flavor: "Junk clusters lashed together; hidden cutters flare when you ping them.",
        faction: "vega_syndicate",
        region: "outer_belt",
    },
    SiteEntry {
        title: "Drifter Ambush",
        flavor: "A scarred navy tender gone privateer, running cold until you close in.",
        faction: "old_navy",
        region: "silent_corridor",
    },
    SiteEntry {
        title: "Tithe Collectors",
        flavor: "Heliophage fanatics demand offerings; their signal math is improvised and sharp.",
        faction: "heliophage",
        region: "nebulae_line",
    },
];

const BEACON_SITES: &[SiteEntry] = &[
    SiteEntry {
        title: "Guild Waypoint",
        flavor: "An independent relay broadcasting safe lanes and barter codes.",
        faction: "beacon_guild",
        region: "silent_corridor",
    },
    SiteEntry {
        title: "Union Rest Stop",
        flavor: "Miners left tools and spare tanks bolted to a spinning platform.",
        faction: "rustbelt_miners",
        region: "outer_belt",
    },
    SiteEntry {
        title: "Syndicate Forward Post",
        flavor: "Sleek refitter ring that trades fuel for silence and signatures.",
        faction: "vega_syndicate",
        region: "nebulae_line",
    },
];

const fn sites_for(kind: NodeType) -> &'static [SiteEntry] {
    match kind {
        NodeType::Base => BASE_SITES,
        NodeType::Exit => EXIT_SITES,
        NodeType::Wreck => WRECK_SITES,
        NodeType::Anomaly => ANOMALY_SITES,
        NodeType::Pirate => PIRATE_SITES,
        NodeType::Beacon => BEACON_SITES,
    }
}

/// Narrator backed by the built-in site tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogNarrator;

impl CatalogNarrator {
    #[must_use]
    pub fn factions(&self) -> &'static [Faction] {
        &FACTIONS
    }

    #[must_use]
    pub fn regions(&self) -> &'static [Region] {
        &REGIONS
    }

    #[must_use]
    pub fn faction(&self, id: &str) -> Option<&'static Faction> {
        FACTIONS.iter().find(|faction| faction.id == id)
    }

    #[must_use]
    pub fn region(&self, id: &str) -> Option<&'static Region> {
        REGIONS.iter().find(|region| region.id == id)
    }
}

impl Narrator for CatalogNarrator {
    fn describe(&self, node: &MapNode) -> NodeNarrative {
        let pool = sites_for(node.kind);
        if pool.is_empty() {
            return NodeNarrative::fallback(node.kind);
        }
        let idx = usize::try_from(node.id).unwrap_or_default() % pool.len();
        let entry = &pool[idx];
        NodeNarrative {
            node_type: node.kind,
            title: entry.title.to_string(),
            flavor: entry.flavor.to_string(),
            faction_id: Some(entry.faction.to_string()),
            region_id: Some(entry.region.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32, kind: NodeType) -> MapNode {
        MapNode {
            id,
            x: 50.0,
            y: 50.0,
            kind,
            danger: 1,
        }
    }

    #[test]
    fn describe_picks_by_node_id() {
        let narrator = CatalogNarrator;
        assert_eq!(
            narrator.describe(&node(0, NodeType::Wreck)).title,
            "Syndicate Bulk Freighter"
        );
        assert_eq!(
            narrator.describe(&node(4, NodeType::Wreck)).title,
            "Old Navy Frigate"
        );
        assert_eq!(
            narrator.describe(&node(7, NodeType::Base)).title,
            "Cartographer Dock"
        );
    }

    #[test]
    fn describe_is_deterministic() {
        let narrator = CatalogNarrator;
        let a = narrator.describe(&node(5, NodeType::Pirate));
        let b = narrator.describe(&node(5, NodeType::Pirate));
        assert_eq!(a, b);
    }

    #[test]
    fn every_site_references_known_faction_and_region() {
        let narrator = CatalogNarrator;
        for kind in NodeType::ALL {
            for entry in sites_for(kind) {
                assert!(narrator.faction(entry.faction).is_some(), "{}", entry.title);
                assert!(narrator.region(entry.region).is_some(), "{}", entry.title);
            }
        }
        assert_eq!(narrator.factions().len(), 5);
        assert_eq!(narrator.regions().len(), 3);
    }

    #[test]
    fn fallback_names_the_node_type() {
        let narrative = NodeNarrative::fallback(NodeType::Beacon);
        assert_eq!(narrative.title, "BEACON Site");
        assert_eq!(
            narrative.flavor,
            "A charted point of interest on this contract."
        );
    }
}
