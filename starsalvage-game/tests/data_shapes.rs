use std::collections::HashSet;
use std::sync::Arc;

use starsalvage_game::{
    CatalogNarrator, ConfigError, Expedition, ExpeditionConfig, HullBreachRule, ItemCatalog,
    ItemPerk, ItemSlot, MapFragment, MapNode, NodeNarrative, NodeType, Narrator, Point, RngBundle,
    StepOutcome,
};

#[test]
fn bundled_catalog_is_well_formed() {
    let catalog = ItemCatalog::load_from_static();
    assert_eq!(catalog.items.len(), 14);

    let ids: HashSet<&str> = catalog.items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids.len(), catalog.items.len(), "item ids must be unique");

    for slot in ItemSlot::ALL {
        assert!(
            catalog
                .items
                .iter()
                .any(|item| item.slot == slot),
            "no item for slot {slot}"
        );
    }
    for kind in [NodeType::Wreck, NodeType::Anomaly, NodeType::Pirate, NodeType::Beacon] {
        assert!(
            !catalog.for_affinity(kind).is_empty(),
            "no salvage pool for {kind}"
        );
    }
    assert!(catalog.for_affinity(NodeType::Exit).is_empty());

    let insight = catalog
        .items
        .iter()
        .filter(|item| item.has_perk(ItemPerk::AnomalyInsight))
        .count();
    assert_eq!(insight, 2);
}

#[test]
fn default_loadout_resolves_against_catalog() {
    let exp = Expedition::with_seed(ExpeditionConfig::default(), 99).unwrap();
    let loadout = &exp.state().loadout;
    let ids: Vec<&str> = loadout.iter().map(|(_, item)| item.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "core_scout",
            "engine_basic",
            "hull_standard",
            "scanner_basic",
            "util_risk_recyclers",
            "util_signal_bender",
        ]
    );
    for (slot, item) in loadout.iter() {
        assert_eq!(item.slot, slot);
    }
}

#[test]
fn catalog_narrator_covers_every_node_type() {
    let narrator = CatalogNarrator;
    for kind in NodeType::ALL {
        for id in 0..6 {
            let node = MapNode {
                id,
                x: 0.0,
                y: 0.0,
                kind,
                danger: 0,
            };
            let narrative = narrator.describe(&node);
            assert_eq!(narrative.node_type, kind);
            assert!(!narrative.title.is_empty());
            assert!(!narrative.flavor.is_empty());
            if let Some(faction) = narrative.faction_id.as_deref() {
                assert!(narrator.faction(faction).is_some(), "unknown faction {faction}");
            }
            if let Some(region) = narrative.region_id.as_deref() {
                assert!(narrator.region(region).is_some(), "unknown region {region}");
            }
        }
    }
    assert_eq!(narrator.factions().len(), 5);
    assert_eq!(narrator.regions().len(), 3);
}

#[derive(Debug, Clone, Copy)]
struct PlainNarrator;

impl Narrator for PlainNarrator {
    fn describe(&self, node: &MapNode) -> NodeNarrative {
        NodeNarrative {
            node_type: node.kind,
            title: format!("Site {}", node.id),
            flavor: "Nothing to report.".to_string(),
            faction_id: None,
            region_id: None,
        }
    }
}

#[test]
fn custom_narrator_feeds_the_run_log() {
    let mut exp = Expedition::with_parts(
        ExpeditionConfig::default(),
        RngBundle::from_user_seed(12),
        Arc::new(ItemCatalog::load_from_static()),
        PlainNarrator,
    )
    .unwrap();
    exp.load_fragment(MapFragment::from_nodes(vec![
        MapNode {
            id: 0,
            x: 20.0,
            y: 20.0,
            kind: NodeType::Base,
            danger: 0,
        },
        MapNode {
            id: 4,
            x: 35.0,
            y: 20.0,
            kind: NodeType::Beacon,
            danger: 1,
        },
    ]));
    exp.extend_path(Point::new(35.0, 20.0));
    exp.launch().unwrap();
    assert_eq!(exp.step(), StepOutcome::Encounter { node_id: 4 });
    let messages: Vec<&str> = exp.log().iter().map(|entry| entry.message.as_str()).collect();
    assert_eq!(messages[1..], ["Site 4", "Nothing to report."]);
}

#[test]
fn partial_config_keeps_defaults() {
    let cfg = ExpeditionConfig::from_json(
        r#"{ "map": { "node_count": 12 }, "rules": { "hull_breach": "end_run" } }"#,
    )
    .unwrap();
    assert_eq!(cfg.map.node_count, 12);
    assert!((cfg.map.radius_min - 28.0).abs() < f64::EPSILON);
    assert!((cfg.travel.hit_radius - 6.0).abs() < f64::EPSILON);
    assert_eq!(cfg.rules.hull_breach, HullBreachRule::EndRun);
    assert_eq!(cfg.start.loadout.utility2, "util_signal_bender");

    let exp = Expedition::with_seed(cfg, 5).unwrap();
    assert_eq!(exp.fragment().nodes.len(), 12);
}

#[test]
fn malformed_config_is_reported() {
    assert!(matches!(
        ExpeditionConfig::from_json("{ not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(ExpeditionConfig::from_json(r#"{ "map": { "radius_min": 40.0, "radius_max": 30.0 } }"#).is_err());
    assert!(ExpeditionConfig::from_json(r#"{ "travel": { "fuel_per_unit": -1.0 } }"#).is_err());
}

#[test]
fn snapshot_json_shape_is_stable() {
    let exp = Expedition::with_seed(ExpeditionConfig::default(), 31).unwrap();
    let value = serde_json::to_value(exp.snapshot()).unwrap();
    let object = value.as_object().unwrap();
    for key in [
        "fragment",
        "phase",
        "stats",
        "log",
        "path",
        "cursor",
        "ship_position",
        "visited",
        "salvage",
        "failure",
        "decision_pending",
        "loadout",
        "signal_bender_used",
        "anomaly_visits",
        "outcome",
    ] {
        assert!(object.contains_key(key), "snapshot lost key {key}");
    }
    let node = &value["fragment"]["nodes"][1];
    for key in ["id", "x", "y", "type", "danger"] {
        assert!(node.get(key).is_some(), "node lost key {key}");
    }
}

#[test]
fn generated_fragments_respect_layout_bounds() {
    let cfg = ExpeditionConfig::default();
    for seed in 0..50 {
        let exp = Expedition::with_seed(cfg.clone(), seed).unwrap();
        let fragment = exp.fragment();
        assert_eq!(fragment.count_of(NodeType::Base), 1);
        for node in &fragment.nodes {
            assert!((cfg.map.field_min..=cfg.map.field_max).contains(&node.x));
            assert!((cfg.map.field_min..=cfg.map.field_max).contains(&node.y));
            if node.kind == NodeType::Base || node.kind == NodeType::Exit {
                assert_eq!(node.danger, 0);
            } else {
                assert!((cfg.map.danger_min..=cfg.map.danger_max).contains(&node.danger));
            }
        }
    }
}
