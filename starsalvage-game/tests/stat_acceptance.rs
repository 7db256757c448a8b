use rand::SeedableRng;
use rand::rngs::SmallRng;
use starsalvage_game::encounter::roll_succeeds;
use starsalvage_game::rng::roll_unit;
use starsalvage_game::{
    Expedition, ExpeditionConfig, FailureKind, ItemCatalog, MapConfig, MapFragment, MapNode,
    NodeType, Point, Resolution, StepOutcome, draw_failure, generate_fragment, resolve_encounter,
};
use std::collections::BTreeMap;
use std::convert::TryFrom;

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

fn rate(count: usize, total: usize) -> f64 {
    f64::from(u32::try_from(count).expect("count fits")) / f64::from(u32::try_from(total).expect("total fits"))
}

#[test]
fn spawned_node_types_track_weights() {
    let cfg = MapConfig::default();
    let mut rng = SmallRng::seed_from_u64(0x5EED);
    let mut counts: BTreeMap<NodeType, usize> = BTreeMap::new();
    let mut total = 0usize;
    while total < SAMPLE_SIZE {
        let fragment = generate_fragment(&cfg, &mut rng);
        assert_eq!(fragment.nodes[0].kind, NodeType::Base);
        for node in fragment.nodes.iter().skip(1) {
            *counts.entry(node.kind).or_default() += 1;
            total += 1;
        }
    }
    for kind in NodeType::SPAWN_ORDER {
        let observed = rate(counts.get(&kind).copied().unwrap_or_default(), total);
        let expected = kind.profile().spawn_weight;
        assert!(
            (observed - expected).abs() <= TOLERANCE,
            "{kind} spawn rate drifted: observed {observed:.4}, expected {expected:.2}"
        );
    }
    assert!(!counts.contains_key(&NodeType::Base));
}

#[test]
fn unit_rolls_match_success_chance() {
    let mut rng = SmallRng::seed_from_u64(0xACED);
    for chance in [0.35, 0.6, 0.8, 0.95] {
        let successes = (0..SAMPLE_SIZE)
            .filter(|_| roll_succeeds(roll_unit(&mut rng), chance))
            .count();
        let observed = rate(successes, SAMPLE_SIZE);
        assert!(
            (observed - chance).abs() <= TOLERANCE,
            "success rate for {chance} drifted: observed {observed:.4}"
        );
    }
}

#[test]
fn failure_variants_split_evenly() {
    let mut rng = SmallRng::seed_from_u64(0xBEEF);
    for kind in [NodeType::Wreck, NodeType::Pirate, NodeType::Anomaly, NodeType::Beacon] {
        let table = FailureKind::table(kind);
        assert_eq!(table.len(), 2);
        let first = (0..SAMPLE_SIZE)
            .filter(|_| draw_failure(kind, 1, &mut rng).kind == table[0])
            .count();
        let observed = rate(first, SAMPLE_SIZE);
        assert!(
            (observed - 0.5).abs() <= TOLERANCE,
            "{kind} failure split drifted: observed {observed:.4}"
        );
    }
}

#[test]
fn salvage_options_sample_the_pool_uniformly() {
    let catalog = ItemCatalog::load_from_static();
    let exp = Expedition::with_seed(ExpeditionConfig::default(), 1).expect("default expedition");
    let loadout = exp.state().loadout.clone();
    let wreck = MapNode {
        id: 3,
        x: 40.0,
        y: 40.0,
        kind: NodeType::Wreck,
        danger: 2,
    };
    let pool = catalog.for_affinity(NodeType::Wreck).len();
    assert_eq!(pool, 4);

    let mut rng = SmallRng::seed_from_u64(0xF00D);
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for _ in 0..SAMPLE_SIZE {
        let state = resolve_encounter(&wreck, &loadout, &catalog, 0, &mut rng);
        assert_eq!(state.options.len(), 3);
        for option in &state.options {
            *seen.entry(option.item.id.clone()).or_default() += 1;
        }
    }
    assert_eq!(seen.len(), pool);
    for (id, count) in seen {
        let observed = rate(count, SAMPLE_SIZE);
        assert!(
            (observed - 0.75).abs() <= TOLERANCE,
            "{id} inclusion drifted: observed {observed:.4}"
        );
    }
}

#[test]
fn seeded_scrap_rolls_track_node_chance() {
    let mut stripped = 0usize;
    for seed in 0..u64::try_from(SAMPLE_SIZE).expect("sample size fits") {
        let mut exp = Expedition::with_seed(ExpeditionConfig::default(), seed).expect("expedition");
        exp.load_fragment(MapFragment::from_nodes(vec![
            MapNode {
                id: 0,
                x: 50.0,
                y: 50.0,
                kind: NodeType::Base,
                danger: 0,
            },
            MapNode {
                id: 1,
                x: 70.0,
                y: 50.0,
                kind: NodeType::Wreck,
                danger: 2,
            },
        ]));
        exp.extend_path(Point::new(70.0, 50.0));
        exp.launch().expect("launch");
        assert_eq!(exp.step(), StepOutcome::Encounter { node_id: 1 });
        if matches!(exp.confirm_scrap(), Ok(Resolution::Stripped { .. })) {
            stripped += 1;
        }
    }
    let observed = rate(stripped, SAMPLE_SIZE);
    let expected = NodeType::Wreck.profile().scrap_chance;
    assert!(
        (observed - expected).abs() <= TOLERANCE,
        "wreck scrap rate drifted: observed {observed:.4}"
    );
}
