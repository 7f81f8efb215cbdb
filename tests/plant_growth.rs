// tests/plant_growth.rs
use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use sylva::{
    BranchSegment, Environment, LeafScatterer, Plant, PlantBlueprint, ProductionRule,
    count_branches,
};

fn forking(max_depth: u32, control_points: u32) -> PlantBlueprint {
    PlantBlueprint {
        max_depth,
        control_points_per_branch: control_points,
        leaves_per_branch: 0,
        ..Default::default()
    }
    .with_axiom("[FA]")
    .with_rule(ProductionRule::deterministic("A", "[FA][FA]"))
}

#[test]
fn test_fork_scenario() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(3);
    let mut plant = Plant::new(Arc::new(forking(1, 2)), Vec3::ZERO);

    assert_eq!(plant.branches().len(), 1);
    assert!(!plant.branch(0).unwrap().is_grown());

    // Root grows from its seed node to two nodes.
    plant.grow(&env, &mut rng, &mut ());
    assert_eq!(plant.branch(0).unwrap().nodes.len(), 2);

    assert!(plant.advance_generation(&mut rng));
    assert_eq!(plant.symbols(), "[F[FA][FA]]");
    assert_eq!(plant.branches().len(), 3);

    let root = plant.branch(0).unwrap();
    assert_eq!(root.symbol, "F");
    assert_eq!(root.nodes.len(), 2, "grown geometry survives resync");
    for i in 1..3 {
        let child = plant.branch(i).unwrap();
        assert_eq!(child.creation_depth, 1);
        assert_eq!(child.nesting, 1);
        assert_eq!(child.parent, Some(0));
        assert!(child.nodes.is_empty(), "new branches start ungrown");
    }

    // Max depth reached: no further generations.
    assert!(!plant.advance_generation(&mut rng));
    assert_eq!(plant.depth(), 1);
    assert!(!plant.is_mature(), "children are still ungrown");

    let report = plant.grow(&env, &mut rng, &mut ());
    assert_eq!(report.branches_grown, 2);
    assert!(plant.is_mature());
    let root_end = plant.branch(0).unwrap().end().unwrap();
    for i in 1..3 {
        let child = plant.branch(i).unwrap();
        assert_eq!(child.nodes.len(), 2);
        assert_eq!(child.start(), Some(root_end), "children start at the parent's tip");
    }
}

#[test]
fn test_exactly_max_depth_generations() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(11);
    let bp = PlantBlueprint {
        max_depth: 3,
        ..Default::default()
    }
    .with_axiom("FA")
    .with_rule(ProductionRule::deterministic("A", "[FA]"));
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);

    for _ in 0..10 {
        plant.update(&env, &mut rng);
    }
    assert_eq!(plant.depth(), 3);
    assert!(plant.is_mature());
    assert_eq!(plant.symbols(), "[F[F[F[FA]]]]");
    assert_eq!(plant.branches().len(), count_branches(plant.symbols()));
    let depths: Vec<u32> = plant.branches().iter().map(|b| b.creation_depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 3]);
}

#[test]
fn test_zero_probability_never_fires() {
    let env = Environment::default();
    let bp = Arc::new(
        PlantBlueprint::default()
            .with_axiom("[FA]")
            .with_rule(ProductionRule::new("A", "[FA][FA]", 0.0)),
    );
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut plant = Plant::new(Arc::clone(&bp), Vec3::ZERO);
        while !plant.is_mature() {
            plant.update(&env, &mut rng);
        }
        assert_eq!(plant.symbols(), "[FA]");
        assert_eq!(plant.branches().len(), 1);
    }
}

#[test]
fn test_branch_without_f_keeps_seed_only() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(5);
    let bp = PlantBlueprint::default().with_axiom("[+A]");
    let mut plant = Plant::new(Arc::new(bp), Vec3::new(2.0, 7.0, -1.0));

    plant.update(&env, &mut rng);
    let root = plant.branch(0).unwrap();
    assert_eq!(root.nodes, vec![Vec3::new(2.0, 0.0, -1.0)]);
    assert_eq!(plant.segments().count(), 0);
}

#[test]
fn test_single_f_yields_control_points() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(9);
    let bp = PlantBlueprint {
        control_points_per_branch: 6,
        ..Default::default()
    }
    .with_axiom("[+F-A]");
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);

    plant.grow(&env, &mut rng, &mut ());
    assert_eq!(plant.branch(0).unwrap().nodes.len(), 6);
}

#[test]
fn test_growth_is_idempotent() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(21);
    let mut plant = Plant::new(Arc::new(forking(2, 4)), Vec3::ZERO);
    plant.update(&env, &mut rng);
    let before: Vec<Vec<Vec3>> = plant.branches().iter().map(|b| b.nodes.clone()).collect();

    let report = plant.grow(&env, &mut rng, &mut ());
    assert_eq!(report.branches_grown, 0);
    let after: Vec<Vec<Vec3>> = plant.branches().iter().map(|b| b.nodes.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_straight_growth_without_deviation() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(1);
    let bp = PlantBlueprint {
        max_deviation: 0.0,
        control_points_per_branch: 10,
        ..Default::default()
    }
    .with_axiom("[FFF]");
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);
    plant.grow(&env, &mut rng, &mut ());

    let nodes = &plant.branch(0).unwrap().nodes;
    assert_eq!(nodes.len(), 1 + 3 * 9);
    for pair in nodes.windows(2) {
        assert!(pair[1].y >= pair[0].y);
        assert!(pair[1].x.abs() < 1e-4 && pair[1].z.abs() < 1e-4);
    }
}

#[test]
fn test_nodes_stay_above_ground() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(77);
    let bp = PlantBlueprint {
        gravitropism_scale_factor: 5.0,
        max_deviation: 1.0,
        max_depth: 3,
        ..Default::default()
    }
    .with_axiom("[FA]")
    .with_rule(ProductionRule::deterministic("A", "[&+FA][^-FA]"));
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);
    while !plant.is_mature() {
        plant.update(&env, &mut rng);
    }
    for branch in plant.branches() {
        assert!(branch.nodes.iter().all(|n| n.y >= 0.0), "branch {} dips underground", branch.id);
    }
}

#[test]
fn test_phototropism_leans_toward_sun() {
    let env = Environment {
        sun_position: Vec3::new(100.0, 0.5, 0.0),
    };
    let mut rng = StdRng::seed_from_u64(4);
    let bp = PlantBlueprint {
        max_deviation: 0.0,
        phototropism_scale_factor: 1.0,
        control_points_per_branch: 5,
        ..Default::default()
    }
    .with_axiom("[F]");
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);
    plant.grow(&env, &mut rng, &mut ());

    let tip = plant.branch(0).unwrap().end().unwrap();
    assert!(tip.x > 0.0, "tip {tip} should lean toward +x");
}

#[test]
fn test_segments_reach_the_index() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(8);
    let mut plant = Plant::new(Arc::new(forking(2, 3)), Vec3::ZERO);
    let mut index: Vec<BranchSegment> = Vec::new();
    while !plant.is_mature() {
        plant.update_indexed(&env, &mut rng, &mut index);
    }

    let drawn: Vec<BranchSegment> = plant.segments().collect();
    assert_eq!(index.len(), drawn.len());
    for segment in &index {
        assert!(drawn.contains(segment));
    }
    assert!(plant.wood_mass() > 0.0);
}

#[test]
fn test_radius_tapers_with_depth() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(13);
    let bp = PlantBlueprint {
        decay_constant: 2.0,
        root_radius: 0.4,
        ..forking(1, 2)
    };
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);
    plant.update(&env, &mut rng);

    for segment in plant.segments() {
        let branch = plant
            .branches()
            .iter()
            .find(|b| b.id == segment.branch_id)
            .unwrap();
        let expected = if branch.creation_depth == 0 { 0.4 } else { 0.2 };
        assert_eq!(segment.radius, expected);
    }
}

#[test]
fn test_leaves_respect_start_depth() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(2);
    let bp = PlantBlueprint {
        leaves_per_branch: 10,
        leaves_start_depth: 1,
        ..forking(1, 2)
    };
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);
    plant.update(&env, &mut rng);

    for branch in plant.branches() {
        let expected = if branch.creation_depth == 0 { 0 } else { 5 };
        assert_eq!(branch.leaves.len(), expected);
        for orientation in branch.leaf_orientations() {
            assert!((orientation.length() - 1.0).abs() < 1e-4);
        }
    }
}

#[test]
fn test_scatterer_skips_young_depths() {
    let mut rng = StdRng::seed_from_u64(6);
    let bp = PlantBlueprint {
        leaves_per_branch: 8,
        leaves_start_depth: 4,
        control_points_per_branch: 2,
        ..Default::default()
    };
    let scatterer = LeafScatterer::new(&bp);

    let mut young = sylva::Branch::new(0, 3);
    scatterer.scatter(&mut young, Vec3::ZERO, Vec3::Y, 0.1, Vec3::Y, &mut rng);
    assert!(young.leaves.is_empty());

    let mut old = sylva::Branch::new(1, 4);
    scatterer.scatter(&mut old, Vec3::ZERO, Vec3::Y, 0.1, Vec3::Y, &mut rng);
    assert_eq!(old.leaves.len(), 4);
    for position in old.leaf_positions() {
        assert!(position.y >= 0.0);
    }
    for leaf in &old.leaves {
        // On the bark (radius 0.1) pushed out by half the leaf scale.
        let radial = Vec3::new(leaf.position.x, 0.0, leaf.position.z).length();
        assert!((radial - (0.1 + bp.leaf_scale * 0.5)).abs() < 1e-4);
        assert!((0.0..=1.0).contains(&leaf.position.y));
    }
}

#[test]
fn test_axiom_grows_before_first_rewrite() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(12);
    let bp = PlantBlueprint {
        max_depth: 1,
        control_points_per_branch: 2,
        ..Default::default()
    }
    .with_axiom("[F]")
    .with_rule(ProductionRule::deterministic("F", "FF"));
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);

    let report = plant.update(&env, &mut rng);
    assert_eq!(plant.symbols(), "[FF]");
    assert_eq!(report.branches_grown, 1);
    // Grown from the axiom's single F, not the rewritten FF.
    assert_eq!(plant.branch(0).unwrap().nodes.len(), 2);
}

#[test]
fn test_zero_max_depth_still_grows_axiom() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(14);
    let bp = PlantBlueprint {
        max_depth: 0,
        ..Default::default()
    }
    .with_axiom("[FA]");
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);
    assert!(!plant.is_mature());

    let mut ticks = 0;
    while !plant.is_mature() {
        plant.update(&env, &mut rng);
        ticks += 1;
    }
    assert_eq!(ticks, 1);
    assert_eq!(plant.depth(), 0);
    assert_eq!(plant.symbols(), "[FA]");
    assert_eq!(plant.branch(0).unwrap().nodes.len(), 4);

    let report = plant.update(&env, &mut rng);
    assert_eq!(report.branches_grown, 0);
}

#[test]
fn test_sibling_after_grandchild_starts_at_root_tip() {
    let env = Environment::default();
    let mut rng = StdRng::seed_from_u64(15);
    let bp = PlantBlueprint {
        control_points_per_branch: 2,
        ..Default::default()
    }
    .with_axiom("[F[F[FA]][FA]]");
    let mut plant = Plant::new(Arc::new(bp), Vec3::ZERO);
    plant.grow(&env, &mut rng, &mut ());

    let branches = plant.branches().as_slice();
    let nesting: Vec<usize> = branches.iter().map(|b| b.nesting).collect();
    assert_eq!(nesting, vec![0, 1, 2, 1]);

    let root_end = branches[0].end();
    assert_eq!(branches[1].start(), root_end);
    assert_eq!(branches[2].start(), branches[1].end());
    // Two levels popped back from the grandchild.
    assert_eq!(branches[3].start(), root_end);
    assert_eq!(branches[3].parent, Some(0));
}
