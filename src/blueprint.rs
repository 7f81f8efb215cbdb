//! Per-species growth parameters and the named registry that shares them
//! between plants.

use crate::error::BlueprintError;
use crate::grammar::{ProductionRule, parse_rules, wrap_axiom};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Name of the rigid, deterministic preset.
pub const LSYSTEM_CLONE: &str = "LSystemClone";
/// Name of the stochastic, many-node preset.
pub const TANGLED_BRANCHES: &str = "TangledBranches";
/// Name of the leafy, light-seeking preset.
pub const GENERIC_TREE: &str = "GenericTree";

/// Everything the growth pipeline reads about a species.
///
/// Blueprints are shared read-only between plants (see [`BlueprintLibrary`]);
/// nothing in the pipeline mutates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantBlueprint {
    /// Initial symbol string. Always starts with `[`.
    pub axiom: String,

    /// Production rules, tested in declaration order.
    pub rules: Vec<ProductionRule>,

    /// Number of generations a plant may be rewritten.
    pub max_depth: u32,

    /// Length of one `F` at the root (scaled down by decay for deeper branches).
    pub draw_length: f32,

    /// Angle in degrees applied by each rotation symbol.
    pub draw_angle: f32,

    /// Radius of root-depth branches.
    pub root_radius: f32,

    /// Per-generation attenuation of length, radius and gravitropism.
    pub decay_constant: f32,

    /// Widest cone spread per step, as a ratio of the step height.
    pub max_deviation: f32,

    /// Nodes in a branch polyline grown from one `F` (including the start).
    pub control_points_per_branch: u32,

    /// Leaves per branch, spread over its segments.
    pub leaves_per_branch: u32,

    /// First creation depth that carries leaves.
    pub leaves_start_depth: u32,

    /// Leaf size; leaves float half of it off the bark.
    pub leaf_scale: f32,

    /// Strength of the bias toward the sun.
    pub phototropism_scale_factor: f32,

    /// Strength of the downward bias.
    pub gravitropism_scale_factor: f32,

    /// Wood density (kg/m³) used for segment mass.
    pub wood_density: f32,
}

impl Default for PlantBlueprint {
    fn default() -> Self {
        Self {
            axiom: "[FA]".to_string(),
            rules: Vec::new(),
            max_depth: 5,
            draw_length: 1.0,
            draw_angle: 30.0,
            root_radius: 0.05,
            decay_constant: 1.4,
            max_deviation: 0.1,
            control_points_per_branch: 4,
            leaves_per_branch: 0,
            leaves_start_depth: 3,
            leaf_scale: 0.03,
            phototropism_scale_factor: 0.0,
            gravitropism_scale_factor: 0.0,
            wood_density: 700.0,
        }
    }
}

impl PlantBlueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the axiom, wrapping it in brackets if it does not open a branch.
    pub fn set_axiom(&mut self, axiom: &str) {
        self.axiom = wrap_axiom(axiom);
    }

    /// Builder form of [`set_axiom`](Self::set_axiom).
    pub fn with_axiom(mut self, axiom: &str) -> Self {
        self.set_axiom(axiom);
        self
    }

    pub fn with_rule(mut self, rule: ProductionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends every valid rule in `text`. Returns how many were added.
    pub fn read_grammar_from_str(&mut self, text: &str) -> usize {
        let rules = parse_rules(text);
        let added = rules.len();
        self.rules.extend(rules);
        added
    }

    /// Appends every valid rule in the file at `path`.
    pub fn read_grammar_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize, BlueprintError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let added = self.read_grammar_from_str(&text);
        info!(path = %path.display(), rules = added, "loaded grammar");
        Ok(added)
    }

    /// Draw angle in radians.
    pub fn draw_angle_radians(&self) -> f32 {
        self.draw_angle.to_radians()
    }

    /// Rigid L-system look: no cone spread, no tropisms, straight segments.
    pub fn lsystem_clone() -> Self {
        let mut bp = Self {
            decay_constant: 1.5,
            draw_angle: 45.0,
            draw_length: 0.7,
            max_depth: 5,
            max_deviation: 0.0,
            leaves_per_branch: 30,
            leaves_start_depth: 2,
            leaf_scale: 0.05,
            control_points_per_branch: 2,
            root_radius: 0.1,
            ..Default::default()
        }
        .with_axiom("FFA");
        bp.read_grammar_from_str("A=[+FA][-FA][/FA][\\FA]");
        bp
    }

    /// Stochastic tangle of thin, wandering branches without leaves.
    pub fn tangled_branches() -> Self {
        let mut bp = Self {
            decay_constant: 1.4,
            draw_angle: 30.0,
            draw_length: 0.8,
            max_depth: 4,
            max_deviation: 0.1,
            leaves_per_branch: 0,
            leaves_start_depth: 0,
            leaf_scale: 0.03,
            control_points_per_branch: 8,
            root_radius: 0.05,
            ..Default::default()
        }
        .with_axiom("FA");
        bp.read_grammar_from_str("A=[+/FA][-&FA][\\^FA],0.8");
        bp
    }

    /// Leafy tree leaning slightly toward the sun.
    pub fn generic_tree() -> Self {
        let mut bp = Self {
            decay_constant: 1.4,
            draw_angle: 45.0,
            draw_length: 1.2,
            max_depth: 5,
            max_deviation: 0.1,
            leaves_per_branch: 30,
            leaves_start_depth: 3,
            leaf_scale: 0.03,
            control_points_per_branch: 6,
            root_radius: 0.04,
            phototropism_scale_factor: 0.005,
            ..Default::default()
        }
        .with_axiom("FFA");
        bp.read_grammar_from_str("A=[+FA][-/FA][\\&FA]");
        bp
    }
}

/// Named blueprints shared between plants.
#[derive(Clone, Debug, Default)]
pub struct BlueprintLibrary {
    blueprints: HashMap<String, Arc<PlantBlueprint>>,
}

impl BlueprintLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// A library holding the three built-in presets.
    pub fn with_presets() -> Self {
        let mut lib = Self::new();
        lib.insert(LSYSTEM_CLONE, PlantBlueprint::lsystem_clone());
        lib.insert(TANGLED_BRANCHES, PlantBlueprint::tangled_branches());
        lib.insert(GENERIC_TREE, PlantBlueprint::generic_tree());
        lib
    }

    /// Registers (or replaces) `name`. Plants already holding the old
    /// blueprint keep it.
    pub fn insert(&mut self, name: impl Into<String>, blueprint: PlantBlueprint) -> Arc<PlantBlueprint> {
        let shared = Arc::new(blueprint);
        self.blueprints.insert(name.into(), Arc::clone(&shared));
        shared
    }

    pub fn get(&self, name: &str) -> Option<Arc<PlantBlueprint>> {
        self.blueprints.get(name).cloned()
    }

    /// Like [`get`](Self::get) but reports unknown names as an error.
    pub fn preset(&self, name: &str) -> Result<Arc<PlantBlueprint>, BlueprintError> {
        self.get(name)
            .ok_or_else(|| BlueprintError::UnknownPreset(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.blueprints.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }
}
