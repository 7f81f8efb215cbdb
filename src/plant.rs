//! A single growing plant: one grammar string, its branch records and the
//! geometry grown for them.

use crate::blueprint::PlantBlueprint;
use crate::branch::{Branch, BranchBook};
use crate::decay::decay;
use crate::grammar::{rewrite, wrap_axiom};
use crate::growth::{Environment, GROUND_LEVEL, GrowthReport, GrowthSimulator};
use crate::segment::{BranchSegment, SegmentIndex};
use glam::Vec3;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// One plant rooted on the ground, driven by a shared [`PlantBlueprint`].
///
/// Each [`update`](Self::update) grows whatever has no geometry yet, rewrites
/// the grammar string once (until `max_depth` generations have run),
/// reconciles the branch records and grows the branches that generation
/// introduced. Existing geometry is never touched.
#[derive(Clone, Debug)]
pub struct Plant {
    blueprint: Arc<PlantBlueprint>,
    position: Vec3,
    symbols: String,
    depth: u32,
    branches: BranchBook,
}

impl Plant {
    /// Plants `blueprint` at `position`. The y coordinate is forced onto the
    /// ground. The axiom is grown by the first [`grow`](Self::grow) or
    /// [`update`](Self::update).
    pub fn new(blueprint: Arc<PlantBlueprint>, position: Vec3) -> Self {
        let symbols = wrap_axiom(&blueprint.axiom);
        let branches = BranchBook::from_symbols(&symbols, 0);
        Self {
            blueprint,
            position: Vec3::new(position.x, GROUND_LEVEL, position.z),
            symbols,
            depth: 0,
            branches,
        }
    }

    pub fn blueprint(&self) -> &Arc<PlantBlueprint> {
        &self.blueprint
    }

    /// Ground position of the plant.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The current generation's grammar string.
    pub fn symbols(&self) -> &str {
        &self.symbols
    }

    /// Generations rewritten so far.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether all `max_depth` generations have run and every branch is grown.
    pub fn is_mature(&self) -> bool {
        self.generations_done() && self.branches.iter().all(Branch::is_grown)
    }

    fn generations_done(&self) -> bool {
        self.depth >= self.blueprint.max_depth
    }

    pub fn branches(&self) -> &BranchBook {
        &self.branches
    }

    pub fn branch(&self, index: usize) -> Option<&Branch> {
        self.branches.get(index)
    }

    /// Rewrites the string for one generation and resyncs the branches.
    ///
    /// Returns `false` (and does nothing) once `max_depth` generations have run.
    pub fn advance_generation<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.generations_done() {
            return false;
        }
        self.depth += 1;

        let next = rewrite(&self.symbols, &self.blueprint.rules, rng);
        let new_branches = next.new_branches();
        for insertion in &next.insertions {
            self.branches
                .insert_placeholders(insertion.count, insertion.position, self.depth);
        }
        self.symbols = next.string;
        self.branches.resync(&self.symbols, self.depth);

        debug!(
            depth = self.depth,
            branches = self.branches.len(),
            substitutions = next.substitutions,
            new_branches,
            "advanced generation"
        );
        true
    }

    /// Grows every ungrown branch, reporting new segments to `index`.
    pub fn grow<R: Rng, I: SegmentIndex + ?Sized>(
        &mut self,
        environment: &Environment,
        rng: &mut R,
        index: &mut I,
    ) -> GrowthReport {
        GrowthSimulator::new(&self.blueprint, environment).evaluate(
            self.branches.as_mut_slice(),
            self.position,
            rng,
            index,
        )
    }

    /// One simulation tick: grow anything still ungrown (the axiom on the first
    /// tick), advance a generation if any remain, then grow its new branches.
    pub fn update<R: Rng>(&mut self, environment: &Environment, rng: &mut R) -> GrowthReport {
        self.update_indexed(environment, rng, &mut ())
    }

    /// [`update`](Self::update), reporting new segments to `index`.
    pub fn update_indexed<R: Rng, I: SegmentIndex + ?Sized>(
        &mut self,
        environment: &Environment,
        rng: &mut R,
        index: &mut I,
    ) -> GrowthReport {
        let mut report = self.grow(environment, rng, index);
        if self.advance_generation(rng) {
            report += self.grow(environment, rng, index);
        }
        report
    }

    /// Every grown segment, branch by branch, with its tapered radius.
    pub fn segments(&self) -> impl Iterator<Item = BranchSegment> + '_ {
        let bp = &self.blueprint;
        self.branches.iter().flat_map(move |branch| {
            let radius = bp.root_radius * decay(branch.creation_depth, bp.decay_constant);
            branch
                .nodes
                .windows(2)
                .enumerate()
                .map(move |(node_index, pair)| BranchSegment {
                    branch_id: branch.id,
                    node_index,
                    start: pair[0],
                    end: pair[1],
                    radius,
                })
        })
    }

    /// Total wood mass of all segments at the blueprint's wood density.
    pub fn wood_mass(&self) -> f32 {
        let density = self.blueprint.wood_density;
        self.segments().map(|s| s.mass(density)).sum()
    }

    pub fn leaf_count(&self) -> usize {
        self.branches.iter().map(|b| b.leaves.len()).sum()
    }
}
