//! Space colonisation: turns branch symbols into 3D polylines.
//!
//! The entry point is [`GrowthSimulator::evaluate`], which walks the branches
//! in string order with a [`TransformStack`] so that every new branch starts
//! at the end of the branch enclosing it. Only ungrown branches are simulated;
//! grown ones just contribute their end point and heading to the stack.
//!
//! # Segment step
//!
//! Each `F` grows `control_points_per_branch - 1` segments. For each one a
//! random point is drawn inside a cone around the heading (height up to
//! `draw_length * decay / control_points`, spread up to `max_deviation`),
//! reflected above the ground, and the heading is pulled toward the sun and
//! toward the ground. The node is then placed one step length along the
//! biased heading.

use crate::blueprint::PlantBlueprint;
use crate::branch::Branch;
use crate::decay::decay;
use crate::leaves::LeafScatterer;
use crate::segment::{BranchSegment, SegmentIndex};
use crate::turtle::{GrowthOp, TransformStack, rotate_heading, up_to};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::ops::AddAssign;
use tracing::{debug, trace};

/// Height of the ground plane. Nodes never end up below it.
pub const GROUND_LEVEL: f32 = 0.0;

/// Scene-wide influences on growth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Point the phototropism bias pulls toward.
    pub sun_position: Vec3,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            sun_position: Vec3::new(0.0, 100.0, 0.0),
        }
    }
}

/// What one growth pass produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Branches that received geometry.
    pub branches_grown: usize,
    /// Segments added across those branches.
    pub segments: usize,
    /// Leaves scattered on the new segments.
    pub leaves: usize,
}

impl AddAssign for GrowthReport {
    fn add_assign(&mut self, rhs: Self) {
        self.branches_grown += rhs.branches_grown;
        self.segments += rhs.segments;
        self.leaves += rhs.leaves;
    }
}

/// Grows branches for one blueprint under one environment.
pub struct GrowthSimulator<'a> {
    blueprint: &'a PlantBlueprint,
    environment: &'a Environment,
    leaves: LeafScatterer<'a>,
}

impl<'a> GrowthSimulator<'a> {
    pub fn new(blueprint: &'a PlantBlueprint, environment: &'a Environment) -> Self {
        Self {
            blueprint,
            environment,
            leaves: LeafScatterer::new(blueprint),
        }
    }

    /// Grows every ungrown branch in `branches`, in order.
    ///
    /// `base` is the plant's ground position; the root branch starts there
    /// heading up. Each newly grown segment is handed to `index`.
    pub fn evaluate<R: Rng, I: SegmentIndex + ?Sized>(
        &self,
        branches: &mut [Branch],
        base: Vec3,
        rng: &mut R,
        index: &mut I,
    ) -> GrowthReport {
        let mut report = GrowthReport::default();
        let mut stack = TransformStack::new(base, Vec3::Y);

        for branch in branches.iter_mut() {
            stack.restore_to(branch.nesting);
            let (start, heading) = stack.top();

            if !branch.is_grown() {
                let leaves_before = branch.leaves.len();
                let segments = self.grow_branch(branch, start, heading, rng, index);
                trace!(
                    id = branch.id,
                    symbol = %branch.symbol,
                    segments,
                    "grew branch"
                );
                report.branches_grown += 1;
                report.segments += segments;
                report.leaves += branch.leaves.len() - leaves_before;
            }

            let end = branch.end().unwrap_or(start);
            let net = branch
                .net_direction()
                .filter(|d| *d != Vec3::ZERO)
                .unwrap_or(heading);
            stack.push(end, net);
        }

        debug!(
            branches = branches.len(),
            grown = report.branches_grown,
            segments = report.segments,
            leaves = report.leaves,
            "growth pass"
        );
        report
    }

    /// Seeds `branch` at `start` and interprets its symbol. Returns the number
    /// of segments grown.
    ///
    /// A symbol without `F` leaves the branch with only its seed node.
    pub fn grow_branch<R: Rng, I: SegmentIndex + ?Sized>(
        &self,
        branch: &mut Branch,
        start: Vec3,
        heading: Vec3,
        rng: &mut R,
        index: &mut I,
    ) -> usize {
        branch.nodes.push(start);

        let angle = self.blueprint.draw_angle_radians();
        let ops: Vec<GrowthOp> = branch.symbol.chars().map(GrowthOp::from_symbol).collect();
        let mut heading = heading;
        let mut segments = 0;

        for op in ops {
            match op {
                GrowthOp::Rotate(plane, sign) => {
                    heading = rotate_heading(heading, plane, angle * sign);
                }
                GrowthOp::Grow => {
                    heading = heading.normalize_or(Vec3::Y);
                    segments += self.colonise(branch, &mut heading, rng, index);
                }
                GrowthOp::Ignore => {}
            }
        }
        segments
    }

    fn colonise<R: Rng, I: SegmentIndex + ?Sized>(
        &self,
        branch: &mut Branch,
        heading: &mut Vec3,
        rng: &mut R,
        index: &mut I,
    ) -> usize {
        let bp = self.blueprint;
        let Some(mut position) = branch.end() else {
            return 0;
        };

        let decay = decay(branch.creation_depth, bp.decay_constant);
        let control_points = bp.control_points_per_branch.max(1);
        let max_step = bp.draw_length * decay / control_points as f32;
        let radius = bp.root_radius * decay;
        let gravitropism = Vec3::NEG_Y * bp.gravitropism_scale_factor * decay;

        for _ in 1..control_points {
            // Random point in a cone, built pointing up.
            let h = rng.random::<f32>();
            let r = rng.random::<f32>() * h * bp.max_deviation;
            let alpha = rng.random::<f32>() * TAU;
            let local = Vec3::new(r * alpha.cos(), h * max_step, r * alpha.sin());

            let offset = up_to(*heading) * local;
            let step = offset.length();
            let candidate = above_ground(position + offset);

            let phototropism = (self.environment.sun_position - candidate).normalize_or_zero()
                * bp.phototropism_scale_factor
                * decay;
            *heading = (candidate - position + phototropism + gravitropism).normalize_or(*heading);

            let next = above_ground(position + *heading * step);
            let segment = BranchSegment {
                branch_id: branch.id,
                node_index: branch.nodes.len() - 1,
                start: position,
                end: next,
                radius,
            };
            branch.nodes.push(next);
            index.insert(segment);
            self.leaves
                .scatter(branch, position, next, radius, *heading, rng);

            position = next;
        }
        control_points as usize - 1
    }
}

/// Mirrors a point that fell to or below the ground back above it.
fn above_ground(p: Vec3) -> Vec3 {
    if p.y <= GROUND_LEVEL {
        Vec3::new(p.x, 2.0 * GROUND_LEVEL - p.y, p.z)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflection_keeps_points_above_ground() {
        assert_eq!(above_ground(Vec3::new(1.0, -0.5, 2.0)), Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(above_ground(Vec3::new(1.0, 0.5, 2.0)), Vec3::new(1.0, 0.5, 2.0));
    }
}
