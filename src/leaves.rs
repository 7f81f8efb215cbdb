//! Leaf scattering on the lateral surface of grown segments.

use crate::blueprint::PlantBlueprint;
use crate::branch::{Branch, Leaf};
use crate::turtle::up_to;
use glam::{EulerRot, Quat, Vec3};
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Maximum random tilt applied to each leaf normal, per axis.
const LEAF_JITTER: f32 = 15.0 * PI / 180.0;

/// Places leaves on segments of branches old enough to carry them.
pub struct LeafScatterer<'a> {
    blueprint: &'a PlantBlueprint,
}

impl<'a> LeafScatterer<'a> {
    pub fn new(blueprint: &'a PlantBlueprint) -> Self {
        Self { blueprint }
    }

    /// Leaves placed per grown segment.
    pub fn leaves_per_segment(&self) -> u32 {
        self.blueprint.leaves_per_branch / self.blueprint.control_points_per_branch.max(1)
    }

    /// Scatters leaves on the cylinder from `start` to `end`.
    ///
    /// Each leaf sits on the lateral surface of a cylinder of `radius` around
    /// the segment, pushed out along its normal by half the leaf scale. The
    /// normal is tilted by up to 15° per axis. Branches created before
    /// `leaves_start_depth` receive nothing.
    pub fn scatter<R: Rng>(
        &self,
        branch: &mut Branch,
        start: Vec3,
        end: Vec3,
        radius: f32,
        direction: Vec3,
        rng: &mut R,
    ) {
        if branch.creation_depth < self.blueprint.leaves_start_depth {
            return;
        }
        let count = self.leaves_per_segment();
        if count == 0 {
            return;
        }

        let length = start.distance(end);
        let rotation = up_to(direction);
        let offset = self.blueprint.leaf_scale * 0.5;
        branch.leaves.reserve(count as usize);

        for _ in 0..count {
            let theta = rng.random::<f32>() * TAU;
            let height = rng.random::<f32>() * length;

            let normal = Vec3::new(theta.cos(), 0.0, theta.sin());
            let surface = normal * radius + Vec3::Y * height;

            let normal = rotation * normal;
            let position = start + rotation * surface + normal * offset;

            let tilt = Quat::from_euler(
                EulerRot::XYZ,
                jitter(rng),
                jitter(rng),
                jitter(rng),
            );
            branch.leaves.push(Leaf {
                position,
                orientation: (tilt * normal).normalize_or(normal),
            });
        }
    }
}

fn jitter<R: Rng>(rng: &mut R) -> f32 {
    (rng.random::<f32>() * 2.0 - 1.0) * LEAF_JITTER
}
