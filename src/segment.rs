//! Grown segments as consumed by renderers, physics and spatial indices.

use crate::branch::BranchId;
use bevy_heavy::ComputeMassProperties3d as _;
use bevy_math::primitives::Cylinder;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One piece of a branch polyline, drawn as a cylinder of `radius`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchSegment {
    /// Branch the segment belongs to.
    pub branch_id: BranchId,
    /// Index of the segment's start node within the branch polyline.
    pub node_index: usize,
    pub start: Vec3,
    pub end: Vec3,
    /// `root_radius * decay(creation_depth)`.
    pub radius: f32,
}

impl BranchSegment {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Unit direction from start to end (+Y for a degenerate segment).
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or(Vec3::Y)
    }

    /// Centre and orientation of the segment's cylinder (aligned along Y).
    pub fn transform(&self) -> (Vec3, Quat) {
        let center = self.start.lerp(self.end, 0.5);
        (center, Quat::from_rotation_arc(Vec3::Y, self.direction()))
    }

    /// Convert to the corresponding `bevy_math` primitive.
    pub fn to_bevy_primitive(&self) -> Cylinder {
        Cylinder::new(self.radius, self.length())
    }

    /// Mass in kg for a wood density in kg/m³, computed via `bevy_heavy`.
    pub fn mass(&self, density: f32) -> f32 {
        self.to_bevy_primitive().mass(density)
    }
}

/// Receives every newly grown segment, e.g. for later proximity queries.
pub trait SegmentIndex {
    fn insert(&mut self, segment: BranchSegment);
}

/// Discards segments.
impl SegmentIndex for () {
    fn insert(&mut self, _segment: BranchSegment) {}
}

/// Records segments in growth order.
impl SegmentIndex for Vec<BranchSegment> {
    fn insert(&mut self, segment: BranchSegment) {
        self.push(segment);
    }
}
