//! Growth turtle: symbol operations and the stacked transform state that
//! hands each branch its parent's end point.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// The plane a rotation symbol turns the heading in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationPlane {
    /// Rotation about Z (`/` and `\`).
    Xy,
    /// Rotation about X (`+` and `-`).
    Yz,
    /// Rotation about Y (`&` and `^`).
    Xz,
}

/// Operations performed while walking a branch symbol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GrowthOp {
    /// Turn the heading by `sign * draw_angle` in the given plane.
    Rotate(RotationPlane, f32),
    /// Grow one stochastic segment run (`F`).
    Grow,
    /// Symbol has no geometric meaning.
    Ignore,
}

impl GrowthOp {
    /// Maps a grammar symbol to its operation.
    pub fn from_symbol(c: char) -> Self {
        match c {
            '/' => Self::Rotate(RotationPlane::Xy, 1.0),
            '\\' => Self::Rotate(RotationPlane::Xy, -1.0),
            '+' => Self::Rotate(RotationPlane::Yz, 1.0),
            '-' => Self::Rotate(RotationPlane::Yz, -1.0),
            '&' => Self::Rotate(RotationPlane::Xz, 1.0),
            '^' => Self::Rotate(RotationPlane::Xz, -1.0),
            'F' => Self::Grow,
            _ => Self::Ignore,
        }
    }
}

/// Rotates `direction` by `angle` radians in `plane`.
pub fn rotate_heading(direction: Vec3, plane: RotationPlane, angle: f32) -> Vec3 {
    let rot = match plane {
        RotationPlane::Xy => Quat::from_rotation_z(angle),
        RotationPlane::Yz => Quat::from_rotation_x(angle),
        RotationPlane::Xz => Quat::from_rotation_y(angle),
    };
    rot * direction
}

/// Rotation taking +Y onto `direction`. A zero direction maps to identity.
pub fn up_to(direction: Vec3) -> Quat {
    Quat::from_rotation_arc(Vec3::Y, direction.normalize_or(Vec3::Y))
}

/// Paired position/direction stacks mirroring bracket nesting.
///
/// The bottom entry (the plant's ground position facing up) is never popped.
#[derive(Clone, Debug)]
pub struct TransformStack {
    positions: Vec<Vec3>,
    directions: Vec<Vec3>,
}

impl TransformStack {
    /// Creates a stack seeded with the plant base.
    pub fn new(base: Vec3, up: Vec3) -> Self {
        Self {
            positions: vec![base],
            directions: vec![up],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Pops entries until `nesting + 1` remain, so the top belongs to the
    /// branch enclosing one at `nesting`.
    pub fn restore_to(&mut self, nesting: usize) {
        let keep = nesting + 1;
        self.positions.truncate(keep);
        self.directions.truncate(keep);
    }

    pub fn push(&mut self, position: Vec3, direction: Vec3) {
        self.positions.push(position);
        self.directions.push(direction);
    }

    /// The current top `(position, direction)`.
    pub fn top(&self) -> (Vec3, Vec3) {
        // Both stacks always hold at least the base entry.
        let position = self.positions.last().copied().unwrap_or_default();
        let direction = self.directions.last().copied().unwrap_or(Vec3::Y);
        (position, direction)
    }
}
