//! Depth-dependent attenuation of branch length, radius and tropism response.

/// Returns the scalar decay for a branch created at generation `depth`.
///
/// The result is `1 / decay_constant^depth`, so `decay(0, k) == 1` for every `k`
/// and deeper branches shrink when `decay_constant > 1`. A constant of exactly
/// `1.0` short-circuits to `1.0`.
pub fn decay(depth: u32, decay_constant: f32) -> f32 {
    if decay_constant == 1.0 || depth == 0 {
        return 1.0;
    }
    1.0 / decay_constant.powi(depth.min(i32::MAX as u32) as i32)
}
