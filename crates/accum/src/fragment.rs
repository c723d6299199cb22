//! Per-fragment force model, shared by the shader and the CPU reference.
//!
//! A surface element facing into the flow is pushed along its inward normal in
//! proportion to how directly it faces the flow. Values are quantized to
//! fixed point so that accumulation is integer and order-independent.

use glam::{IVec3, Vec3};

/// Fixed-point scale applied before quantizing force and torque to integers.
pub const FORCE_SCALE: f32 = 1000.0;

/// A rasterized surface sample: world-space position and unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Fragment {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }

    /// Quantized `(force, torque)` contribution, `w` lanes included.
    ///
    /// `force.w` is 1 (invocation counter) and `torque.w` is 0 (reserved).
    pub fn contribution(&self, flow: Vec3, center: Vec3) -> ([i32; 4], [i32; 4]) {
        let pressure = (-self.normal.dot(flow)).max(0.0);
        let force = -self.normal * pressure;
        let torque = (self.position - center).cross(force);
        let f = quantize(force);
        let t = quantize(torque);
        ([f.x, f.y, f.z, 1], [t.x, t.y, t.z, 0])
    }
}

/// Round-half-to-even, matching WGSL `round`.
fn quantize(v: Vec3) -> IVec3 {
    let s = v * FORCE_SCALE;
    IVec3::new(
        s.x.round_ties_even() as i32,
        s.y.round_ties_even() as i32,
        s.z.round_ties_even() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_on_surface_is_pushed_downstream() {
        let frag = Fragment::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        let (force, torque) = frag.contribution(Vec3::NEG_Z, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(force, [0, 0, -1000, 1]);
        assert_eq!(torque, [0, 0, 0, 0]);
    }

    #[test]
    fn leeward_surface_contributes_only_to_counter() {
        let frag = Fragment::new(Vec3::ZERO, Vec3::NEG_Z);
        let (force, torque) = frag.contribution(Vec3::NEG_Z, Vec3::ZERO);
        assert_eq!(force, [0, 0, 0, 1]);
        assert_eq!(torque, [0, 0, 0, 0]);
    }

    #[test]
    fn off_center_sample_produces_torque() {
        // Lever arm +X, force -Z: torque = x cross -z = +y.
        let frag = Fragment::new(Vec3::X, Vec3::Z);
        let (_, torque) = frag.contribution(Vec3::NEG_Z, Vec3::ZERO);
        assert_eq!(torque, [0, 1000, 0, 0]);
    }

    #[test]
    fn quantize_scales_to_fixed_point() {
        let q = quantize(Vec3::new(0.25, -1.5, 2.0));
        assert_eq!(q, IVec3::new(250, -1500, 2000));
    }
}
