use glam::{Mat4, Vec3};

/// Fixed scene placement and projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Where the airfoil sits in the world.
    pub mesh_offset: Vec3,
    /// Rotation of the airfoil about +Y, radians.
    pub mesh_yaw: f32,
    /// Reference point torques are measured about.
    pub torque_center: Vec3,
    pub clear_color: wgpu::Color,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.01,
            far: 10_000.0,
            mesh_offset: Vec3::new(0.0, 0.0, -2.0),
            mesh_yaw: std::f32::consts::FRAC_PI_2,
            torque_center: Vec3::new(0.0, 0.0, -2.0),
            clear_color: wgpu::Color {
                r: 0.3,
                g: 0.7,
                b: 0.8,
                a: 1.0,
            },
        }
    }
}

impl ViewSettings {
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_translation(self.mesh_offset) * Mat4::from_rotation_y(self.mesh_yaw)
    }
}

/// Per-frame camera-derived inputs to the draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
    /// Free-stream direction in world space.
    pub flow: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_places_mesh_at_offset() {
        let settings = ViewSettings::default();
        let origin = settings.model().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-6));
        // Chord (+X) runs along the default view direction (-Z).
        let chord = settings.model().transform_vector3(Vec3::X);
        assert!(chord.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn projection_is_finite() {
        let p = ViewSettings::default().projection(800.0 / 600.0);
        assert!(p.is_finite());
    }
}
