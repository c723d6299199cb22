use glam::{EulerRot, Mat4, Quat, Vec3};

/// One of the three camera axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn component(self, v: &mut Vec3) -> &mut f32 {
        match self {
            Axis::X => &mut v.x,
            Axis::Y => &mut v.y,
            Axis::Z => &mut v.z,
        }
    }
}

/// Fixed per-tick step sizes used by the key bindings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Translation per tick while a movement key is held.
    pub move_step: f32,
    /// Rotation per tick (radians) while a rotation key is held.
    pub rotate_step: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_step: 0.2,
            rotate_step: 0.02,
        }
    }
}

/// Fly camera with per-axis velocities.
///
/// Movement velocity is expressed in the camera's local frame: `-Z` is forward,
/// `+X` is right, `+Y` is up. With zero rotation that is the world frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Euler angles in radians: pitch (x), yaw (y), roll (z).
    pub rotation: Vec3,
    pub velocity: Vec3,
    pub rotation_velocity: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation_velocity: Vec3::ZERO,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one movement axis to `signed_step` (press edge, last event wins).
    pub fn set_velocity_axis(&mut self, axis: Axis, signed_step: f32) {
        *axis.component(&mut self.velocity) = signed_step;
    }

    /// Clear one movement axis on a release edge.
    ///
    /// The axis is only cleared while it still holds `signed_step`; a release
    /// of a key that was already overridden by the opposite key is a no-op.
    pub fn release_velocity_axis(&mut self, axis: Axis, signed_step: f32) {
        release(axis.component(&mut self.velocity), signed_step);
    }

    /// Set one rotation axis to `signed_step` (press edge, last event wins).
    pub fn set_rotation_velocity_axis(&mut self, axis: Axis, signed_step: f32) {
        *axis.component(&mut self.rotation_velocity) = signed_step;
    }

    /// Rotation counterpart of [`Camera::release_velocity_axis`].
    pub fn release_rotation_velocity_axis(&mut self, axis: Axis, signed_step: f32) {
        release(axis.component(&mut self.rotation_velocity), signed_step);
    }

    /// Overwrite the orientation. Used by the drag gesture.
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    /// Advance one render tick.
    pub fn update(&mut self) {
        self.position += self.orientation() * self.velocity;
        self.rotation += self.rotation_velocity;
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }

    /// Direction the camera looks along, in world space.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }
}

fn release(component: &mut f32, signed_step: f32) {
    if *component == signed_step {
        *component = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn forward_three_ticks() {
        let s = CameraSettings::default().move_step;
        let mut cam = Camera::new();
        cam.set_velocity_axis(Axis::Z, -s);
        for _ in 0..3 {
            cam.update();
        }
        assert!((cam.position.z - (-3.0 * s)).abs() < EPS);
        assert_eq!(cam.position.x, 0.0);
        assert_eq!(cam.position.y, 0.0);
        assert_eq!(cam.rotation, Vec3::ZERO);
    }

    #[test]
    fn opposite_press_overrides_and_stale_release_is_ignored() {
        let s = 0.2;
        let mut cam = Camera::new();
        cam.set_velocity_axis(Axis::Z, -s); // W down
        cam.set_velocity_axis(Axis::Z, s); // S down
        assert_eq!(cam.velocity.z, s);
        cam.release_velocity_axis(Axis::Z, -s); // W up
        assert_eq!(cam.velocity.z, s);
        cam.release_velocity_axis(Axis::Z, s); // S up
        assert_eq!(cam.velocity.z, 0.0);
    }

    #[test]
    fn release_clears_matching_axis_only() {
        let mut cam = Camera::new();
        cam.set_velocity_axis(Axis::X, 0.2);
        cam.set_velocity_axis(Axis::Y, 0.2);
        cam.release_velocity_axis(Axis::X, 0.2);
        assert_eq!(cam.velocity, Vec3::new(0.0, 0.2, 0.0));
    }

    #[test]
    fn rotation_velocity_integrates() {
        let mut cam = Camera::new();
        cam.set_rotation_velocity_axis(Axis::Y, 0.02);
        cam.update();
        cam.update();
        assert!((cam.rotation.y - 0.04).abs() < EPS);
        cam.release_rotation_velocity_axis(Axis::Y, 0.02);
        cam.update();
        assert!((cam.rotation.y - 0.04).abs() < EPS);
    }

    #[test]
    fn movement_follows_yaw() {
        let mut cam = Camera::new();
        cam.set_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        cam.set_velocity_axis(Axis::Z, -1.0);
        cam.update();
        // Yawing +90 degrees turns forward from -Z to -X.
        assert!((cam.position - Vec3::new(-1.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn view_matrix_is_pure() {
        let mut cam = Camera::new();
        cam.position = Vec3::new(1.0, 2.0, 3.0);
        cam.set_rotation(Vec3::new(0.3, -0.7, 0.1));
        let a = cam.view_matrix();
        let b = cam.view_matrix();
        assert_eq!(a, b);
        // The camera origin maps to the view-space origin.
        let origin = a.transform_point3(cam.position);
        assert!(origin.length() < EPS);
    }

    #[test]
    fn identity_view_at_rest() {
        let cam = Camera::default();
        let v = cam.view_matrix();
        assert!(v.abs_diff_eq(Mat4::IDENTITY, EPS));
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, EPS));
    }
}
