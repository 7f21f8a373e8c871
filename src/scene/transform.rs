use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local transform of a scene node.
///
/// Rotation is stored as XYZ Euler angles in radians so animation passes can
/// accumulate per-axis spin directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local-to-parent matrix (scale, then rotate, then translate)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn yaw_rotates_around_y() {
        let mut t = Transform::IDENTITY;
        t.rotation.y = std::f32::consts::FRAC_PI_2;
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn translation_applies_after_scale() {
        let t = Transform::from_position(Vec3::new(0.0, 2.0, 0.0)).with_scale(Vec3::splat(2.0));
        let p = t.matrix().transform_point3(Vec3::ONE);
        assert!((p - Vec3::new(2.0, 4.0, 2.0)).length() < 1e-5);
    }
}
