// Math utilities for Falsebound

pub use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// Squared lengths below this are treated as a zero direction.
const DIRECTION_EPSILON: f32 = 1.0e-12;

/// Represents a 3D transformation relative to a parent (or the scene root).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Create a new transform
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create an identity transform
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Identity transform moved to `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Decompose an affine matrix back into position, rotation and scale.
    ///
    /// Matrices carrying shear (non-uniform scale under a rotated parent)
    /// decompose approximately.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Generate transformation matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Compose `child` under this transform: `self ∘ child`.
    pub fn then(&self, child: &Transform) -> Mat4 {
        self.matrix() * child.matrix()
    }

    /// Add `delta` to the position.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// The +Z axis carried by this transform's rotation.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation (yaw, then pitch, no roll) that carries +Z onto `direction`.
///
/// Returns `None` for a zero direction so callers keep their orientation.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    if direction.length_squared() <= DIRECTION_EPSILON {
        return None;
    }
    let yaw = direction.x.atan2(direction.z);
    let horizontal = (direction.x * direction.x + direction.z * direction.z).sqrt();
    let pitch = -direction.y.atan2(horizontal);
    Some(Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_matrix_is_identity() {
        assert_eq!(Transform::identity().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn look_rotation_points_forward_at_direction() {
        for direction in [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -3.0),
            Vec3::new(-2.0, 1.0, 4.0),
            Vec3::new(0.0, 5.0, 0.0),
        ] {
            let rotation = look_rotation(direction).unwrap();
            let forward = rotation * Vec3::Z;
            assert!(
                forward.abs_diff_eq(direction.normalize(), 1.0e-5),
                "{direction:?} -> {forward:?}"
            );
        }
    }

    #[test]
    fn look_rotation_ignores_zero_direction() {
        assert!(look_rotation(Vec3::ZERO).is_none());
    }

    #[test]
    fn zero_vector_normalizes_to_zero() {
        assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
    }

    #[test]
    fn then_applies_parent_after_child() {
        let parent = Transform::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let child = Transform::from_position(Vec3::new(0.0, 0.0, 1.0));
        let world = Transform::from_matrix(parent.then(&child));
        // +Z under a quarter turn about Y lands on +X, doubled by the scale.
        assert_relative_eq!(world.position.x, 12.0, epsilon = 1.0e-5);
        assert_relative_eq!(world.position.z, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(world.scale.y, 2.0, epsilon = 1.0e-5);
    }

    #[test]
    fn translate_accumulates() {
        let mut transform = Transform::identity();
        transform.translate(Vec3::new(1.0, 2.0, 3.0));
        transform.translate(Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(transform.position, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(transform.forward(), Vec3::Z);
    }
}
