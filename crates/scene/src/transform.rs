//! Object transforms.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Position, rotation, and scale of a scene object.
#[derive(Clone, Debug)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Normal matrix: inverse-transpose of the model's upper 3x3, widened
    /// back to Mat4 for the push-constant block.
    ///
    /// Falls back to identity when the scale is degenerate.
    pub fn normal_matrix(&self) -> Mat4 {
        let model3 = Mat3::from_mat4(self.matrix());
        if model3.determinant().abs() < 1e-6 {
            return Mat4::IDENTITY;
        }
        Mat4::from_mat3(model3.inverse().transpose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Mat4, b: Mat4) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn identity_by_default() {
        let transform = Transform::new();
        assert!(approx_eq(transform.matrix(), Mat4::IDENTITY));
        assert!(approx_eq(transform.normal_matrix(), Mat4::IDENTITY));
    }

    #[test]
    fn translation_lands_in_last_column() {
        let transform = Transform::new().with_position(Vec3::new(1.0, 2.0, 3.0));
        let m = transform.matrix();
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let transform = Transform::new().with_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = Mat3::from_mat4(transform.normal_matrix());
        // A normal along +X must be scaled by 1/2 before renormalization.
        let transformed = n * Vec3::X;
        assert!((transformed.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn degenerate_scale_falls_back_to_identity() {
        let transform = Transform::new().with_scale(Vec3::new(0.0, 1.0, 1.0));
        assert!(approx_eq(transform.normal_matrix(), Mat4::IDENTITY));
    }

    #[test]
    fn rotation_preserves_normal_length() {
        let transform =
            Transform::new().with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_3));
        let n = Mat3::from_mat4(transform.normal_matrix());
        let transformed = n * Vec3::Z;
        assert!((transformed.length() - 1.0).abs() < 1e-5);
    }
}
