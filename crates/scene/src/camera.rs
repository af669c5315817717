//! Camera math.

use glam::{Mat4, Quat, Vec3};

/// Projection settings.
#[derive(Clone, Debug)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

/// Free camera defined by position + rotation.
///
/// The uniform block wants both the view matrix and its inverse (for the
/// camera world position in lighting), so both are exposed directly.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Projection::Perspective {
                fov_y: 50.0_f32.to_radians(),
                aspect: 4.0 / 3.0,
                near: 0.1,
                far: 100.0,
            },
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        };
    }

    /// Updates the aspect ratio of a perspective projection in place.
    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective {
            fov_y, near, far, ..
        } = self.projection
        {
            self.projection = Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            };
        }
    }

    /// World-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        // The inverse of the camera's world transform, computed directly.
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// View-to-world matrix; column 3 is the camera's world position.
    pub fn inverse_view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Projection matrix with the Vulkan Y-flip applied.
    pub fn projection_matrix(&self) -> Mat4 {
        let mut proj = match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
        };
        proj.y_axis.y *= -1.0;
        proj
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_inverts_camera_transform() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(0.0, 0.0, -2.5);

        let product = camera.view_matrix() * camera.inverse_view_matrix();
        let identity = Mat4::IDENTITY.to_cols_array();
        for (a, b) in product.to_cols_array().iter().zip(identity.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn inverse_view_carries_position() {
        let mut camera = Camera::new();
        camera.position = Vec3::new(1.0, -2.0, 3.0);
        let inv = camera.inverse_view_matrix();
        assert_eq!(inv.w_axis.truncate(), camera.position);
    }

    #[test]
    fn projection_flips_y_for_vulkan() {
        let camera = Camera::new();
        let proj = camera.projection_matrix();
        // perspective_rh yields a positive y scale; the flip negates it.
        assert!(proj.y_axis.y < 0.0);
        let Projection::Perspective { fov_y, .. } = camera.projection else {
            panic!("default projection should be perspective");
        };
        let unflipped = Mat4::perspective_rh(fov_y, 4.0 / 3.0, 0.1, 100.0);
        assert!((proj.y_axis.y + unflipped.y_axis.y).abs() < 1e-5);
    }

    #[test]
    fn set_aspect_only_touches_aspect() {
        let mut camera = Camera::new();
        camera.set_aspect(2.0);
        match camera.projection {
            Projection::Perspective { aspect, near, far, .. } => {
                assert_eq!(aspect, 2.0);
                assert_eq!(near, 0.1);
                assert_eq!(far, 100.0);
            }
            Projection::Orthographic { .. } => panic!("projection type changed"),
        }
    }

    #[test]
    fn forward_tracks_rotation() {
        let mut camera = Camera::new();
        camera.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let forward = camera.forward();
        assert!((forward.x - -1.0).abs() < 1e-5);
        assert!(forward.z.abs() < 1e-5);
    }
}
