//! Point-light attributes.

use glam::Vec3;

/// Point-light component attached to a scene object.
///
/// Position comes from the owning object's transform; this record carries
/// only the emission attributes. The GPU-facing layout lives in the
/// renderer's uniform block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Billboard radius in world units.
    pub radius: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            radius: 0.1,
        }
    }
}
