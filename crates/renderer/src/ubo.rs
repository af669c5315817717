//! The per-frame uniform block.
//!
//! One `GlobalUbo` is written into the current slot's buffer exactly once
//! per frame, after every pass's `update` and before any draw that reads
//! it. The layout must match the shader's std140 uniform block.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Capacity of the uniform block's light array.
pub const MAX_LIGHTS: usize = 10;

/// GPU-side point light. `color.w` carries the intensity.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightData {
    pub position: Vec4,
    pub color: Vec4,
}

impl PointLightData {
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Global per-frame uniforms: camera matrices, ambient term, and the
/// active point lights.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GlobalUbo {
    pub projection: Mat4,
    pub view: Mat4,
    pub inverse_view: Mat4,
    /// rgb = ambient color, w = ambient intensity
    pub ambient_color: Vec4,
    pub point_lights: [PointLightData; MAX_LIGHTS],
    pub num_lights: u32,
    pub _pad: [u32; 3],
}

impl GlobalUbo {
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

impl Default for GlobalUbo {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            ambient_color: Vec4::new(1.0, 1.0, 1.0, 0.02),
            point_lights: [PointLightData::default(); MAX_LIGHTS],
            num_lights: 0,
            _pad: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of};

    #[test]
    fn point_light_data_layout() {
        assert_eq!(PointLightData::SIZE, 32);
        assert_eq!(offset_of!(PointLightData, position), 0);
        assert_eq!(offset_of!(PointLightData, color), 16);
    }

    #[test]
    fn global_ubo_layout_matches_std140() {
        assert_eq!(offset_of!(GlobalUbo, projection), 0);
        assert_eq!(offset_of!(GlobalUbo, view), 64);
        assert_eq!(offset_of!(GlobalUbo, inverse_view), 128);
        assert_eq!(offset_of!(GlobalUbo, ambient_color), 192);
        assert_eq!(offset_of!(GlobalUbo, point_lights), 208);
        assert_eq!(offset_of!(GlobalUbo, num_lights), 528);
        assert_eq!(GlobalUbo::SIZE, 544);
        assert_eq!(align_of::<GlobalUbo>(), 16);
    }

    #[test]
    fn default_has_dim_white_ambient_and_no_lights() {
        let ubo = GlobalUbo::default();
        assert_eq!(ubo.ambient_color, Vec4::new(1.0, 1.0, 1.0, 0.02));
        assert_eq!(ubo.num_lights, 0);
    }

    #[test]
    fn ubo_casts_to_bytes() {
        let ubo = GlobalUbo::default();
        let bytes = bytemuck::bytes_of(&ubo);
        assert_eq!(bytes.len(), GlobalUbo::SIZE);
    }
}
