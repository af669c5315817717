//! The point-light billboard pass.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use mocha_rhi::RhiResult;
use mocha_rhi::device::Device;
use mocha_rhi::pipeline::{CullMode, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use mocha_rhi::shader::{Shader, ShaderStage};
use mocha_scene::SceneStore;

use crate::context::FrameContext;
use crate::pass::DrawPass;
use crate::ubo::{GlobalUbo, MAX_LIGHTS, PointLightData};

/// Per-light push block for the billboard draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PointLightPush {
    pub position: Vec4,
    /// rgb = color, w = intensity
    pub color: Vec4,
    pub radius: f32,
    pub _pad: [f32; 3],
}

impl PointLightPush {
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Publishes the scene's point lights into the uniform block and draws a
/// camera-facing billboard for each.
///
/// Must run after the geometry pass: the billboards alpha-blend against
/// the lit scene.
pub struct PointLightPass {
    device: Arc<Device>,
    layout: PipelineLayout,
    pipeline: Pipeline,
}

impl PointLightPass {
    /// Builds the billboard pipeline. The quad corners are generated in
    /// the vertex shader, so the pipeline has no vertex input.
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        global_layout: vk::DescriptorSetLayout,
        shader_dir: &Path,
    ) -> RhiResult<Self> {
        let vertex_shader = Shader::from_spirv_file(
            device.clone(),
            &shader_dir.join("point_light.vert.spv"),
            ShaderStage::Vertex,
            "main",
        )?;
        let fragment_shader = Shader::from_spirv_file(
            device.clone(),
            &shader_dir.join("point_light.frag.spv"),
            ShaderStage::Fragment,
            "main",
        )?;

        let push_range = vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
            .offset(0)
            .size(PointLightPush::SIZE as u32);

        let layout = PipelineLayout::new(device.clone(), &[global_layout], &[push_range])?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .cull_mode(CullMode::None)
            .alpha_blend(true)
            .render_pass(render_pass, 0)
            .build(device.clone(), &layout)?;

        Ok(Self {
            device,
            layout,
            pipeline,
        })
    }
}

impl DrawPass for PointLightPass {
    fn name(&self) -> &'static str {
        "point_light"
    }

    /// Copies every lit object into the uniform block's light array.
    fn update(&mut self, ctx: &FrameContext, ubo: &mut GlobalUbo) {
        collect_point_lights(ctx.scene, ubo);
    }

    fn record(&self, ctx: &FrameContext) {
        let cmd = ctx.command_buffer;
        self.pipeline.bind(cmd);

        // SAFETY: cmd is recording inside the render pass; set and layout
        // are live for the frame.
        unsafe {
            self.device.handle().cmd_bind_descriptor_sets(
                cmd,
                vk::PipelineBindPoint::GRAPHICS,
                self.layout.handle(),
                0,
                &[ctx.global_set],
                &[],
            );
        }

        for object in ctx.scene.iter() {
            let Some(light) = &object.point_light else {
                continue;
            };

            let push = PointLightPush {
                position: object.transform.position.extend(1.0),
                color: light.color.extend(light.intensity),
                radius: light.radius,
                _pad: [0.0; 3],
            };

            // SAFETY: push range declared on this layout with matching
            // size and stages; two triangles form the billboard quad.
            unsafe {
                self.device.handle().cmd_push_constants(
                    cmd,
                    self.layout.handle(),
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                    0,
                    bytemuck::bytes_of(&push),
                );
                self.device.handle().cmd_draw(cmd, 6, 1, 0, 0);
            }
        }
    }
}

/// Writes the scene's point lights into the uniform block's light array,
/// in object id order.
///
/// # Panics
///
/// Panics when the scene carries more than [`MAX_LIGHTS`] point lights;
/// the uniform block's array is fixed-size.
pub fn collect_point_lights(scene: &SceneStore, ubo: &mut GlobalUbo) {
    let mut count = 0usize;

    for object in scene.iter() {
        let Some(light) = &object.point_light else {
            continue;
        };

        assert!(
            count < MAX_LIGHTS,
            "scene has more than {MAX_LIGHTS} point lights"
        );

        ubo.point_lights[count] = PointLightData {
            position: object.transform.position.extend(1.0),
            color: light.color.extend(light.intensity),
        };
        count += 1;
    }

    ubo.num_lights = count as u32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use mocha_scene::SceneStore;

    #[test]
    fn push_block_layout() {
        assert_eq!(PointLightPush::SIZE, 48);
        assert_eq!(std::mem::offset_of!(PointLightPush, position), 0);
        assert_eq!(std::mem::offset_of!(PointLightPush, color), 16);
        assert_eq!(std::mem::offset_of!(PointLightPush, radius), 32);
    }

    #[test]
    fn collect_copies_lights_in_id_order() {
        let mut scene = SceneStore::new();
        scene
            .spawn_point_light(Vec3::new(1.0, 0.1, 0.1), 0.2, 0.1)
            .transform
            .position = Vec3::new(-1.0, -1.0, -1.0);
        scene.spawn(); // meshless, lightless object is skipped
        scene
            .spawn_point_light(Vec3::new(0.1, 0.1, 1.0), 0.5, 0.1)
            .transform
            .position = Vec3::new(1.0, -1.0, -1.0);

        let mut ubo = GlobalUbo::default();
        collect_point_lights(&scene, &mut ubo);

        assert_eq!(ubo.num_lights, 2);
        assert_eq!(
            ubo.point_lights[0].position,
            Vec4::new(-1.0, -1.0, -1.0, 1.0)
        );
        assert_eq!(ubo.point_lights[0].color, Vec4::new(1.0, 0.1, 0.1, 0.2));
        assert_eq!(ubo.point_lights[1].color, Vec4::new(0.1, 0.1, 1.0, 0.5));
    }

    #[test]
    fn collect_resets_count_each_frame() {
        let mut scene = SceneStore::new();
        scene.spawn_point_light(Vec3::ONE, 1.0, 0.1);

        let mut ubo = GlobalUbo::default();
        ubo.num_lights = 7; // stale value from a previous frame
        collect_point_lights(&scene, &mut ubo);
        assert_eq!(ubo.num_lights, 1);
    }

    #[test]
    #[should_panic(expected = "point lights")]
    fn collect_rejects_light_overflow() {
        let mut scene = SceneStore::new();
        for _ in 0..(MAX_LIGHTS + 1) {
            scene.spawn_point_light(Vec3::ONE, 1.0, 0.1);
        }
        let mut ubo = GlobalUbo::default();
        collect_point_lights(&scene, &mut ubo);
    }
}
