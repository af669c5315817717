//! The opaque geometry pass.

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use mocha_rhi::RhiResult;
use mocha_rhi::device::Device;
use mocha_rhi::pipeline::{CullMode, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use mocha_rhi::shader::{Shader, ShaderStage};
use mocha_rhi::vertex::Vertex;

use crate::context::FrameContext;
use crate::pass::DrawPass;

/// Per-draw push block: model and normal matrices.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GeometryPush {
    pub model: Mat4,
    pub normal: Mat4,
}

impl GeometryPush {
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Draws every scene object that carries a mesh, in id order.
pub struct GeometryPass {
    device: Arc<Device>,
    layout: PipelineLayout,
    pipeline: Pipeline,
}

impl GeometryPass {
    /// Builds the pipeline against the swapchain's render pass.
    pub fn new(
        device: Arc<Device>,
        render_pass: vk::RenderPass,
        global_layout: vk::DescriptorSetLayout,
        shader_dir: &Path,
    ) -> RhiResult<Self> {
        let vertex_shader = Shader::from_spirv_file(
            device.clone(),
            &shader_dir.join("geometry.vert.spv"),
            ShaderStage::Vertex,
            "main",
        )?;
        let fragment_shader = Shader::from_spirv_file(
            device.clone(),
            &shader_dir.join("geometry.frag.spv"),
            ShaderStage::Fragment,
            "main",
        )?;

        let push_range = vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
            .offset(0)
            .size(GeometryPush::SIZE as u32);

        let layout = PipelineLayout::new(device.clone(), &[global_layout], &[push_range])?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(Vertex::binding_description())
            .vertex_attributes(&Vertex::attribute_descriptions())
            // The projection's Y-flip reverses apparent winding; draw
            // both faces.
            .cull_mode(CullMode::None)
            .render_pass(render_pass, 0)
            .build(device.clone(), &layout)?;

        Ok(Self {
            device,
            layout,
            pipeline,
        })
    }
}

impl DrawPass for GeometryPass {
    fn name(&self) -> &'static str {
        "geometry"
    }

    fn record(&self, ctx: &FrameContext) {
        let cmd = ctx.command_buffer;
        self.pipeline.bind(cmd);

        // SAFETY: cmd is in the recording state inside the render pass;
        // the set and layout are live for the frame.
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
            let Some(mesh) = &object.mesh else {
                continue;
            };

            let push = GeometryPush {
                model: object.transform.matrix(),
                normal: object.transform.normal_matrix(),
            };

            // SAFETY: the push range was declared on this layout with
            // matching size and stage flags.
            unsafe {
                self.device.handle().cmd_push_constants(
                    cmd,
                    self.layout.handle(),
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                    0,
                    bytemuck::bytes_of(&push),
                );
            }

            mesh.bind(cmd);
            mesh.draw(cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_block_is_two_matrices() {
        assert_eq!(GeometryPush::SIZE, 128);
        assert_eq!(std::mem::offset_of!(GeometryPush, model), 0);
        assert_eq!(std::mem::offset_of!(GeometryPush, normal), 64);
    }
}
