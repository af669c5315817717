//! The global descriptor protocol.
//!
//! One uniform buffer and one descriptor set per frame slot, from a pool
//! sized exactly [`MAX_FRAMES_IN_FLIGHT`]. Each set is written once at
//! startup against its slot's buffer; after that only buffer contents
//! change. Pool exhaustion is therefore impossible in steady state and
//! fatal if it happens at startup.

use std::sync::Arc;

use ash::vk;
use tracing::info;

use mocha_rhi::RhiResult;
use mocha_rhi::buffer::{Buffer, BufferUsage};
use mocha_rhi::descriptor::{
    DescriptorBindingBuilder, DescriptorPool, DescriptorSetLayout, buffer_info,
    update_descriptor_sets,
};
use mocha_rhi::device::Device;

use crate::MAX_FRAMES_IN_FLIGHT;
use crate::ubo::GlobalUbo;

/// Binding 0: the global uniform block, visible to every graphics stage.
pub fn global_binding() -> vk::DescriptorSetLayoutBinding<'static> {
    DescriptorBindingBuilder::uniform_buffer(0, vk::ShaderStageFlags::ALL_GRAPHICS)
}

/// Pool sizing: one uniform descriptor per frame slot, nothing more.
pub fn global_pool_sizes(frame_count: u32) -> [vk::DescriptorPoolSize; 1] {
    [vk::DescriptorPoolSize::default()
        .ty(vk::DescriptorType::UNIFORM_BUFFER)
        .descriptor_count(frame_count)]
}

/// Per-slot uniform buffers and their permanently-bound descriptor sets.
pub struct FrameDescriptors {
    layout: DescriptorSetLayout,
    _pool: DescriptorPool,
    buffers: Vec<Buffer>,
    sets: Vec<vk::DescriptorSet>,
}

impl FrameDescriptors {
    /// Builds the layout, pool, buffers, and sets for every frame slot.
    ///
    /// # Errors
    ///
    /// Any allocation failure here is fatal to the caller; the sizes are
    /// static and never grow.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let frame_count = MAX_FRAMES_IN_FLIGHT as u32;

        let layout = DescriptorSetLayout::new(device.clone(), &[global_binding()])?;
        let pool = DescriptorPool::new(
            device.clone(),
            frame_count,
            &global_pool_sizes(frame_count),
        )?;

        let buffers = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| Buffer::new(device.clone(), BufferUsage::Uniform, GlobalUbo::SIZE as u64))
            .collect::<RhiResult<Vec<_>>>()?;

        let layouts = vec![layout.handle(); MAX_FRAMES_IN_FLIGHT];
        let sets = pool.allocate(&layouts)?;

        // Bind each set to its slot's buffer, once, for the process
        // lifetime.
        for (set, buffer) in sets.iter().zip(&buffers) {
            let infos = [buffer_info(buffer, 0, GlobalUbo::SIZE as u64)];
            let writes = [vk::WriteDescriptorSet::default()
                .dst_set(*set)
                .dst_binding(0)
                .dst_array_element(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&infos)];
            update_descriptor_sets(&device, &writes);
        }

        info!(
            "Frame descriptors ready: {} slots, {} bytes per uniform block",
            MAX_FRAMES_IN_FLIGHT,
            GlobalUbo::SIZE
        );

        Ok(Self {
            layout,
            _pool: pool,
            buffers,
            sets,
        })
    }

    /// The set layout, for pipeline layout construction.
    #[inline]
    pub fn layout(&self) -> vk::DescriptorSetLayout {
        self.layout.handle()
    }

    /// The descriptor set bound to `slot`'s uniform buffer.
    #[inline]
    pub fn set(&self, slot: usize) -> vk::DescriptorSet {
        self.sets[slot]
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.buffers.len()
    }

    /// Flushes the frame's uniform block into `slot`'s buffer.
    ///
    /// Must happen after every pass's `update` and before submission of
    /// any draw reading the block.
    pub fn write(&self, slot: usize, ubo: &GlobalUbo) -> RhiResult<()> {
        self.buffers[slot].write_data(0, bytemuck::bytes_of(ubo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_is_visible_to_all_graphics_stages() {
        let binding = global_binding();
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(binding.stage_flags, vk::ShaderStageFlags::ALL_GRAPHICS);
    }

    #[test]
    fn pool_holds_exactly_one_uniform_per_slot() {
        let sizes = global_pool_sizes(MAX_FRAMES_IN_FLIGHT as u32);
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].ty, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(sizes[0].descriptor_count, 2);
    }
}
