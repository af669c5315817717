//! Descriptor set layouts, pools, and write helpers.
//!
//! The engine's binding model is deliberately small: one uniform-buffer
//! binding visible to all graphics stages, one set per frame in flight,
//! written once at startup.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::buffer::Buffer;
use crate::device::Device;
use crate::error::RhiResult;

/// RAII descriptor set layout.
pub struct DescriptorSetLayout {
    device: Arc<Device>,
    layout: vk::DescriptorSetLayout,
}

impl DescriptorSetLayout {
    pub fn new(
        device: Arc<Device>,
        bindings: &[vk::DescriptorSetLayoutBinding],
    ) -> RhiResult<Self> {
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(bindings);

        // SAFETY: device is live; create_info borrows `bindings` only for
        // the duration of the call.
        let layout = unsafe {
            device
                .handle()
                .create_descriptor_set_layout(&create_info, None)?
        };

        debug!("Descriptor set layout created ({} bindings)", bindings.len());

        Ok(Self { device, layout })
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        // SAFETY: layout is owned by self and destroyed exactly once.
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_set_layout(self.layout, None);
        }
        debug!("Descriptor set layout destroyed");
    }
}

/// RAII descriptor pool.
///
/// Sized exactly at creation; sets allocated here live until the pool is
/// destroyed. Exhaustion is an allocation error the caller treats as fatal.
pub struct DescriptorPool {
    device: Arc<Device>,
    pool: vk::DescriptorPool,
    max_sets: u32,
}

impl DescriptorPool {
    pub fn new(
        device: Arc<Device>,
        max_sets: u32,
        pool_sizes: &[vk::DescriptorPoolSize],
    ) -> RhiResult<Self> {
        let create_info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(max_sets)
            .pool_sizes(pool_sizes);

        // SAFETY: device is live; pool_sizes is borrowed only for the call.
        let pool = unsafe { device.handle().create_descriptor_pool(&create_info, None)? };

        debug!("Descriptor pool created (max {} sets)", max_sets);

        Ok(Self {
            device,
            pool,
            max_sets,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }

    #[inline]
    pub fn max_sets(&self) -> u32 {
        self.max_sets
    }

    /// Allocates one set per layout handle in `layouts`.
    ///
    /// # Errors
    ///
    /// Propagates `ERROR_OUT_OF_POOL_MEMORY` when the pool is exhausted.
    pub fn allocate(
        &self,
        layouts: &[vk::DescriptorSetLayout],
    ) -> RhiResult<Vec<vk::DescriptorSet>> {
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(layouts);

        // SAFETY: pool and layouts are live handles from this device.
        let sets = unsafe { self.device.handle().allocate_descriptor_sets(&alloc_info)? };

        Ok(sets)
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        // SAFETY: destroying the pool frees all sets allocated from it.
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_pool(self.pool, None);
        }
        debug!("Descriptor pool destroyed");
    }
}

/// Builders for common binding descriptions.
pub struct DescriptorBindingBuilder;

impl DescriptorBindingBuilder {
    /// A uniform-buffer binding at `binding`, visible to `stage_flags`.
    pub fn uniform_buffer(
        binding: u32,
        stage_flags: vk::ShaderStageFlags,
    ) -> vk::DescriptorSetLayoutBinding<'static> {
        vk::DescriptorSetLayoutBinding::default()
            .binding(binding)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(stage_flags)
    }
}

/// Buffer info for a whole-buffer descriptor write.
pub fn buffer_info(buffer: &Buffer, offset: u64, range: u64) -> vk::DescriptorBufferInfo {
    vk::DescriptorBufferInfo::default()
        .buffer(buffer.handle())
        .offset(offset)
        .range(range)
}

/// Applies descriptor writes immediately.
pub fn update_descriptor_sets(device: &Device, writes: &[vk::WriteDescriptorSet]) {
    // SAFETY: the writes reference live sets and buffers owned by the
    // caller; no set being written is bound in an executing command buffer.
    unsafe {
        device.handle().update_descriptor_sets(writes, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_binding_shape() {
        let binding = DescriptorBindingBuilder::uniform_buffer(0, vk::ShaderStageFlags::ALL_GRAPHICS);
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(binding.descriptor_count, 1);
        assert_eq!(binding.stage_flags, vk::ShaderStageFlags::ALL_GRAPHICS);
    }

    #[test]
    fn uniform_binding_respects_index() {
        let binding = DescriptorBindingBuilder::uniform_buffer(3, vk::ShaderStageFlags::VERTEX);
        assert_eq!(binding.binding, 3);
        assert_eq!(binding.stage_flags, vk::ShaderStageFlags::VERTEX);
    }
}
