//! GPU buffers backed by gpu-allocator.

use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// What a buffer is used for; determines usage flags and memory location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex data, written once from the CPU
    Vertex,
    /// Index data, written once from the CPU
    Index,
    /// Per-frame uniform data, persistently mapped
    Uniform,
}

impl BufferUsage {
    fn to_vk_usage(self) -> vk::BufferUsageFlags {
        match self {
            BufferUsage::Vertex => vk::BufferUsageFlags::VERTEX_BUFFER,
            BufferUsage::Index => vk::BufferUsageFlags::INDEX_BUFFER,
            BufferUsage::Uniform => vk::BufferUsageFlags::UNIFORM_BUFFER,
        }
    }

    fn memory_location(self) -> MemoryLocation {
        // Everything here is CPU-written; geometry is small enough that a
        // staging path is not worth the upload machinery.
        MemoryLocation::CpuToGpu
    }

    fn name(self) -> &'static str {
        match self {
            BufferUsage::Vertex => "vertex",
            BufferUsage::Index => "index",
            BufferUsage::Uniform => "uniform",
        }
    }
}

/// RAII buffer with its backing allocation.
pub struct Buffer {
    device: Arc<Device>,
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
    size: u64,
    usage: BufferUsage,
}

impl Buffer {
    /// Creates an uninitialized buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Rejects zero-sized buffers with [`RhiError::InvalidArgument`].
    pub fn new(device: Arc<Device>, usage: BufferUsage, size: u64) -> RhiResult<Self> {
        if size == 0 {
            return Err(RhiError::InvalidArgument(
                "buffer size must be non-zero".to_string(),
            ));
        }

        let create_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage.to_vk_usage())
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        // SAFETY: device is live; create_info borrows nothing.
        let buffer = unsafe { device.handle().create_buffer(&create_info, None)? };

        // SAFETY: buffer was just created from this device.
        let requirements = unsafe { device.handle().get_buffer_memory_requirements(buffer) };

        let allocation = device
            .allocator()
            .lock()
            .map_err(|_| RhiError::InvalidArgument("allocator mutex poisoned".to_string()))?
            .allocate(&AllocationCreateDesc {
                name: usage.name(),
                requirements,
                location: usage.memory_location(),
                linear: true,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })?;

        // SAFETY: the allocation satisfies the buffer's requirements.
        unsafe {
            device
                .handle()
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())?;
        }

        debug!("Created {} buffer ({} bytes)", usage.name(), size);

        Ok(Self {
            device,
            buffer,
            allocation: Some(allocation),
            size,
            usage,
        })
    }

    /// Creates a buffer and fills it with `data`.
    pub fn new_with_data(device: Arc<Device>, usage: BufferUsage, data: &[u8]) -> RhiResult<Self> {
        let buffer = Self::new(device, usage, data.len() as u64)?;
        buffer.write_data(0, data)?;
        Ok(buffer)
    }

    #[inline]
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Copies `data` into the mapped allocation at `offset` bytes.
    ///
    /// CpuToGpu memory is persistently mapped and host-coherent, so the
    /// write is visible to the GPU once the frame's submission executes.
    ///
    /// # Errors
    ///
    /// Fails when the write would run past the end of the buffer or the
    /// memory is not host-visible.
    pub fn write_data(&self, offset: u64, data: &[u8]) -> RhiResult<()> {
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or_else(|| RhiError::InvalidArgument("write range overflow".to_string()))?;
        if end > self.size {
            return Err(RhiError::InvalidArgument(format!(
                "write of {} bytes at offset {} exceeds buffer size {}",
                data.len(),
                offset,
                self.size
            )));
        }

        let allocation = self
            .allocation
            .as_ref()
            .ok_or_else(|| RhiError::InvalidArgument("buffer already freed".to_string()))?;

        let mapped = allocation.mapped_ptr().ok_or_else(|| {
            RhiError::InvalidArgument("buffer memory is not host-visible".to_string())
        })?;

        // SAFETY: bounds checked above; the mapping is valid for the
        // allocation's lifetime and the regions cannot overlap.
        unsafe {
            let dst = mapped.as_ptr().cast::<u8>().add(offset as usize);
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
        }

        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take()
            && let Ok(mut allocator) = self.device.allocator().lock()
        {
            let _ = allocator.free(allocation);
        }
        // SAFETY: the allocation backing this buffer was freed above; the
        // handle is destroyed exactly once.
        unsafe {
            self.device.handle().destroy_buffer(self.buffer, None);
        }
        debug!("Destroyed {} buffer", self.usage.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_flags_match_purpose() {
        assert_eq!(
            BufferUsage::Vertex.to_vk_usage(),
            vk::BufferUsageFlags::VERTEX_BUFFER
        );
        assert_eq!(
            BufferUsage::Index.to_vk_usage(),
            vk::BufferUsageFlags::INDEX_BUFFER
        );
        assert_eq!(
            BufferUsage::Uniform.to_vk_usage(),
            vk::BufferUsageFlags::UNIFORM_BUFFER
        );
    }

    #[test]
    fn all_usages_are_host_visible() {
        for usage in [BufferUsage::Vertex, BufferUsage::Index, BufferUsage::Uniform] {
            assert_eq!(usage.memory_location(), MemoryLocation::CpuToGpu);
        }
    }
}
