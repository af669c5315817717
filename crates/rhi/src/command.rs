//! Command pool and command buffer wrappers.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::RhiResult;

/// RAII command pool.
///
/// Created with `RESET_COMMAND_BUFFER` so individual buffers can be reset
/// and re-recorded every frame.
pub struct CommandPool {
    device: Arc<Device>,
    pool: vk::CommandPool,
}

impl CommandPool {
    /// Creates a pool for the given queue family.
    pub fn new(device: Arc<Device>, queue_family_index: u32) -> RhiResult<Self> {
        let create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family_index)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        // SAFETY: device is live; create_info borrows nothing.
        let pool = unsafe { device.handle().create_command_pool(&create_info, None)? };

        debug!("Command pool created for family {}", queue_family_index);

        Ok(Self { device, pool })
    }

    #[inline]
    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }

    /// Allocates `count` primary command buffers from this pool.
    pub fn allocate_command_buffers(&self, count: u32) -> RhiResult<Vec<CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        // SAFETY: pool is owned by self.
        let buffers = unsafe { self.device.handle().allocate_command_buffers(&alloc_info)? };

        Ok(buffers
            .into_iter()
            .map(|buffer| CommandBuffer {
                device: self.device.clone(),
                buffer,
            })
            .collect())
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        // SAFETY: destroying the pool frees all buffers allocated from it;
        // callers must not record into them afterwards.
        unsafe {
            self.device.handle().destroy_command_pool(self.pool, None);
        }
        debug!("Command pool destroyed");
    }
}

/// A primary command buffer allocated from a [`CommandPool`].
///
/// Does not own the handle; it is freed when its pool is destroyed.
pub struct CommandBuffer {
    device: Arc<Device>,
    buffer: vk::CommandBuffer,
}

impl CommandBuffer {
    #[inline]
    pub fn handle(&self) -> vk::CommandBuffer {
        self.buffer
    }

    /// Resets and begins recording.
    pub fn begin(&self) -> RhiResult<()> {
        // SAFETY: the buffer comes from a RESET_COMMAND_BUFFER pool and is
        // not pending execution (the caller gates on the frame fence).
        unsafe {
            self.device
                .handle()
                .reset_command_buffer(self.buffer, vk::CommandBufferResetFlags::empty())?;

            let begin_info = vk::CommandBufferBeginInfo::default();
            self.device
                .handle()
                .begin_command_buffer(self.buffer, &begin_info)?;
        }
        Ok(())
    }

    /// Ends recording.
    pub fn end(&self) -> RhiResult<()> {
        // SAFETY: buffer is in the recording state.
        unsafe {
            self.device.handle().end_command_buffer(self.buffer)?;
        }
        Ok(())
    }
}
