//! Synchronization primitives.
//!
//! [`Semaphore`] orders GPU work across queue operations; [`Fence`] lets
//! the host wait on GPU completion. [`FrameSync`] bundles the three
//! primitives each frame slot needs.

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::RhiResult;

/// Number of frames the CPU may record ahead of the GPU.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// RAII binary semaphore.
pub struct Semaphore {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();
        // SAFETY: device is live.
        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };
        Ok(Self { device, semaphore })
    }

    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        // SAFETY: semaphore is owned by self and not in use; callers gate
        // destruction on device idle.
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
    }
}

/// RAII fence.
pub struct Fence {
    device: Arc<Device>,
    fence: vk::Fence,
}

impl Fence {
    /// Creates a fence, optionally pre-signaled so the first wait passes.
    pub fn new(device: Arc<Device>, signaled: bool) -> RhiResult<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::default().flags(flags);
        // SAFETY: device is live.
        let fence = unsafe { device.handle().create_fence(&create_info, None)? };
        Ok(Self { device, fence })
    }

    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }

    /// Blocks until the fence signals or `timeout_ns` elapses.
    pub fn wait(&self, timeout_ns: u64) -> RhiResult<()> {
        // SAFETY: fence is owned by self.
        unsafe {
            self.device
                .handle()
                .wait_for_fences(&[self.fence], true, timeout_ns)?;
        }
        Ok(())
    }

    /// Returns the fence to the unsignaled state.
    pub fn reset(&self) -> RhiResult<()> {
        // SAFETY: fence is owned by self and not pending.
        unsafe {
            self.device.handle().reset_fences(&[self.fence])?;
        }
        Ok(())
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        // SAFETY: fence is owned by self; callers gate on device idle.
        unsafe {
            self.device.handle().destroy_fence(self.fence, None);
        }
    }
}

/// Per-slot synchronization bundle.
///
/// `image_available` gates rendering on acquisition, `render_finished`
/// gates presentation on rendering, and `in_flight` gates CPU reuse of the
/// slot's resources on GPU completion.
pub struct FrameSync {
    image_available: Semaphore,
    render_finished: Semaphore,
    in_flight: Fence,
}

impl FrameSync {
    /// Creates the bundle with the fence signaled, so the slot's first
    /// frame does not wait.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let image_available = Semaphore::new(device.clone())?;
        let render_finished = Semaphore::new(device.clone())?;
        let in_flight = Fence::new(device, true)?;

        debug!("Frame sync bundle created");

        Ok(Self {
            image_available,
            render_finished,
            in_flight,
        })
    }

    #[inline]
    pub fn image_available_handle(&self) -> vk::Semaphore {
        self.image_available.handle()
    }

    #[inline]
    pub fn render_finished_handle(&self) -> vk::Semaphore {
        self.render_finished.handle()
    }

    #[inline]
    pub fn in_flight(&self) -> &Fence {
        &self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn sync_primitives_are_send_sync() {
        assert_send_sync::<Semaphore>();
        assert_send_sync::<Fence>();
        assert_send_sync::<FrameSync>();
    }

    #[test]
    fn two_frames_in_flight() {
        // The descriptor pool, uniform buffers, and command buffers are all
        // sized from this constant.
        assert_eq!(MAX_FRAMES_IN_FLIGHT, 2);
    }
}
