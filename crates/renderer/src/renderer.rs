//! The frame renderer.
//!
//! Owns the Vulkan object graph from instance to command buffers and
//! drives the per-frame protocol:
//!
//! `begin_frame` → `begin_render_pass` → draws → `end_render_pass` →
//! `end_frame`
//!
//! Calling these out of order is a programming error and panics. A stale
//! or zero-area swapchain makes `begin_frame` return `Ok(None)`: the
//! frame is skipped and the renderer stays idle.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info, warn};

use mocha_platform::{Surface, Window, required_surface_extensions};
use mocha_rhi::command::{CommandBuffer, CommandPool};
use mocha_rhi::device::Device;
use mocha_rhi::instance::Instance;
use mocha_rhi::physical_device::select_physical_device;
use mocha_rhi::swapchain::{AcquireOutcome, PresentOutcome, Swapchain};
use mocha_rhi::{RhiError, RhiResult};

use crate::MAX_FRAMES_IN_FLIGHT;
use crate::frame::{FrameTracker, RebuildLatch};

/// Clear color for the frame's color attachment.
const CLEAR_COLOR: [f32; 4] = [0.01, 0.01, 0.01, 1.0];

/// Owns the device, the swapchain, and per-slot command buffers, and
/// enforces the frame protocol.
///
/// Field order is drop order: command buffers and their pool go before
/// the swapchain, the swapchain before the device, and the surface and
/// instance last.
pub struct FrameRenderer {
    tracker: FrameTracker,
    latch: RebuildLatch,

    command_buffers: Vec<CommandBuffer>,
    _command_pool: CommandPool,
    swapchain: Swapchain,
    device: Arc<Device>,
    _surface: Surface,
    instance: Instance,
}

impl FrameRenderer {
    /// Brings up the full Vulkan stack against `window`.
    ///
    /// Validation layers are requested in debug builds only.
    ///
    /// # Errors
    ///
    /// Fails if no suitable GPU is found, the surface cannot be created,
    /// or the initial swapchain cannot be built (including a zero-area
    /// window at startup).
    pub fn new(window: &Window) -> RhiResult<Self> {
        let display_handle = window
            .display_handle()
            .map_err(|e| RhiError::SurfaceError(format!("no display handle: {e}")))?;
        let surface_extensions = required_surface_extensions(display_handle.as_raw())
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;

        let instance = Instance::new(cfg!(debug_assertions), &surface_extensions)?;

        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;

        let physical =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;
        let device = Device::new(&instance, &physical)?;

        let swapchain = Swapchain::new(
            instance.handle(),
            device.clone(),
            surface.handle(),
            surface.loader(),
            window.width(),
            window.height(),
        )?;

        let graphics_family = device
            .queue_families()
            .graphics_family
            .ok_or(RhiError::NoSuitableGpu)?;
        let command_pool = CommandPool::new(device.clone(), graphics_family)?;
        let command_buffers =
            command_pool.allocate_command_buffers(MAX_FRAMES_IN_FLIGHT as u32)?;

        info!(
            "Renderer ready: {} frames in flight, {}x{}",
            MAX_FRAMES_IN_FLIGHT,
            window.width(),
            window.height()
        );

        Ok(Self {
            tracker: FrameTracker::new(),
            latch: RebuildLatch::new(window.width(), window.height()),
            command_buffers,
            _command_pool: command_pool,
            swapchain,
            device,
            _surface: surface,
            instance,
        })
    }

    #[inline]
    pub fn device(&self) -> Arc<Device> {
        self.device.clone()
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.swapchain.render_pass()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.swapchain.aspect_ratio()
    }

    /// Slot whose command buffer, uniform buffer, and descriptor set the
    /// current or next frame uses.
    #[inline]
    pub fn current_slot(&self) -> usize {
        self.tracker.current_slot()
    }

    #[inline]
    pub fn is_frame_started(&self) -> bool {
        self.tracker.is_frame_started()
    }

    #[inline]
    pub fn has_validation(&self) -> bool {
        self.instance.has_validation()
    }

    /// Records a new drawable size. The swapchain is rebuilt at the end
    /// of the next completed frame, not here.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.latch.record_resize(width, height);
    }

    /// Starts a frame: waits for the slot's previous work, acquires a
    /// swapchain image, and begins the slot's command buffer.
    ///
    /// Returns `Ok(None)` without starting a frame when the drawable has
    /// no area, or when the swapchain was stale and has been rebuilt; the
    /// caller simply skips rendering this iteration.
    ///
    /// # Panics
    ///
    /// Panics if a frame is already in progress.
    pub fn begin_frame(&mut self) -> RhiResult<Option<vk::CommandBuffer>> {
        assert!(
            !self.tracker.is_frame_started(),
            "begin_frame called while a frame is already in progress"
        );

        if self.latch.is_zero_area() {
            // Minimized; keep the old swapchain and wait for area.
            return Ok(None);
        }

        let slot = self.tracker.current_slot();
        match self.swapchain.acquire_next_image(slot)? {
            AcquireOutcome::OutOfDate => {
                debug!("Acquire reported out-of-date; rebuilding swapchain");
                self.apply_rebuild(true)?;
                Ok(None)
            }
            AcquireOutcome::Acquired {
                image_index,
                suboptimal,
            } => {
                if suboptimal {
                    // Still presentable; present will flag staleness and
                    // end_frame rebuilds.
                    debug!("Acquired suboptimal swapchain image");
                }
                self.tracker.begin(image_index);
                let cmd = &self.command_buffers[slot];
                cmd.begin()?;
                Ok(Some(cmd.handle()))
            }
        }
    }

    /// Begins the render pass on the current framebuffer and sets the
    /// full-extent viewport and scissor.
    ///
    /// # Panics
    ///
    /// Panics when no frame is in progress or `cmd` is not the buffer
    /// `begin_frame` returned for this frame.
    pub fn begin_render_pass(&self, cmd: vk::CommandBuffer) {
        self.tracker.assert_frame_started("begin_render_pass");
        self.assert_current_buffer(cmd, "begin_render_pass");

        let extent = self.swapchain.extent();
        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: CLEAR_COLOR,
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            },
        ];

        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(self.swapchain.render_pass())
            .framebuffer(self.swapchain.framebuffer(self.tracker.image_index()))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .clear_values(&clear_values);

        let viewport = vk::Viewport::default()
            .x(0.0)
            .y(0.0)
            .width(extent.width as f32)
            .height(extent.height as f32)
            .min_depth(0.0)
            .max_depth(1.0);
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };

        // SAFETY: cmd is the slot's buffer in the recording state; the
        // framebuffer and render pass are live until end_frame.
        unsafe {
            self.device.handle().cmd_begin_render_pass(
                cmd,
                &begin_info,
                vk::SubpassContents::INLINE,
            );
            self.device.handle().cmd_set_viewport(cmd, 0, &[viewport]);
            self.device.handle().cmd_set_scissor(cmd, 0, &[scissor]);
        }
    }

    /// Ends the render pass.
    ///
    /// # Panics
    ///
    /// Panics when no frame is in progress or `cmd` is not this frame's
    /// buffer.
    pub fn end_render_pass(&self, cmd: vk::CommandBuffer) {
        self.tracker.assert_frame_started("end_render_pass");
        self.assert_current_buffer(cmd, "end_render_pass");

        // SAFETY: cmd is recording inside the render pass begun above.
        unsafe {
            self.device.handle().cmd_end_render_pass(cmd);
        }
    }

    /// Finishes the frame: ends recording, submits, presents, and applies
    /// at most one swapchain rebuild for staleness or a pending resize.
    ///
    /// # Panics
    ///
    /// Panics when no frame is in progress.
    pub fn end_frame(&mut self) -> RhiResult<()> {
        self.tracker.assert_frame_started("end_frame");

        let slot = self.tracker.current_slot();
        let cmd = &self.command_buffers[slot];
        cmd.end()?;

        let outcome =
            self.swapchain
                .submit_and_present(cmd.handle(), self.tracker.image_index(), slot)?;

        self.apply_rebuild(outcome == PresentOutcome::Stale)?;

        self.tracker.finish();
        Ok(())
    }

    /// Consumes the rebuild latch; one rebuild covers a stale present and
    /// a pending resize when they coincide.
    fn apply_rebuild(&mut self, stale: bool) -> RhiResult<()> {
        if let Some((width, height)) = self.latch.take(stale) {
            self.swapchain.recreate(width, height)?;
        }
        Ok(())
    }

    fn assert_current_buffer(&self, cmd: vk::CommandBuffer, operation: &str) {
        let current = self.command_buffers[self.tracker.current_slot()].handle();
        assert!(
            cmd == current,
            "{operation} called with a command buffer from another frame"
        );
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            warn!("wait_idle failed during renderer teardown: {e}");
        }
        debug!("Renderer destroyed");
    }
}
