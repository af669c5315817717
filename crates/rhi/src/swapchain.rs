//! The swapchain manager.
//!
//! Owns everything tied to the presentable surface: the `vk::SwapchainKHR`
//! and its images/views, the shared depth target, the classic render pass,
//! one framebuffer per image, and one [`FrameSync`] bundle per frame in
//! flight. Exposes the acquire / submit-and-present protocol the frame
//! renderer drives, and atomic recreation for resize and staleness.

use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use tracing::{debug, info};

use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::sync::{FrameSync, MAX_FRAMES_IN_FLIGHT};

/// Depth format used for the depth attachment.
pub const DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

/// Result of acquiring the next presentable image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired. `suboptimal` means it is still usable but
    /// the swapchain no longer matches the surface exactly.
    Acquired { image_index: u32, suboptimal: bool },
    /// The swapchain is stale; recreate before rendering.
    OutOfDate,
}

/// Result of a submit-and-present cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    /// Presented on a swapchain that still matches the surface.
    Optimal,
    /// Presented (or failed to present) on a stale swapchain; recreate.
    Stale,
}

/// Surface capabilities snapshot used to configure the swapchain.
pub struct SwapchainSupportDetails {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupportDetails {
    pub fn query(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
    ) -> RhiResult<Self> {
        // SAFETY: the handles are live and belong to the same instance.
        let capabilities = unsafe {
            surface_loader.get_physical_device_surface_capabilities(physical_device, surface)?
        };
        let formats = unsafe {
            surface_loader.get_physical_device_surface_formats(physical_device, surface)?
        };
        let present_modes = unsafe {
            surface_loader.get_physical_device_surface_present_modes(physical_device, surface)?
        };

        Ok(Self {
            capabilities,
            formats,
            present_modes,
        })
    }

    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Shared depth attachment, recreated with the swapchain.
struct DepthTarget {
    device: Arc<Device>,
    image: vk::Image,
    view: vk::ImageView,
    allocation: Option<Allocation>,
}

impl DepthTarget {
    fn new(device: Arc<Device>, extent: vk::Extent2D) -> RhiResult<Self> {
        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(DEPTH_FORMAT)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        // SAFETY: device is live; image_info borrows nothing.
        let image = unsafe { device.handle().create_image(&image_info, None)? };
        let requirements = unsafe { device.handle().get_image_memory_requirements(image) };

        let allocation = device
            .allocator()
            .lock()
            .map_err(|_| RhiError::InvalidArgument("allocator mutex poisoned".to_string()))?
            .allocate(&AllocationCreateDesc {
                name: "depth target",
                requirements,
                location: MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })?;

        // SAFETY: allocation satisfies the image's requirements.
        unsafe {
            device
                .handle()
                .bind_image_memory(image, allocation.memory(), allocation.offset())?;
        }

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(DEPTH_FORMAT)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(vk::ImageAspectFlags::DEPTH)
                    .base_mip_level(0)
                    .level_count(1)
                    .base_array_layer(0)
                    .layer_count(1),
            );

        // SAFETY: image was created and bound above.
        let view = unsafe { device.handle().create_image_view(&view_info, None)? };

        debug!("Depth target created ({}x{})", extent.width, extent.height);

        Ok(Self {
            device,
            image,
            view,
            allocation: Some(allocation),
        })
    }
}

impl Drop for DepthTarget {
    fn drop(&mut self) {
        // SAFETY: view and image are owned by self; destruction is gated on
        // device idle by the swapchain.
        unsafe {
            self.device.handle().destroy_image_view(self.view, None);
            self.device.handle().destroy_image(self.image, None);
        }
        if let Some(allocation) = self.allocation.take()
            && let Ok(mut allocator) = self.device.allocator().lock()
        {
            let _ = allocator.free(allocation);
        }
    }
}

/// Result of building the raw swapchain and its views.
struct SwapchainInner {
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    surface_format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
}

/// The swapchain manager.
pub struct Swapchain {
    device: Arc<Device>,
    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    swapchain_loader: ash::khr::swapchain::Device,

    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    surface_format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,

    depth: Option<DepthTarget>,
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,
    frame_syncs: Vec<FrameSync>,
}

impl Swapchain {
    /// Creates the swapchain and all per-image resources.
    ///
    /// # Errors
    ///
    /// Rejects zero-area extents: no image, framebuffer, or depth resource
    /// may exist at a degenerate size.
    pub fn new(
        instance: &ash::Instance,
        device: Arc<Device>,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
        width: u32,
        height: u32,
    ) -> RhiResult<Self> {
        let swapchain_loader = ash::khr::swapchain::Device::new(instance, device.handle());
        let surface_loader = surface_loader.clone();

        let inner = create_inner(
            &device,
            surface,
            &surface_loader,
            &swapchain_loader,
            width,
            height,
            vk::SwapchainKHR::null(),
        )?;

        let depth = DepthTarget::new(device.clone(), inner.extent)?;
        let render_pass = create_render_pass(&device, inner.surface_format.format)?;
        let framebuffers =
            create_framebuffers(&device, render_pass, &inner.image_views, depth.view, inner.extent)?;

        let frame_syncs = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| FrameSync::new(device.clone()))
            .collect::<RhiResult<Vec<_>>>()?;

        info!(
            "Swapchain created: {} images, {:?}, {}x{}",
            inner.images.len(),
            inner.surface_format.format,
            inner.extent.width,
            inner.extent.height
        );

        Ok(Self {
            device,
            surface,
            surface_loader,
            swapchain_loader,
            swapchain: inner.swapchain,
            images: inner.images,
            image_views: inner.image_views,
            surface_format: inner.surface_format,
            extent: inner.extent,
            depth: Some(depth),
            render_pass,
            framebuffers,
            frame_syncs,
        })
    }

    #[inline]
    pub fn format(&self) -> vk::Format {
        self.surface_format.format
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    #[inline]
    pub fn image_count(&self) -> u32 {
        self.images.len() as u32
    }

    #[inline]
    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    #[inline]
    pub fn framebuffer(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.extent.width as f32 / self.extent.height as f32
    }

    /// Waits on the slot's fence and acquires the next presentable image.
    ///
    /// The fence wait bounds CPU run-ahead to [`MAX_FRAMES_IN_FLIGHT`]
    /// frames. Acquisition signals the slot's image-available semaphore.
    pub fn acquire_next_image(&self, slot: usize) -> RhiResult<AcquireOutcome> {
        let sync = &self.frame_syncs[slot];
        sync.in_flight().wait(u64::MAX)?;

        // SAFETY: swapchain and semaphore are live; the semaphore is
        // unsignaled because the previous submit for this slot waited it.
        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                sync.image_available_handle(),
                vk::Fence::null(),
            )
        };

        match result {
            Ok((image_index, suboptimal)) => Ok(AcquireOutcome::Acquired {
                image_index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(RhiError::VulkanError(e)),
        }
    }

    /// Submits `cmd` to the graphics queue and presents `image_index`.
    ///
    /// The submission waits the slot's image-available semaphore at
    /// color-attachment output, signals render-finished plus the slot's
    /// fence; presentation waits render-finished.
    pub fn submit_and_present(
        &self,
        cmd: vk::CommandBuffer,
        image_index: u32,
        slot: usize,
    ) -> RhiResult<PresentOutcome> {
        let sync = &self.frame_syncs[slot];
        sync.in_flight().reset()?;

        let wait_semaphores = [sync.image_available_handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [sync.render_finished_handle()];
        let command_buffers = [cmd];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        // SAFETY: cmd finished recording, the semaphores are in the states
        // the protocol guarantees, and the fence was reset above.
        unsafe {
            self.device
                .submit_graphics(&[submit_info], sync.in_flight().handle())?;
        }

        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        // SAFETY: present queue and swapchain are live.
        let result = unsafe {
            self.swapchain_loader
                .queue_present(self.device.present_queue(), &present_info)
        };

        match result {
            Ok(false) => Ok(PresentOutcome::Optimal),
            Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) | Err(vk::Result::SUBOPTIMAL_KHR) => {
                Ok(PresentOutcome::Stale)
            }
            Err(e) => Err(RhiError::VulkanError(e)),
        }
    }

    /// Recreates the swapchain and every per-image resource at the new
    /// extent, draining the device first.
    ///
    /// # Errors
    ///
    /// - Zero-area extents are rejected; the caller defers until the
    ///   surface has area again.
    /// - A change in surface format across recreation is fatal: pipelines
    ///   and the render pass were built against the original format.
    pub fn recreate(&mut self, width: u32, height: u32) -> RhiResult<()> {
        validate_extent(width, height, "recreate swapchain")?;

        self.device.wait_idle()?;

        // Tear down resources built on the old images. The depth target
        // and framebuffers are extent-dependent; the render pass and frame
        // syncs are not.
        for &framebuffer in &self.framebuffers {
            // SAFETY: device is idle; framebuffers are owned by self.
            unsafe {
                self.device.handle().destroy_framebuffer(framebuffer, None);
            }
        }
        self.framebuffers.clear();
        self.depth = None;

        for &view in &self.image_views {
            // SAFETY: device is idle; views are owned by self.
            unsafe {
                self.device.handle().destroy_image_view(view, None);
            }
        }
        self.image_views.clear();

        let inner = create_inner(
            &self.device,
            self.surface,
            &self.surface_loader,
            &self.swapchain_loader,
            width,
            height,
            self.swapchain,
        )?;

        // SAFETY: the new swapchain retired the old handle via
        // old_swapchain; it is no longer in use after the idle wait.
        unsafe {
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }

        if inner.surface_format != self.surface_format {
            // Leave the struct in a droppable state before bailing out.
            self.swapchain = inner.swapchain;
            self.images = inner.images;
            self.image_views = inner.image_views;
            return Err(RhiError::SwapchainError(format!(
                "surface format changed on recreation: {:?} -> {:?}",
                self.surface_format.format, inner.surface_format.format
            )));
        }

        self.swapchain = inner.swapchain;
        self.images = inner.images;
        self.image_views = inner.image_views;
        self.extent = inner.extent;

        let depth = DepthTarget::new(self.device.clone(), self.extent)?;
        self.framebuffers = create_framebuffers(
            &self.device,
            self.render_pass,
            &self.image_views,
            depth.view,
            self.extent,
        )?;
        self.depth = Some(depth);

        info!(
            "Swapchain recreated: {} images, {}x{}",
            self.images.len(),
            self.extent.width,
            self.extent.height
        );

        Ok(())
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        for &framebuffer in &self.framebuffers {
            // SAFETY: callers drain the device before dropping the
            // swapchain; all handles below are owned by self.
            unsafe {
                self.device.handle().destroy_framebuffer(framebuffer, None);
            }
        }
        unsafe {
            self.device
                .handle()
                .destroy_render_pass(self.render_pass, None);
        }
        for &view in &self.image_views {
            unsafe {
                self.device.handle().destroy_image_view(view, None);
            }
        }
        if self.swapchain != vk::SwapchainKHR::null() {
            unsafe {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            }
        }
        debug!("Swapchain destroyed");
    }
}

fn create_inner(
    device: &Arc<Device>,
    surface: vk::SurfaceKHR,
    surface_loader: &ash::khr::surface::Instance,
    swapchain_loader: &ash::khr::swapchain::Device,
    width: u32,
    height: u32,
    old_swapchain: vk::SwapchainKHR,
) -> RhiResult<SwapchainInner> {
    validate_extent(width, height, "create swapchain")?;

    let support =
        SwapchainSupportDetails::query(device.physical_device(), surface, surface_loader)?;
    if !support.is_adequate() {
        return Err(RhiError::SwapchainError(
            "surface reports no formats or present modes".to_string(),
        ));
    }

    let surface_format = choose_surface_format(&support.formats);
    let present_mode = choose_present_mode(&support.present_modes);
    let extent = choose_extent(&support.capabilities, width, height);
    let image_count = determine_image_count(&support.capabilities);

    let families = device.queue_families();
    let family_indices = families.unique_families();
    let concurrent = family_indices.len() > 1;

    let mut create_info = vk::SwapchainCreateInfoKHR::default()
        .surface(surface)
        .min_image_count(image_count)
        .image_format(surface_format.format)
        .image_color_space(surface_format.color_space)
        .image_extent(extent)
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .pre_transform(support.capabilities.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(present_mode)
        .clipped(true)
        .old_swapchain(old_swapchain);

    create_info = if concurrent {
        create_info
            .image_sharing_mode(vk::SharingMode::CONCURRENT)
            .queue_family_indices(&family_indices)
    } else {
        create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
    };

    // SAFETY: all handles in create_info are live; family_indices outlives
    // the call.
    let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None)? };

    // SAFETY: swapchain was just created.
    let images = unsafe { swapchain_loader.get_swapchain_images(swapchain)? };
    let image_views = create_image_views(device, &images, surface_format.format)?;

    Ok(SwapchainInner {
        swapchain,
        images,
        image_views,
        surface_format,
        extent,
    })
}

fn create_image_views(
    device: &Arc<Device>,
    images: &[vk::Image],
    format: vk::Format,
) -> RhiResult<Vec<vk::ImageView>> {
    images
        .iter()
        .map(|&image| {
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .subresource_range(
                    vk::ImageSubresourceRange::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1),
                );

            // SAFETY: image belongs to the live swapchain.
            let view = unsafe { device.handle().create_image_view(&view_info, None)? };
            Ok(view)
        })
        .collect()
}

fn create_render_pass(device: &Arc<Device>, color_format: vk::Format) -> RhiResult<vk::RenderPass> {
    let attachments = [
        vk::AttachmentDescription::default()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR),
        vk::AttachmentDescription::default()
            .format(DEPTH_FORMAT)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL),
    ];

    let color_ref = [vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)];
    let depth_ref = vk::AttachmentReference::default()
        .attachment(1)
        .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

    let subpasses = [vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(&color_ref)
        .depth_stencil_attachment(&depth_ref)];

    let dependencies = [vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        )
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
        )
        .dst_access_mask(
            vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        )];

    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    // SAFETY: device is live; create_info borrows locals only.
    let render_pass = unsafe { device.handle().create_render_pass(&create_info, None)? };

    debug!("Render pass created for {:?}", color_format);

    Ok(render_pass)
}

fn create_framebuffers(
    device: &Arc<Device>,
    render_pass: vk::RenderPass,
    image_views: &[vk::ImageView],
    depth_view: vk::ImageView,
    extent: vk::Extent2D,
) -> RhiResult<Vec<vk::Framebuffer>> {
    image_views
        .iter()
        .map(|&view| {
            let attachments = [view, depth_view];
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass)
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);

            // SAFETY: render pass and views are live and compatible.
            let framebuffer = unsafe { device.handle().create_framebuffer(&create_info, None)? };
            Ok(framebuffer)
        })
        .collect()
}

/// Prefers B8G8R8A8_SRGB with sRGB nonlinear color space.
fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    formats
        .iter()
        .copied()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .unwrap_or(formats[0])
}

/// Prefers MAILBOX (low-latency triple buffering), falls back to the
/// always-available FIFO.
fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Uses the surface's fixed extent when it has one, otherwise clamps the
/// window size into the supported range.
fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    width: u32,
    height: u32,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D {
            width: width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ),
            height: height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ),
        }
    }
}

/// Rejects extents that would produce degenerate images or framebuffers.
fn validate_extent(width: u32, height: u32, operation: &str) -> RhiResult<()> {
    if width == 0 || height == 0 {
        return Err(RhiError::SwapchainError(format!(
            "cannot {operation} at zero-area extent ({width}x{height})"
        )));
    }
    Ok(())
}

/// One more than the minimum, clamped to the maximum (0 = unbounded).
fn determine_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        count = capabilities.max_image_count;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn prefers_bgra_srgb() {
        let formats = [
            surface_format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            surface_format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [surface_format(
            vk::Format::R8G8B8A8_UNORM,
            vk::ColorSpaceKHR::SRGB_NONLINEAR,
        )];
        let chosen = choose_surface_format(&formats);
        assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn prefers_mailbox_present_mode() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn fifo_when_mailbox_missing() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::FIFO);
    }

    fn capabilities(
        current: vk::Extent2D,
        min: vk::Extent2D,
        max: vk::Extent2D,
        min_images: u32,
        max_images: u32,
    ) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            current_extent: current,
            min_image_extent: min,
            max_image_extent: max,
            min_image_count: min_images,
            max_image_count: max_images,
            ..Default::default()
        }
    }

    #[test]
    fn extent_uses_fixed_surface_size() {
        let caps = capabilities(
            vk::Extent2D {
                width: 800,
                height: 600,
            },
            vk::Extent2D {
                width: 1,
                height: 1,
            },
            vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            2,
            8,
        );
        let extent = choose_extent(&caps, 1280, 720);
        assert_eq!(extent.width, 800);
        assert_eq!(extent.height, 600);
    }

    #[test]
    fn extent_clamps_when_surface_is_flexible() {
        let caps = capabilities(
            vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            vk::Extent2D {
                width: 200,
                height: 200,
            },
            vk::Extent2D {
                width: 1000,
                height: 1000,
            },
            2,
            8,
        );
        let extent = choose_extent(&caps, 5000, 100);
        assert_eq!(extent.width, 1000);
        assert_eq!(extent.height, 200);
    }

    #[test]
    fn image_count_is_min_plus_one() {
        let caps = capabilities(
            vk::Extent2D::default(),
            vk::Extent2D::default(),
            vk::Extent2D::default(),
            2,
            8,
        );
        assert_eq!(determine_image_count(&caps), 3);
    }

    #[test]
    fn image_count_respects_maximum() {
        let caps = capabilities(
            vk::Extent2D::default(),
            vk::Extent2D::default(),
            vk::Extent2D::default(),
            3,
            3,
        );
        assert_eq!(determine_image_count(&caps), 3);
    }

    #[test]
    fn unbounded_maximum_allows_extra_image() {
        let caps = capabilities(
            vk::Extent2D::default(),
            vk::Extent2D::default(),
            vk::Extent2D::default(),
            4,
            0,
        );
        assert_eq!(determine_image_count(&caps), 5);
    }

    #[test]
    fn zero_area_extents_are_rejected() {
        assert!(matches!(
            validate_extent(0, 600, "create swapchain"),
            Err(RhiError::SwapchainError(_))
        ));
        assert!(matches!(
            validate_extent(800, 0, "create swapchain"),
            Err(RhiError::SwapchainError(_))
        ));
        assert!(matches!(
            validate_extent(0, 0, "recreate swapchain"),
            Err(RhiError::SwapchainError(_))
        ));
    }

    #[test]
    fn positive_extents_pass_validation() {
        assert!(validate_extent(1, 1, "create swapchain").is_ok());
        assert!(validate_extent(1920, 1080, "recreate swapchain").is_ok());
    }

    #[test]
    fn depth_format_is_stable() {
        // Pipelines and the render pass both assume this format; a change
        // here must be deliberate.
        assert_eq!(DEPTH_FORMAT, vk::Format::D32_SFLOAT);
    }
}
