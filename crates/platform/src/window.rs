//! Window and Vulkan surface management.

use std::sync::Arc;

use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window as WinitWindow, WindowAttributes};

use mocha_core::{Error, Result};

/// RAII wrapper for a `vk::SurfaceKHR`.
///
/// The caller must ensure the Vulkan instance outlives this surface.
pub struct Surface {
    handle: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
}

impl Surface {
    /// Raw surface handle, valid only while this wrapper is alive.
    #[inline]
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    /// Surface loader, for capability/format/present-mode queries.
    #[inline]
    pub fn loader(&self) -> &ash::khr::surface::Instance {
        &self.surface_loader
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        // SAFETY: handle was created by ash_window::create_surface with this
        // loader's instance, and this is the only place it is destroyed.
        unsafe {
            self.surface_loader.destroy_surface(self.handle, None);
        }
        tracing::debug!("Surface destroyed");
    }
}

/// Winit window wrapper tracking the drawable size and a resize latch.
///
/// The resize latch is edge-triggered: winit sets it through [`resize`],
/// and the frame loop consumes it exactly once via [`take_resized`].
///
/// [`resize`]: Window::resize
/// [`take_resized`]: Window::take_resized
pub struct Window {
    window: Arc<WinitWindow>,
    width: u32,
    height: u32,
    resized: bool,
}

impl Window {
    /// Create a resizable window with the given dimensions and title.
    pub fn new(event_loop: &ActiveEventLoop, width: u32, height: u32, title: &str) -> Result<Self> {
        let attrs = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| Error::Window(e.to_string()))?;

        tracing::info!("Window created: {}x{} \"{}\"", width, height, title);

        Ok(Self {
            window: Arc::new(window),
            width,
            height,
            resized: false,
        })
    }

    /// Record a new drawable size and arm the resize latch.
    ///
    /// Zero dimensions are recorded as-is; the frame loop treats a
    /// zero-area drawable as "skip rendering" until a non-zero size
    /// arrives.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        tracing::debug!(
            "Window resized: {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        self.resized = true;
    }

    /// Consume the resize latch, returning whether it was armed.
    pub fn take_resized(&mut self) -> bool {
        std::mem::take(&mut self.resized)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True while the drawable has no area (minimized or zero-sized).
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Display handle for instance extension enumeration.
    pub fn display_handle(
        &self,
    ) -> std::result::Result<raw_window_handle::DisplayHandle<'_>, raw_window_handle::HandleError>
    {
        self.window.display_handle()
    }

    /// Schedule a redraw through the event loop.
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Create a Vulkan surface for this window.
    ///
    /// # Errors
    ///
    /// Fails if the raw handles cannot be obtained or surface creation
    /// fails in the loader.
    pub fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<Surface> {
        let display_handle = self
            .window
            .display_handle()
            .map_err(|e| Error::Window(format!("failed to get display handle: {e}")))?;

        let window_handle = self
            .window
            .window_handle()
            .map_err(|e| Error::Window(format!("failed to get window handle: {e}")))?;

        // SAFETY: entry and instance are live, and the raw handles come from
        // the winit window owned by self. Destruction happens in Surface::drop.
        let handle = unsafe {
            ash_window::create_surface(
                entry,
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| Error::Vulkan(format!("failed to create surface: {e}")))?
        };

        let surface_loader = ash::khr::surface::Instance::new(entry, instance);

        tracing::info!("Vulkan surface created");

        Ok(Surface {
            handle,
            surface_loader,
        })
    }
}

/// Instance extensions required to present to the current platform's
/// windowing system.
///
/// The returned pointers reference static strings owned by the loader.
pub fn required_surface_extensions(
    display_handle: raw_window_handle::RawDisplayHandle,
) -> Result<Vec<*const i8>> {
    let extensions = ash_window::enumerate_required_extensions(display_handle)
        .map_err(|e| Error::Vulkan(format!("failed to enumerate surface extensions: {e}")))?;

    Ok(extensions.to_vec())
}
