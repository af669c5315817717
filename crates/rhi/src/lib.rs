//! Vulkan hardware interface for the Mocha engine.
//!
//! Thin RAII wrappers over ash 0.38: instance and device setup, memory via
//! gpu-allocator, command recording, buffers and meshes, descriptors,
//! graphics pipelines, and the swapchain that drives the present loop.
//!
//! Every wrapper that owns a Vulkan handle holds an `Arc<Device>` and
//! destroys the handle in `Drop`, so teardown order follows struct drop
//! order.

mod error;

pub mod buffer;
pub mod command;
pub mod descriptor;
pub mod device;
pub mod instance;
pub mod mesh;
pub mod physical_device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex;

pub use error::{RhiError, RhiResult};

// Re-export for downstream crates that need raw Vulkan types.
pub use ash::vk;
