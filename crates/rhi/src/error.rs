//! RHI error types.

use thiserror::Error;

/// Errors produced by the Vulkan layer.
#[derive(Error, Debug)]
pub enum RhiError {
    /// Raw Vulkan API error
    #[error("vulkan error: {0}")]
    VulkanError(#[from] ash::vk::Result),

    /// The Vulkan loader could not be found or initialized
    #[error("failed to load vulkan: {0}")]
    LoadingError(#[from] ash::LoadingError),

    /// GPU memory allocation failure
    #[error("allocation error: {0}")]
    AllocatorError(#[from] gpu_allocator::AllocationError),

    /// No physical device satisfied the engine's requirements
    #[error("no suitable GPU found")]
    NoSuitableGpu,

    /// SPIR-V loading or reflection failure
    #[error("shader error: {0}")]
    ShaderError(String),

    /// Surface capability or creation failure
    #[error("surface error: {0}")]
    SurfaceError(String),

    /// Swapchain creation or recreation failure; also raised when the
    /// surface format changes across a recreation, which is fatal
    #[error("swapchain error: {0}")]
    SwapchainError(String),

    /// A caller passed an argument the API cannot act on
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Pipeline construction failure
    #[error("pipeline error: {0}")]
    PipelineError(String),
}

/// Result alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;
