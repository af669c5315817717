//! Frame orchestration for the Mocha engine.
//!
//! Drives the per-frame protocol: acquire a swapchain image, record the
//! ordered pass sequence into the slot's command buffer, write the slot's
//! uniform block, submit, present, and advance the frame slot. Recoverable
//! swapchain staleness is handled here; calling the protocol out of order
//! is a programming error and panics.

pub mod context;
pub mod descriptors;
pub mod frame;
pub mod geometry;
pub mod pass;
pub mod point_light;
pub mod renderer;
pub mod ubo;

pub use context::FrameContext;
pub use descriptors::FrameDescriptors;
pub use frame::{FrameTracker, RebuildLatch};
pub use geometry::GeometryPass;
pub use pass::{DrawPass, PassSequence};
pub use point_light::PointLightPass;
pub use renderer::FrameRenderer;
pub use ubo::{GlobalUbo, MAX_LIGHTS, PointLightData};

pub use mocha_rhi::sync::MAX_FRAMES_IN_FLIGHT;
