//! Shared foundations for the Mocha engine.
//!
//! Error type and result alias, logging setup, and frame timing. Everything
//! here is GPU-agnostic; Vulkan-specific errors live in `mocha_rhi`.

mod error;
mod logging;
mod timer;

pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::FrameTimer;
