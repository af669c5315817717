//! Platform layer for the Mocha engine.
//!
//! Window management via winit, keyboard input state, and Vulkan surface
//! creation through ash-window.

mod input;
mod window;

pub use input::{InputState, KeyCode};
pub use window::{Surface, Window, required_surface_extensions};
