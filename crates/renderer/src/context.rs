//! The per-frame context handed to render passes.

use ash::vk;
use mocha_scene::{Camera, SceneStore};

/// Borrowed view of everything a pass needs for one frame.
///
/// Built fresh after `begin_frame` and dropped before `end_frame`; never
/// stored. The scene is read-only from here on: animation happens before
/// the context is built.
pub struct FrameContext<'a> {
    /// Frame slot index in `[0, MAX_FRAMES_IN_FLIGHT)`
    pub slot: usize,
    /// Delta time of this frame in seconds
    pub frame_time: f32,
    /// The slot's command buffer, in the recording state
    pub command_buffer: vk::CommandBuffer,
    pub camera: &'a Camera,
    /// The slot's global descriptor set (set 0)
    pub global_set: vk::DescriptorSet,
    pub scene: &'a SceneStore,
}
