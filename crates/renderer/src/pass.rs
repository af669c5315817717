//! The render pass seam and the ordered pass list.

use crate::context::FrameContext;
use crate::ubo::GlobalUbo;

/// A render pass the frame loop drives.
///
/// `update` runs for every pass, in order, before the frame's uniform
/// block is flushed; it may write into the block but records nothing.
/// `record` runs inside the render pass scope, again in order, and only
/// records commands.
pub trait DrawPass {
    fn name(&self) -> &'static str;

    /// Per-frame CPU work feeding the uniform block.
    fn update(&mut self, _ctx: &FrameContext, _ubo: &mut GlobalUbo) {}

    /// Records this pass's draws into `ctx.command_buffer`.
    fn record(&self, ctx: &FrameContext);
}

/// Explicit, ordered list of passes.
///
/// Insertion order is execution order for both phases; the geometry pass
/// is pushed before the light pass so lit billboards blend over geometry.
#[derive(Default)]
pub struct PassSequence {
    passes: Vec<Box<dyn DrawPass>>,
}

impl PassSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pass: Box<dyn DrawPass>) {
        self.passes.push(pass);
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs every pass's `update` in insertion order.
    pub fn update_all(&mut self, ctx: &FrameContext, ubo: &mut GlobalUbo) {
        for pass in &mut self.passes {
            pass.update(ctx, ubo);
        }
    }

    /// Records every pass in insertion order.
    pub fn record_all(&self, ctx: &FrameContext) {
        for pass in &self.passes {
            pass.record(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk;
    use mocha_scene::{Camera, SceneStore};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingPass {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl DrawPass for RecordingPass {
        fn name(&self) -> &'static str {
            self.name
        }

        fn update(&mut self, _ctx: &FrameContext, ubo: &mut GlobalUbo) {
            self.log.borrow_mut().push(format!("update:{}", self.name));
            ubo.num_lights += 1;
        }

        fn record(&self, _ctx: &FrameContext) {
            self.log.borrow_mut().push(format!("record:{}", self.name));
        }
    }

    fn test_context<'a>(camera: &'a Camera, scene: &'a SceneStore) -> FrameContext<'a> {
        FrameContext {
            slot: 0,
            frame_time: 0.016,
            command_buffer: vk::CommandBuffer::null(),
            camera,
            global_set: vk::DescriptorSet::null(),
            scene,
        }
    }

    #[test]
    fn passes_run_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sequence = PassSequence::new();
        sequence.push(Box::new(RecordingPass {
            name: "geometry",
            log: log.clone(),
        }));
        sequence.push(Box::new(RecordingPass {
            name: "point_light",
            log: log.clone(),
        }));

        let camera = Camera::new();
        let scene = SceneStore::new();
        let ctx = test_context(&camera, &scene);
        let mut ubo = GlobalUbo::default();

        sequence.update_all(&ctx, &mut ubo);
        sequence.record_all(&ctx);

        assert_eq!(
            *log.borrow(),
            vec![
                "update:geometry",
                "update:point_light",
                "record:geometry",
                "record:point_light",
            ]
        );
    }

    #[test]
    fn updates_complete_before_any_record() {
        // The frame loop flushes the uniform block between the phases, so
        // every update must land before the first record.
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sequence = PassSequence::new();
        for name in ["a", "b", "c"] {
            sequence.push(Box::new(RecordingPass {
                name,
                log: log.clone(),
            }));
        }

        let camera = Camera::new();
        let scene = SceneStore::new();
        let ctx = test_context(&camera, &scene);
        let mut ubo = GlobalUbo::default();

        sequence.update_all(&ctx, &mut ubo);
        assert_eq!(ubo.num_lights, 3);
        sequence.record_all(&ctx);

        let log = log.borrow();
        let first_record = log.iter().position(|e| e.starts_with("record")).unwrap();
        assert!(log[..first_record].iter().all(|e| e.starts_with("update")));
    }

    #[test]
    fn empty_sequence_is_a_no_op() {
        let camera = Camera::new();
        let scene = SceneStore::new();
        let ctx = test_context(&camera, &scene);
        let mut ubo = GlobalUbo::default();

        let mut sequence = PassSequence::new();
        assert!(sequence.is_empty());
        sequence.update_all(&ctx, &mut ubo);
        sequence.record_all(&ctx);
        assert_eq!(ubo, GlobalUbo::default());
    }
}
