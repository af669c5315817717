//! The frame protocol state machine and the swapchain rebuild latch.
//!
//! Pure bookkeeping, factored out of the renderer so the protocol's
//! invariants are testable without a GPU. A frame is either idle or
//! started; the slot index advances exactly once per finished frame and
//! cycles through [`MAX_FRAMES_IN_FLIGHT`] slots.

use crate::MAX_FRAMES_IN_FLIGHT;

/// Tracks the current frame slot, the acquired image, and whether a frame
/// is being recorded.
#[derive(Debug, Default)]
pub struct FrameTracker {
    current_slot: usize,
    image_index: u32,
    frame_started: bool,
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot whose resources (command buffer, uniform buffer, descriptor
    /// set) the current or next frame uses.
    #[inline]
    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    /// Swapchain image index of the frame being recorded.
    ///
    /// # Panics
    ///
    /// Panics when no frame is started; the image index is meaningless
    /// outside a frame.
    pub fn image_index(&self) -> u32 {
        assert!(
            self.frame_started,
            "image_index queried outside a frame"
        );
        self.image_index
    }

    #[inline]
    pub fn is_frame_started(&self) -> bool {
        self.frame_started
    }

    /// Marks the frame started with the acquired image.
    ///
    /// # Panics
    ///
    /// Panics if a frame is already in progress.
    pub fn begin(&mut self, image_index: u32) {
        assert!(
            !self.frame_started,
            "begin_frame called while a frame is already in progress"
        );
        self.image_index = image_index;
        self.frame_started = true;
    }

    /// Marks the frame finished and advances to the next slot.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn finish(&mut self) {
        assert!(
            self.frame_started,
            "end_frame called with no frame in progress"
        );
        self.frame_started = false;
        self.current_slot = (self.current_slot + 1) % MAX_FRAMES_IN_FLIGHT;
    }

    /// Guards operations that are only legal inside a frame.
    ///
    /// # Panics
    ///
    /// Panics with the operation name when no frame is started.
    pub fn assert_frame_started(&self, operation: &str) {
        assert!(
            self.frame_started,
            "{operation} called with no frame in progress"
        );
    }
}

/// Edge-triggered latch deciding when the swapchain gets rebuilt.
///
/// Resize events arm the latch; the end of a frame consumes it via
/// [`take`], which also folds in a stale present. One consumption covers
/// both causes, so a single resize yields exactly one rebuild. A
/// zero-area drawable re-arms the latch instead of releasing an extent,
/// deferring the rebuild until the surface has area again.
///
/// [`take`]: RebuildLatch::take
#[derive(Debug)]
pub struct RebuildLatch {
    width: u32,
    height: u32,
    pending: bool,
}

impl RebuildLatch {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pending: false,
        }
    }

    /// Records a new drawable size, arming the latch on any change.
    pub fn record_resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pending = true;
    }

    /// True while the drawable has no area (minimized window).
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Consumes the latch, returning the extent to rebuild at.
    ///
    /// Returns `Some` when a resize is pending or `stale` is set and the
    /// drawable has area; `None` otherwise. A zero-area drawable re-arms
    /// the latch so the rebuild happens once area returns.
    pub fn take(&mut self, stale: bool) -> Option<(u32, u32)> {
        let armed = std::mem::take(&mut self.pending);
        if !armed && !stale {
            return None;
        }
        if self.is_zero_area() {
            self.pending = true;
            return None;
        }
        Some((self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_cycle_with_period_n() {
        let mut tracker = FrameTracker::new();
        let mut observed = Vec::new();
        for i in 0..6 {
            observed.push(tracker.current_slot());
            tracker.begin(i % 3);
            tracker.finish();
        }
        assert_eq!(observed, vec![0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn image_index_is_independent_of_slot() {
        let mut tracker = FrameTracker::new();
        tracker.begin(2);
        assert_eq!(tracker.current_slot(), 0);
        assert_eq!(tracker.image_index(), 2);
        tracker.finish();
        assert_eq!(tracker.current_slot(), 1);
    }

    #[test]
    #[should_panic(expected = "already in progress")]
    fn double_begin_panics() {
        let mut tracker = FrameTracker::new();
        tracker.begin(0);
        tracker.begin(1);
    }

    #[test]
    #[should_panic(expected = "no frame in progress")]
    fn finish_without_begin_panics() {
        let mut tracker = FrameTracker::new();
        tracker.finish();
    }

    #[test]
    #[should_panic(expected = "begin_render_pass called with no frame in progress")]
    fn render_pass_scope_requires_frame() {
        let tracker = FrameTracker::new();
        tracker.assert_frame_started("begin_render_pass");
    }

    #[test]
    #[should_panic(expected = "image_index queried outside a frame")]
    fn image_index_requires_frame() {
        let tracker = FrameTracker::new();
        let _ = tracker.image_index();
    }

    #[test]
    fn failed_acquire_leaves_tracker_idle() {
        // An out-of-date acquire never reaches begin(); the tracker must
        // stay idle and keep its slot for the retry.
        let mut tracker = FrameTracker::new();
        tracker.begin(0);
        tracker.finish();
        let slot_before = tracker.current_slot();
        // Staleness path: no begin/finish pair.
        assert!(!tracker.is_frame_started());
        assert_eq!(tracker.current_slot(), slot_before);
    }

    #[test]
    fn one_resize_yields_exactly_one_rebuild() {
        let mut latch = RebuildLatch::new(800, 600);
        latch.record_resize(1024, 768);
        assert_eq!(latch.take(false), Some((1024, 768)));
        // Subsequent frames without new events rebuild nothing.
        assert_eq!(latch.take(false), None);
        assert_eq!(latch.take(false), None);
    }

    #[test]
    fn unchanged_size_does_not_arm() {
        let mut latch = RebuildLatch::new(800, 600);
        latch.record_resize(800, 600);
        assert_eq!(latch.take(false), None);
    }

    #[test]
    fn stale_present_rebuilds_at_current_extent() {
        let mut latch = RebuildLatch::new(800, 600);
        assert_eq!(latch.take(true), Some((800, 600)));
        assert_eq!(latch.take(false), None);
    }

    #[test]
    fn stale_and_resize_coalesce_into_one_rebuild() {
        let mut latch = RebuildLatch::new(800, 600);
        latch.record_resize(400, 300);
        assert_eq!(latch.take(true), Some((400, 300)));
        assert_eq!(latch.take(false), None);
    }

    #[test]
    fn zero_area_defers_the_rebuild() {
        let mut latch = RebuildLatch::new(800, 600);
        latch.record_resize(0, 0);
        assert!(latch.is_zero_area());
        // Minimized: no extent released, latch stays armed.
        assert_eq!(latch.take(false), None);
        // Restore: the deferred rebuild fires once, at the new size.
        latch.record_resize(800, 600);
        assert_eq!(latch.take(false), Some((800, 600)));
        assert_eq!(latch.take(false), None);
    }

    #[test]
    fn staleness_while_minimized_re_arms() {
        let mut latch = RebuildLatch::new(0, 0);
        assert_eq!(latch.take(true), None);
        latch.record_resize(640, 480);
        assert_eq!(latch.take(false), Some((640, 480)));
    }
}
