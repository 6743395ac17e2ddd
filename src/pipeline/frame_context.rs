// src/pipeline/frame_context.rs
//
// Everything the engine produced for one frame. Consumers (overlay, HUD,
// export, debug view) read from this instead of from the trackers directly,
// so all of them see the same post-update state.

use crate::analysis::{LaneMetrics, LineSnapshot, SanityVerdict};
use crate::detection::{LaneBases, LaneFit, LanePixels};

/// Per-frame detection intermediates, before tracking.
#[derive(Debug, Clone)]
pub struct FrameDetection {
    pub bases: LaneBases,
    pub pixels: LanePixels,
    pub raw_left: Option<LaneFit>,
    pub raw_right: Option<LaneFit>,
    pub checked_left: Option<LaneFit>,
    pub checked_right: Option<LaneFit>,
    pub verdict: SanityVerdict,
}

impl FrameDetection {
    pub fn left_pixel_count(&self) -> usize {
        self.pixels.left.len()
    }

    pub fn right_pixel_count(&self) -> usize {
        self.pixels.right.len()
    }
}

#[derive(Debug, Clone)]
pub struct FrameResult {
    pub frame_id: u64,
    pub width: u32,
    pub height: u32,
    pub detection: FrameDetection,
    pub left: LineSnapshot,
    pub right: LineSnapshot,
    pub metrics: LaneMetrics,
    /// Either line is in sustained loss; the driver must take over.
    pub takeover: bool,
}

impl FrameResult {
    pub fn both_detected(&self) -> bool {
        self.left.detected && self.right.detected
    }
}
