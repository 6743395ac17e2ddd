// src/analysis/line_tracker.rs
//
// Temporal tracker for one lane line.
//
// Consumes one checked fit (or its absence) per frame and keeps:
//   - an exponentially smoothed polynomial (first accepted fit is taken as-is),
//   - a DETECTED / UNDETECTED state with hysteresis: `max_frames_lost`
//     consecutive misses are needed to drop to UNDETECTED, one accepted fit
//     brings the line straight back,
//   - a confidence score from the pixel support of the last accepted fit,
//     decaying linearly on every miss.
//
// A miss leaves the smoothed fit untouched. Consumers must check `detected`
// before trusting `current_fit` for display or metrics.
//
// One tracker per lane side; the pipeline owns both and feeds them strictly
// in frame order.

use crate::detection::{LaneFit, LaneSide};
use crate::types::TrackerConfig;
use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackState {
    Undetected,
    Detected,
}

impl TrackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undetected => "UNDETECTED",
            Self::Detected => "DETECTED",
        }
    }
}

/// Read-only view of a tracker for overlay, HUD and export consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSnapshot {
    pub side: LaneSide,
    pub state: TrackState,
    pub detected: bool,
    pub confidence: f64,
    pub current_fit: Option<LaneFit>,
    pub frames_since_detected: u32,
    pub pixel_count: usize,
}

#[derive(Debug, Clone)]
pub struct LineTracker {
    side: LaneSide,
    config: TrackerConfig,

    current_fit: Option<LaneFit>,
    detected: bool,
    confidence: f64,
    frames_since_detected: u32,
    /// Pixel support of the last accepted fit.
    pixel_count: usize,

    // ── Metrics ──
    pub total_accepted: u64,
    pub total_missed: u64,
}

impl LineTracker {
    pub fn new(side: LaneSide, config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            side,
            config,
            current_fit: None,
            detected: false,
            confidence: 0.0,
            frames_since_detected: 0,
            pixel_count: 0,
            total_accepted: 0,
            total_missed: 0,
        })
    }

    /// Apply one frame's checked fit.
    ///
    /// `pixel_count` is the size of the pixel set the fit came from; it is
    /// only used when the fit is present.
    pub fn update(&mut self, fit: Option<&LaneFit>, pixel_count: usize) {
        match fit {
            Some(fit) => self.accept(fit, pixel_count),
            None => self.miss(),
        }
    }

    fn accept(&mut self, fit: &LaneFit, pixel_count: usize) {
        if !self.detected {
            info!(
                "🛣️  {} line {} → {} ({} px)",
                self.side.as_str(),
                TrackState::Undetected.as_str(),
                TrackState::Detected.as_str(),
                pixel_count
            );
        }

        self.frames_since_detected = 0;
        self.detected = true;
        self.pixel_count = pixel_count;
        self.confidence = self.confidence_for(pixel_count);
        self.total_accepted += 1;

        self.current_fit = Some(match self.current_fit {
            Some(previous) => previous.blend(fit, self.config.smoothing_alpha),
            None => *fit,
        });

        debug!(
            "{} accepted: conf={:.2} fit={:?}",
            self.side.as_str(),
            self.confidence,
            self.current_fit
        );
    }

    fn miss(&mut self) {
        self.frames_since_detected = self.frames_since_detected.saturating_add(1);
        self.total_missed += 1;

        if self.frames_since_detected >= self.config.max_frames_lost && self.detected {
            self.detected = false;
            warn!(
                "⚠️  {} line {} → {} after {} missed frames",
                self.side.as_str(),
                TrackState::Detected.as_str(),
                TrackState::Undetected.as_str(),
                self.frames_since_detected
            );
        }

        self.confidence = (self.confidence - self.config.confidence_decay).max(0.0);
    }

    /// Linear ramp from `min_confidence_pixels` (0.0) to
    /// `full_confidence_pixels` (1.0), clamped.
    pub fn confidence_for(&self, pixel_count: usize) -> f64 {
        let min_p = self.config.min_confidence_pixels as f64;
        let max_p = self.config.full_confidence_pixels as f64;
        let n = pixel_count as f64;
        if n < min_p {
            return 0.0;
        }
        ((n - min_p) / (max_p - min_p)).clamp(0.0, 1.0)
    }

    pub fn side(&self) -> LaneSide {
        self.side
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> TrackState {
        if self.detected {
            TrackState::Detected
        } else {
            TrackState::Undetected
        }
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Smoothed fit; may be stale while `frames_since_detected > 0`.
    pub fn current_fit(&self) -> Option<&LaneFit> {
        self.current_fit.as_ref()
    }

    pub fn frames_since_detected(&self) -> u32 {
        self.frames_since_detected
    }

    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Sustained loss: the driver should take over.
    pub fn needs_takeover(&self) -> bool {
        self.frames_since_detected >= self.config.max_frames_lost
    }

    pub fn snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            side: self.side,
            state: self.state(),
            detected: self.detected,
            confidence: self.confidence,
            current_fit: self.current_fit,
            frames_since_detected: self.frames_since_detected,
            pixel_count: self.pixel_count,
        }
    }

    /// Back to the initial state, keeping configuration.
    pub fn reset(&mut self) {
        self.current_fit = None;
        self.detected = false;
        self.confidence = 0.0;
        self.frames_since_detected = 0;
        self.pixel_count = 0;
        self.total_accepted = 0;
        self.total_missed = 0;
    }
}
