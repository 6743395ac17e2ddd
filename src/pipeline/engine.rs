// src/pipeline/engine.rs
//
// One run of the lane tracking engine.
//
// Per frame:
//   mask → locate_lane_bases → SlidingWindowSearch → fit_pixels (×2)
//        → SanityChecker (join) → LineTracker::update (×2) → MetricsConverter
//
// The two trackers are the only state carried between frames. They are owned
// here and only mutated through `process_frame(&mut self)`, which keeps frame
// N+1 from starting before frame N has been committed.
//
// The first mask fixes the frame size for the run; a later mask with other
// dimensions is refused.

use super::frame_context::{FrameDetection, FrameResult};
use super::metrics::PipelineMetrics;
use crate::analysis::{fit_pixels, LineTracker, MetricsConverter, SanityChecker};
use crate::detection::{locate_lane_bases, LaneSide, SlidingWindowSearch};
use crate::mask::BinaryMask;
use crate::types::Config;
use anyhow::{bail, Result};
use tracing::{debug, info};

pub struct LaneEngine {
    config: Config,
    search: SlidingWindowSearch,
    sanity: SanityChecker,
    left: LineTracker,
    right: LineTracker,
    converter: Option<MetricsConverter>,
    frame_id: u64,
    metrics: PipelineMetrics,
}

impl LaneEngine {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            search: SlidingWindowSearch::new(config.search.clone()),
            sanity: SanityChecker::new(config.sanity.clone()),
            left: LineTracker::new(LaneSide::Left, config.tracker.clone())?,
            right: LineTracker::new(LaneSide::Right, config.tracker.clone())?,
            converter: None,
            frame_id: 0,
            metrics: PipelineMetrics::new(),
            config,
        })
    }

    /// Run the full per-frame chain and commit both tracker updates.
    pub fn process_frame(&mut self, mask: &BinaryMask) -> Result<FrameResult> {
        let converter = self.converter_for(mask)?;
        let detection = self.detect(mask);

        self.left.update(
            detection.checked_left.as_ref(),
            detection.left_pixel_count(),
        );
        self.right.update(
            detection.checked_right.as_ref(),
            detection.right_pixel_count(),
        );

        let metrics = converter.compute(&self.left, &self.right);
        let left = self.left.snapshot();
        let right = self.right.snapshot();
        let takeover = !(left.detected && right.detected);

        self.metrics
            .record(&detection.verdict, metrics.available, takeover);

        let frame_id = self.frame_id;
        self.frame_id += 1;

        if frame_id % 100 == 0 {
            debug!(
                "Frame {}: {} | L={} ({:.2}) R={} ({:.2}) | offset={:.2} m",
                frame_id,
                detection.verdict.as_str(),
                left.state.as_str(),
                left.confidence,
                right.state.as_str(),
                right.confidence,
                metrics.offset_m
            );
        }

        Ok(FrameResult {
            frame_id,
            width: mask.width(),
            height: mask.height(),
            detection,
            left,
            right,
            metrics,
            takeover,
        })
    }

    /// Stateless part of a frame: bases, windows, raw fits, sanity gate.
    pub fn detect(&self, mask: &BinaryMask) -> FrameDetection {
        let bases = locate_lane_bases(mask);
        let pixels = self.search.collect(mask, bases);

        let raw_left = fit_pixels(&pixels.left);
        let raw_right = fit_pixels(&pixels.right);
        let checked = self.sanity.check(raw_left, raw_right, mask.height());

        FrameDetection {
            bases,
            pixels,
            raw_left,
            raw_right,
            checked_left: checked.left,
            checked_right: checked.right,
            verdict: checked.verdict,
        }
    }

    fn converter_for(&mut self, mask: &BinaryMask) -> Result<MetricsConverter> {
        if let Some(converter) = self.converter {
            if self.dimensions() != Some(mask.dimensions()) {
                bail!(
                    "frame {} is {}x{}, run started at {:?}",
                    self.frame_id,
                    mask.width(),
                    mask.height(),
                    self.dimensions()
                );
            }
            return Ok(converter);
        }

        let converter =
            MetricsConverter::new(mask.width(), mask.height(), &self.config.calibration)?;
        info!(
            "Engine locked to {}x{} masks ({:.5} m/px x, {:.5} m/px y)",
            mask.width(),
            mask.height(),
            converter.xm_per_pix(),
            converter.ym_per_pix()
        );
        self.converter = Some(converter);
        Ok(converter)
    }

    /// Frame size of the run, once the first frame has been seen.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.converter.map(|c| c.dimensions())
    }

    pub fn left(&self) -> &LineTracker {
        &self.left
    }

    pub fn right(&self) -> &LineTracker {
        &self.right
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frames_processed(&self) -> u64 {
        self.frame_id
    }

    /// Start a new run: fresh trackers, stats and frame size.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.converter = None;
        self.frame_id = 0;
        self.metrics = PipelineMetrics::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{LaneMetrics, SanityVerdict, TrackState};

    fn band_mask(left_x: u32, right_x: u32) -> BinaryMask {
        let mut mask = BinaryMask::empty(1280, 720).unwrap();
        mask.fill_rect(left_x, 0, left_x + 8, 720);
        mask.fill_rect(right_x, 0, right_x + 8, 720);
        mask
    }

    fn engine() -> LaneEngine {
        LaneEngine::new(Config::default()).unwrap()
    }

    #[test]
    fn test_plausible_bands_are_tracked() {
        let mut engine = engine();
        let result = engine.process_frame(&band_mask(300, 980)).unwrap();

        assert_eq!(result.detection.verdict, SanityVerdict::Accepted);
        let raw = result.detection.raw_left.unwrap();
        assert!(raw.a.abs() < 1e-9 && raw.b.abs() < 1e-6);
        assert!((raw.c - 303.5).abs() < 1e-6);

        assert!(result.both_detected());
        assert!(!result.takeover);
        assert_eq!(result.left.state, TrackState::Detected);
        assert_eq!(result.left.confidence, 1.0);
        assert!(result.metrics.available);
        // lane center at 643.5 px, image center at 640 px
        let expected = (640.0 - 643.5) * 3.7 / 680.0;
        assert!((result.metrics.offset_m - expected).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_bands_are_rejected() {
        let mut engine = engine();
        let result = engine.process_frame(&band_mask(400, 880)).unwrap();

        let raw_l = result.detection.raw_left.unwrap();
        let raw_r = result.detection.raw_right.unwrap();
        assert!(raw_l.a.abs() < 1e-9 && raw_r.a.abs() < 1e-9);
        assert!(matches!(
            result.detection.verdict,
            SanityVerdict::ImplausibleWidth { .. }
        ));
        assert!(result.detection.checked_left.is_none());
        assert!(result.detection.checked_right.is_none());
        assert!(!result.left.detected && !result.right.detected);
        assert!(result.takeover);
        assert_eq!(result.metrics, LaneMetrics::UNAVAILABLE);
    }

    #[test]
    fn test_empty_mask_is_a_miss_not_an_error() {
        let mut engine = engine();
        engine.process_frame(&band_mask(300, 980)).unwrap();
        let empty = BinaryMask::empty(1280, 720).unwrap();
        let result = engine.process_frame(&empty).unwrap();

        assert_eq!(result.detection.verdict, SanityVerdict::MissingFit);
        assert_eq!(result.detection.bases.left, 320);
        assert_eq!(result.detection.bases.right, 960);
        assert!(result.left.detected);
        assert_eq!(result.left.frames_since_detected, 1);
        assert!((result.left.confidence - 0.9).abs() < 1e-12);
        assert!(result.metrics.available);
    }

    #[test]
    fn test_dropout_then_takeover_then_recovery() {
        let mut engine = engine();
        let good = band_mask(300, 980);
        let empty = BinaryMask::empty(1280, 720).unwrap();

        engine.process_frame(&good).unwrap();
        for _ in 0..14 {
            let r = engine.process_frame(&empty).unwrap();
            assert!(!r.takeover);
        }
        let lost = engine.process_frame(&empty).unwrap();
        assert!(lost.takeover);
        assert_eq!(lost.metrics, LaneMetrics::UNAVAILABLE);

        let back = engine.process_frame(&good).unwrap();
        assert!(!back.takeover);
        assert!(back.metrics.available);

        let summary = engine.metrics().summary();
        assert_eq!(summary.total_frames, 17);
        assert_eq!(summary.accepted_frames, 2);
        assert_eq!(summary.takeover_events, 1);
    }

    #[test]
    fn test_smoothing_follows_shifted_lane() {
        let mut engine = engine();
        engine.process_frame(&band_mask(300, 980)).unwrap();
        let first = engine.left().current_fit().unwrap().c;
        let result = engine.process_frame(&band_mask(320, 1000)).unwrap();
        let c = result.left.current_fit.unwrap().c;
        assert!((c - (first + 2.0)).abs() < 1e-6, "c={}", c);
    }

    #[test]
    fn test_dimension_change_is_refused() {
        let mut engine = engine();
        engine.process_frame(&band_mask(300, 980)).unwrap();
        let other = BinaryMask::empty(640, 360).unwrap();
        assert!(engine.process_frame(&other).is_err());
        assert_eq!(engine.frames_processed(), 1);

        engine.reset();
        assert!(engine.process_frame(&other).is_ok());
        assert_eq!(engine.dimensions(), Some((640, 360)));
    }

    #[test]
    fn test_frame_ids_are_sequential() {
        let mut engine = engine();
        let mask = band_mask(300, 980);
        for expected in 0..3 {
            assert_eq!(engine.process_frame(&mask).unwrap().frame_id, expected);
        }
    }
}
