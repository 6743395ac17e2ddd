// src/pipeline/metrics.rs
//
// Run statistics. Counts per-frame outcomes for the end-of-run summary.

use crate::analysis::SanityVerdict;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: u64,
    pub accepted_frames: u64,
    pub missing_fit_frames: u64,
    pub not_parallel_frames: u64,
    pub implausible_width_frames: u64,
    pub metrics_frames: u64,
    pub takeover_frames: u64,
    pub takeover_events: u64,
    in_takeover: bool,
    pub started_at: Instant,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: 0,
            accepted_frames: 0,
            missing_fit_frames: 0,
            not_parallel_frames: 0,
            implausible_width_frames: 0,
            metrics_frames: 0,
            takeover_frames: 0,
            takeover_events: 0,
            in_takeover: false,
            started_at: Instant::now(),
        }
    }

    pub fn record(&mut self, verdict: &SanityVerdict, metrics_available: bool, takeover: bool) {
        self.total_frames += 1;
        match verdict {
            SanityVerdict::Accepted => self.accepted_frames += 1,
            SanityVerdict::MissingFit => self.missing_fit_frames += 1,
            SanityVerdict::NotParallel { .. } => self.not_parallel_frames += 1,
            SanityVerdict::ImplausibleWidth { .. } => self.implausible_width_frames += 1,
        }
        if metrics_available {
            self.metrics_frames += 1;
        }
        if takeover {
            self.takeover_frames += 1;
            if !self.in_takeover {
                self.takeover_events += 1;
            }
        }
        self.in_takeover = takeover;
    }

    pub fn fps(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            self.total_frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            fps: self.fps(),
            accepted_frames: self.accepted_frames,
            rejected_frames: self.total_frames - self.accepted_frames,
            missing_fit_frames: self.missing_fit_frames,
            not_parallel_frames: self.not_parallel_frames,
            implausible_width_frames: self.implausible_width_frames,
            metrics_frames: self.metrics_frames,
            takeover_frames: self.takeover_frames,
            takeover_events: self.takeover_events,
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub accepted_frames: u64,
    pub rejected_frames: u64,
    pub missing_fit_frames: u64,
    pub not_parallel_frames: u64,
    pub implausible_width_frames: u64,
    pub metrics_frames: u64,
    pub takeover_frames: u64,
    pub takeover_events: u64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_verdicts_and_takeover_episodes() {
        let mut m = PipelineMetrics::new();
        m.record(&SanityVerdict::Accepted, true, false);
        m.record(&SanityVerdict::MissingFit, false, true);
        m.record(&SanityVerdict::NotParallel { curvature_diff: 0.01 }, false, true);
        m.record(&SanityVerdict::Accepted, true, false);
        m.record(&SanityVerdict::ImplausibleWidth { width_px: 480.0 }, false, true);

        let s = m.summary();
        assert_eq!(s.total_frames, 5);
        assert_eq!(s.accepted_frames, 2);
        assert_eq!(s.rejected_frames, 3);
        assert_eq!(s.missing_fit_frames, 1);
        assert_eq!(s.not_parallel_frames, 1);
        assert_eq!(s.implausible_width_frames, 1);
        assert_eq!(s.metrics_frames, 2);
        assert_eq!(s.takeover_frames, 3);
        assert_eq!(s.takeover_events, 2);
    }
}
