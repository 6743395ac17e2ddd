// src/analysis/sanity_check.rs
//
// Pairwise plausibility gate for raw lane fits.
//
// Width and parallelism are properties of the pair, so a failure drops both
// sides for the frame; one side is never accepted alone. Checks run in order
// and stop at the first failure.

use crate::detection::LaneFit;
use crate::types::SanityConfig;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SanityVerdict {
    Accepted,
    /// One or both fits were absent.
    MissingFit,
    /// `|a_left − a_right|` exceeded the threshold.
    NotParallel { curvature_diff: f64 },
    /// Bottom-row gap fell outside the plausible lane width range.
    ImplausibleWidth { width_px: f64 },
}

impl SanityVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::MissingFit => "MISSING_FIT",
            Self::NotParallel { .. } => "NOT_PARALLEL",
            Self::ImplausibleWidth { .. } => "IMPLAUSIBLE_WIDTH",
        }
    }
}

/// Fits that survived the gate, or `None` on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckedPair {
    pub left: Option<LaneFit>,
    pub right: Option<LaneFit>,
    pub verdict: SanityVerdict,
}

pub struct SanityChecker {
    config: SanityConfig,
}

impl SanityChecker {
    pub fn new(config: SanityConfig) -> Self {
        Self { config }
    }

    pub fn check(
        &self,
        left: Option<LaneFit>,
        right: Option<LaneFit>,
        image_height: u32,
    ) -> CheckedPair {
        let verdict = self.verdict(left.as_ref(), right.as_ref(), image_height);

        if verdict.is_accepted() {
            CheckedPair {
                left,
                right,
                verdict,
            }
        } else {
            debug!("Sanity check rejected pair: {:?}", verdict);
            CheckedPair {
                left: None,
                right: None,
                verdict,
            }
        }
    }

    pub fn verdict(
        &self,
        left: Option<&LaneFit>,
        right: Option<&LaneFit>,
        image_height: u32,
    ) -> SanityVerdict {
        let (left, right) = match (left, right) {
            (Some(l), Some(r)) => (l, r),
            _ => return SanityVerdict::MissingFit,
        };

        let curvature_diff = (left.a - right.a).abs();
        if curvature_diff > self.config.max_curvature_diff {
            return SanityVerdict::NotParallel { curvature_diff };
        }

        let y_eval = image_height.saturating_sub(1) as f64;
        let width_px = right.x_at(y_eval) - left.x_at(y_eval);
        let plausible =
            width_px > self.config.min_lane_width_px && width_px < self.config.max_lane_width_px;
        if !plausible {
            return SanityVerdict::ImplausibleWidth { width_px };
        }

        SanityVerdict::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> SanityChecker {
        SanityChecker::new(SanityConfig::default())
    }

    fn vertical(x: f64) -> LaneFit {
        LaneFit::new(0.0, 0.0, x)
    }

    #[test]
    fn test_accepts_plausible_pair_unchanged() {
        let left = LaneFit::new(1e-4, -0.1, 320.0);
        let right = LaneFit::new(1.5e-4, -0.1, 960.0);
        let out = checker().check(Some(left), Some(right), 720);
        assert_eq!(out.verdict, SanityVerdict::Accepted);
        assert_eq!(out.left, Some(left));
        assert_eq!(out.right, Some(right));
    }

    #[test]
    fn test_missing_side_rejects_both() {
        let out = checker().check(Some(vertical(300.0)), None, 720);
        assert_eq!(out.verdict, SanityVerdict::MissingFit);
        assert!(out.left.is_none() && out.right.is_none());

        let out = checker().check(None, Some(vertical(980.0)), 720);
        assert!(out.left.is_none() && out.right.is_none());
    }

    #[test]
    fn test_non_parallel_rejects_both() {
        let left = LaneFit::new(0.002, -1.0, 300.0);
        let right = LaneFit::new(-0.0005, 0.0, 980.0);
        let out = checker().check(Some(left), Some(right), 720);
        assert!(matches!(out.verdict, SanityVerdict::NotParallel { .. }));
        assert!(out.left.is_none() && out.right.is_none());
    }

    #[test]
    fn test_parallel_checked_before_width() {
        // Both checks fail; the first in order is reported.
        let left = LaneFit::new(0.01, 0.0, 0.0);
        let right = LaneFit::new(0.0, 0.0, 10.0);
        let verdict = checker().verdict(Some(&left), Some(&right), 720);
        assert!(matches!(verdict, SanityVerdict::NotParallel { .. }));
    }

    #[test]
    fn test_width_bounds_are_exclusive() {
        let c = checker();
        let narrow = c.check(Some(vertical(400.0)), Some(vertical(880.0)), 720);
        assert!(matches!(
            narrow.verdict,
            SanityVerdict::ImplausibleWidth { width_px } if (width_px - 480.0).abs() < 1e-9
        ));

        let at_min = c.verdict(Some(&vertical(100.0)), Some(&vertical(600.0)), 720);
        assert!(!at_min.is_accepted());
        let at_max = c.verdict(Some(&vertical(100.0)), Some(&vertical(950.0)), 720);
        assert!(!at_max.is_accepted());
        let inside = c.verdict(Some(&vertical(100.0)), Some(&vertical(601.0)), 720);
        assert!(inside.is_accepted());
    }

    #[test]
    fn test_width_measured_at_bottom_row() {
        // Lines converge towards the top but are 680 px apart at y = 719.
        let left = LaneFit::new(0.0, 0.2, 300.0 - 0.2 * 719.0);
        let right = LaneFit::new(0.0, -0.2, 980.0 + 0.2 * 719.0);
        let out = checker().check(Some(left), Some(right), 720);
        assert!(out.verdict.is_accepted());
    }

    #[test]
    fn test_rejection_is_deterministic() {
        let c = checker();
        let left = vertical(400.0);
        let right = vertical(880.0);
        for _ in 0..5 {
            let out = c.check(Some(left), Some(right), 720);
            assert!(out.left.is_none() && out.right.is_none());
        }
        let ok = c.check(Some(vertical(300.0)), Some(vertical(980.0)), 720);
        assert!(ok.verdict.is_accepted());
        let again = c.check(Some(left), Some(right), 720);
        assert!(again.left.is_none() && again.right.is_none());
    }
}
