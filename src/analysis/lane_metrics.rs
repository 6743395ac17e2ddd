// src/analysis/lane_metrics.rs
//
// Real-world lane metrics from the smoothed fits.
//
// Scale factors come from the warp calibration: the destination rectangle of
// the upstream perspective transform leaves `warp_offset_px` on each side, so
// one lane spans `width − 2·offset` warped pixels and `lane_width_m` meters.
// Vertically the warped image is assumed to cover `visible_distance_m`.
//
// Metrics are only meaningful when both lines are DETECTED. Otherwise the
// result is the unavailable sentinel (offset 0.0, radius 0.0,
// `available = false`); a 0.0 here is never a measurement.

use super::line_tracker::LineTracker;
use super::polynomial_fit::fit_quadratic;
use crate::detection::LaneFit;
use crate::types::CalibrationConfig;
use anyhow::{ensure, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaneMetrics {
    /// Vehicle offset from lane center in meters, positive when the vehicle
    /// sits left of the lane center.
    pub offset_m: f64,
    /// Mean radius of curvature of both lines in meters. `+∞` on a straight road.
    pub curvature_radius_m: f64,
    pub available: bool,
}

impl LaneMetrics {
    pub const UNAVAILABLE: Self = Self {
        offset_m: 0.0,
        curvature_radius_m: 0.0,
        available: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsConverter {
    width: u32,
    height: u32,
    xm_per_pix: f64,
    ym_per_pix: f64,
}

impl MetricsConverter {
    pub fn new(width: u32, height: u32, calibration: &CalibrationConfig) -> Result<Self> {
        calibration.validate()?;
        ensure!(
            width > 0 && height > 0,
            "image dimensions must be positive"
        );
        ensure!(
            2 * calibration.warp_offset_px < width,
            "warp offset {} leaves no lane in a {} px wide image",
            calibration.warp_offset_px,
            width
        );

        let warped_lane_width_px = (width - 2 * calibration.warp_offset_px) as f64;
        Ok(Self {
            width,
            height,
            xm_per_pix: calibration.lane_width_m / warped_lane_width_px,
            ym_per_pix: calibration.visible_distance_m / height as f64,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn xm_per_pix(&self) -> f64 {
        self.xm_per_pix
    }

    pub fn ym_per_pix(&self) -> f64 {
        self.ym_per_pix
    }

    /// Metrics for the current tracker pair, or the sentinel when either
    /// line is not detected.
    pub fn compute(&self, left: &LineTracker, right: &LineTracker) -> LaneMetrics {
        if !left.is_detected() || !right.is_detected() {
            return LaneMetrics::UNAVAILABLE;
        }
        match (left.current_fit(), right.current_fit()) {
            (Some(l), Some(r)) => self.from_fits(l, r),
            _ => LaneMetrics::UNAVAILABLE,
        }
    }

    /// Metrics for an explicit fit pair.
    pub fn from_fits(&self, left: &LaneFit, right: &LaneFit) -> LaneMetrics {
        let offset_m = self.offset_m(left, right);
        let curvature_radius_m = match (self.radius_m(left), self.radius_m(right)) {
            (Some(l), Some(r)) => (l + r) / 2.0,
            _ => return LaneMetrics::UNAVAILABLE,
        };

        debug!(
            "Metrics: offset={:.3} m, radius={:.1} m",
            offset_m, curvature_radius_m
        );

        LaneMetrics {
            offset_m,
            curvature_radius_m,
            available: true,
        }
    }

    /// Lateral offset at the bottom row.
    pub fn offset_m(&self, left: &LaneFit, right: &LaneFit) -> f64 {
        let y_eval = (self.height - 1) as f64;
        let lane_center_px = (left.x_at(y_eval) + right.x_at(y_eval)) / 2.0;
        let car_center_px = self.width as f64 / 2.0;
        (car_center_px - lane_center_px) * self.xm_per_pix
    }

    /// Radius of curvature in meters at the bottom of the image.
    ///
    /// The pixel fit is sampled at every row, rescaled to meters and re-fit,
    /// then `R = (1 + (2Ay + B)²)^1.5 / |2A|`.
    pub fn radius_m(&self, fit: &LaneFit) -> Option<f64> {
        let (xm, ym) = (self.xm_per_pix, self.ym_per_pix);
        let world = fit_quadratic(
            (0..self.height).map(|y| (y as f64 * ym, fit.x_at(y as f64) * xm)),
        )?;

        let y_eval = (self.height - 1) as f64 * ym;
        let slope = 2.0 * world.a * y_eval + world.b;
        let numerator = (1.0 + slope * slope).powf(1.5);
        let denominator = (2.0 * world.a).abs();

        Some(if denominator == 0.0 {
            f64::INFINITY
        } else {
            numerator / denominator
        })
    }
}
