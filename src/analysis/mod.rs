// src/analysis/mod.rs
//
// Geometry and temporal stages.
//
// Signal flow per frame:
//   PixelSet (×2) → polynomial_fit → sanity_check ─→ line_tracker (×2) → lane_metrics
//
// Orchestrated by pipeline::LaneEngine.

pub mod lane_metrics;
pub mod line_tracker;
pub mod polynomial_fit;
pub mod sanity_check;

pub use lane_metrics::{LaneMetrics, MetricsConverter};
pub use line_tracker::{LineSnapshot, LineTracker, TrackState};
pub use polynomial_fit::{fit_pixels, fit_quadratic};
pub use sanity_check::{CheckedPair, SanityChecker, SanityVerdict};
