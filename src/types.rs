use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub sanity: SanityConfig,
    pub tracker: TrackerConfig,
    pub calibration: CalibrationConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Sliding-window search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of horizontal bands the mask height is split into.
    pub window_count: u32,
    /// Half-width of every search window in pixels.
    pub margin: i64,
    /// Pixels a window must collect before the next window re-centers.
    pub min_pixels: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            window_count: 9,
            margin: 100,
            min_pixels: 50,
        }
    }
}

/// Pairwise plausibility thresholds applied to raw fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    /// Maximum |a_left - a_right| for the pair to count as parallel.
    pub max_curvature_diff: f64,
    /// Exclusive lower bound on lane width at the bottom row (px).
    pub min_lane_width_px: f64,
    /// Exclusive upper bound on lane width at the bottom row (px).
    pub max_lane_width_px: f64,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            max_curvature_diff: 0.001,
            min_lane_width_px: 500.0,
            max_lane_width_px: 850.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Weight of the newest accepted fit in the exponential moving average.
    pub smoothing_alpha: f64,
    /// Consecutive missed frames before a line is declared lost.
    pub max_frames_lost: u32,
    /// Pixel support mapped to zero confidence.
    pub min_confidence_pixels: usize,
    /// Pixel support mapped to full confidence.
    pub full_confidence_pixels: usize,
    /// Confidence subtracted on every missed frame.
    pub confidence_decay: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.1,
            max_frames_lost: 15,
            min_confidence_pixels: 50,
            full_confidence_pixels: 2000,
            confidence_decay: 0.1,
        }
    }
}

/// Pixel to meter conversion for the warped view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Real-world lane width in meters.
    pub lane_width_m: f64,
    /// Horizontal margin used by the upstream warp destination rectangle.
    pub warp_offset_px: u32,
    /// Road distance covered by the full warped image height, in meters.
    pub visible_distance_m: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            lane_width_m: 3.7,
            warp_offset_px: 300,
            visible_distance_m: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub mask_dir: String,
    /// Luma values above this are lane-marking candidates.
    pub binary_threshold: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mask_dir: "masks".to_string(),
            binary_threshold: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: String,
    pub run_name: String,
    pub save_debug: bool,
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: "outputs".to_string(),
            run_name: "run".to_string(),
            save_debug: true,
            log_level: "info".to_string(),
        }
    }
}
