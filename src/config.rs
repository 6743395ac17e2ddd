use crate::types::{CalibrationConfig, Config, SanityConfig, SearchConfig, TrackerConfig};
use anyhow::{ensure, Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.sanity.validate()?;
        self.tracker.validate()?;
        self.calibration.validate()?;
        Ok(())
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.window_count > 0, "search.window_count must be positive");
        ensure!(self.margin > 0, "search.margin must be positive");
        Ok(())
    }
}

impl SanityConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_curvature_diff >= 0.0,
            "sanity.max_curvature_diff must not be negative"
        );
        ensure!(
            self.min_lane_width_px < self.max_lane_width_px,
            "sanity lane width range is empty: ({}, {})",
            self.min_lane_width_px,
            self.max_lane_width_px
        );
        Ok(())
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0,
            "tracker.smoothing_alpha must be in (0, 1], got {}",
            self.smoothing_alpha
        );
        ensure!(
            self.max_frames_lost >= 1,
            "tracker.max_frames_lost must be at least 1"
        );
        ensure!(
            self.full_confidence_pixels > self.min_confidence_pixels,
            "tracker.full_confidence_pixels must exceed min_confidence_pixels"
        );
        ensure!(
            self.confidence_decay >= 0.0,
            "tracker.confidence_decay must not be negative"
        );
        Ok(())
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.lane_width_m > 0.0,
            "calibration.lane_width_m must be positive"
        );
        ensure!(
            self.visible_distance_m > 0.0,
            "calibration.visible_distance_m must be positive"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "tracker:\n  smoothing_alpha: 0.25\nsearch:\n  margin: 80\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tracker.smoothing_alpha, 0.25);
        assert_eq!(config.tracker.max_frames_lost, 15);
        assert_eq!(config.search.margin, 80);
        assert_eq!(config.search.window_count, 9);
        assert_eq!(config.sanity.max_lane_width_px, 850.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_alpha() {
        let mut config = Config::default();
        config.tracker.smoothing_alpha = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_width_range() {
        let mut config = Config::default();
        config.sanity.min_lane_width_px = 900.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Config::load("/nonexistent/lane-tracking.yaml").is_err());
    }
}
