// src/export.rs
//
// Per-frame results as JSON lines, one object per processed mask.

use crate::pipeline::FrameResult;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub frame_id: u64,
    pub left_detected: bool,
    pub right_detected: bool,
    pub left_confidence: f64,
    pub right_confidence: f64,
    pub lat_offset_m: f64,
    /// `None` on a straight road (infinite radius), which JSON cannot carry.
    pub curvature_radius_m: Option<f64>,
    pub metrics_available: bool,
    pub takeover: bool,
}

impl From<&FrameResult> for FrameRecord {
    fn from(result: &FrameResult) -> Self {
        let radius = result.metrics.curvature_radius_m;
        Self {
            frame_id: result.frame_id,
            left_detected: result.left.detected,
            right_detected: result.right.detected,
            left_confidence: result.left.confidence,
            right_confidence: result.right.confidence,
            lat_offset_m: result.metrics.offset_m,
            curvature_radius_m: radius.is_finite().then_some(radius),
            metrics_available: result.metrics.available,
            takeover: result.takeover,
        }
    }
}

pub struct FrameRecordWriter<W: Write> {
    out: W,
    written: u64,
}

impl FrameRecordWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> FrameRecordWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, result: &FrameResult) -> Result<()> {
        let json_line = serde_json::to_string(&FrameRecord::from(result))?;
        writeln!(self.out, "{}", json_line)?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::BinaryMask;
    use crate::pipeline::LaneEngine;
    use crate::types::Config;

    fn band_mask(left_x: u32, right_x: u32) -> BinaryMask {
        let mut mask = BinaryMask::empty(1280, 720).unwrap();
        mask.fill_rect(left_x, 0, left_x + 10, 720);
        mask.fill_rect(right_x, 0, right_x + 10, 720);
        mask
    }

    #[test]
    fn test_record_mirrors_frame_result() {
        let mut engine = LaneEngine::new(Config::default()).unwrap();
        let mut result = engine.process_frame(&band_mask(300, 980)).unwrap();
        let record = FrameRecord::from(&result);

        assert_eq!(record.frame_id, 0);
        assert!(record.left_detected && record.right_detected);
        assert_eq!(record.left_confidence, 1.0);
        assert!(record.metrics_available);
        assert_eq!(record.lat_offset_m, result.metrics.offset_m);
        assert!(!record.takeover);

        result.metrics.curvature_radius_m = f64::INFINITY;
        assert_eq!(FrameRecord::from(&result).curvature_radius_m, None);
        let json = serde_json::to_value(FrameRecord::from(&result)).unwrap();
        assert!(json["curvature_radius_m"].is_null());
    }

    #[test]
    fn test_writes_one_line_per_frame() {
        let mut engine = LaneEngine::new(Config::default()).unwrap();
        let mut writer = FrameRecordWriter::new(Vec::new());

        writer
            .write(&engine.process_frame(&band_mask(300, 980)).unwrap())
            .unwrap();
        writer
            .write(&engine.process_frame(&band_mask(400, 880)).unwrap())
            .unwrap();
        assert_eq!(writer.written(), 2);

        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["frame_id"], 1);
        // rejected frame: previous fit still held, line not yet lost
        assert_eq!(second["left_detected"], true);
        assert_eq!(second["takeover"], false);
        assert_eq!(second["metrics_available"], true);
    }
}
