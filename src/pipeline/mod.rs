// src/pipeline/mod.rs

pub mod engine;
pub mod frame_context;
pub mod metrics;

pub use engine::LaneEngine;
pub use frame_context::{FrameDetection, FrameResult};
pub use metrics::{MetricsSummary, PipelineMetrics};
