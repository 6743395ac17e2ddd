// src/lib.rs
//
// Lane geometry estimation and temporal tracking on bird's-eye binary masks.

pub mod analysis;
pub mod config;
pub mod debug;
pub mod detection;
pub mod export;
pub mod mask;
pub mod mask_source;
pub mod pipeline;
pub mod types;

pub use mask::BinaryMask;
pub use pipeline::{FrameResult, LaneEngine};
pub use types::Config;
