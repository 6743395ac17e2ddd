// src/detection/mod.rs
//
// Per-frame pixel-level stages: histogram bases and sliding-window search.

mod base_locator;
mod sliding_window;
mod types;

pub use base_locator::{bottom_half_histogram, locate_lane_bases};
pub use sliding_window::{LanePixels, SlidingWindowSearch};
pub use types::*;
