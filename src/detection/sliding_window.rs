// src/detection/sliding_window.rs
//
// Sliding-window lane pixel collection.
//
// Starting from the two histogram bases, the mask is scanned bottom-to-top in
// `window_count` equal horizontal bands. Each side keeps a current x center;
// the window for a band spans `center ± margin`. Pixels inside the window are
// attributed to that side, and when a window gathers at least `min_pixels`
// the center moves to their mean x for the next band up. Following the pixel
// mass band by band lets the search bend with curved lines and step over
// short gaps (dashed markings, occlusions) without a global window.
//
// Windows of the two sides are independent and may overlap.

use super::types::{LaneBases, LaneSide, PixelSet, SearchWindow};
use crate::mask::BinaryMask;
use crate::types::SearchConfig;
use tracing::debug;

/// Pixels collected for both sides plus the windows that produced them.
#[derive(Debug, Clone, Default)]
pub struct LanePixels {
    pub left: PixelSet,
    pub right: PixelSet,
    pub windows: Vec<SearchWindow>,
}

impl LanePixels {
    pub fn side(&self, side: LaneSide) -> &PixelSet {
        match side {
            LaneSide::Left => &self.left,
            LaneSide::Right => &self.right,
        }
    }
}

/// Per-side walking state.
struct Cursor {
    side: LaneSide,
    center: i64,
    pixels: PixelSet,
}

pub struct SlidingWindowSearch {
    config: SearchConfig,
}

impl SlidingWindowSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Walk both sides up the mask and gather their pixel sets.
    pub fn collect(&self, mask: &BinaryMask, bases: LaneBases) -> LanePixels {
        let rows = nonzero_columns_by_row(mask);
        let height = mask.height() as i64;
        let window_count = self.config.window_count.max(1);
        let window_height = height / window_count as i64;

        let mut cursors = [
            Cursor {
                side: LaneSide::Left,
                center: bases.left,
                pixels: PixelSet::new(),
            },
            Cursor {
                side: LaneSide::Right,
                center: bases.right,
                pixels: PixelSet::new(),
            },
        ];
        let mut windows = Vec::with_capacity(window_count as usize * 2);

        for index in 0..window_count {
            let y_low = height - (index as i64 + 1) * window_height;
            let y_high = height - index as i64 * window_height;

            for cursor in cursors.iter_mut() {
                let x_low = cursor.center - self.config.margin;
                let x_high = cursor.center + self.config.margin;

                let found = pixels_in_window(&rows, x_low, x_high, y_low, y_high);
                let recentered = found.len() >= self.config.min_pixels && !found.is_empty();

                if recentered {
                    let sum_x: i64 = found.iter().map(|&(x, _)| x as i64).sum();
                    cursor.center = sum_x.div_euclid(found.len() as i64);
                }

                windows.push(SearchWindow {
                    side: cursor.side,
                    index,
                    x_low,
                    x_high,
                    y_low,
                    y_high,
                    pixel_count: found.len(),
                    recentered,
                });
                cursor.pixels.extend(&found);
            }
        }

        let [left, right] = cursors;
        debug!(
            "Sliding window: left={} px (end x={}), right={} px (end x={})",
            left.pixels.len(),
            left.center,
            right.pixels.len(),
            right.center
        );

        LanePixels {
            left: left.pixels,
            right: right.pixels,
            windows,
        }
    }
}

/// Sorted x coordinates of set pixels, one vector per row.
fn nonzero_columns_by_row(mask: &BinaryMask) -> Vec<Vec<u32>> {
    (0..mask.height())
        .map(|y| {
            mask.row(y)
                .iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(|(x, _)| x as u32)
                .collect()
        })
        .collect()
}

/// Set pixels with `x_low <= x < x_high` and `y_low <= y < y_high`.
fn pixels_in_window(
    rows: &[Vec<u32>],
    x_low: i64,
    x_high: i64,
    y_low: i64,
    y_high: i64,
) -> Vec<(u32, u32)> {
    let mut found = Vec::new();
    if x_high <= 0 || x_low >= x_high {
        return found;
    }

    let y_start = y_low.max(0) as usize;
    let y_end = (y_high.max(0) as usize).min(rows.len());

    for (y, xs) in rows.iter().enumerate().take(y_end).skip(y_start) {
        let lo = xs.partition_point(|&x| (x as i64) < x_low);
        let hi = xs.partition_point(|&x| (x as i64) < x_high);
        found.extend(xs[lo..hi].iter().map(|&x| (x, y as u32)));
    }
    found
}
