// src/detection/base_locator.rs
//
// Finds where each lane line enters the bottom of the warped mask.
//
// The bottom half is closest to the vehicle and carries the most reliable
// marking pixels, so only those rows vote. Each half of the column histogram
// contributes one peak.

use super::types::LaneBases;
use crate::mask::BinaryMask;
use tracing::debug;

/// Column sums over rows `height/2 .. height`.
pub fn bottom_half_histogram(mask: &BinaryMask) -> Vec<u32> {
    let mut histogram = vec![0u32; mask.width() as usize];
    for y in mask.height() / 2..mask.height() {
        for (bin, &v) in histogram.iter_mut().zip(mask.row(y)) {
            *bin += v as u32;
        }
    }
    histogram
}

/// Locate the left and right lane bases.
///
/// Left base is the peak column in `[0, width/2)`, right base the peak in
/// `[width/2, width)`. Ties go to the lowest column. A half with no pixels
/// at all falls back to its own midpoint (width/4, 3·width/4) rather than
/// the first column of the half.
pub fn locate_lane_bases(mask: &BinaryMask) -> LaneBases {
    let histogram = bottom_half_histogram(mask);
    let midpoint = histogram.len() / 2;

    let left = peak_or_center(&histogram[..midpoint], 0);
    let right = peak_or_center(&histogram[midpoint..], midpoint);

    debug!(
        "Lane bases: left={} right={} (midpoint={})",
        left, right, midpoint
    );

    LaneBases {
        left: left as i64,
        right: right as i64,
    }
}

fn peak_or_center(half: &[u32], offset: usize) -> usize {
    match argmax(half) {
        Some((idx, peak)) if peak > 0 => offset + idx,
        _ => {
            debug!(
                "Empty histogram half at offset {}, using its center",
                offset
            );
            offset + half.len() / 2
        }
    }
}

/// First index of the maximum value.
fn argmax(values: &[u32]) -> Option<(usize, u32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (idx, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((idx, v)),
        })
}
