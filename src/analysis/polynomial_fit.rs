// src/analysis/polynomial_fit.rs
//
// Least-squares fit of x = a·y² + b·y + c.
//
// y is centred and scaled to [-1, 1] before the normal equations are built,
// and the solution is mapped back to the caller's units. An impossible fit
// (empty set, fewer than three distinct rows, singular system, non-finite
// result) is `None`, never a panic.

use crate::detection::{LaneFit, PixelSet};
use tracing::debug;

/// Minimum distinct y values for a quadratic in y to be determined.
const MIN_DISTINCT_ROWS: usize = 3;

/// Pivot magnitude below which the normal system is treated as singular.
const SINGULAR_EPS: f64 = 1e-12;

/// Fit a lane polynomial to the pixels of one side.
pub fn fit_pixels(pixels: &PixelSet) -> Option<LaneFit> {
    let fit = fit_quadratic(pixels.samples());
    if fit.is_none() && !pixels.is_empty() {
        debug!("Poly fit failed on {} pixels", pixels.len());
    }
    fit
}

/// Fit x(y) to `(y, x)` samples.
pub fn fit_quadratic<I>(samples: I) -> Option<LaneFit>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let samples: Vec<(f64, f64)> = samples
        .into_iter()
        .filter(|(y, x)| y.is_finite() && x.is_finite())
        .collect();

    if samples.len() < MIN_DISTINCT_ROWS || distinct_rows(&samples) < MIN_DISTINCT_ROWS {
        return None;
    }

    let n = samples.len() as f64;
    let y_min = samples.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
    let y_max = samples.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
    let mean = samples.iter().map(|s| s.0).sum::<f64>() / n;
    let scale = ((y_max - y_min) / 2.0).max(f64::MIN_POSITIVE);

    let mut s1 = 0.0;
    let mut s2 = 0.0;
    let mut s3 = 0.0;
    let mut s4 = 0.0;
    let mut sx0 = 0.0;
    let mut sx1 = 0.0;
    let mut sx2 = 0.0;

    for &(y, x) in &samples {
        let t = (y - mean) / scale;
        let t2 = t * t;
        s1 += t;
        s2 += t2;
        s3 += t2 * t;
        s4 += t2 * t2;
        sx0 += x;
        sx1 += x * t;
        sx2 += x * t2;
    }

    //   | s4 s3 s2 | | A |   | sx2 |
    //   | s3 s2 s1 | | B | = | sx1 |
    //   | s2 s1 n  | | C |   | sx0 |
    let (ta, tb, tc) = solve_3x3([s4, s3, s2, s3, s2, s1, s2, s1, n], [sx2, sx1, sx0])?;

    // x = A·t² + B·t + C with t = (y − m)/s
    let s_sq = scale * scale;
    let fit = LaneFit {
        a: ta / s_sq,
        b: tb / scale - 2.0 * ta * mean / s_sq,
        c: ta * mean * mean / s_sq - tb * mean / scale + tc,
    };

    fit.is_finite().then_some(fit)
}

fn distinct_rows(samples: &[(f64, f64)]) -> usize {
    let mut ys: Vec<f64> = samples.iter().map(|s| s.0).collect();
    ys.sort_by(|a, b| a.total_cmp(b));
    ys.dedup();
    ys.len()
}

/// Solve a 3×3 linear system with Gaussian elimination and partial pivoting.
/// Row-major input. `None` if singular.
fn solve_3x3(mat: [f64; 9], rhs: [f64; 3]) -> Option<(f64, f64, f64)> {
    let mut m = [
        [mat[0], mat[1], mat[2], rhs[0]],
        [mat[3], mat[4], mat[5], rhs[1]],
        [mat[6], mat[7], mat[8], rhs[2]],
    ];

    for col in 0..3 {
        let mut max_val = m[col][col].abs();
        let mut max_row = col;
        for (row, r) in m.iter().enumerate().skip(col + 1) {
            if r[col].abs() > max_val {
                max_val = r[col].abs();
                max_row = row;
            }
        }

        if max_val < SINGULAR_EPS {
            return None;
        }
        if max_row != col {
            m.swap(col, max_row);
        }

        for row in (col + 1)..3 {
            let factor = m[row][col] / m[col][col];
            for j in col..4 {
                m[row][j] -= factor * m[col][j];
            }
        }
    }

    let c = m[2][3] / m[2][2];
    let b = (m[1][3] - m[1][2] * c) / m[1][1];
    let a = (m[0][3] - m[0][2] * c - m[0][1] * b) / m[0][0];

    if a.is_finite() && b.is_finite() && c.is_finite() {
        Some((a, b, c))
    } else {
        None
    }
}
