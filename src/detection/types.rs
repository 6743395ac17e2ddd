// src/detection/types.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneSide {
    Left,
    Right,
}

impl LaneSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

/// Starting column of each lane line at the bottom of the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaneBases {
    pub left: i64,
    pub right: i64,
}

/// Mask pixels attributed to one lane line in one frame, as (x, y).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelSet {
    pub points: Vec<(u32, u32)>,
}

impl PixelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, x: u32, y: u32) {
        self.points.push((x, y));
    }

    pub fn extend(&mut self, other: &[(u32, u32)]) {
        self.points.extend_from_slice(other);
    }

    /// Points as (y, x) samples for fitting x as a function of y.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|&(x, y)| (y as f64, x as f64))
    }
}

/// Second-degree lane polynomial in warped pixel space: x(y) = a·y² + b·y + c.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LaneFit {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    #[inline]
    pub fn x_at(&self, y: f64) -> f64 {
        self.a * y * y + self.b * y + self.c
    }

    /// Coefficient-wise `alpha·other + (1 − alpha)·self`.
    pub fn blend(&self, other: &LaneFit, alpha: f64) -> LaneFit {
        let keep = 1.0 - alpha;
        LaneFit {
            a: alpha * other.a + keep * self.a,
            b: alpha * other.b + keep * self.b,
            c: alpha * other.c + keep * self.c,
        }
    }

    /// Largest absolute coefficient difference.
    pub fn max_abs_diff(&self, other: &LaneFit) -> f64 {
        (self.a - other.a)
            .abs()
            .max((self.b - other.b).abs())
            .max((self.c - other.c).abs())
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
    }
}

/// One sliding-window rectangle, kept for the debug view.
/// Bounds are half-open: `[x_low, x_high) × [y_low, y_high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchWindow {
    pub side: LaneSide,
    pub index: u32,
    pub x_low: i64,
    pub x_high: i64,
    pub y_low: i64,
    pub y_high: i64,
    pub pixel_count: usize,
    pub recentered: bool,
}
