// src/mask.rs
//
// Binary lane-candidate mask in the warped (bird's-eye) view.
//
// Every cell is 0 or 1. Thresholding and the perspective warp happen
// upstream; the engine only reads the grid.

use anyhow::{ensure, Result};
use image::GrayImage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Build from a row-major byte buffer. Any non-zero byte becomes 1.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "mask dimensions must be positive, got {}x{}",
            width,
            height
        );
        ensure!(
            data.len() == width as usize * height as usize,
            "mask buffer has {} bytes, expected {} for {}x{}",
            data.len(),
            width as usize * height as usize,
            width,
            height
        );
        let data = data.into_iter().map(|v| u8::from(v != 0)).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// All-zero mask.
    pub fn empty(width: u32, height: u32) -> Result<Self> {
        Self::from_raw(width, height, vec![0; width as usize * height as usize])
    }

    /// Binarize a luma image: pixels strictly above `threshold` are set.
    pub fn from_luma(image: &GrayImage, threshold: u8) -> Result<Self> {
        let (width, height) = image.dimensions();
        let data = image.as_raw().iter().map(|&v| u8::from(v > threshold)).collect();
        Self::from_raw(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.data[self.index(x, y)] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.data[idx] = u8::from(on);
        }
    }

    /// Set every pixel in the half-open rectangle `[x0, x1) × [y0, y1)`.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.set(x, y, true);
            }
        }
    }

    /// Row slice of 0/1 values.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Expand to a 0/255 luma image.
    pub fn to_luma(&self) -> GrayImage {
        let raw = self.data.iter().map(|&v| v * 255).collect();
        GrayImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_from_raw_binarizes() {
        let mask = BinaryMask::from_raw(3, 2, vec![0, 7, 255, 1, 0, 0]).unwrap();
        assert_eq!(mask.row(0), &[0, 1, 1]);
        assert_eq!(mask.row(1), &[1, 0, 0]);
        assert_eq!(mask.count_nonzero(), 3);
    }

    #[test]
    fn test_from_raw_rejects_bad_length() {
        assert!(BinaryMask::from_raw(4, 4, vec![0; 15]).is_err());
        assert!(BinaryMask::from_raw(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn test_from_luma_threshold() {
        let mut img = GrayImage::new(4, 1);
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(1, 0, Luma([128]));
        img.put_pixel(2, 0, Luma([255]));
        let mask = BinaryMask::from_luma(&img, 100).unwrap();
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(mask.get(2, 0));
        assert!(!mask.get(3, 0));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut mask = BinaryMask::empty(10, 10).unwrap();
        mask.fill_rect(8, 8, 20, 20);
        assert_eq!(mask.count_nonzero(), 4);
        assert!(!mask.get(10, 10));
    }

    #[test]
    fn test_to_luma_roundtrip_values() {
        let mut mask = BinaryMask::empty(2, 2).unwrap();
        mask.set(1, 1, true);
        let img = mask.to_luma();
        assert_eq!(img.get_pixel(1, 1)[0], 255);
        assert_eq!(img.get_pixel(0, 0)[0], 0);
    }
}
