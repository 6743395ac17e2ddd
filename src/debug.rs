// src/debug.rs
//
// Diagnostic rendering of the sliding-window search on the warped mask.

use crate::detection::{LaneFit, LaneSide, SearchWindow};
use crate::mask::BinaryMask;
use crate::pipeline::FrameDetection;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

const WINDOW_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LEFT_PIXEL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const RIGHT_PIXEL_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const LEFT_FIT_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const RIGHT_FIT_COLOR: Rgb<u8> = Rgb([0, 255, 255]);

/// Mask in white, search windows in green, left/right pixels red/blue, and
/// the fits that passed the sanity check in yellow/cyan.
pub fn visualize_search(mask: &BinaryMask, detection: &FrameDetection) -> RgbImage {
    let mut canvas = RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get(x, y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });

    for window in &detection.pixels.windows {
        draw_window(&mut canvas, window);
    }

    for &(x, y) in &detection.pixels.left.points {
        canvas.put_pixel(x, y, LEFT_PIXEL_COLOR);
    }
    for &(x, y) in &detection.pixels.right.points {
        canvas.put_pixel(x, y, RIGHT_PIXEL_COLOR);
    }

    if let Some(fit) = &detection.checked_left {
        draw_fit(&mut canvas, fit, LaneSide::Left);
    }
    if let Some(fit) = &detection.checked_right {
        draw_fit(&mut canvas, fit, LaneSide::Right);
    }

    canvas
}

fn draw_window(canvas: &mut RgbImage, window: &SearchWindow) {
    let width = (window.x_high - window.x_low).max(1) as u32;
    let height = (window.y_high - window.y_low).max(1) as u32;
    let rect = Rect::at(window.x_low as i32, window.y_low as i32).of_size(width, height);
    draw_hollow_rect_mut(canvas, rect, WINDOW_COLOR);
}

fn draw_fit(canvas: &mut RgbImage, fit: &LaneFit, side: LaneSide) {
    let color = match side {
        LaneSide::Left => LEFT_FIT_COLOR,
        LaneSide::Right => RIGHT_FIT_COLOR,
    };
    let width = canvas.width() as f64;
    for y in 0..canvas.height() {
        let x = fit.x_at(y as f64);
        if x >= 0.0 && x < width {
            draw_filled_circle_mut(canvas, (x as i32, y as i32), 2, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::LaneEngine;
    use crate::types::Config;

    #[test]
    fn test_visualization_marks_pixels_and_fits() {
        let mut mask = BinaryMask::empty(1280, 720).unwrap();
        mask.fill_rect(300, 0, 310, 720);
        mask.fill_rect(980, 0, 990, 720);

        let engine = LaneEngine::new(Config::default()).unwrap();
        let detection = engine.detect(&mask);
        let img = visualize_search(&mask, &detection);

        assert_eq!(img.dimensions(), (1280, 720));
        // fitted centre line is drawn over the pixels
        assert_eq!(*img.get_pixel(304, 360), LEFT_FIT_COLOR);
        assert_eq!(*img.get_pixel(984, 360), RIGHT_FIT_COLOR);
        // collected pixel away from the fit curve
        assert_eq!(*img.get_pixel(300, 360), LEFT_PIXEL_COLOR);
        // window outline: bottom-left window spans x 200..400
        assert_eq!(*img.get_pixel(200, 700), WINDOW_COLOR);
        // empty background
        assert_eq!(*img.get_pixel(640, 100), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_rejected_fits_are_not_drawn() {
        let mut mask = BinaryMask::empty(1280, 720).unwrap();
        mask.fill_rect(400, 0, 410, 720);
        mask.fill_rect(880, 0, 890, 720);

        let engine = LaneEngine::new(Config::default()).unwrap();
        let detection = engine.detect(&mask);
        let img = visualize_search(&mask, &detection);

        assert_eq!(*img.get_pixel(404, 360), LEFT_PIXEL_COLOR);
        assert_eq!(*img.get_pixel(884, 360), RIGHT_PIXEL_COLOR);
    }
}
