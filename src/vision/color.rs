//! HSV color masks.
//!
//! Hue is expressed on the 0..180 scale, saturation and value on 0..=255,
//! matching the ranges the raid screen colors were measured with.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Inclusive HSV window. Bounds may fall outside the channel range; they are
/// compared as-is, so a lower hue of -50 simply accepts everything from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [i16; 3],
    pub upper: [i16; 3],
}

impl HsvRange {
    pub const fn new(lower: [i16; 3], upper: [i16; 3]) -> Self {
        Self { lower, upper }
    }

    /// Window of `center ± offset` on every channel.
    pub const fn around(center: [i16; 3], offset: [i16; 3]) -> Self {
        Self {
            lower: [
                center[0] - offset[0],
                center[1] - offset[1],
                center[2] - offset[2],
            ],
            upper: [
                center[0] + offset[0],
                center[1] + offset[1],
                center[2] + offset[2],
            ],
        }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| {
            let v = hsv[i] as i16;
            v >= self.lower[i] && v <= self.upper[i]
        })
    }
}

/// Converts an RGB pixel to HSV.
pub fn rgb_to_hsv(pixel: &Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0.map(|c| c as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        ((h / 2.0).round() as u16 % 180) as u8,
        s.round() as u8,
        max as u8,
    ]
}

/// Binary mask of the pixels whose HSV value falls inside `range`
/// (255 inside, 0 outside).
pub fn in_range(img: &RgbImage, range: &HsvRange) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut mask = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        if range.contains(rgb_to_hsv(pixel)) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    mask
}

/// Luma of an RGB image with the BT.601 weights (0.299, 0.587, 0.114).
pub fn to_gray(img: &RgbImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b] = pixel.0.map(|c| c as u32);
        let luma = (r * 4899 + g * 9617 + b * 1868 + 8192) >> 14;
        gray.put_pixel(x, y, Luma([luma as u8]));
    }

    gray
}
