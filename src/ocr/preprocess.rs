use image::{GrayImage, Luma, Pixel};
use imageproc::definitions::Image;
use imageproc::filter::box_filter;

use crate::geometry::Rect;

/// Crops a resolved rectangle out of an image.
///
/// The rectangle is clamped to the image bounds, so an empty or partially
/// outside rectangle yields a smaller (possibly empty) image.
pub fn crop<P>(img: &Image<P>, rect: &Rect) -> Image<P>
where
    P: Pixel + 'static,
{
    let (w, h) = img.dimensions();

    let x0 = rect.x0.min(w);
    let y0 = rect.y0.min(h);
    let cw = rect.width().min(w - x0);
    let ch = rect.height().min(h - y0);

    image::imageops::crop_imm(img, x0, y0, cw, ch).to_image()
}

/// Inverted binary threshold.
///
/// Pixels brighter than `cutoff` become black (text), all others white, so
/// the light glyphs of the game UI come out dark on a white page.
pub fn binarize_inverted(gray: &GrayImage, cutoff: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] > cutoff { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Adaptive mean threshold.
///
/// A pixel becomes white when it is brighter than the mean of its
/// `block`×`block` neighborhood minus `c`, black otherwise.
pub fn adaptive_mean_threshold(gray: &GrayImage, block: u32, c: i16) -> GrayImage {
    let radius = block / 2;
    let means = box_filter(gray, radius, radius);
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in gray.enumerate_pixels() {
        let mean = means.get_pixel(x, y)[0] as i16;
        let value = if pixel[0] as i16 > mean - c { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}
