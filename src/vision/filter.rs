//! Smoothing and morphology helpers.

use image::{GrayImage, Pixel};
use imageproc::definitions::{Clamp, Image};
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use imageproc::morphology::dilate;

/// Normalized 1-D Gaussian kernel with `size` taps.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let center = (size as f32 - 1.0) / 2.0;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Blurs with a `size`×`size` Gaussian kernel of standard deviation `sigma`.
pub fn gaussian_blur<P>(image: &Image<P>, size: usize, sigma: f32) -> Image<P>
where
    P: Pixel + 'static,
    <P as Pixel>::Subpixel: Into<f32> + Clamp<f32>,
{
    separable_filter_equal(image, &gaussian_kernel(size, sigma))
}

/// Dilates a binary mask with a `size`×`size` square structuring element.
pub fn dilate_square(mask: &GrayImage, size: u8) -> GrayImage {
    dilate(mask, Norm::LInf, size / 2)
}
