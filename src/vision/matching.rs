//! Masked template matching.

use image::GrayImage;
use imageproc::template_matching::{match_template_with_mask, MatchTemplateMethod};

/// Top-left positions where the masked normalized cross-correlation of
/// `template` over `image` reaches `threshold`, in row-major order.
///
/// An image smaller than the template yields no positions.
pub fn match_points(
    image: &GrayImage,
    template: &GrayImage,
    mask: &GrayImage,
    threshold: f32,
) -> Vec<(u32, u32)> {
    if image.width() < template.width() || image.height() < template.height() {
        return Vec::new();
    }

    let scores = match_template_with_mask(
        image,
        template,
        MatchTemplateMethod::CrossCorrelationNormalized,
        mask,
    );

    let mut points = Vec::new();
    for y in 0..scores.height() {
        for x in 0..scores.width() {
            if scores.get_pixel(x, y)[0] >= threshold {
                points.push((x, y));
            }
        }
    }

    points
}
