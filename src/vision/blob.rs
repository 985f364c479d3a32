//! Blob search over binary masks.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

use crate::geometry::Rect;

/// Area enclosed by a contour polygon (shoelace formula).
///
/// A contour made of a single pixel or a single line encloses no area.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    (twice as f64 / 2.0).abs()
}

/// Smallest rectangle covering every contour pixel.
pub fn bounding_rect(points: &[Point<i32>]) -> Option<Rect> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;

    Some(Rect::new(
        (min_x as u32, min_y as u32),
        (max_x as u32 + 1, max_y as u32 + 1),
    ))
}

/// Bounding box of the largest external blob of a mask, in mask coordinates.
///
/// Blobs are compared by contour area; on equal areas the first blob found
/// in scan order wins. Returns `None` when the mask is empty.
pub fn largest_blob_box(mask: &GrayImage) -> Option<Rect> {
    let contours = find_contours::<i32>(mask);

    let mut best: Option<(&[Point<i32>], f64)> = None;
    for contour in contours.iter().filter(|c| c.border_type == BorderType::Outer) {
        let area = contour_area(&contour.points);
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((contour.points.as_slice(), area)),
        }
    }

    best.and_then(|(points, _)| bounding_rect(points))
}
