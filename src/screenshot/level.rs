//! Raid level, counted as star markers.
//!
//! Template matching fires on several neighboring pixels around every star,
//! so match points are merged into one marker per star, and markers away
//! from the row of stars are dropped before counting.

use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect as DrawRect;

use super::error::{ExtractionError, Subject};
use super::frame::Frame;
use super::templates::LevelTemplates;
use crate::config::LevelThresholds;
use crate::geometry::{Rect, Region};
use crate::vision::match_points;

/// Match points closer than this to a marker belong to it.
pub const MERGE_DISTANCE: f64 = 10.0;

/// Markers further than this from the mean row height are dropped.
pub const ROW_TOLERANCE: f64 = 20.0;

pub const MAX_LEVEL: u8 = 5;

/// Merged match points, at their running mean position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub hits: u32,
}

/// Merges match points into markers, in the order points are given.
pub fn cluster(points: &[(u32, u32)]) -> Vec<Marker> {
    let mut markers: Vec<Marker> = Vec::new();

    for &(px, py) in points {
        let (px, py) = (px as f64, py as f64);

        match markers
            .iter_mut()
            .find(|m| (m.x - px).hypot(m.y - py) <= MERGE_DISTANCE)
        {
            Some(m) => {
                let n = m.hits as f64;
                m.x = (m.x * n + px) / (n + 1.0);
                m.y = (m.y * n + py) / (n + 1.0);
                m.hits += 1;
            }
            None => markers.push(Marker {
                x: px,
                y: py,
                hits: 1,
            }),
        }
    }

    markers
}

/// Drops markers off the row of stars.
pub fn keep_row(markers: Vec<Marker>) -> Vec<Marker> {
    if markers.is_empty() {
        return markers;
    }

    let mean = markers.iter().map(|m| m.y).sum::<f64>() / markers.len() as f64;
    markers
        .into_iter()
        .filter(|m| (m.y - mean).abs() <= ROW_TOLERANCE)
        .collect()
}

/// Level shown by a set of match points, with the markers it was counted from.
pub fn count(points: &[(u32, u32)]) -> Option<(u8, Vec<Marker>)> {
    let markers = keep_row(cluster(points));
    if markers.is_empty() {
        return None;
    }

    let level = markers.len().min(MAX_LEVEL as usize) as u8;
    Some((level, markers))
}

/// Raid phase, which decides template and search band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Stars sit below the hatching timer.
    Egg { timer_box: Rect },
    Hatched,
}

pub fn search_region(phase: &Phase) -> Region {
    match phase {
        Phase::Egg { timer_box } => {
            let bottom = timer_box.y1 as i32;
            Region::new(0.55, (bottom + 15, bottom + 105))
        }
        Phase::Hatched => Region::new(0.5, (0.10, 0.20)),
    }
}

/// Reads the level and the box spanning its markers, in screenshot pixels.
pub fn find(
    frame: &Frame,
    templates: &LevelTemplates,
    thresholds: &LevelThresholds,
    phase: &Phase,
) -> Result<(u8, Rect), ExtractionError> {
    let not_found = ExtractionError::not_found(Subject::Level);

    let (template, threshold) = match phase {
        Phase::Egg { .. } => (&templates.egg, thresholds.egg),
        Phase::Hatched => (&templates.hatched, thresholds.hatched),
    };

    let area = frame.resolve(&search_region(phase), Subject::Level)?;
    let gray = frame.gray(&area);
    let points = match_points(&gray, &template.image, &template.mask, threshold);

    let (level, markers) = count(&points).ok_or(not_found)?;
    let (w, h) = (template.width(), template.height());

    let min_x = markers.iter().map(|m| m.x.round() as u32).min().unwrap_or(0);
    let min_y = markers.iter().map(|m| m.y.round() as u32).min().unwrap_or(0);
    let max_x = markers.iter().map(|m| m.x.round() as u32).max().unwrap_or(0);
    let max_y = markers.iter().map(|m| m.y.round() as u32).max().unwrap_or(0);
    let anchor = area.translate_from(Rect::new((min_x, min_y), (max_x + w, max_y + h)));

    let mut overlay = frame.crop(&area);
    for m in &markers {
        let r = DrawRect::at(m.x.round() as i32, m.y.round() as i32).of_size(w, h);
        draw_hollow_rect_mut(&mut overlay, r, Rgb([255, 0, 0]));
    }
    frame.dump_rgb("level", &overlay);

    log::debug!("level {} from {} match points", level, points.len());
    Ok((level, anchor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screenshot::templates::star;
    use image::{imageops, Rgb, RgbImage};

    fn tight_cluster(x: u32, y: u32) -> Vec<(u32, u32)> {
        vec![(x, y), (x + 1, y), (x, y + 1), (x + 2, y + 2)]
    }

    #[test]
    fn test_three_stars_and_an_outlier() {
        let mut points = Vec::new();
        points.extend(tight_cluster(10, 100));
        points.extend(tight_cluster(50, 100));
        points.extend(tight_cluster(90, 100));
        points.push((60, 150));

        let (level, markers) = count(&points).unwrap();

        assert_eq!(level, 3);
        assert!(markers.iter().all(|m| m.hits == 4));
    }

    #[test]
    fn test_cluster_running_mean() {
        let markers = cluster(&[(0, 0), (4, 0), (8, 0), (30, 0)]);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0], Marker { x: 4.0, y: 0.0, hits: 3 });
        assert_eq!(markers[1], Marker { x: 30.0, y: 0.0, hits: 1 });
    }

    #[test]
    fn test_level_is_capped() {
        let points: Vec<(u32, u32)> = (0..7).map(|i| (i * 30, 40)).collect();
        assert_eq!(count(&points).map(|(l, _)| l), Some(MAX_LEVEL));
    }

    #[test]
    fn test_no_points_no_level() {
        assert!(count(&[]).is_none());
    }

    #[test]
    fn test_egg_search_region_follows_timer() {
        let phase = Phase::Egg {
            timer_box: Rect::new((300, 240), (420, 290)),
        };
        assert_eq!(search_region(&phase), Region::new(0.55, (305, 395)));
    }

    /// Pastes `n` egg stars in a row starting at (`x`, `y`).
    fn paste_stars(img: &mut RgbImage, n: u32, x: u32, y: u32) {
        let template = star(26);
        let rgb = image::DynamicImage::ImageLuma8(template.image).to_rgb8();
        for i in 0..n {
            imageops::replace(img, &rgb, (x + i * 40) as i64, y as i64);
        }
    }

    #[test]
    fn test_find_egg_level() {
        let mut img = RgbImage::from_pixel(720, 1280, Rgb([0, 0, 0]));
        paste_stars(&mut img, 4, 280, 320);
        let frame = Frame::new(&img, None);
        let phase = Phase::Egg {
            timer_box: Rect::new((300, 240), (420, 290)),
        };

        let (level, anchor) = find(
            &frame,
            &LevelTemplates::builtin(),
            &LevelThresholds::default(),
            &phase,
        )
        .unwrap();

        assert_eq!(level, 4);
        assert!(anchor.x0.abs_diff(280) <= 2 && anchor.y0.abs_diff(320) <= 2, "{:?}", anchor);
        assert!(anchor.x1.abs_diff(280 + 3 * 40 + 26) <= 2, "{:?}", anchor);
    }

    #[test]
    fn test_find_without_stars() {
        let img = RgbImage::from_pixel(720, 1280, Rgb([90, 90, 90]));
        let frame = Frame::new(&img, None);

        assert_eq!(
            find(&frame, &LevelTemplates::builtin(), &LevelThresholds::default(), &Phase::Hatched),
            Err(ExtractionError::not_found(Subject::Level))
        );
    }
}
