//! Circle detection with the Hough gradient method.
//!
//! Every edge pixel votes for candidate centers along its gradient direction,
//! in both senses, for every radius in the configured range. Accumulator
//! peaks above `param2` become centers, refined to the mean position of the
//! votes around them. The radius of each center is the distance shared by
//! most edge pixels.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Parameters of a circle search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Inverse ratio of the accumulator resolution to the image resolution.
    pub dp: f64,
    /// Minimum distance between the centers of two detected circles.
    pub min_dist: f64,
    /// Upper edge threshold (the lower one is half of it).
    pub param1: f32,
    /// Accumulator votes needed for a center.
    pub param2: u32,
    pub min_radius: u32,
    pub max_radius: u32,
}

impl HoughParams {
    pub const fn new(min_radius: u32, max_radius: u32) -> Self {
        Self {
            dp: 1.2,
            min_dist: 100.0,
            param1: 50.0,
            param2: 30,
            min_radius,
            max_radius,
        }
    }
}

/// Detected circle, in the coordinates of the searched image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

/// Finds circles in `gray`, strongest first.
pub fn detect_circles(gray: &GrayImage, params: &HoughParams) -> Vec<Circle> {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 || params.max_radius < params.min_radius {
        return Vec::new();
    }

    let edges = canny(gray, params.param1 / 2.0, params.param1);
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    let mut acc = Accumulator::new(width, height, params.dp);
    let mut edge_points = Vec::new();

    let min_r = params.min_radius.max(1);

    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel[0] == 0 {
            continue;
        }

        let dx = gx.get_pixel(x, y)[0] as f64;
        let dy = gy.get_pixel(x, y)[0] as f64;
        let magnitude = dx.hypot(dy);
        if magnitude == 0.0 {
            continue;
        }
        edge_points.push((x as f64, y as f64));

        let (ux, uy) = (dx / magnitude, dy / magnitude);
        for sign in [-1.0, 1.0] {
            for r in min_r..=params.max_radius {
                let cx = x as f64 + sign * ux * r as f64;
                let cy = y as f64 + sign * uy * r as f64;
                if cx < 0.0 || cy < 0.0 || cx >= width as f64 || cy >= height as f64 {
                    break;
                }
                acc.vote(cx, cy);
            }
        }
    }

    let mut circles: Vec<Circle> = Vec::new();
    for (cx, cy) in acc.peaks(params.param2) {
        if circles
            .iter()
            .any(|c| (c.x - cx).hypot(c.y - cy) < params.min_dist)
        {
            continue;
        }

        if let Some(r) = best_radius(&edge_points, cx, cy, min_r, params.max_radius) {
            circles.push(Circle { x: cx, y: cy, r });
        }
    }

    circles
}

/// Votes landing in one accumulator cell.
#[derive(Debug, Clone, Copy, Default)]
struct Bin {
    votes: u32,
    sum_x: f64,
    sum_y: f64,
}

impl Bin {
    fn add(&mut self, other: &Bin) {
        self.votes += other.votes;
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
    }
}

/// Center accumulator, `dp` image pixels per cell.
///
/// Cells keep the sum of the exact vote positions, so a peak can be refined
/// below the cell size.
struct Accumulator {
    width: usize,
    height: usize,
    dp: f64,
    bins: Vec<Bin>,
}

impl Accumulator {
    fn new(width: u32, height: u32, dp: f64) -> Self {
        let width = (width as f64 / dp).ceil() as usize + 1;
        let height = (height as f64 / dp).ceil() as usize + 1;
        Self {
            width,
            height,
            dp,
            bins: vec![Bin::default(); width * height],
        }
    }

    fn vote(&mut self, x: f64, y: f64) {
        let ax = (x / self.dp) as usize;
        let ay = (y / self.dp) as usize;
        let bin = &mut self.bins[ay * self.width + ax];
        bin.votes += 1;
        bin.sum_x += x;
        bin.sum_y += y;
    }

    /// Sum of the cells within `radius` of `(ax, ay)`, clipped to the grid.
    fn window(&self, ax: usize, ay: usize, radius: usize) -> Bin {
        let mut total = Bin::default();
        for y in ay.saturating_sub(radius)..(ay + radius + 1).min(self.height) {
            for x in ax.saturating_sub(radius)..(ax + radius + 1).min(self.width) {
                total.add(&self.bins[y * self.width + x]);
            }
        }
        total
    }

    fn max_in_window(&self, ax: usize, ay: usize) -> u32 {
        let mut max = 0;
        for y in ay - 1..=ay + 1 {
            for x in ax - 1..=ax + 1 {
                max = max.max(self.bins[y * self.width + x].votes);
            }
        }
        max
    }

    /// Refined centers, strongest first.
    ///
    /// Peaks are local maxima of the 3x3 vote sums, so a center split across
    /// neighbouring cells is not lost to whichever cell the scan meets first.
    /// A cell must hold more than `threshold` votes somewhere in its 3x3
    /// window. Each center is the mean vote position over the 5x5 window.
    fn peaks(&self, threshold: u32) -> Vec<(f64, f64)> {
        if self.width < 3 || self.height < 3 {
            return Vec::new();
        }

        let mut smoothed = vec![0u32; self.bins.len()];
        for ay in 0..self.height {
            for ax in 0..self.width {
                smoothed[ay * self.width + ax] = self.window(ax, ay, 1).votes;
            }
        }

        let w = self.width as isize;
        // Earlier neighbours must be strictly lower so a plateau yields one peak
        let before = [-w - 1, -w, -w + 1, -1];
        let after = [1, w - 1, w, w + 1];

        let mut peaks = Vec::new();
        for ay in 1..self.height - 1 {
            for ax in 1..self.width - 1 {
                let i = ay * self.width + ax;
                let score = smoothed[i];
                let at = |offset: isize| smoothed[(i as isize + offset) as usize];
                if score == 0
                    || before.iter().any(|&o| at(o) >= score)
                    || after.iter().any(|&o| at(o) > score)
                    || self.max_in_window(ax, ay) <= threshold
                {
                    continue;
                }

                let support = self.window(ax, ay, 2);
                let n = support.votes as f64;
                peaks.push((score, support.votes, support.sum_x / n, support.sum_y / n));
            }
        }

        peaks.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        peaks.into_iter().map(|(_, _, x, y)| (x, y)).collect()
    }
}

/// Radius in `[min_r, max_r]` supported by the most edge pixels.
fn best_radius(edge_points: &[(f64, f64)], cx: f64, cy: f64, min_r: u32, max_r: u32) -> Option<f64> {
    let mut histogram = vec![0u32; (max_r - min_r + 1) as usize];

    for &(x, y) in edge_points {
        let d = (x - cx).hypot(y - cy).round() as u32;
        if d >= min_r && d <= max_r {
            histogram[(d - min_r) as usize] += 1;
        }
    }

    let (index, count) = histogram
        .iter()
        .enumerate()
        .fold((0, 0), |best, (i, &c)| if c > best.1 { (i, c) } else { best });

    if count == 0 {
        return None;
    }

    Some((min_r as usize + index) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_circle_mut;

    fn disc(width: u32, height: u32, center: (i32, i32), radius: i32) -> GrayImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([30]));
        draw_filled_circle_mut(&mut img, center, radius, Luma([230]));
        img
    }

    #[test]
    fn test_detects_single_disc() {
        let img = disc(180, 200, (90, 100), 35);
        let circles = detect_circles(&img, &HoughParams::new(30, 40));

        assert!(!circles.is_empty());
        let c = circles[0];
        assert!((c.x - 90.0).abs() <= 3.0, "x = {}", c.x);
        assert!((c.y - 100.0).abs() <= 3.0, "y = {}", c.y);
        assert!((c.r - 35.0).abs() <= 3.0, "r = {}", c.r);
    }

    #[test]
    fn test_detects_disc_on_several_canvases() {
        // Centers that fall between accumulator cells spread their votes
        let cases = [
            (160, 160, (80, 80), 35, (30, 40)),
            (200, 180, (100, 90), 35, (30, 40)),
            (240, 220, (117, 103), 35, (30, 40)),
            (150, 190, (73, 96), 35, (30, 40)),
            (200, 200, (100, 100), 57, (50, 65)),
        ];

        for (width, height, (x, y), r, (min_r, max_r)) in cases {
            let img = disc(width, height, (x, y), r);
            let circles = detect_circles(&img, &HoughParams::new(min_r, max_r));

            let canvas = (width, height);
            assert_eq!(circles.len(), 1, "{:?}: {:?}", canvas, circles);
            let c = circles[0];
            assert!((c.x - x as f64).abs() <= 3.0, "{:?}: x = {}", canvas, c.x);
            assert!((c.y - y as f64).abs() <= 3.0, "{:?}: y = {}", canvas, c.y);
            assert!((c.r - r as f64).abs() <= 3.0, "{:?}: r = {}", canvas, c.r);
        }
    }

    #[test]
    fn test_split_peak_resolves_to_vote_centroid() {
        let mut acc = Accumulator::new(60, 60, 1.2);
        // Two neighbouring cells with equal votes straddling x = 30
        for _ in 0..40 {
            acc.vote(29.5, 30.2);
            acc.vote(30.5, 30.2);
        }

        let peaks = acc.peaks(30);

        assert_eq!(peaks.len(), 1);
        assert!((peaks[0].0 - 30.0).abs() < 1e-9, "x = {}", peaks[0].0);
        assert!((peaks[0].1 - 30.2).abs() < 1e-9, "y = {}", peaks[0].1);
    }

    #[test]
    fn test_radius_outside_range_is_ignored() {
        let img = disc(180, 200, (90, 100), 12);
        let circles = detect_circles(&img, &HoughParams::new(50, 65));

        assert!(circles.is_empty());
    }

    #[test]
    fn test_flat_image_has_no_circles() {
        let img = GrayImage::from_pixel(120, 120, Luma([128]));
        assert!(detect_circles(&img, &HoughParams::new(20, 40)).is_empty());
    }

    #[test]
    fn test_best_radius_picks_most_supported_distance() {
        let points: Vec<(f64, f64)> = (0..36)
            .map(|i| {
                let a = i as f64 * std::f64::consts::PI / 18.0;
                (50.0 + 20.0 * a.cos(), 50.0 + 20.0 * a.sin())
            })
            .chain([(50.0, 80.0)])
            .collect();

        assert_eq!(best_radius(&points, 50.0, 50.0, 10, 40), Some(20.0));
        assert_eq!(best_radius(&points, 50.0, 50.0, 35, 40), None);
    }
}
