//! Level marker templates.
//!
//! The level of a raid is shown as a row of stars. Each raid phase has its
//! own star template and mask: a smaller star under the hatching timer of
//! an egg, a larger one above a hatched boss. Built-in stars are drawn at
//! start-up; PNG files in a template directory replace them.

use anyhow::{Context, Result};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use std::f64::consts::PI;
use std::path::Path;

/// A grayscale template with the mask of the pixels that take part in matching.
#[derive(Debug, Clone)]
pub struct Template {
    pub image: GrayImage,
    pub mask: GrayImage,
}

impl Template {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Loads `<dir>/<name>.png` and `<dir>/<name>_mask.png`.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let image_path = dir.join(format!("{}.png", name));
        let mask_path = dir.join(format!("{}_mask.png", name));

        let image = image::open(&image_path)
            .with_context(|| format!("Failed to open {}", image_path.display()))?
            .to_luma8();
        let mask = image::open(&mask_path)
            .with_context(|| format!("Failed to open {}", mask_path.display()))?
            .to_luma8();

        anyhow::ensure!(
            image.dimensions() == mask.dimensions(),
            "{} and its mask differ in size",
            image_path.display()
        );

        Ok(Self { image, mask })
    }
}

/// A white five-pointed star on black, `size` pixels wide, with a full mask.
pub fn star(size: u32) -> Template {
    let mut image = GrayImage::new(size, size);
    let center = (size as f64 - 1.0) / 2.0;
    let outer = size as f64 / 2.0 - 1.0;
    let inner = outer * 0.45;

    let points: Vec<Point<i32>> = (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = -PI / 2.0 + i as f64 * PI / 5.0;
            Point::new(
                (center + radius * angle.cos()).round() as i32,
                (center + radius * angle.sin()).round() as i32,
            )
        })
        .collect();
    draw_polygon_mut(&mut image, &points, Luma([255]));

    let mask = GrayImage::from_pixel(size, size, Luma([255]));
    Template { image, mask }
}

/// Templates for both raid phases.
#[derive(Debug, Clone)]
pub struct LevelTemplates {
    pub egg: Template,
    pub hatched: Template,
}

impl LevelTemplates {
    pub fn builtin() -> Self {
        Self {
            egg: star(26),
            hatched: star(30),
        }
    }

    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            egg: Template::load(dir, "egg")?,
            hatched: Template::load(dir, "hatched")?,
        })
    }

    /// Templates from `dir` when it holds a complete set, built-in ones otherwise.
    pub fn load_or_builtin(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return Self::builtin();
        };

        match Self::load(dir) {
            Ok(templates) => {
                log::info!("Level templates loaded from {}", dir.display());
                templates
            }
            Err(e) => {
                log::warn!("{:#}. Using built-in level templates.", e);
                Self::builtin()
            }
        }
    }
}
