//! Debug dumps of intermediate images.
//!
//! Each pipeline stage can hand its mask or crop to a [`DebugDump`], which
//! writes it to `<dir>/<stage>.png`. Dumps are write-only and best effort:
//! a failed write is logged and never interrupts the extraction.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect as DrawRect;
use std::path::{Path, PathBuf};

use crate::geometry::Rect;

/// Shape drawn on the anchors overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    Circle { x: i32, y: i32, r: i32 },
    Box(Rect),
}

#[derive(Debug, Clone)]
pub struct DebugDump {
    dir: PathBuf,
}

impl DebugDump {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a grayscale stage image.
    pub fn gray(&self, stage: &str, img: &GrayImage) {
        self.write(stage, |path| img.save(path));
    }

    /// Writes a color stage image.
    pub fn rgb(&self, stage: &str, img: &RgbImage) {
        self.write(stage, |path| img.save(path));
    }

    /// Writes a copy of `screenshot` with every mark drawn on it.
    pub fn anchors(&self, screenshot: &RgbImage, marks: &[Mark]) {
        let mut canvas = screenshot.clone();
        for mark in marks {
            match *mark {
                Mark::Circle { x, y, r } => {
                    draw_hollow_circle_mut(&mut canvas, (x, y), r, Rgb([0, 255, 0]));
                    draw_hollow_circle_mut(&mut canvas, (x, y), 2, Rgb([255, 0, 0]));
                }
                Mark::Box(rect) if !rect.is_empty() => {
                    let r = DrawRect::at(rect.x0 as i32, rect.y0 as i32)
                        .of_size(rect.width(), rect.height());
                    draw_hollow_rect_mut(&mut canvas, r, Rgb([0, 255, 0]));
                }
                Mark::Box(_) => {}
            }
        }
        self.rgb("anchors", &canvas);
    }

    fn write<F>(&self, stage: &str, save: F)
    where
        F: FnOnce(&Path) -> image::ImageResult<()>,
    {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            log::warn!("Cannot create debug folder {}: {}", self.dir.display(), e);
            return;
        }

        let path = self.dir.join(format!("{}.png", stage));
        match save(&path) {
            Ok(()) => log::debug!("Saved debug image {}", path.display()),
            Err(e) => log::warn!("Failed to save debug image {}: {}", path.display(), e),
        }
    }
}
