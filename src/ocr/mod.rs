//! Text recognition.
//!
//! The pipeline talks to OCR through [`TextRecognizer`], so extraction can
//! run against the tesseract command-line engine or against a scripted
//! recognizer in tests.

pub mod engine;
pub mod extract;
pub mod preprocess;
pub mod setup;

pub use engine::Tesseract;
pub use extract::{normalize_text, parse_clock, parse_timer};
pub use preprocess::{adaptive_mean_threshold, binarize_inverted, crop};

use anyhow::Result;
use image::GrayImage;

/// Anything that turns a preprocessed grayscale image into text.
pub trait TextRecognizer {
    fn recognize(&self, img: &GrayImage) -> Result<String>;
}
