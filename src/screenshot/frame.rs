//! Pixel access shared by the extractors.

use image::{GrayImage, RgbImage};

use super::error::{ExtractionError, Subject};
use crate::geometry::{resolve, Rect, Region};
use crate::ocr::{crop, TextRecognizer};
use crate::vision::{to_gray, DebugDump};

/// A screenshot seen by one extractor, with the optional debug side channel.
pub struct Frame<'a> {
    img: &'a RgbImage,
    debug: Option<&'a DebugDump>,
}

impl<'a> Frame<'a> {
    pub fn new(img: &'a RgbImage, debug: Option<&'a DebugDump>) -> Self {
        Self { img, debug }
    }

    pub fn size(&self) -> (u32, u32) {
        self.img.dimensions()
    }

    /// Resolves a region for `subject`.
    ///
    /// An inverted region is a misconfiguration; it is logged and reported as
    /// the subject not being found.
    pub fn resolve(&self, region: &Region, subject: Subject) -> Result<Rect, ExtractionError> {
        resolve(self.size(), region).map_err(|e| {
            log::error!("Invalid {} region {:?}: {}", subject, region, e);
            ExtractionError::not_found(subject)
        })
    }

    pub fn crop(&self, rect: &Rect) -> RgbImage {
        crop(self.img, rect)
    }

    pub fn gray(&self, rect: &Rect) -> GrayImage {
        to_gray(&self.crop(rect))
    }

    pub fn dump_gray(&self, stage: &str, img: &GrayImage) {
        if let Some(debug) = self.debug {
            debug.gray(stage, img);
        }
    }

    pub fn dump_rgb(&self, stage: &str, img: &RgbImage) {
        if let Some(debug) = self.debug {
            debug.rgb(stage, img);
        }
    }

    /// Runs OCR on a preprocessed crop. Engine failures are logged and read
    /// as no text.
    pub fn read_text(&self, ocr: &dyn TextRecognizer, img: &GrayImage, stage: &str) -> Option<String> {
        self.dump_gray(stage, img);

        if img.width() == 0 || img.height() == 0 {
            return None;
        }

        match ocr.recognize(img) {
            Ok(text) => {
                log::debug!("raw {} «{}»", stage, text);
                Some(text)
            }
            Err(e) => {
                log::warn!("OCR failed on {}: {:#}", stage, e);
                None
            }
        }
    }
}
