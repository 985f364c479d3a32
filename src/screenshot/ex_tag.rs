//! EX raid badge.
//!
//! A violet badge in the top right corner marks EX raids. Other violet UI
//! elements exist, so a candidate box is only accepted once OCR confirms it
//! reads "EX RAID".

use super::error::{ExtractionError, Subject};
use super::frame::Frame;
use crate::geometry::{Rect, Region};
use crate::ocr::{binarize_inverted, TextRecognizer};
use crate::similarity::ratio;
use crate::vision::{dilate_square, gaussian_blur, in_range, largest_blob_box, HsvRange};

const EX_COLOR: HsvRange = HsvRange::around([133, 138, 189], [50, 15, 13]);

/// Minimum similarity with the badge text.
const MIN_EX_SIMILARITY: f64 = 0.4;

pub fn region() -> Region {
    Region::new((-230, 1.0), (30, 100))
}

/// Candidate badge box, in screenshot pixels.
pub fn find_box(frame: &Frame) -> Result<Rect, ExtractionError> {
    let not_found = ExtractionError::not_found(Subject::ExTag);

    let area = frame.resolve(&region(), Subject::ExTag)?;
    if area.is_empty() {
        return Err(not_found);
    }

    let blurred = gaussian_blur(&frame.crop(&area), 5, 5.0);
    let mask = dilate_square(&in_range(&blurred, &EX_COLOR), 5);
    frame.dump_gray("ex_tag_mask", &mask);

    largest_blob_box(&mask)
        .map(|b| area.translate_from(b))
        .ok_or(not_found)
}

/// Whether OCR text of the badge reads "EX RAID" or "RAID EX".
///
/// Case and whitespace are ignored, since OCR splits and joins the two
/// words unpredictably.
pub fn is_ex_text(text: &str) -> bool {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    let score = ratio(&compact, "exraid").max(ratio(&compact, "raidex"));
    score > MIN_EX_SIMILARITY
}

/// Confirms a candidate badge by reading it.
pub fn confirm(
    frame: &Frame,
    ocr: &dyn TextRecognizer,
    tag_box: &Rect,
    cutoff: u8,
) -> Result<bool, ExtractionError> {
    let img = binarize_inverted(&frame.gray(tag_box), cutoff);

    match frame.read_text(ocr, &img, Subject::ExTag.key()) {
        Some(text) if is_ex_text(&text) => Ok(true),
        _ => Err(ExtractionError::unreadable(Subject::ExTag)),
    }
}
