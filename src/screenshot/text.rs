//! Text fields of the raid screen: gym name, boss name and the clock of the
//! status bar.

use chrono::NaiveTime;

use super::anchors::Anchor;
use super::error::{ExtractionError, Subject};
use super::frame::Frame;
use crate::geometry::{Axis, Rect, Region};
use crate::ocr::{adaptive_mean_threshold, binarize_inverted, normalize_text, parse_clock, TextRecognizer};
use crate::vision::{gaussian_blur, to_gray};

/// Gym name band, to the right of the gym picture when it was found.
pub fn gym_region(gym_image: Option<Anchor>) -> Region {
    match gym_image {
        Some(Anchor::Circle { x, y, r }) => {
            let (x, y, r) = (x as i32, y as i32, r as i32);
            Region::new((x + r + 10, -160), (y - r + 5, y + r - 5))
        }
        _ => Region::new((200, -160), (60, 150)),
    }
}

/// Boss name band, below the level stars when they were found.
pub fn boss_region(level_box: Option<Rect>) -> Region {
    match level_box {
        Some(level) => {
            let bottom = level.y1 as i32;
            Region::new(0.8, (bottom + 85, bottom + 215))
        }
        None => Region::new(0.8, (0.23, 0.34)),
    }
}

/// Reads and binarizes a text band, returning its normalized text.
fn read_band(
    frame: &Frame,
    ocr: &dyn TextRecognizer,
    region: &Region,
    cutoff: u8,
    subject: Subject,
) -> Result<String, ExtractionError> {
    let area = frame.resolve(region, subject)?;
    let img = binarize_inverted(&frame.gray(&area), cutoff);

    let text = frame
        .read_text(ocr, &img, subject.key())
        .map(|t| normalize_text(&t))
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ExtractionError::not_found(subject));
    }
    Ok(text)
}

/// OCR text of the gym name.
pub fn read_gym_name(
    frame: &Frame,
    ocr: &dyn TextRecognizer,
    gym_image: Option<Anchor>,
    cutoff: u8,
) -> Result<String, ExtractionError> {
    read_band(frame, ocr, &gym_region(gym_image), cutoff, Subject::Gym)
}

/// OCR text of the boss name.
pub fn read_boss_text(
    frame: &Frame,
    ocr: &dyn TextRecognizer,
    level_box: Option<Rect>,
    cutoff: u8,
) -> Result<String, ExtractionError> {
    read_band(frame, ocr, &boss_region(level_box), cutoff, Subject::Boss)
}

/// Status bar bands where the clock may be, in the order they are tried.
pub fn time_candidates(gym_image: Option<Anchor>) -> [Region; 3] {
    let bottom = match gym_image {
        Some(Anchor::Circle { y, r, .. }) if y as i32 - r as i32 - 10 > 0 => {
            y as i32 - r as i32 - 10
        }
        _ => 60,
    };

    let xs = [Axis::from(0.2), Axis::from((-0.2, 1.0)), Axis::from(1.0)];
    xs.map(|x| Region {
        x,
        y: (0, bottom).into(),
    })
}

/// Clock of the status bar, from the first band that reads as `H:MM`.
pub fn read_time(
    frame: &Frame,
    ocr: &dyn TextRecognizer,
    gym_image: Option<Anchor>,
) -> Result<NaiveTime, ExtractionError> {
    for region in time_candidates(gym_image) {
        let Ok(area) = frame.resolve(&region, Subject::Time) else {
            continue;
        };
        if area.is_empty() {
            continue;
        }

        let blurred = gaussian_blur(&frame.crop(&area), 5, 3.0);
        let img = adaptive_mean_threshold(&to_gray(&blurred), 11, 2);

        if let Some(time) = frame
            .read_text(ocr, &img, Subject::Time.key())
            .and_then(|text| parse_clock(&text))
        {
            log::debug!("time {}", time.format("%H:%M"));
            return Ok(time);
        }
    }

    Err(ExtractionError::not_found(Subject::Time))
}
