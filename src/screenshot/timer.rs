//! Countdown widgets: the hatching timer of an egg and the raid timer of a
//! hatched boss.
//!
//! Both are colored boxes found by color segmentation, then read with OCR
//! as `H:MM:SS`.

use chrono::TimeDelta;

use super::error::{ExtractionError, Subject};
use super::frame::Frame;
use crate::geometry::{Rect, Region};
use crate::ocr::{binarize_inverted, parse_timer, TextRecognizer};
use crate::vision::{gaussian_blur, in_range, largest_blob_box, HsvRange};

/// Where a countdown widget is searched for and the color of its box.
#[derive(Debug, Clone, Copy)]
pub struct TimerWidget {
    pub subject: Subject,
    pub region: Region,
    pub color: HsvRange,
}

impl TimerWidget {
    pub fn hatching() -> Self {
        Self {
            subject: Subject::HatchingTimer,
            region: Region::new(0.35, (0.15, 0.29)),
            color: HsvRange::new([150, 100, 230], [255, 130, 255]),
        }
    }

    pub fn raid() -> Self {
        Self {
            subject: Subject::RaidTimer,
            region: Region::new((-0.30, -0.02), (0.54, 0.65)),
            color: HsvRange::new([-50, 175, 230], [50, 205, 255]),
        }
    }
}

/// Bounding box of the widget, in screenshot pixels.
pub fn find_box(frame: &Frame, widget: &TimerWidget) -> Result<Rect, ExtractionError> {
    let not_found = ExtractionError::not_found(widget.subject);

    let area = frame.resolve(&widget.region, widget.subject)?;
    if area.is_empty() {
        return Err(not_found);
    }

    let blurred = gaussian_blur(&frame.crop(&area), 5, 5.0);
    let mask = in_range(&blurred, &widget.color);
    frame.dump_gray(&format!("{}_mask", widget.subject.key()), &mask);

    largest_blob_box(&mask)
        .map(|b| area.translate_from(b))
        .ok_or(not_found)
}

/// Reads the countdown shown in `timer_box`.
pub fn read(
    frame: &Frame,
    ocr: &dyn TextRecognizer,
    timer_box: &Rect,
    cutoff: u8,
    subject: Subject,
) -> Result<TimeDelta, ExtractionError> {
    let unreadable = ExtractionError::unreadable(subject);

    let img = binarize_inverted(&frame.gray(timer_box), cutoff);
    let text = frame
        .read_text(ocr, &img, subject.key())
        .ok_or(unreadable)?;

    let timer = parse_timer(&text).ok_or(unreadable)?;
    log::debug!("{} {}s", subject, timer.num_seconds());
    Ok(timer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::testing::ScriptedOcr;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect as DrawRect;

    fn screenshot_with_box(x: i32, y: i32, w: u32, h: u32, color: Rgb<u8>) -> RgbImage {
        let mut img = RgbImage::from_pixel(720, 1280, Rgb([30, 30, 30]));
        draw_filled_rect_mut(&mut img, DrawRect::at(x, y).of_size(w, h), color);
        img
    }

    #[test]
    fn test_hatching_timer_box() {
        let img = screenshot_with_box(300, 240, 120, 50, Rgb([245, 134, 171]));
        let frame = Frame::new(&img, None);

        let found = find_box(&frame, &TimerWidget::hatching()).unwrap();

        // The blur softens the edges by at most a couple of pixels
        assert!(found.x0.abs_diff(300) <= 2 && found.x1.abs_diff(420) <= 2, "{:?}", found);
        assert!(found.y0.abs_diff(240) <= 2 && found.y1.abs_diff(290) <= 2, "{:?}", found);
    }

    #[test]
    fn test_raid_timer_box() {
        // Orange-red, inside the lower right band
        let img = screenshot_with_box(560, 720, 90, 40, Rgb([245, 80, 63]));
        let frame = Frame::new(&img, None);

        let found = find_box(&frame, &TimerWidget::raid()).unwrap();

        assert!(found.x0.abs_diff(560) <= 2 && found.y0.abs_diff(720) <= 2, "{:?}", found);
        assert!(find_box(&frame, &TimerWidget::hatching()).is_err());
    }

    #[test]
    fn test_missing_box_is_not_found() {
        let img = RgbImage::from_pixel(720, 1280, Rgb([30, 30, 30]));
        let frame = Frame::new(&img, None);

        assert_eq!(
            find_box(&frame, &TimerWidget::hatching()),
            Err(ExtractionError::not_found(Subject::HatchingTimer))
        );
    }

    #[test]
    fn test_read_timer() {
        let img = screenshot_with_box(300, 240, 120, 50, Rgb([245, 134, 171]));
        let frame = Frame::new(&img, None);
        let timer_box = Rect::new((300, 240), (420, 290));

        let ocr = ScriptedOcr::always("1:23:45\n");
        assert_eq!(
            read(&frame, &ocr, &timer_box, 210, Subject::HatchingTimer),
            Ok(TimeDelta::seconds(3600 + 23 * 60 + 45))
        );

        let noise = ScriptedOcr::always("~#@ lI");
        assert_eq!(
            read(&frame, &noise, &timer_box, 210, Subject::HatchingTimer),
            Err(ExtractionError::unreadable(Subject::HatchingTimer))
        );
    }
}
