//! Landmarks of the raid screen.
//!
//! Five round icons sit at fixed places of the raid screen. Finding at least
//! four of them is the first half of telling a raid screenshot apart; their
//! positions also anchor the regions of later extractors.

use image::GrayImage;
use std::collections::BTreeMap;

use crate::geometry::{resolve, Rect, Region};
use crate::ocr::crop;
use crate::vision::{detect_circles, HoughParams, Mark};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnchorName {
    GymImage,
    GymDetail,
    RaidInfo,
    Exit,
    Gym,
    HatchingTimer,
    RaidTimer,
    ExTag,
    Level,
}

/// A located landmark, in screenshot pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Circle { x: u32, y: u32, r: u32 },
    Box(Rect),
}

impl Anchor {
    pub fn to_mark(&self) -> Mark {
        match *self {
            Anchor::Circle { x, y, r } => Mark::Circle {
                x: x as i32,
                y: y as i32,
                r: r as i32,
            },
            Anchor::Box(rect) => Mark::Box(rect),
        }
    }
}

/// Where to look for a round landmark and how large it is.
#[derive(Debug, Clone, Copy)]
pub struct Landmark {
    pub name: AnchorName,
    pub region: Region,
    pub params: HoughParams,
}

/// Landmarks needed to classify a screenshot as a raid.
pub const MIN_LANDMARKS: usize = 4;

pub fn landmarks() -> [Landmark; 5] {
    [
        Landmark {
            name: AnchorName::GymImage,
            region: Region::new((0, 0.25), (40, 0.20)),
            params: HoughParams::new(50, 65),
        },
        Landmark {
            name: AnchorName::GymDetail,
            region: Region::new((-0.20, -30), (60, 0.17)),
            params: HoughParams::new(20, 40),
        },
        Landmark {
            name: AnchorName::RaidInfo,
            region: Region::new((30, 0.25), (-250, 1.0)),
            params: HoughParams::new(30, 40),
        },
        Landmark {
            name: AnchorName::Exit,
            region: Region::new(0.25, (-250, 1.0)),
            params: HoughParams::new(30, 40),
        },
        Landmark {
            name: AnchorName::Gym,
            region: Region::new((-0.25, -30), (-250, 1.0)),
            params: HoughParams::new(30, 40),
        },
    ]
}

/// Strongest circle of `landmark` in the grayscale screenshot.
pub fn locate(gray: &GrayImage, landmark: &Landmark) -> Option<Anchor> {
    let area = match resolve(gray.dimensions(), &landmark.region) {
        Ok(area) => area,
        Err(e) => {
            log::error!("Invalid {:?} region: {}", landmark.name, e);
            return None;
        }
    };

    let circle = detect_circles(&crop(gray, &area), &landmark.params)
        .into_iter()
        .next()?;

    Some(Anchor::Circle {
        x: circle.x.round() as u32 + area.x0,
        y: circle.y.round() as u32 + area.y0,
        r: circle.r.round() as u32,
    })
}

/// Searches every landmark once; missing ones are left out.
pub fn locate_all(gray: &GrayImage) -> BTreeMap<AnchorName, Anchor> {
    let mut found = BTreeMap::new();

    for landmark in landmarks() {
        match locate(gray, &landmark) {
            Some(anchor) => {
                log::debug!("Anchor {:?} at {:?}", landmark.name, anchor);
                found.insert(landmark.name, anchor);
            }
            None => log::debug!("Anchor {:?} not found", landmark.name),
        }
    }

    found
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};
    use imageproc::drawing::draw_filled_circle_mut;

    /// Landmark centers and radii on a 720×1280 screenshot.
    pub(crate) const LANDMARK_CIRCLES: [(AnchorName, i32, i32, i32); 5] = [
        (AnchorName::GymImage, 90, 148, 57),
        (AnchorName::GymDetail, 633, 138, 30),
        (AnchorName::RaidInfo, 105, 1155, 35),
        (AnchorName::Exit, 360, 1155, 35),
        (AnchorName::Gym, 615, 1155, 35),
    ];

    pub(crate) fn draw_landmarks(img: &mut RgbImage, skip: &[AnchorName]) {
        for (name, x, y, r) in LANDMARK_CIRCLES {
            if !skip.contains(&name) {
                draw_filled_circle_mut(img, (x, y), r, Rgb([235, 235, 235]));
            }
        }
    }

    #[test]
    fn test_landmark_regions_resolve_on_phone_screens() {
        for size in [(720, 1280), (1080, 1920), (1080, 2340)] {
            for landmark in landmarks() {
                let rect = resolve(size, &landmark.region).unwrap();
                assert!(!rect.is_empty(), "{:?} on {:?}", landmark.name, size);
            }
        }
    }

    #[test]
    fn test_locate_translates_to_screenshot_coordinates() {
        let mut gray = GrayImage::from_pixel(720, 1280, Luma([25]));
        draw_filled_circle_mut(&mut gray, (360, 1155), 35, Luma([235]));

        let exit = landmarks()[3];
        let Some(Anchor::Circle { x, y, r }) = locate(&gray, &exit) else {
            panic!("exit landmark not found");
        };

        assert!(x.abs_diff(360) <= 3, "x = {}", x);
        assert!(y.abs_diff(1155) <= 3, "y = {}", y);
        assert!(r.abs_diff(35) <= 3, "r = {}", r);
    }

    #[test]
    fn test_locate_all() {
        let mut img = RgbImage::from_pixel(720, 1280, Rgb([25, 25, 25]));
        draw_landmarks(&mut img, &[AnchorName::GymDetail]);

        let found = locate_all(&image::imageops::grayscale(&img));

        assert_eq!(found.len(), 4);
        assert!(!found.contains_key(&AnchorName::GymDetail));
        assert!(found.contains_key(&AnchorName::GymImage));
    }
}
