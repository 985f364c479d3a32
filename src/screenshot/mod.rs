//! Raid screenshot analysis.
//!
//! [`ScreenshotRaid`] wraps one decoded screenshot. Landmarks are located
//! when it is built; every other property is extracted on first access and
//! cached, failures included, so reading a property twice never runs OCR
//! twice. Extractions that depend on each other (level on the raid phase,
//! boss on the level) pull their dependencies through the same caches.

pub mod anchors;
pub mod error;
pub mod ex_tag;
pub mod frame;
pub mod level;
pub mod templates;
pub mod text;
pub mod timer;

pub use anchors::{Anchor, AnchorName};
pub use error::{ErrorKind, ExtractionError, ScreenshotError, Subject};
pub use templates::LevelTemplates;

use chrono::{Local, NaiveTime, TimeDelta};
use image::RgbImage;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ExtractorConfig;
use crate::data::{Boss, DataSnapshot, Gym, ReferenceData};
use crate::geometry::Rect;
use crate::ocr::TextRecognizer;
use crate::raid::Raid;
use crate::vision::{to_gray, DebugDump, Mark};
use frame::Frame;
use level::Phase;
use timer::TimerWidget;

/// Minutes a hatched boss stays, added to the hatching timer of an egg.
const RAID_DURATION_MINUTES: i64 = 45;

/// Everything an extraction needs besides the screenshot.
pub struct ExtractionContext {
    pub config: ExtractorConfig,
    pub data: Arc<ReferenceData>,
    pub templates: LevelTemplates,
    ocr: Box<dyn TextRecognizer>,
    debug: Option<DebugDump>,
}

impl ExtractionContext {
    pub fn new(config: ExtractorConfig, ocr: Box<dyn TextRecognizer>) -> Self {
        let templates = LevelTemplates::load_or_builtin(config.template_dir.as_deref());
        Self {
            config,
            data: Arc::new(ReferenceData::new()),
            templates,
            ocr,
            debug: None,
        }
    }

    pub fn with_data(mut self, data: Arc<ReferenceData>) -> Self {
        self.data = data;
        self
    }

    pub fn with_templates(mut self, templates: LevelTemplates) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_debug(mut self, debug: DebugDump) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Loads the configured boss and gym sources that are missing or expired.
    ///
    /// Load failures are logged and keep the previous lists.
    pub fn refresh_data(&self) {
        let stale = self
            .data
            .is_stale(self.config.data_expiration(), Local::now());

        if let Some(source) = &self.config.bosses {
            if stale || self.data.bosses().is_none() {
                if let Err(e) = self.data.load_bosses(source) {
                    log::warn!("Bosses list not loaded: {}", e);
                }
            }
        }

        if let Some(source) = &self.config.gyms {
            if stale || self.data.gyms().is_none() {
                if let Err(e) = self.data.load_gyms(source) {
                    log::warn!("Gyms list not loaded: {}", e);
                }
            }
        }
    }
}

type Cached<T> = OnceCell<Result<T, ExtractionError>>;

/// Lazily analyzed raid screenshot.
pub struct ScreenshotRaid<'a> {
    ctx: &'a ExtractionContext,
    img: RgbImage,
    data: DataSnapshot,
    landmarks: BTreeMap<AnchorName, Anchor>,
    now: NaiveTime,
    debug: Option<DebugDump>,

    hatching_box: Cached<Rect>,
    raid_box: Cached<Rect>,
    ex_box: Cached<Rect>,
    hatching_timer: Cached<TimeDelta>,
    raid_timer: Cached<TimeDelta>,
    is_ex: Cached<bool>,
    level: Cached<(u8, Rect)>,
    gym: Cached<Gym>,
    boss: Cached<Boss>,
    time: Cached<NaiveTime>,
}

impl<'a> ScreenshotRaid<'a> {
    /// Wraps a decoded screenshot and locates its landmarks.
    ///
    /// The reference lists are read once here; reloading them later does
    /// not affect this screenshot.
    pub fn new(ctx: &'a ExtractionContext, img: RgbImage) -> Self {
        let landmarks = anchors::locate_all(&to_gray(&img));
        log::debug!("{} landmarks found", landmarks.len());

        Self {
            ctx,
            img,
            data: ctx.data.snapshot(),
            landmarks,
            now: Local::now().time(),
            debug: ctx.debug.clone(),
            hatching_box: OnceCell::new(),
            raid_box: OnceCell::new(),
            ex_box: OnceCell::new(),
            hatching_timer: OnceCell::new(),
            raid_timer: OnceCell::new(),
            is_ex: OnceCell::new(),
            level: OnceCell::new(),
            gym: OnceCell::new(),
            boss: OnceCell::new(),
            time: OnceCell::new(),
        }
    }

    pub fn from_bytes(ctx: &'a ExtractionContext, bytes: &[u8]) -> Result<Self, ScreenshotError> {
        let img = image::load_from_memory(bytes)?.to_rgb8();
        Ok(Self::new(ctx, img))
    }

    /// Replaces the wall-clock time used when the status bar clock is unreadable.
    pub fn at(mut self, now: NaiveTime) -> Self {
        self.now = now;
        self
    }

    /// Sends the intermediate images of this screenshot to `debug`.
    pub fn with_debug(mut self, debug: DebugDump) -> Self {
        self.debug = Some(debug);
        self
    }

    fn frame(&self) -> Frame<'_> {
        Frame::new(&self.img, self.debug.as_ref())
    }

    /// Landmarks plus every widget located so far.
    pub fn anchors(&self) -> BTreeMap<AnchorName, Anchor> {
        let mut found = self.landmarks.clone();

        let located = [
            (AnchorName::HatchingTimer, self.hatching_box.get().and_then(|r| r.ok())),
            (AnchorName::RaidTimer, self.raid_box.get().and_then(|r| r.ok())),
            (
                AnchorName::Level,
                self.level.get().and_then(|r| r.ok()).map(|(_, rect)| rect),
            ),
        ];
        for (name, rect) in located {
            if let Some(rect) = rect {
                found.insert(name, Anchor::Box(rect));
            }
        }

        if let (Some(Ok(true)), Some(Ok(rect))) = (self.is_ex.get(), self.ex_box.get()) {
            found.insert(AnchorName::ExTag, Anchor::Box(*rect));
        }

        found
    }

    /// Number of landmarks found.
    pub fn available_count(&self) -> usize {
        self.landmarks.len()
    }

    pub fn try_hatching_timer_position(&self) -> Result<Rect, ExtractionError> {
        *self.hatching_box.get_or_init(|| {
            timer::find_box(&self.frame(), &TimerWidget::hatching()).inspect_err(log_failure)
        })
    }

    pub fn try_raid_timer_position(&self) -> Result<Rect, ExtractionError> {
        *self.raid_box.get_or_init(|| {
            timer::find_box(&self.frame(), &TimerWidget::raid()).inspect_err(log_failure)
        })
    }

    pub fn try_ex_tag_position(&self) -> Result<Rect, ExtractionError> {
        *self
            .ex_box
            .get_or_init(|| ex_tag::find_box(&self.frame()).inspect_err(log_failure))
    }

    pub fn hatching_timer_position(&self) -> Option<Rect> {
        self.try_hatching_timer_position().ok()
    }

    pub fn raid_timer_position(&self) -> Option<Rect> {
        self.try_raid_timer_position().ok()
    }

    pub fn ex_tag_position(&self) -> Option<Rect> {
        self.try_ex_tag_position().ok()
    }

    pub fn try_hatching_timer(&self) -> Result<TimeDelta, ExtractionError> {
        *self.hatching_timer.get_or_init(|| {
            let timer_box = self.try_hatching_timer_position()?;
            timer::read(
                &self.frame(),
                self.ctx.ocr.as_ref(),
                &timer_box,
                self.ctx.config.cutoffs.timer,
                Subject::HatchingTimer,
            )
            .inspect_err(log_failure)
        })
    }

    pub fn try_raid_timer(&self) -> Result<TimeDelta, ExtractionError> {
        *self.raid_timer.get_or_init(|| {
            let timer_box = self.try_raid_timer_position()?;
            timer::read(
                &self.frame(),
                self.ctx.ocr.as_ref(),
                &timer_box,
                self.ctx.config.cutoffs.timer,
                Subject::RaidTimer,
            )
            .inspect_err(log_failure)
        })
    }

    pub fn hatching_timer(&self) -> Option<TimeDelta> {
        self.try_hatching_timer().ok()
    }

    pub fn raid_timer(&self) -> Option<TimeDelta> {
        self.try_raid_timer().ok()
    }

    /// Hatching timer of an egg, raid timer of a hatched boss.
    pub fn timer(&self) -> Option<TimeDelta> {
        if self.is_egg() {
            self.hatching_timer()
        } else {
            self.raid_timer()
        }
    }

    pub fn try_is_ex(&self) -> Result<bool, ExtractionError> {
        *self.is_ex.get_or_init(|| {
            let tag_box = self.try_ex_tag_position()?;
            ex_tag::confirm(
                &self.frame(),
                self.ctx.ocr.as_ref(),
                &tag_box,
                self.ctx.config.cutoffs.ex_tag,
            )
            .inspect_err(log_failure)
        })
    }

    pub fn is_ex(&self) -> bool {
        self.try_is_ex().unwrap_or(false)
    }

    pub fn try_level(&self) -> Result<u8, ExtractionError> {
        self.level_with_box().map(|(level, _)| level)
    }

    fn level_with_box(&self) -> Result<(u8, Rect), ExtractionError> {
        *self.level.get_or_init(|| {
            let phase = match self.hatching_timer_position() {
                Some(timer_box) if self.is_egg() => Phase::Egg { timer_box },
                _ => Phase::Hatched,
            };
            level::find(
                &self.frame(),
                &self.ctx.templates,
                &self.ctx.config.level,
                &phase,
            )
            .inspect_err(log_failure)
        })
    }

    pub fn level(&self) -> Option<u8> {
        self.try_level().ok()
    }

    pub fn try_gym(&self) -> Result<&Gym, ExtractionError> {
        self.gym
            .get_or_init(|| {
                let text = text::read_gym_name(
                    &self.frame(),
                    self.ctx.ocr.as_ref(),
                    self.landmarks.get(&AnchorName::GymImage).copied(),
                    self.ctx.config.cutoffs.gym,
                )
                .inspect_err(log_failure)?;

                Ok(self
                    .data
                    .find_gym(&text, self.ctx.config.similarity.gym)
                    .unwrap_or_else(|| Gym::new(&text)))
            })
            .as_ref()
            .map_err(|e| *e)
    }

    pub fn gym(&self) -> Option<&Gym> {
        self.try_gym().ok()
    }

    pub fn try_boss(&self) -> Result<&Boss, ExtractionError> {
        self.boss
            .get_or_init(|| {
                if !self.data.has_bosses() {
                    let err = ExtractionError::list_unavailable(Subject::Boss);
                    log_failure(&err);
                    return Err(err);
                }

                let level_box = self.level_with_box().ok().map(|(_, rect)| rect);
                let text = text::read_boss_text(
                    &self.frame(),
                    self.ctx.ocr.as_ref(),
                    level_box,
                    self.ctx.config.cutoffs.boss,
                )
                .inspect_err(log_failure)?;

                self.data
                    .find_boss(&text, self.ctx.config.similarity.boss)
                    .ok_or_else(|| {
                        let err = ExtractionError::not_found(Subject::Boss);
                        log_failure(&err);
                        err
                    })
            })
            .as_ref()
            .map_err(|e| *e)
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.try_boss().ok()
    }

    /// Resolves a boss name typed by a user, with the stricter correction threshold.
    pub fn correct_boss(&self, text: &str) -> Option<Boss> {
        self.data
            .find_boss(text, self.ctx.config.similarity.boss_correction)
    }

    /// Clock of the status bar. Not read when disabled in the configuration.
    pub fn try_time(&self) -> Result<NaiveTime, ExtractionError> {
        *self.time.get_or_init(|| {
            if !self.ctx.config.read_notification_time {
                return Err(ExtractionError::not_found(Subject::Time));
            }

            text::read_time(
                &self.frame(),
                self.ctx.ocr.as_ref(),
                self.landmarks.get(&AnchorName::GymImage).copied(),
            )
            .inspect_err(log_failure)
        })
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.try_time().ok()
    }

    /// Enough landmarks and one of the two countdown widgets.
    pub fn is_raid(&self) -> bool {
        if self.available_count() < anchors::MIN_LANDMARKS {
            return false;
        }

        self.hatching_timer_position().is_some() || self.raid_timer_position().is_some()
    }

    pub fn is_egg(&self) -> bool {
        self.hatching_timer().is_some()
    }

    pub fn is_hatched(&self) -> bool {
        !self.is_egg()
    }

    fn reference_time(&self) -> NaiveTime {
        self.time().unwrap_or(self.now)
    }

    /// Time the egg hatches.
    pub fn hatching(&self) -> Option<NaiveTime> {
        self.hatching_timer().map(|t| self.reference_time() + t)
    }

    /// Time the raid ends.
    pub fn end(&self) -> Option<NaiveTime> {
        if self.is_hatched() {
            self.raid_timer().map(|t| self.reference_time() + t)
        } else {
            self.hatching_timer()
                .map(|t| self.reference_time() + t + TimeDelta::minutes(RAID_DURATION_MINUTES))
        }
    }

    /// Writes the anchors overlay to the debug folder, when there is one.
    pub fn dump_anchors(&self) {
        if let Some(debug) = &self.debug {
            let marks: Vec<Mark> = self.anchors().values().map(Anchor::to_mark).collect();
            debug.anchors(&self.img, &marks);
        }
    }

    pub fn to_raid(&self) -> Raid {
        let mut raid = Raid::new();
        raid.gym = self.gym().cloned();
        raid.level = self.level();
        raid.is_ex = self.is_ex();
        raid.end = self.end();
        raid.is_aprx_time = self.time().is_none();

        if self.is_hatched() {
            raid.is_hatched = true;
            raid.boss = self.boss().cloned();
        } else {
            raid.is_hatched = false;
            raid.hatching = self.hatching();
        }

        raid
    }
}

fn log_failure(e: &ExtractionError) {
    log::debug!("{}", e);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BossList;
    use crate::ocr::testing::ScriptedOcr;
    use crate::screenshot::anchors::tests::draw_landmarks;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect as DrawRect;
    use std::rc::Rc;

    fn screenshot(skip: &[AnchorName]) -> RgbImage {
        let mut img = RgbImage::from_pixel(720, 1280, Rgb([25, 25, 25]));
        draw_landmarks(&mut img, skip);
        img
    }

    fn egg_screenshot(skip: &[AnchorName]) -> RgbImage {
        let mut img = screenshot(skip);
        draw_filled_rect_mut(
            &mut img,
            DrawRect::at(300, 240).of_size(120, 50),
            Rgb([245, 134, 171]),
        );
        img
    }

    fn hatched_screenshot(skip: &[AnchorName]) -> RgbImage {
        let mut img = screenshot(skip);
        draw_filled_rect_mut(
            &mut img,
            DrawRect::at(560, 720).of_size(90, 40),
            Rgb([245, 80, 63]),
        );
        img
    }

    /// Pastes `n` hatched-boss stars in a row starting at (`x`, `y`).
    fn paste_hatched_stars(img: &mut RgbImage, n: u32, x: u32, y: u32) {
        let star = image::DynamicImage::ImageLuma8(templates::star(30).image).to_rgb8();
        for i in 0..n {
            image::imageops::replace(img, &star, (x + i * 40) as i64, y as i64);
        }
    }

    fn bosses() -> Arc<ReferenceData> {
        let data = Arc::new(ReferenceData::new());
        data.set_bosses(BossList::new(vec![
            Boss::with_level("Groudon", 5),
            Boss::with_level("Mewtwo", 5),
        ]));
        data
    }

    fn context(ocr: &Rc<ScriptedOcr>) -> ExtractionContext {
        ExtractionContext::new(ExtractorConfig::default(), Box::new(Rc::clone(ocr)))
    }

    fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_egg_screenshot() {
        let ocr = Rc::new(ScriptedOcr::always("1:23:45"));
        let ctx = context(&ocr);
        let shot = ScreenshotRaid::new(&ctx, egg_screenshot(&[AnchorName::GymDetail]))
            .at(hms(0, 0, 0));

        assert_eq!(shot.available_count(), 4);
        assert!(shot.is_raid());
        assert!(shot.is_egg());
        assert!(!shot.is_hatched());
        assert_eq!(shot.hatching_timer(), Some(TimeDelta::seconds(5025)));

        // The status bar reads "1:23" from the same text
        assert_eq!(shot.time(), Some(hms(1, 23, 0)));
        assert_eq!(shot.hatching(), Some(hms(2, 46, 45)));
        assert_eq!(shot.end(), Some(hms(3, 31, 45)));

        let raid = shot.to_raid();
        assert!(!raid.is_hatched);
        assert!(!raid.is_aprx_time);
        assert!(!raid.is_ex);
        assert!(raid.boss.is_none());
        assert_eq!(raid.hatching, Some(hms(2, 46, 45)));
        assert_eq!(raid.gym.map(|g| g.name), Some("1:23:45".to_string()));
    }

    #[test]
    fn test_hatched_screenshot() {
        let ocr = Rc::new(ScriptedOcr::always("MEWTWO").then("0:45:00"));
        let mut config = ExtractorConfig::default();
        config.read_notification_time = false;
        let ctx = ExtractionContext::new(config, Box::new(Rc::clone(&ocr))).with_data(bosses());
        let shot = ScreenshotRaid::new(&ctx, hatched_screenshot(&[])).at(hms(10, 0, 0));

        assert!(shot.is_raid());
        assert!(shot.raid_timer_position().is_some());
        assert!(shot.hatching_timer_position().is_none());
        assert!(!shot.is_egg());
        assert!(shot.is_hatched());

        assert_eq!(shot.raid_timer(), Some(TimeDelta::seconds(2700)));
        assert_eq!(shot.timer(), Some(TimeDelta::seconds(2700)));
        assert_eq!(shot.hatching(), None);
        assert_eq!(shot.end(), Some(hms(10, 45, 0)));

        let raid = shot.to_raid();
        assert!(raid.is_hatched);
        assert!(raid.is_aprx_time);
        assert_eq!(raid.hatching, None);
        assert_eq!(raid.end, Some(hms(10, 45, 0)));
        assert_eq!(raid.boss, Some(Boss::with_level("Mewtwo", 5)));
        assert_eq!(raid.effective_level(), Some(5));
    }

    #[test]
    fn test_level_places_the_boss_band() {
        let dir = tempfile::tempdir().unwrap();
        let mut img = hatched_screenshot(&[]);
        paste_hatched_stars(&mut img, 3, 250, 160);

        let ocr = Rc::new(ScriptedOcr::always("MEWTWO"));
        let ctx = context(&ocr).with_data(bosses());
        let shot = ScreenshotRaid::new(&ctx, img).with_debug(DebugDump::new(dir.path()));

        assert_eq!(shot.level(), Some(3));
        let Some(Anchor::Box(level_box)) = shot.anchors().get(&AnchorName::Level).copied() else {
            panic!("level box missing from anchors");
        };
        assert!(level_box.y1.abs_diff(190) <= 2, "{:?}", level_box);

        assert_eq!(shot.boss().map(|b| b.name.as_str()), Some("Mewtwo"));
        // 130 px below the stars; the fixed fallback band is 141 px high
        let band = image::open(dir.path().join("boss.png")).unwrap().to_luma8();
        assert_eq!(band.height(), 130);
    }

    #[test]
    fn test_landmarks_without_timer_is_not_a_raid() {
        let ocr = Rc::new(ScriptedOcr::always("0:45:00"));
        let ctx = context(&ocr);
        let shot = ScreenshotRaid::new(&ctx, screenshot(&[]));

        assert_eq!(shot.available_count(), 5);
        assert!(shot.hatching_timer_position().is_none());
        assert!(shot.raid_timer_position().is_none());
        assert!(!shot.is_raid());
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn test_three_landmarks_is_not_a_raid() {
        let ocr = Rc::new(ScriptedOcr::always("1:23:45"));
        let ctx = context(&ocr);
        let shot = ScreenshotRaid::new(
            &ctx,
            egg_screenshot(&[AnchorName::GymDetail, AnchorName::Gym]),
        );

        assert_eq!(shot.available_count(), 3);
        assert!(!shot.is_raid());
    }

    #[test]
    fn test_properties_are_computed_once() {
        let ocr = Rc::new(ScriptedOcr::always("1:23:45"));
        let ctx = context(&ocr);
        let shot = ScreenshotRaid::new(&ctx, egg_screenshot(&[])).at(hms(12, 0, 0));

        let first = shot.to_raid();
        let calls = ocr.calls();
        let second = shot.to_raid();

        assert_eq!(ocr.calls(), calls);
        assert_eq!(first.end, second.end);
        assert_eq!(first.gym, second.gym);
        assert_ne!(first.code, second.code);
    }

    #[test]
    fn test_approximate_time_without_clock() {
        let ocr = Rc::new(ScriptedOcr::always("0:30:00"));
        let mut config = ExtractorConfig::default();
        config.read_notification_time = false;
        let ctx = ExtractionContext::new(config, Box::new(Rc::clone(&ocr)));
        let shot = ScreenshotRaid::new(&ctx, egg_screenshot(&[])).at(hms(10, 0, 0));

        assert_eq!(shot.try_time(), Err(ExtractionError::not_found(Subject::Time)));
        assert_eq!(shot.hatching(), Some(hms(10, 30, 0)));
        assert_eq!(shot.end(), Some(hms(11, 15, 0)));
        assert!(shot.to_raid().is_aprx_time);
    }

    #[test]
    fn test_boss_needs_a_list() {
        let ocr = Rc::new(ScriptedOcr::always("MEWTWO"));
        let ctx = context(&ocr);
        let shot = ScreenshotRaid::new(&ctx, screenshot(&[]));

        assert_eq!(
            shot.try_boss(),
            Err(ExtractionError::list_unavailable(Subject::Boss))
        );
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn test_boss_from_list() {
        let ocr = Rc::new(ScriptedOcr::always("MEWTW0"));
        let ctx = context(&ocr).with_data(bosses());
        let shot = ScreenshotRaid::new(&ctx, screenshot(&[]));

        assert!(shot.is_hatched());
        assert_eq!(shot.boss().map(|b| b.name.as_str()), Some("Mewtwo"));
        assert_eq!(shot.correct_boss("mewtw"), Some(Boss::with_level("Mewtwo", 5)));
        assert_eq!(shot.correct_boss("mew"), None);
    }

    #[test]
    fn test_anchors_include_located_widgets() {
        let ocr = Rc::new(ScriptedOcr::always("1:23:45"));
        let ctx = context(&ocr);
        let shot = ScreenshotRaid::new(&ctx, egg_screenshot(&[]));

        assert!(!shot.anchors().contains_key(&AnchorName::HatchingTimer));
        shot.hatching_timer_position();
        assert!(matches!(
            shot.anchors().get(&AnchorName::HatchingTimer),
            Some(Anchor::Box(_))
        ));
    }

    #[test]
    fn test_debug_dump() {
        let dir = tempfile::tempdir().unwrap();
        let ocr = Rc::new(ScriptedOcr::always("1:23:45"));
        let ctx = context(&ocr);
        let shot = ScreenshotRaid::new(&ctx, egg_screenshot(&[]))
            .with_debug(DebugDump::new(dir.path()));

        assert!(shot.is_raid());
        shot.dump_anchors();

        assert!(dir.path().join("hatching_timer_mask.png").exists());
        assert!(dir.path().join("anchors.png").exists());
    }

    #[test]
    fn test_undecodable_bytes() {
        let ocr = Rc::new(ScriptedOcr::always(""));
        let ctx = context(&ocr);

        assert!(matches!(
            ScreenshotRaid::from_bytes(&ctx, b"not an image"),
            Err(ScreenshotError::Decode(_))
        ));
    }
}
