//! Extractor configuration.
//!
//! Loaded from a JSON file at startup. Every field has a default, so a
//! config file only needs the values it overrides.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::get_exe_dir;

/// Tesseract invocation settings, shared by every extractor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// OCR engine mode (1 = LSTM)
    pub oem: u8,
    /// Page segmentation mode (3 = fully automatic)
    pub psm: u8,
    pub language: String,
    /// Explicit tesseract executable; searched for when absent
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory; searched for when absent
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            oem: 1,
            psm: 3,
            language: "eng".to_string(),
            tesseract_path: None,
            tessdata_dir: None,
        }
    }
}

/// Gray levels above which pixels count as text before OCR.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeCutoffs {
    pub timer: u8,
    pub ex_tag: u8,
    pub gym: u8,
    pub boss: u8,
}

impl Default for BinarizeCutoffs {
    fn default() -> Self {
        Self {
            timer: 210,
            ex_tag: 210,
            gym: 220,
            boss: 240,
        }
    }
}

/// Minimum template correlation for a level marker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelThresholds {
    pub egg: f32,
    pub hatched: f32,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            egg: 0.914,
            hatched: 0.94,
        }
    }
}

/// Minimum name similarity for reference data lookups.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityThresholds {
    pub gym: f64,
    pub boss: f64,
    /// Used for names typed by users when correcting a boss
    pub boss_correction: f64,
}

impl Default for SimilarityThresholds {
    fn default() -> Self {
        Self {
            gym: 0.6,
            boss: 0.4,
            boss_correction: 0.8,
        }
    }
}

/// Complete extractor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub ocr: OcrSettings,
    #[serde(default)]
    pub cutoffs: BinarizeCutoffs,
    #[serde(default)]
    pub level: LevelThresholds,
    #[serde(default)]
    pub similarity: SimilarityThresholds,
    /// Read the status bar clock to anchor times; otherwise times are
    /// relative to the moment of extraction
    #[serde(default = "default_read_notification_time")]
    pub read_notification_time: bool,
    /// Directory with egg.png, egg_mask.png, hatched.png, hatched_mask.png
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    /// Boss list file or URL
    #[serde(default)]
    pub bosses: Option<String>,
    /// Gym list file or URL
    #[serde(default)]
    pub gyms: Option<String>,
    /// Age after which reference lists should be reloaded
    #[serde(default = "default_data_expiration_hours")]
    pub data_expiration_hours: i64,
    /// Lifetime of a stored raid record
    #[serde(default = "default_raid_ttl_hours")]
    pub raid_ttl_hours: i64,
}

fn default_read_notification_time() -> bool {
    true
}

fn default_data_expiration_hours() -> i64 {
    24
}

fn default_raid_ttl_hours() -> i64 {
    6
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ocr: OcrSettings::default(),
            cutoffs: BinarizeCutoffs::default(),
            level: LevelThresholds::default(),
            similarity: SimilarityThresholds::default(),
            read_notification_time: default_read_notification_time(),
            template_dir: None,
            bosses: None,
            gyms: None,
            data_expiration_hours: default_data_expiration_hours(),
            raid_ttl_hours: default_raid_ttl_hours(),
        }
    }
}

impl ExtractorConfig {
    pub fn data_expiration(&self) -> TimeDelta {
        TimeDelta::hours(self.data_expiration_hours)
    }

    pub fn raid_ttl(&self) -> TimeDelta {
        TimeDelta::hours(self.raid_ttl_hours)
    }
}

/// Returns the default config location: `<exe_dir>/config.json`
pub fn default_config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Loads configuration from `path` (or the default location) or returns
/// defaults when the file is missing or invalid.
pub fn load_config(path: Option<&Path>) -> ExtractorConfig {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    log::debug!("Looking for config at: {}", config_path.display());

    if !config_path.exists() {
        log::info!("{} not found. Using default config.", config_path.display());
        return ExtractorConfig::default();
    }

    match fs::read_to_string(&config_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                log::info!("Config loaded from {}", config_path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                ExtractorConfig::default()
            }
        },
        Err(e) => {
            log::warn!(
                "Failed to read {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            ExtractorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();

        assert_eq!(config.ocr.oem, 1);
        assert_eq!(config.ocr.psm, 3);
        assert_eq!(config.cutoffs.boss, 240);
        assert_eq!(config.level.egg, 0.914);
        assert_eq!(config.similarity.boss_correction, 0.8);
        assert!(config.read_notification_time);
        assert_eq!(config.raid_ttl(), TimeDelta::hours(6));
        assert_eq!(config.data_expiration(), TimeDelta::hours(24));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"cutoffs": {"gym": 200}, "read_notification_time": false, "bosses": "bosses.csv"}"#,
        )
        .unwrap();

        let config = load_config(Some(&path));

        assert_eq!(config.cutoffs.gym, 200);
        assert_eq!(config.cutoffs.timer, 210);
        assert!(!config.read_notification_time);
        assert_eq!(config.bosses.as_deref(), Some("bosses.csv"));
        assert_eq!(config.ocr, OcrSettings::default());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_config(Some(&path)), ExtractorConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");

        assert_eq!(load_config(Some(&path)), ExtractorConfig::default());
    }
}
