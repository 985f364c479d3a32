use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};
use super::TextRecognizer;
use crate::config::OcrSettings;

/// Tesseract command-line engine.
///
/// Every call writes the image to a temporary PNG and reads the recognized
/// text from the process's standard output.
#[derive(Debug, Clone)]
pub struct Tesseract {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    language: String,
    oem: u8,
    psm: u8,
}

impl Tesseract {
    /// Locates the executable and the language data described by `settings`.
    ///
    /// A missing tessdata directory is not fatal: tesseract then falls back
    /// to its compiled-in search path.
    pub fn from_settings(settings: &OcrSettings) -> Result<Self> {
        let executable = find_tesseract_executable(settings.tesseract_path.as_deref())?;
        let tessdata = match find_tessdata_dir(settings.tessdata_dir.as_deref(), &settings.language) {
            Ok(dir) => Some(dir),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        };

        log::info!(
            "Using tesseract {} (tessdata: {})",
            executable.display(),
            tessdata
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "default".to_string())
        );

        Ok(Self {
            executable,
            tessdata,
            language: settings.language.clone(),
            oem: settings.oem,
            psm: settings.psm,
        })
    }

    fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
        ];
        if let Some(dir) = &self.tessdata {
            args.push("--tessdata-dir".to_string());
            args.push(dir.to_string_lossy().to_string());
        }
        args
    }
}

impl TextRecognizer for Tesseract {
    fn recognize(&self, img: &GrayImage) -> Result<String> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())
            .context("Failed to write OCR input image")?;

        let output = Command::new(&self.executable)
            .arg(temp_input.path())
            .args(self.command_args())
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
