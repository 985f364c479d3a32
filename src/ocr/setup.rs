//! Locating tesseract and its language data.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::OcrSettings;
use crate::paths::get_tesseract_dir;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

const COMMON_EXECUTABLES: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

const SYSTEM_TESSDATA: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

fn executable_name() -> &'static str {
    if cfg!(windows) {
        "tesseract.exe"
    } else {
        "tesseract"
    }
}

fn has_traineddata(dir: &Path, language: &str) -> bool {
    dir.join(format!("{}.traineddata", language)).exists()
}

/// Finds the tesseract executable.
///
/// Order: configured path, local data directory, `PATH`, common install
/// locations. A configured path that does not exist is an error.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!(
            "Configured tesseract executable not found: {}",
            path.display()
        ));
    }

    let local_exe = get_tesseract_dir().join(executable_name());
    if local_exe.exists() {
        return Ok(local_exe);
    }

    if let Ok(output) = std::process::Command::new("tesseract")
        .arg("--version")
        .output()
    {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    for path in COMMON_EXECUTABLES {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds a tessdata directory holding `<language>.traineddata`.
///
/// Order: configured directory, local data directory, system locations,
/// `TESSDATA_PREFIX`.
pub fn find_tessdata_dir(configured: Option<&Path>, language: &str) -> Result<PathBuf> {
    if let Some(dir) = configured {
        if has_traineddata(dir, language) {
            return Ok(dir.to_path_buf());
        }
        log::warn!(
            "Configured tessdata directory {} has no {}.traineddata",
            dir.display(),
            language
        );
    }

    let local_tessdata = get_tesseract_dir().join("tessdata");
    if has_traineddata(&local_tessdata, language) {
        return Ok(local_tessdata);
    }

    for path in SYSTEM_TESSDATA {
        let p = PathBuf::from(path);
        if has_traineddata(&p, language) {
            return Ok(p);
        }
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if has_traineddata(&p, language) {
            return Ok(p);
        }
        let p = p.join("tessdata");
        if has_traineddata(&p, language) {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "tessdata directory not found. Please ensure {}.traineddata is available.",
        language
    ))
}

/// Makes sure language data is available, downloading it into the local
/// data directory when no tessdata directory has it.
pub fn ensure_tessdata(settings: &OcrSettings) -> Result<PathBuf> {
    if let Ok(dir) = find_tessdata_dir(settings.tessdata_dir.as_deref(), &settings.language) {
        log::info!("Tessdata found at: {}", dir.display());
        return Ok(dir);
    }

    let tessdata_dir = get_tesseract_dir().join("tessdata");
    fs::create_dir_all(&tessdata_dir)
        .with_context(|| format!("Failed to create {}", tessdata_dir.display()))?;
    download_tessdata(&tessdata_dir, &settings.language)?;

    Ok(tessdata_dir)
}

fn download_tessdata(tessdata_dir: &Path, language: &str) -> Result<()> {
    let file_name = format!("{}.traineddata", language);
    let url = format!("{}/{}", TESSDATA_REPO, file_name);
    let path = tessdata_dir.join(&file_name);

    log::info!("Downloading {}...", file_name);

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "raidshot")
        .send()?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            file_name,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&path)?;
    file.write_all(&bytes)?;

    log::info!("Downloaded {} ({} bytes)", file_name, bytes.len());

    Ok(())
}
