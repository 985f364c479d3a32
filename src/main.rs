//! raidshot
//!
//! Reads raid screenshots and prints the raid they show as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use raidshot::config::load_config;
use raidshot::ocr::setup::ensure_tessdata;
use raidshot::ocr::Tesseract;
use raidshot::raid::{MemoryStore, RaidStore};
use raidshot::screenshot::{ExtractionContext, ScreenshotRaid};
use raidshot::vision::DebugDump;
use raidshot::{logging, paths};

#[derive(Parser, Debug)]
#[command(version, about = "Extracts raid information from game screenshots")]
struct Cli {
    /// Screenshots to analyze
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Configuration file (defaults to config.json next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Boss list, as a file path or URL
    #[arg(long)]
    bosses: Option<String>,

    /// Gym list, as a file path or URL
    #[arg(long)]
    gyms: Option<String>,

    /// Folder for intermediate images; one subfolder per screenshot
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Log file (defaults to logs/raidshot.log next to the executable)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// More output; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| paths::get_logs_dir().join("raidshot.log"));
    logging::init(cli.verbose, Some(&log_file))?;

    let mut config = load_config(cli.config.as_deref());
    if cli.bosses.is_some() {
        config.bosses = cli.bosses.clone();
    }
    if cli.gyms.is_some() {
        config.gyms = cli.gyms.clone();
    }
    if config.template_dir.is_none() {
        let dir = paths::get_level_template_dir();
        if dir.exists() {
            config.template_dir = Some(dir);
        }
    }

    if let Err(e) = ensure_tessdata(&config.ocr) {
        log::warn!("Failed to set up tessdata: {:#}", e);
    }
    let tesseract = Tesseract::from_settings(&config.ocr).context("Tesseract is not available")?;

    let ctx = ExtractionContext::new(config, Box::new(tesseract));
    ctx.refresh_data();
    let mut store = MemoryStore::new(ctx.config.raid_ttl());

    let mut failed = 0;
    for path in &cli.images {
        if let Err(e) = analyze(&ctx, &mut store, path, cli.debug_dir.as_deref()) {
            log::error!("{}: {:#}", path.display(), e);
            failed += 1;
        }
    }

    anyhow::ensure!(failed == 0, "{} of {} screenshots failed", failed, cli.images.len());
    Ok(())
}

fn analyze(
    ctx: &ExtractionContext,
    store: &mut dyn RaidStore,
    path: &Path,
    debug_dir: Option<&Path>,
) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut shot = ScreenshotRaid::from_bytes(ctx, &bytes)?;
    if let Some(dir) = debug_dir {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "screenshot".to_string());
        shot = shot.with_debug(DebugDump::new(dir.join(stem)));
    }

    let is_raid = shot.is_raid();
    let raid = is_raid.then(|| shot.to_raid());
    shot.dump_anchors();

    match raid {
        Some(raid) => {
            store.save(&raid)?;
            log::debug!("Stored raid {} from {}", raid.code, path.display());
            println!("{}: {}", path.display(), serde_json::to_string_pretty(&raid)?);
        }
        None => println!("{}: not a raid", path.display()),
    }
    Ok(())
}
