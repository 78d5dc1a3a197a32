use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use image::ImageFormat;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::WalkDir;

use cloth_seg_rs::{Config, MaskPipeline, SegformerModel};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::parse();

    ensure!(config.input_dir.exists(), "Input directory does not exist");
    ensure!(
        ImageFormat::from_extension(&config.format).is_some(),
        "Invalid format"
    );

    let model = SegformerModel::load(&config.models_dir, config.device_id)?;
    tracing::info!("model ready ({})", model.source());

    let toggles = config.toggles();
    let pipeline = MaskPipeline::new(model);

    let image_paths = WalkDir::new(&config.input_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file() && ImageFormat::from_path(e.path()).is_ok())
        .map(walkdir::DirEntry::into_path)
        .collect::<Vec<_>>();

    let progress_bar = ProgressBar::new(image_paths.len() as u64);
    progress_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec} {eta})",
        )?
        .progress_chars("#>-"),
    );

    image_paths
        .par_iter()
        .progress_with(progress_bar.clone())
        .try_for_each(|path| -> Result<()> {
            let image = image::open(path)
                .with_context(|| format!("Failed to open image: {}", path.display()))?
                .into_rgb8();

            let mask = pipeline.mask_image(&image, &toggles)?;
            let output_path = construct_output_path(path, &config)?;
            mask.save(&output_path)
                .with_context(|| format!("Failed to save image: {}", output_path.display()))
        })?;

    progress_bar.finish();

    Ok(())
}

fn construct_output_path(path: &Path, config: &Config) -> Result<PathBuf> {
    let relative = path
        .strip_prefix(&config.input_dir)
        .with_context(|| format!("Input file outside input directory: {}", path.display()))?;
    let output_path = config.output_dir.join(relative);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(output_path.with_extension(&config.format))
}
