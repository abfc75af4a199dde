// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::api::DetectQuery;
use crate::config::Settings;
use crate::vision::{inference, validate_and_load, ModelManager};

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Image file to run detection on
    pub image: PathBuf,

    /// Model path (defaults to MODEL_PATH)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Confidence threshold (0.01 - 0.99)
    #[arg(long)]
    pub conf: Option<f32>,

    /// NMS IoU threshold (0.01 - 0.99)
    #[arg(long)]
    pub iou: Option<f32>,

    /// Maximum detections (1 - 1000)
    #[arg(long)]
    pub max_det: Option<u32>,

    /// Model input size (320 - 1280)
    #[arg(long)]
    pub img_size: Option<u32>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Content type implied by a file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub async fn run_detect(args: DetectArgs, settings: Settings) -> Result<()> {
    let params = DetectQuery {
        conf: args.conf,
        iou: args.iou,
        max_det: args.max_det,
        img_size: args.img_size,
    }
    .resolve(&settings.defaults)?;

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    let image = validate_and_load(&bytes, Some(content_type_for(&args.image)), &settings.upload_limits())?;

    let model_path = args.model.unwrap_or_else(|| settings.model_path.clone());
    let manager = ModelManager::new().with_input_size(settings.model_input_size);
    manager.load(&model_path).await?;
    let model = manager.get().await?;

    info!("Running detection on {}", args.image.display());
    let classes = settings.classes.clone();
    let response = tokio::task::spawn_blocking(move || {
        inference::run(&image, &params, model.as_ref(), &classes)
    })
    .await??;
    manager.release().await;

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);
    Ok(())
}
