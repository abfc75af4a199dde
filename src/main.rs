// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use std::{env, sync::Arc};
use thermaleye_node::{
    api::{start_server, AppState},
    config::Settings,
    version,
    vision::ModelManager,
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("Starting {}", version::get_version_string());

    let settings = Settings::from_env();
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    info!("Loading model from {}", settings.model_path.display());
    let model_manager =
        Arc::new(ModelManager::new().with_input_size(settings.model_input_size));
    if let Err(e) = model_manager.load(&settings.model_path).await {
        error!("Model load failed: {}", e);
        return Err(e.into());
    }

    let state = AppState::new(settings, Arc::clone(&model_manager));

    start_server(state, async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    })
    .await?;

    model_manager.release().await;
    info!("Shutdown complete");
    Ok(())
}
