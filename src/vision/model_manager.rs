// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model handle: owns the loaded detector for the lifetime of the service

use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::vision::detection::RawDetection;
use crate::vision::params::PredictParams;
use crate::vision::yolo::YoloOnnxModel;

/// A loaded object detector
///
/// Implementations must be safe to call concurrently from the blocking pool.
pub trait ObjectDetector: Send + Sync {
    /// Run detection on an RGB image
    ///
    /// Boxes are returned in source-image pixels, highest confidence first.
    fn predict(&self, image: &RgbImage, params: &PredictParams) -> anyhow::Result<Vec<RawDetection>>;
}

/// Shared reference handed out to request handlers
pub type ModelRef = Arc<dyn ObjectDetector>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model not found at {0}")]
    ModelNotFound(String),

    #[error("Failed to load model from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Model not ready yet.")]
    ModelNotReady,
}

struct LoadedModel {
    detector: ModelRef,
    path: PathBuf,
}

/// Manager for the detection model
///
/// Loaded once at startup, released at shutdown. Readers take a cheap `Arc`
/// clone and drop the lock before running inference.
pub struct ModelManager {
    slot: RwLock<Option<LoadedModel>>,
    input_size: Option<u32>,
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelManager {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            input_size: None,
        }
    }

    /// Fix the model input size for static-shape exports
    pub fn with_input_size(mut self, input_size: Option<u32>) -> Self {
        self.input_size = input_size;
        self
    }

    /// Load the ONNX detector from `path`
    pub async fn load<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        if !path.is_file() {
            warn!("Model file missing: {}", path.display());
            return Err(ModelError::ModelNotFound(path.display().to_string()));
        }

        let model = YoloOnnxModel::new(path, self.input_size)
            .await
            .map_err(|e| ModelError::LoadFailed {
                path: path.display().to_string(),
                reason: format!("{:#}", e),
            })?;

        self.install(path, Arc::new(model)).await;
        Ok(())
    }

    /// Install an already-built detector
    pub async fn install<P: AsRef<Path>>(&self, path: P, detector: ModelRef) {
        let path = path.as_ref().to_path_buf();
        info!("Model ready: {}", path.display());
        *self.slot.write().await = Some(LoadedModel { detector, path });
    }

    /// Get the loaded detector
    pub async fn get(&self) -> Result<ModelRef, ModelError> {
        self.slot
            .read()
            .await
            .as_ref()
            .map(|loaded| Arc::clone(&loaded.detector))
            .ok_or(ModelError::ModelNotReady)
    }

    /// Drop the in-memory model
    pub async fn release(&self) {
        if let Some(loaded) = self.slot.write().await.take() {
            info!("Model released: {}", loaded.path.display());
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Path of the loaded model, if any
    pub async fn model_path(&self) -> Option<PathBuf> {
        self.slot.read().await.as_ref().map(|loaded| loaded.path.clone())
    }
}
