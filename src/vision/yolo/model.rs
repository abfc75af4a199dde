// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime backed YOLO detector
//!
//! Loads an exported YOLO-family model (single output head, either
//! `[1, 4 + nc, N]` or `[1, N, 4 + nc]`) and runs it on CPU.

use anyhow::{Context, Result};
use image::RgbImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::postprocessing::{decode_output, non_max_suppression};
use super::preprocessing::{effective_input_size, letterbox};
use crate::vision::detection::RawDetection;
use crate::vision::model_manager::ObjectDetector;
use crate::vision::params::PredictParams;

/// YOLO detector backed by an ONNX Runtime session
pub struct YoloOnnxModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    /// Static-shape exports only accept one input size
    fixed_input_size: Option<u32>,
}

impl std::fmt::Debug for YoloOnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloOnnxModel")
            .field("input_name", &self.input_name)
            .field("fixed_input_size", &self.fixed_input_size)
            .finish()
    }
}

impl YoloOnnxModel {
    /// Load a detection model from an ONNX file
    ///
    /// # Arguments
    /// - `model_path`: Path to the exported model
    /// - `fixed_input_size`: Input size for static-shape exports; `None` follows `img_size`
    pub async fn new<P: AsRef<Path>>(model_path: P, fixed_input_size: Option<u32>) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(input) = session.inputs.first() {
            debug!("Detection model input {}: {:?}", input_name, input.input_type);
        }

        info!("Detection model loaded (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            fixed_input_size,
        })
    }

    /// Square input size used for a request
    pub fn input_size_for(&self, requested: u32) -> u32 {
        self.fixed_input_size
            .unwrap_or_else(|| effective_input_size(requested))
    }
}

impl ObjectDetector for YoloOnnxModel {
    fn predict(&self, image: &RgbImage, params: &PredictParams) -> Result<Vec<RawDetection>> {
        let size = self.input_size_for(params.img_size);
        let (tensor, transform) = letterbox(image, size);

        let input_value = Value::from_array(tensor).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        debug!("Detection output shape: {:?}", output_tensor.shape());

        let candidates = decode_output(output_tensor.view(), params.conf)?;
        let kept = non_max_suppression(candidates, params.iou, params.max_det as usize);

        Ok(kept.iter().map(|c| c.to_raw(&transform)).collect())
    }
}
