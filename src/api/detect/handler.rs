// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::request::DetectQuery;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::config::Settings;
use crate::vision::{inference, validate_and_load, DetectionResponse, ObjectDetector, PredictParams};

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// POST /api/detect - Run object detection on an uploaded image
///
/// # Request
/// - multipart field `file`: the image (jpeg, png, bmp, tiff, webp by default)
/// - query `conf`, `iou`: thresholds in [0.01, 0.99]
/// - query `max_det`: in [1, 1000]
/// - query `img_size`: in [320, 1280]
///
/// # Errors
/// - 422: parameter out of range, missing `file`, undecodable image
/// - 415: content type not allowed
/// - 413: upload too large
/// - 503: model not loaded
/// - 500: inference failed
pub async fn detect_handler(
    State(state): State<AppState>,
    query: Result<Query<DetectQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    // 1. Parameters, before touching the body
    let Query(query) = query.map_err(|e| {
        warn!("Rejected detect query: {}", e.body_text());
        ApiError::from(e)
    })?;
    let params = query.resolve(&state.settings.defaults).map_err(|e| {
        warn!("Detect parameter out of range: {}", e);
        ApiError::from(e)
    })?;

    // 2. Upload
    let max_mb = state.settings.max_upload_size_mb;
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected detect body: {}", e.body_text());
        ApiError::from(e)
    })?;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart(e, max_mb))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::from_multipart(e, max_mb))?;
        upload = Some((bytes, content_type));
        break;
    }
    let (bytes, content_type) = upload.ok_or_else(|| {
        warn!("Detect request without '{}' field", FILE_FIELD);
        ApiError::MissingField(FILE_FIELD.to_string())
    })?;

    // 3. Model readiness
    let model = state.model_manager.get().await?;

    // 4 + 5. Intake and inference on the blocking pool
    let settings = Arc::clone(&state.settings);
    let response = tokio::task::spawn_blocking(move || {
        process_upload(&bytes, content_type.as_deref(), &params, model.as_ref(), &settings)
    })
    .await
    .map_err(|e| {
        error!("Detection task failed: {}", e);
        ApiError::InferenceFailure(e.to_string())
    })??;

    Ok(Json(response))
}

/// Decode an upload and run the detector on it
///
/// Intake errors are returned before the model is invoked.
pub fn process_upload(
    bytes: &[u8],
    content_type: Option<&str>,
    params: &PredictParams,
    model: &dyn ObjectDetector,
    settings: &Settings,
) -> Result<DetectionResponse, ApiError> {
    let image = validate_and_load(bytes, content_type, &settings.upload_limits()).map_err(|e| {
        warn!("Rejected upload: {}", e);
        ApiError::from(e)
    })?;
    debug!(
        "Running detection on {}x{} image (conf={}, iou={}, max_det={}, img_size={})",
        image.width(),
        image.height(),
        params.conf,
        params.iou,
        params.max_det,
        params.img_size
    );

    inference::run(&image, params, model, &settings.classes).map_err(|e| {
        error!("Inference error: {:#}", e);
        ApiError::InferenceFailure(format!("{:#}", e))
    })
}
