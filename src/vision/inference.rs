// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference adapter: runs the detector and shapes its output into the API schema

use image::RgbImage;
use std::time::Instant;
use tracing::info;

use crate::config::ClassTable;
use crate::vision::detection::{
    BoundingBox, Detection, DetectionResponse, DetectionSummary, RawDetection,
};
use crate::vision::model_manager::ObjectDetector;
use crate::vision::params::PredictParams;

/// Run detection on one image and build the response
///
/// Only the model call is timed. Detector errors are returned unchanged.
pub fn run(
    image: &RgbImage,
    params: &PredictParams,
    model: &dyn ObjectDetector,
    classes: &ClassTable,
) -> anyhow::Result<DetectionResponse> {
    let start = Instant::now();
    let raw = model.predict(image, params)?;
    let inference_ms = start.elapsed().as_secs_f64() * 1000.0;

    let response = build_response(
        &raw,
        image.width(),
        image.height(),
        inference_ms,
        params,
        classes,
    );

    info!(
        "Detected {} objects ({} persons, {} vehicles, {} bicycles) in {:.2}ms",
        response.summary.total,
        response.summary.persons,
        response.summary.vehicles,
        response.summary.bicycles,
        response.inference_ms
    );

    Ok(response)
}

/// Map raw detections into the public schema, preserving their order
pub fn build_response(
    raw: &[RawDetection],
    image_width: u32,
    image_height: u32,
    inference_ms: f64,
    params: &PredictParams,
    classes: &ClassTable,
) -> DetectionResponse {
    let w = image_width.max(1) as f64;
    let h = image_height.max(1) as f64;

    let detections: Vec<Detection> = raw
        .iter()
        .enumerate()
        .map(|(idx, det)| {
            let class = classes.resolve(det.class_id);

            let (x1, y1, x2, y2) = (
                det.x1 as f64,
                det.y1 as f64,
                det.x2 as f64,
                det.y2 as f64,
            );
            let (rx1, ry1, rx2, ry2) = (
                round_to(x1, 2),
                round_to(y1, 2),
                round_to(x2, 2),
                round_to(y2, 2),
            );

            Detection {
                id: idx as u32 + 1,
                class_id: det.class_id,
                class_name: class.name.clone(),
                class_type: class.class_type.clone(),
                color: class.color.clone(),
                confidence: round_to(det.confidence as f64, 4) as f32,
                bbox: BoundingBox {
                    x1: rx1,
                    y1: ry1,
                    x2: rx2,
                    y2: ry2,
                    width: round_to(rx2 - rx1, 2),
                    height: round_to(ry2 - ry1, 2),
                    x1_norm: round_to(x1 / w, 4),
                    y1_norm: round_to(y1 / h, 4),
                    x2_norm: round_to(x2 / w, 4),
                    y2_norm: round_to(y2 / h, 4),
                },
            }
        })
        .collect();

    DetectionResponse {
        success: true,
        image_width,
        image_height,
        inference_ms: round_to(inference_ms, 2),
        conf_threshold: params.conf,
        iou_threshold: params.iou,
        summary: DetectionSummary::from_detections(&detections),
        detections,
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
