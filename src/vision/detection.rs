// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection types: raw detector output and the public response schema

use serde::{Deserialize, Serialize};

/// One box as reported by a detector, in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub class_id: u32,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Box corners in pixels plus the same corners normalized by image size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub width: f64,
    pub height: f64,
    pub x1_norm: f64,
    pub y1_norm: f64,
    pub x2_norm: f64,
    pub y2_norm: f64,
}

/// A single detected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// 1-based position in the model output (stable within one response only)
    pub id: u32,
    pub class_id: u32,
    pub class_name: String,
    /// person | vehicle | bicycle | other
    pub class_type: String,
    /// Hex colour for the UI canvas
    pub color: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Per-category counts for one image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub total: usize,
    pub persons: usize,
    pub vehicles: usize,
    pub bicycles: usize,
    pub other: usize,
    pub threat_detected: bool,
}

impl DetectionSummary {
    /// Tally detections by class type
    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut summary = Self::default();
        for detection in detections {
            match detection.class_type.as_str() {
                "person" => summary.persons += 1,
                "vehicle" => summary.vehicles += 1,
                "bicycle" => summary.bicycles += 1,
                _ => summary.other += 1,
            }
        }
        summary.total = detections.len();
        summary.threat_detected = summary.total > 0;
        summary
    }
}

/// Full result of one detection request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub success: bool,
    pub image_width: u32,
    pub image_height: u32,
    /// Model call latency in milliseconds
    pub inference_ms: f64,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub summary: DetectionSummary,
    /// Model-native order, never re-sorted
    pub detections: Vec<Detection>,
}
