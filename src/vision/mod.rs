// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for object detection
//!
//! This module provides:
//! - Upload intake (content type, size, decode, EXIF orientation)
//! - A YOLO detector running on ONNX Runtime (CPU)
//! - The model handle shared by the HTTP layer and the CLI
//! - The adapter shaping raw boxes into the response schema

pub mod detection;
pub mod image_utils;
pub mod inference;
pub mod model_manager;
pub mod params;
pub mod yolo;

pub use detection::{BoundingBox, Detection, DetectionResponse, DetectionSummary, RawDetection};
pub use image_utils::{decode_oriented, validate_and_load, ImageError, UploadLimits};
pub use model_manager::{ModelError, ModelManager, ModelRef, ObjectDetector};
pub use params::{ParamError, PredictParams};
pub use yolo::YoloOnnxModel;
