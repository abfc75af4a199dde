// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::http_server::{create_app, start_server, AppState};
pub use config::{ClassInfo, ClassTable, Settings};
pub use vision::{
    DetectionResponse, ModelError, ModelManager, ObjectDetector, PredictParams, RawDetection,
};
