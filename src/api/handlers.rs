// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use crate::version::{SERVICE_NAME, VERSION_NUMBER};

/// Banner returned by `GET /`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub health: String,
    pub detect: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            version: VERSION_NUMBER.to_string(),
            health: "/api/health".to_string(),
            detect: "/api/detect".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    /// "ok" once the model is loaded, "model_loading" before
    pub status: String,
    pub model_loaded: bool,
    pub model_path: String,
    pub version: String,
}

pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// GET /api/health - always 200, reports model readiness
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.model_manager.is_loaded().await;

    Json(HealthResponse {
        status: if model_loaded { "ok" } else { "model_loading" }.to_string(),
        model_loaded,
        model_path: state.settings.model_path.display().to_string(),
        version: VERSION_NUMBER.to_string(),
    })
}
