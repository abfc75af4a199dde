// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::detect::detect_handler;
use super::handlers::{health_handler, root_handler};
use crate::config::Settings;
use crate::vision::ModelManager;

/// Headroom on top of the upload cap for multipart boundaries and part headers
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub model_manager: Arc<ModelManager>,
}

impl AppState {
    pub fn new(settings: Settings, model_manager: Arc<ModelManager>) -> Self {
        Self {
            settings: Arc::new(settings),
            model_manager,
        }
    }
}

/// Build the router: `GET /`, `GET /api/health`, `POST /api/detect`
pub fn create_app(state: AppState) -> Router {
    let body_limit = state
        .settings
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let cors = cors_layer(&state.settings.cors_origins);

    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/detect", post(detect_handler));

    Router::new()
        .route("/", get(root_handler))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// CORS from the configured origin list; `*` allows any origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(list))
}

/// Bind and serve until `shutdown` resolves
pub async fn start_server<F>(state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.settings.listen_addr();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("ThermalEye API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}
