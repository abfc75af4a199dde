// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for the API tests
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thermaleye_node::{
    api::http_server::AppState,
    config::Settings,
    vision::{ModelManager, ObjectDetector, PredictParams, RawDetection},
};

pub const BOUNDARY: &str = "thermaleye-test-boundary";
pub const STUB_MODEL_PATH: &str = "/models/stub.onnx";

/// Detector returning a fixed list and counting calls
#[derive(Default)]
pub struct StubDetector {
    pub detections: Vec<RawDetection>,
    pub calls: AtomicUsize,
}

impl StubDetector {
    pub fn new(detections: Vec<RawDetection>) -> Arc<Self> {
        Arc::new(Self {
            detections,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ObjectDetector for StubDetector {
    fn predict(&self, _image: &RgbImage, _params: &PredictParams) -> anyhow::Result<Vec<RawDetection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }
}

/// Detector that always errors
pub struct FailingDetector;

impl ObjectDetector for FailingDetector {
    fn predict(&self, _image: &RgbImage, _params: &PredictParams) -> anyhow::Result<Vec<RawDetection>> {
        anyhow::bail!("onnx session crashed")
    }
}

pub fn raw(class_id: u32, confidence: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> RawDetection {
    RawDetection {
        class_id,
        confidence,
        x1,
        y1,
        x2,
        y2,
    }
}

/// The two-box scene used across tests: one person, one vehicle
pub fn person_and_vehicle() -> Vec<RawDetection> {
    vec![
        raw(0, 0.87, 50.0, 60.0, 150.0, 200.0),
        raw(1, 0.72, 300.0, 100.0, 420.0, 280.0),
    ]
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, image::Rgb([40, 40, 40]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// One-part multipart body
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn detect_request(query: &str, body: Vec<u8>) -> Request<Body> {
    let uri = if query.is_empty() {
        "/api/detect".to_string()
    } else {
        format!("/api/detect?{}", query)
    };
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn state_with(settings: Settings, detector: Option<Arc<dyn ObjectDetector>>) -> AppState {
    let manager = Arc::new(ModelManager::new());
    if let Some(detector) = detector {
        manager.install(STUB_MODEL_PATH, detector).await;
    }
    AppState::new(settings, manager)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
