// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model handle lifecycle tests

use image::RgbImage;
use std::sync::Arc;
use thermaleye_node::vision::{
    ModelError, ModelManager, ObjectDetector, PredictParams, RawDetection,
};

struct Fixed;

impl ObjectDetector for Fixed {
    fn predict(&self, _image: &RgbImage, _params: &PredictParams) -> anyhow::Result<Vec<RawDetection>> {
        Ok(vec![RawDetection {
            class_id: 2,
            confidence: 0.5,
            x1: 1.0,
            y1: 2.0,
            x2: 3.0,
            y2: 4.0,
        }])
    }
}

#[tokio::test]
async fn test_lifecycle() {
    let manager = ModelManager::new();
    assert!(matches!(manager.get().await, Err(ModelError::ModelNotReady)));

    manager.install("/models/fixed.onnx", Arc::new(Fixed)).await;
    assert!(manager.is_loaded().await);

    let model = manager.get().await.unwrap();
    let detections = model
        .predict(&RgbImage::new(4, 4), &PredictParams::default())
        .unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].class_id, 2);

    manager.release().await;
    assert!(!manager.is_loaded().await);
    assert!(matches!(manager.get().await, Err(ModelError::ModelNotReady)));
}

#[tokio::test]
async fn test_concurrent_readers() {
    let manager = Arc::new(ModelManager::new());
    manager.install("/models/fixed.onnx", Arc::new(Fixed)).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            let model = manager.get().await.unwrap();
            tokio::task::spawn_blocking(move || {
                model
                    .predict(&RgbImage::new(2, 2), &PredictParams::default())
                    .unwrap()
                    .len()
            })
            .await
            .unwrap()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 1);
    }
}

#[tokio::test]
async fn test_load_errors() {
    let manager = ModelManager::new().with_input_size(Some(640));

    let err = manager.load("/does/not/exist.onnx").await.unwrap_err();
    assert!(matches!(err, ModelError::ModelNotFound(_)));
    assert_eq!(err.to_string(), "Model not found at /does/not/exist.onnx");

    let file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
    std::fs::write(file.path(), [0u8; 64]).unwrap();
    let err = manager.load(file.path()).await.unwrap_err();
    assert!(matches!(err, ModelError::LoadFailed { .. }));
    assert!(!manager.is_loaded().await);
}
