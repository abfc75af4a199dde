// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO detector: letterbox preprocessing, ONNX inference, NMS

pub mod model;
pub mod postprocessing;
pub mod preprocessing;

pub use model::YoloOnnxModel;
pub use postprocessing::{decode_output, non_max_suppression, Candidate};
pub use preprocessing::{effective_input_size, letterbox, LetterboxTransform};
