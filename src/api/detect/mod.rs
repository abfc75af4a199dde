// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection API endpoint module
//!
//! Provides POST /api/detect for running the detector on an uploaded image.

pub mod handler;
pub mod request;

pub use handler::detect_handler;
pub use request::DetectQuery;
