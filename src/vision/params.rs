// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection parameters and their accepted ranges

use std::ops::RangeInclusive;
use thiserror::Error;

/// Accepted confidence / IoU thresholds
pub const THRESHOLD_RANGE: RangeInclusive<f32> = 0.01..=0.99;

/// Accepted `max_det` values
pub const MAX_DET_RANGE: RangeInclusive<u32> = 1..=1000;

/// Accepted model input sizes (pixels, square)
pub const IMG_SIZE_RANGE: RangeInclusive<u32> = 320..=1280;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} must be between {min} and {max}, got {value}")]
pub struct ParamError {
    pub field: &'static str,
    pub value: String,
    pub min: String,
    pub max: String,
}

/// Parameters passed through to the detector for one inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictParams {
    /// Minimum confidence for a box to be reported
    pub conf: f32,
    /// IoU threshold for non-maximum suppression
    pub iou: f32,
    /// Maximum number of boxes returned
    pub max_det: u32,
    /// Target (square) model input size
    pub img_size: u32,
}

impl Default for PredictParams {
    fn default() -> Self {
        Self {
            conf: 0.45,
            iou: 0.50,
            max_det: 100,
            img_size: 640,
        }
    }
}

impl PredictParams {
    /// Check every field against its accepted range
    pub fn validate(&self) -> Result<(), ParamError> {
        check_range("conf", self.conf, &THRESHOLD_RANGE)?;
        check_range("iou", self.iou, &THRESHOLD_RANGE)?;
        check_range("max_det", self.max_det, &MAX_DET_RANGE)?;
        check_range("img_size", self.img_size, &IMG_SIZE_RANGE)?;
        Ok(())
    }
}

fn check_range<T>(field: &'static str, value: T, range: &RangeInclusive<T>) -> Result<(), ParamError>
where
    T: PartialOrd + ToString,
{
    // NaN fails `contains`, which is what we want
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ParamError {
            field,
            value: value.to_string(),
            min: range.start().to_string(),
            max: range.end().to_string(),
        })
    }
}
