// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request query parameters

use serde::{Deserialize, Serialize};

use crate::vision::{ParamError, PredictParams};

/// Query string of `POST /api/detect`; missing values take configured defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectQuery {
    #[serde(default)]
    pub conf: Option<f32>,
    #[serde(default)]
    pub iou: Option<f32>,
    #[serde(default)]
    pub max_det: Option<u32>,
    #[serde(default)]
    pub img_size: Option<u32>,
}

impl DetectQuery {
    /// Fill gaps from `defaults` and check bounds
    pub fn resolve(&self, defaults: &PredictParams) -> Result<PredictParams, ParamError> {
        let params = PredictParams {
            conf: self.conf.unwrap_or(defaults.conf),
            iou: self.iou.unwrap_or(defaults.iou),
            max_det: self.max_det.unwrap_or(defaults.max_det),
            img_size: self.img_size.unwrap_or(defaults.img_size),
        };
        params.validate()?;
        Ok(params)
    }
}
