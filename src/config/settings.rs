// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service settings loaded from environment variables

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use super::classes::ClassTable;
use crate::vision::image_utils::UploadLimits;
use crate::vision::PredictParams;

pub const DEFAULT_MODEL_PATH: &str = "./models/flir_adas_model.onnx";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 20;

/// Upload MIME types accepted by default
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/bmp",
    "image/tiff",
    "image/webp",
];

/// Configuration for the detection node
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to the exported detection model
    pub model_path: PathBuf,
    /// Fixed model input size for static-shape exports (None = follow `img_size`)
    pub model_input_size: Option<u32>,
    /// Defaults applied when a request omits conf / iou / max_det / img_size
    pub defaults: PredictParams,
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Allowed CORS origins ("*" = any)
    pub cors_origins: Vec<String>,
    /// Upload size cap in megabytes
    pub max_upload_size_mb: u64,
    /// Accepted upload content types
    pub allowed_mime_types: Vec<String>,
    /// Class id lookup table
    pub classes: ClassTable,
}

impl Settings {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Unparseable values are logged and replaced by their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = PredictParams::default();

        Self {
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            model_input_size: lookup("MODEL_INPUT_SIZE").and_then(|v| parse_or_warn("MODEL_INPUT_SIZE", &v)),
            defaults: PredictParams {
                conf: parse_with_default(&lookup, "DEFAULT_CONF", base.conf),
                iou: parse_with_default(&lookup, "DEFAULT_IOU", base.iou),
                max_det: parse_with_default(&lookup, "DEFAULT_MAX_DET", base.max_det),
                img_size: parse_with_default(&lookup, "DEFAULT_IMG_SIZE", base.img_size),
            },
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_with_default(&lookup, "PORT", DEFAULT_PORT),
            cors_origins: lookup("CORS_ORIGINS")
                .and_then(|v| parse_list("CORS_ORIGINS", &v))
                .unwrap_or_else(|| vec!["*".to_string()]),
            max_upload_size_mb: parse_with_default(&lookup, "MAX_UPLOAD_SIZE_MB", DEFAULT_MAX_UPLOAD_SIZE_MB),
            allowed_mime_types: lookup("ALLOWED_MIME_TYPES")
                .and_then(|v| parse_list("ALLOWED_MIME_TYPES", &v))
                .unwrap_or_else(|| DEFAULT_ALLOWED_MIME_TYPES.iter().map(|s| s.to_string()).collect()),
            classes: lookup("CLASS_TABLE")
                .and_then(|v| match ClassTable::from_json(&v) {
                    Ok(table) => Some(table),
                    Err(e) => {
                        warn!("Ignoring invalid CLASS_TABLE: {}", e);
                        None
                    }
                })
                .unwrap_or_default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.defaults
            .validate()
            .map_err(|e| format!("Invalid default detection parameter: {}", e))?;
        if self.max_upload_size_mb == 0 {
            return Err("MAX_UPLOAD_SIZE_MB must be greater than 0".to_string());
        }
        if self.allowed_mime_types.is_empty() {
            return Err("At least one allowed MIME type is required".to_string());
        }
        if let Some(size) = self.model_input_size {
            if size == 0 || size % 32 != 0 {
                return Err(format!("MODEL_INPUT_SIZE must be a positive multiple of 32, got {}", size));
            }
        }
        if self.classes.is_empty() {
            return Err("CLASS_TABLE must define at least one class".to_string());
        }
        self.classes.validate()?;
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upload cap in bytes
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }

    /// Limits handed to image intake
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            allowed_types: self.allowed_mime_types.clone(),
            max_upload_size_mb: self.max_upload_size_mb,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or_warn<T>(key: &str, raw: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring invalid {}='{}': {}", key, raw, e);
            None
        }
    }
}

fn parse_with_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .and_then(|raw| parse_or_warn(key, &raw))
        .unwrap_or(default)
}

/// Accepts either a JSON array or a comma separated list
fn parse_list(key: &str, raw: &str) -> Option<Vec<String>> {
    let trimmed = raw.trim();
    let items: Vec<String> = if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<String>>(trimmed) {
            Ok(items) => items,
            Err(e) => {
                warn!("Ignoring invalid {}: {}", key, e);
                return None;
            }
        }
    } else {
        trimmed.split(',').map(|s| s.trim().to_string()).collect()
    };

    let items: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
