// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::multipart::{MultipartError, MultipartRejection};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::detect::handler::FILE_FIELD;
use crate::vision::{ImageError, ModelError, ParamError};

/// JSON error body: `{"detail": ..., "error_type": ...}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_type: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    UnsupportedMediaType(String),
    PayloadTooLarge(String),
    UnprocessableImage(String),
    ParameterOutOfRange { field: String, message: String },
    MissingField(String),
    InvalidUpload(String),
    ModelNotReady,
    InferenceFailure(String),
}

impl ApiError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::UnsupportedMediaType(_) => "unsupported_media_type",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::UnprocessableImage(_) => "unprocessable_image",
            ApiError::ParameterOutOfRange { .. } => "parameter_out_of_range",
            ApiError::MissingField(_) => "missing_field",
            ApiError::InvalidUpload(_) => "invalid_upload",
            ApiError::ModelNotReady => "model_not_ready",
            ApiError::InferenceFailure(_) => "inference_failure",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::UnsupportedMediaType(_) => 415,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::UnprocessableImage(_)
            | ApiError::ParameterOutOfRange { .. }
            | ApiError::MissingField(_) => 422,
            ApiError::InvalidUpload(_) => 400,
            ApiError::ModelNotReady => 503,
            ApiError::InferenceFailure(_) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            detail: self.to_string(),
            error_type: self.error_type().to_string(),
        }
    }

    /// Map a multipart read failure, treating body-limit overruns as 413
    pub fn from_multipart(err: MultipartError, max_upload_size_mb: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!("File too large. Max {} MB.", max_upload_size_mb))
        } else {
            ApiError::InvalidUpload(err.body_text())
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UnsupportedMediaType(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::UnprocessableImage(msg) => write!(f, "{}", msg),
            ApiError::ParameterOutOfRange { message, .. } => write!(f, "{}", message),
            ApiError::MissingField(field) => write!(f, "Missing required form field '{}'", field),
            ApiError::InvalidUpload(msg) => write!(f, "Invalid multipart upload: {}", msg),
            ApiError::ModelNotReady => write!(f, "Model not ready yet."),
            ApiError::InferenceFailure(msg) => write!(f, "Inference error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        let detail = err.to_string();
        match err {
            ImageError::UnsupportedMediaType { .. } => ApiError::UnsupportedMediaType(detail),
            ImageError::PayloadTooLarge { .. } => ApiError::PayloadTooLarge(detail),
            ImageError::UnprocessableImage(_) => ApiError::UnprocessableImage(detail),
        }
    }
}

impl From<ParamError> for ApiError {
    fn from(err: ParamError) -> Self {
        ApiError::ParameterOutOfRange {
            field: err.field.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::ParameterOutOfRange {
            field: "query".to_string(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection {
            // No multipart content type means there is no file part at all
            MultipartRejection::InvalidBoundary(_) => ApiError::MissingField(FILE_FIELD.to_string()),
            other => ApiError::InvalidUpload(other.body_text()),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ModelNotReady => ApiError::ModelNotReady,
            other => ApiError::InferenceFailure(other.to_string()),
        }
    }
}
