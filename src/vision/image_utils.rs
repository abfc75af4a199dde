// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image intake: upload validation, decoding and orientation correction

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

/// Custom error types for image intake
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported file type '{content_type}'. Allowed: {}", allowed.join(", "))]
    UnsupportedMediaType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File too large. Max {max_mb} MB.")]
    PayloadTooLarge { size: usize, max_mb: u64 },

    #[error("Cannot decode image: {0}")]
    UnprocessableImage(String),
}

/// Upload restrictions applied before decoding
#[derive(Debug, Clone)]
pub struct UploadLimits {
    /// Accepted content types (compared case-insensitively, without parameters)
    pub allowed_types: Vec<String>,
    /// Upload cap in megabytes
    pub max_upload_size_mb: u64,
}

impl UploadLimits {
    pub fn max_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }

    /// Check a declared content type against the allow-list
    pub fn allows(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        !essence.is_empty()
            && self
                .allowed_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
    }
}

/// Validate an upload and decode it into an RGB buffer
///
/// Content type and size are checked before any decoding work happens.
///
/// # Returns
/// * `Ok(RgbImage)` - Orientation-corrected 3-channel image
/// * `Err(ImageError)` - Unsupported type, too large, or undecodable
pub fn validate_and_load(
    bytes: &[u8],
    content_type: Option<&str>,
    limits: &UploadLimits,
) -> Result<RgbImage, ImageError> {
    let declared = content_type.unwrap_or("");
    if !limits.allows(declared) {
        return Err(ImageError::UnsupportedMediaType {
            content_type: declared.to_string(),
            allowed: limits.allowed_types.clone(),
        });
    }

    if bytes.len() > limits.max_bytes() {
        return Err(ImageError::PayloadTooLarge {
            size: bytes.len(),
            max_mb: limits.max_upload_size_mb,
        });
    }

    let image = decode_oriented(bytes)?;
    debug!(
        "Decoded upload: {}x{}, {} bytes, declared {}",
        image.width(),
        image.height(),
        bytes.len(),
        declared
    );

    Ok(image.to_rgb8())
}

/// Decode raw bytes, guessing the format from content and applying EXIF orientation
pub fn decode_oriented(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::UnprocessableImage(e.to_string()))?;

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| ImageError::UnprocessableImage(e.to_string()))?;

    // Missing or unreadable EXIF means the pixels are already upright
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| ImageError::UnprocessableImage(e.to_string()))?;
    image.apply_orientation(orientation);

    Ok(image)
}
