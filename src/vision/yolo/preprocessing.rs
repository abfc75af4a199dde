// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLO-family detectors

use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use ndarray::Array4;

/// Network stride; input sizes are rounded up to a multiple of this
pub const STRIDE: u32 = 32;

/// Gray used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// Round a requested input size up to the network stride
pub fn effective_input_size(requested: u32) -> u32 {
    requested.max(STRIDE).div_ceil(STRIDE) * STRIDE
}

/// Mapping between letterboxed model space and the source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    /// Source → model scale factor
    pub scale: f32,
    /// Horizontal padding (left) in model pixels
    pub pad_x: f32,
    /// Vertical padding (top) in model pixels
    pub pad_y: f32,
    /// Source image width
    pub source_width: u32,
    /// Source image height
    pub source_height: u32,
}

impl LetterboxTransform {
    pub fn new(source_width: u32, source_height: u32, target_size: u32) -> Self {
        let scale = (target_size as f32 / source_width as f32)
            .min(target_size as f32 / source_height as f32);
        let (new_w, new_h) = scaled_dims(source_width, source_height, scale, target_size);

        Self {
            scale,
            pad_x: ((target_size - new_w) / 2) as f32,
            pad_y: ((target_size - new_h) / 2) as f32,
            source_width,
            source_height,
        }
    }

    /// Map a model-space point back to source pixels, clipped to the image
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        let sx = (x - self.pad_x) / self.scale;
        let sy = (y - self.pad_y) / self.scale;
        (
            sx.clamp(0.0, self.source_width as f32),
            sy.clamp(0.0, self.source_height as f32),
        )
    }
}

fn scaled_dims(width: u32, height: u32, scale: f32, target_size: u32) -> (u32, u32) {
    let new_w = ((width as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((height as f32 * scale).round() as u32).clamp(1, target_size);
    (new_w, new_h)
}

/// Resize with aspect ratio preservation, pad to a square, build an NCHW tensor
///
/// Steps:
/// 1. Scale the image to fit within target_size x target_size
/// 2. Center it on a gray (114) canvas
/// 3. Scale pixel values to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, S, S]
pub fn letterbox(image: &RgbImage, target_size: u32) -> (Array4<f32>, LetterboxTransform) {
    let transform = LetterboxTransform::new(image.width(), image.height(), target_size);
    let (new_w, new_h) = scaled_dims(image.width(), image.height(), transform.scale, target_size);

    let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));
    image::imageops::overlay(
        &mut canvas,
        &resized,
        transform.pad_x as i64,
        transform.pad_y as i64,
    );

    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, transform)
}
