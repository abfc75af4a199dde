// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Image intake tests: allow-list, size cap, decoding and orientation

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use thermaleye_node::{
    config::Settings,
    vision::{validate_and_load, ImageError},
};

fn encode(image: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

#[test]
fn test_default_allow_list_formats() {
    let limits = Settings::default().upload_limits();
    let image = RgbImage::from_pixel(12, 10, Rgb([90, 120, 150]));

    for (format, content_type) in [
        (ImageFormat::Png, "image/png"),
        (ImageFormat::Jpeg, "image/jpeg"),
        (ImageFormat::Bmp, "image/bmp"),
        (ImageFormat::Tiff, "image/tiff"),
    ] {
        let bytes = encode(image.clone(), format);
        let decoded = validate_and_load(&bytes, Some(content_type), &limits)
            .unwrap_or_else(|e| panic!("{} failed: {}", content_type, e));
        assert_eq!(decoded.dimensions(), (12, 10));
    }
}

#[test]
fn test_format_guessed_from_content() {
    // Declared type only gates the upload; decoding follows the bytes
    let limits = Settings::default().upload_limits();
    let bytes = encode(RgbImage::new(5, 7), ImageFormat::Png);
    let decoded = validate_and_load(&bytes, Some("image/jpeg"), &limits).unwrap();
    assert_eq!(decoded.dimensions(), (5, 7));
}

#[test]
fn test_gif_not_in_default_allow_list() {
    let limits = Settings::default().upload_limits();
    let err = validate_and_load(b"GIF89a", Some("image/gif"), &limits).unwrap_err();
    assert!(matches!(err, ImageError::UnsupportedMediaType { .. }));
}

#[test]
fn test_text_payload_undecodable() {
    let limits = Settings::default().upload_limits();
    let err = validate_and_load(b"hello world", Some("image/png"), &limits).unwrap_err();
    assert!(matches!(err, ImageError::UnprocessableImage(_)));
}

/// JPEG with an APP1 Exif segment carrying a single Orientation tag
fn jpeg_with_orientation(image: RgbImage, orientation: u16) -> Vec<u8> {
    let jpeg = encode(image, ImageFormat::Jpeg);

    // Little-endian TIFF header, one IFD entry: 0x0112 SHORT x1
    let mut tiff = vec![b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01, 0x00];
    tiff.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0x00, 0x00]);
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);
    let segment_len = (payload.len() + 2) as u16;

    // SOI, then APP1, then the rest of the encoded stream
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// 32x16: left half red, right half blue
fn split_image() -> RgbImage {
    RgbImage::from_fn(32, 16, |x, _| {
        if x < 16 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    })
}

fn is_red(pixel: &Rgb<u8>) -> bool {
    pixel[0] > 180 && pixel[2] < 80
}

fn is_blue(pixel: &Rgb<u8>) -> bool {
    pixel[2] > 180 && pixel[0] < 80
}

#[test]
fn test_exif_rotate_90() {
    let limits = Settings::default().upload_limits();
    let bytes = jpeg_with_orientation(split_image(), 6);

    let decoded = validate_and_load(&bytes, Some("image/jpeg"), &limits).unwrap();
    // Rotated clockwise: width and height swap, the left half ends up on top
    assert_eq!(decoded.dimensions(), (16, 32));
    assert!(is_red(decoded.get_pixel(8, 4)));
    assert!(is_blue(decoded.get_pixel(8, 27)));
}

#[test]
fn test_exif_rotate_180() {
    let limits = Settings::default().upload_limits();
    let bytes = jpeg_with_orientation(split_image(), 3);

    let decoded = validate_and_load(&bytes, Some("image/jpeg"), &limits).unwrap();
    assert_eq!(decoded.dimensions(), (32, 16));
    assert!(is_blue(decoded.get_pixel(4, 8)));
    assert!(is_red(decoded.get_pixel(27, 8)));
}

#[test]
fn test_exif_upright_left_unchanged() {
    let limits = Settings::default().upload_limits();
    let bytes = jpeg_with_orientation(split_image(), 1);

    let decoded = validate_and_load(&bytes, Some("image/jpeg"), &limits).unwrap();
    assert_eq!(decoded.dimensions(), (32, 16));
    assert!(is_red(decoded.get_pixel(4, 8)));
}
