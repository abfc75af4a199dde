// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO output decoding and non-maximum suppression

use anyhow::Result;
use ndarray::{ArrayViewD, Axis, Ix2};

use super::preprocessing::LetterboxTransform;
use crate::vision::detection::RawDetection;

/// A candidate box in letterboxed model space (corner format)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: u32,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Candidate {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &Candidate) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }

    /// Map to source-image pixels
    pub fn to_raw(&self, transform: &LetterboxTransform) -> RawDetection {
        let (x1, y1) = transform.to_source(self.x1, self.y1);
        let (x2, y2) = transform.to_source(self.x2, self.y2);
        RawDetection {
            class_id: self.class_id,
            confidence: self.confidence,
            x1,
            y1,
            x2,
            y2,
        }
    }
}

/// Decode a YOLO head output into candidates scoring at least `conf`
///
/// Accepts `[1, 4 + nc, N]` or `[1, N, 4 + nc]`; the feature axis is the
/// smaller of the two. Each anchor row is `cx, cy, w, h, score_0 .. score_nc-1`.
pub fn decode_output(output: ArrayViewD<f32>, conf: f32) -> Result<Vec<Candidate>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected detector output shape: {:?}, expected [1, F, N]", shape);
    }

    let features_first = shape[1] <= shape[2];
    let num_features = if features_first { shape[1] } else { shape[2] };
    if num_features < 5 {
        anyhow::bail!(
            "Detector output has {} features per anchor, expected at least 5",
            num_features
        );
    }

    let plane = output.index_axis(Axis(0), 0).into_dimensionality::<Ix2>()?;
    // rows = anchors, columns = features
    let rows = if features_first {
        plane.reversed_axes()
    } else {
        plane
    };

    let mut candidates = Vec::new();
    for row in rows.outer_iter() {
        let (best_class, best_score) = row
            .iter()
            .skip(4)
            .enumerate()
            .fold((0usize, f32::MIN), |best, (idx, &score)| {
                if score > best.1 {
                    (idx, score)
                } else {
                    best
                }
            });

        if best_score < conf {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        if w <= 0.0 || h <= 0.0 {
            continue;
        }

        candidates.push(Candidate {
            class_id: best_class as u32,
            confidence: best_score,
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        });
    }

    Ok(candidates)
}

/// Class-aware greedy NMS, highest confidence first, capped at `max_det`
pub fn non_max_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_det: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_det {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
