//! Focal point estimation from detected faces.
//!
//! Crops of a thumbnail should keep heads in frame. Each face contributes a
//! point between the crown of the head (15% of the face height above the box)
//! and the face center; the focal point is their plain average.

use std::sync::Arc;

use image::DynamicImage;

use crate::face::{CoordinateOrigin, FaceDetector, FaceRegion};

/// Focal value when there is no signal: assume centered content.
pub const DEFAULT_FOCAL_Y: f64 = 0.5;

/// Fraction of the face height added past the box to reach the crown.
const HEAD_EXTENSION: f64 = 0.15;

/// Weight of the crown point in each face's contribution.
const TOP_OF_HEAD_WEIGHT: f64 = 0.6;

/// Weight of the face center in each face's contribution.
const CENTER_WEIGHT: f64 = 0.4;

/// Reduces detected face regions to one vertical focal coordinate.
pub struct FocalPointEstimator {
    detector: Arc<dyn FaceDetector>,
}

impl FocalPointEstimator {
    /// Create an estimator around a detector.
    pub fn new(detector: Arc<dyn FaceDetector>) -> Self {
        Self { detector }
    }

    /// Estimate the focal y in [0, 1], top-left origin.
    ///
    /// Detector failures are logged and yield the center.
    pub fn estimate_focal_y(&self, image: &DynamicImage) -> f64 {
        match self.detector.detect(image) {
            Ok(regions) => {
                tracing::trace!("  Detected {} face region(s)", regions.len());
                focal_y_from_regions(&regions, self.detector.origin())
            }
            Err(e) => {
                tracing::warn!("Face detection failed, using center focal point: {e}");
                DEFAULT_FOCAL_Y
            }
        }
    }
}

/// Pure reduction from regions to a top-left-origin focal y.
///
/// Regions are read in the detector's native frame. With a bottom-left
/// origin the box top is `y + height`, the crown sits above it (capped at 1)
/// and the averaged value is flipped at the end. With a top-left origin the
/// box top is `y`, the crown sits above it (capped at 0) and no flip is
/// needed. Both produce the same answer for the same face.
/// Overlapping regions are not merged and each counts fully.
pub fn focal_y_from_regions(regions: &[FaceRegion], origin: CoordinateOrigin) -> f64 {
    if regions.is_empty() {
        return DEFAULT_FOCAL_Y;
    }

    let total: f64 = regions
        .iter()
        .map(|region| {
            let extension = region.height * HEAD_EXTENSION;
            let top_of_head = match origin {
                CoordinateOrigin::BottomLeft => (region.y + region.height + extension).min(1.0),
                CoordinateOrigin::TopLeft => (region.y - extension).max(0.0),
            };
            let center = region.center_y();
            top_of_head * TOP_OF_HEAD_WEIGHT + center * CENTER_WEIGHT
        })
        .sum();
    let average = total / regions.len() as f64;

    let focal = match origin {
        CoordinateOrigin::BottomLeft => 1.0 - average,
        CoordinateOrigin::TopLeft => average,
    };
    focal.clamp(0.0, 1.0)
}
