//! Face-region detection.
//!
//! The focal-point estimator only needs bounding boxes, so detection sits
//! behind the [`FaceDetector`] trait. The bundled backend runs the UltraFace
//! RFB-320 model locally via ONNX Runtime; [`NoFaceDetector`] is used when no
//! model is available.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gesto_core::face::load_detector;
//! use gesto_core::Config;
//!
//! let config = Config::default();
//! let detector = load_detector(&config.focal, &config.face_model_path());
//! let faces = detector.detect(&image)?;
//! ```

pub(crate) mod preprocess;
pub(crate) mod ultraface;

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::config::FocalConfig;
use crate::error::DerivativeError;

pub use self::ultraface::UltraFaceDetector;

/// Where a detector puts y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateOrigin {
    /// y grows downwards from the top edge
    TopLeft,
    /// y grows upwards from the bottom edge
    BottomLeft,
}

/// A detected face, normalized to the image size.
///
/// `y` is the edge nearest the detector's origin, so with a bottom-left
/// origin it is the bottom of the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f32,
}

impl FaceRegion {
    /// Create a region with full confidence.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence: 1.0,
        }
    }

    /// Vertical midpoint of the box.
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Intersection-over-union with another region.
    pub fn iou(&self, other: &FaceRegion) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.width * self.height + other.width * other.height - inter;
        if union <= 0.0 {
            0.0
        } else {
            inter / union
        }
    }
}

/// Capability: find faces in decoded pixels.
pub trait FaceDetector: Send + Sync {
    /// Detect faces. An empty vector means no faces, not an error.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<FaceRegion>, DerivativeError>;

    /// Coordinate convention of the returned regions.
    fn origin(&self) -> CoordinateOrigin {
        CoordinateOrigin::TopLeft
    }
}

/// Detector that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<FaceRegion>, DerivativeError> {
        Ok(Vec::new())
    }
}

/// Build the configured detector.
///
/// Falls back to [`NoFaceDetector`] when detection is disabled, the model is
/// missing or fails to load. Imports keep working, focal points just stay
/// centered.
pub fn load_detector(config: &FocalConfig, model_path: &Path) -> Arc<dyn FaceDetector> {
    if !config.enabled {
        tracing::debug!("Face detection disabled; focal points default to center");
        return Arc::new(NoFaceDetector);
    }
    if !model_path.exists() {
        tracing::warn!(
            "Face model not found at {:?}. Run `gesto models download` to enable focal points.",
            model_path
        );
        return Arc::new(NoFaceDetector);
    }
    match UltraFaceDetector::load(model_path, config.score_threshold, config.iou_threshold) {
        Ok(detector) => Arc::new(detector),
        Err(e) => {
            tracing::warn!("Face detection unavailable: {e}");
            Arc::new(NoFaceDetector)
        }
    }
}
