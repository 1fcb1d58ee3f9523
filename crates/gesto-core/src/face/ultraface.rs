//! UltraFace ONNX session management and inference.
//!
//! Loads the "Ultra-Light-Fast-Generic-Face-Detector" RFB-320 model and turns
//! its raw anchor outputs into a handful of face boxes.

use std::path::Path;
use std::sync::Mutex;

use image::DynamicImage;
use ort::session::Session;
use ort::value::Value;

use crate::error::DerivativeError;

use super::preprocess::preprocess;
use super::{CoordinateOrigin, FaceDetector, FaceRegion};

/// Output tensor holding `[1, N, 2]` background/face scores.
const SCORES_OUTPUT: &str = "scores";

/// Output tensor holding `[1, N, 4]` normalized corner boxes.
const BOXES_OUTPUT: &str = "boxes";

/// Wraps an ONNX Runtime session for UltraFace.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct UltraFaceDetector {
    session: Mutex<Session>,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    score_threshold: f32,
    iou_threshold: f32,
}

impl UltraFaceDetector {
    /// Load the model from an ONNX file.
    pub fn load(
        model_path: &Path,
        score_threshold: f32,
        iou_threshold: f32,
    ) -> Result<Self, DerivativeError> {
        let session = Session::builder()
            .map_err(|e| {
                DerivativeError::Detection(format!("Failed to create ONNX session builder: {e}"))
            })?
            .commit_from_file(model_path)
            .map_err(|e| {
                DerivativeError::Detection(format!(
                    "Failed to load ONNX model {}: {e}",
                    model_path.display()
                ))
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());

        tracing::debug!(
            "Loaded UltraFace model from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            score_threshold,
            iou_threshold,
        })
    }
}

impl FaceDetector for UltraFaceDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<FaceRegion>, DerivativeError> {
        let tensor = preprocess(image);
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data)).map_err(|e| {
            DerivativeError::Detection(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self
            .session
            .lock()
            .map_err(|e| DerivativeError::Detection(format!("Session lock poisoned: {e}")))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| DerivativeError::Detection(format!("ONNX inference failed: {e}")))?;

        let mut scores: Option<Vec<f32>> = None;
        let mut boxes: Option<Vec<f32>> = None;
        for (index, (name, value)) in outputs.iter().enumerate() {
            let (_, data) = value.try_extract_tensor::<f32>().map_err(|e| {
                DerivativeError::Detection(format!("Failed to extract {name} tensor: {e}"))
            })?;
            // Exported models sometimes lose their output names; fall back to order.
            match (name, index) {
                (SCORES_OUTPUT, _) => scores = Some(data.to_vec()),
                (BOXES_OUTPUT, _) => boxes = Some(data.to_vec()),
                (_, 0) if scores.is_none() => scores = Some(data.to_vec()),
                (_, 1) if boxes.is_none() => boxes = Some(data.to_vec()),
                _ => {}
            }
        }

        let (Some(scores), Some(boxes)) = (scores, boxes) else {
            return Err(DerivativeError::Detection(
                "Model did not produce scores and boxes".to_string(),
            ));
        };

        let candidates = decode_candidates(&scores, &boxes, self.score_threshold)?;
        Ok(non_max_suppression(candidates, self.iou_threshold))
    }

    fn origin(&self) -> CoordinateOrigin {
        CoordinateOrigin::TopLeft
    }
}

/// Pair per-anchor face scores with their boxes and keep the confident ones.
///
/// `scores` is `[N, 2]` (background, face), `boxes` is `[N, 4]` as
/// normalized `x1, y1, x2, y2`.
pub(crate) fn decode_candidates(
    scores: &[f32],
    boxes: &[f32],
    threshold: f32,
) -> Result<Vec<FaceRegion>, DerivativeError> {
    if scores.len() % 2 != 0 || boxes.len() % 4 != 0 || scores.len() / 2 != boxes.len() / 4 {
        return Err(DerivativeError::Detection(format!(
            "Mismatched output sizes: {} scores, {} box coordinates",
            scores.len(),
            boxes.len()
        )));
    }

    let regions = scores
        .chunks_exact(2)
        .zip(boxes.chunks_exact(4))
        .filter(|(score, _)| score[1] >= threshold)
        .filter_map(|(score, b)| {
            let x1 = (b[0] as f64).clamp(0.0, 1.0);
            let y1 = (b[1] as f64).clamp(0.0, 1.0);
            let x2 = (b[2] as f64).clamp(0.0, 1.0);
            let y2 = (b[3] as f64).clamp(0.0, 1.0);
            (x2 > x1 && y2 > y1).then(|| FaceRegion {
                x: x1,
                y: y1,
                width: x2 - x1,
                height: y2 - y1,
                confidence: score[1],
            })
        })
        .collect();

    Ok(regions)
}

/// Greedy NMS: keep the most confident box, drop everything overlapping it
/// by more than `iou_threshold`, repeat.
pub(crate) fn non_max_suppression(
    mut candidates: Vec<FaceRegion>,
    iou_threshold: f32,
) -> Vec<FaceRegion> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<FaceRegion> = Vec::new();
    for candidate in candidates {
        if kept
            .iter()
            .all(|k| k.iou(&candidate) <= iou_threshold as f64)
        {
            kept.push(candidate);
        }
    }
    kept
}
