//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where boards keep their originals and thumbnails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the board storage tree (`Images/` and `Thumbnails/` live here)
    pub app_data_root: PathBuf,
}

impl Default for StorageConfig {
    /// `<platform data dir>/Gesto`, e.g. `~/Library/Application Support/Gesto`
    /// on macOS and `~/.local/share/Gesto` on Linux. Falls back to `~/.gesto`.
    fn default() -> Self {
        let root = directories::BaseDirs::new()
            .map(|dirs| dirs.data_dir().join("Gesto"))
            .unwrap_or_else(|| PathBuf::from("~/.gesto"));
        Self {
            app_data_root: root,
        }
    }
}

/// Import settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Extensions picked up when collecting files and folders
    pub supported_extensions: Vec<String>,

    /// Extension used when the source file has none
    pub default_extension: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            supported_extensions: [
                "jpg", "jpeg", "png", "heic", "heif", "webp", "tiff", "tif", "gif", "bmp",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            default_extension: "jpg".to_string(),
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Longest edge of the thumbnail in pixels
    pub max_pixel_size: u32,

    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_pixel_size: 300,
            quality: 80,
        }
    }
}

/// Focal point / face detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocalConfig {
    /// Run face detection at all. When false every focal value is 0.5.
    pub enabled: bool,

    /// Path to the UltraFace ONNX model
    pub model_path: PathBuf,

    /// Minimum face score kept after inference
    pub score_threshold: f32,

    /// IoU above which overlapping detections are suppressed
    pub iou_threshold: f32,
}

impl Default for FocalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_path: PathBuf::from("~/.gesto/models/version-RFB-320.onnx"),
            score_threshold: 0.7,
            iou_threshold: 0.3,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
