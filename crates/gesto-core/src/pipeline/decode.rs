//! Image decoding with content-based format detection.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::ImportError;

use super::metadata::Orientation;

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded pixels, as stored (orientation not applied)
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Stored width in pixels
    pub width: u32,
    /// Stored height in pixels
    pub height: u32,
    /// EXIF orientation of the source
    pub orientation: Orientation,
}

impl DecodedImage {
    /// The pixels rotated/flipped for display.
    pub fn upright(&self) -> DynamicImage {
        self.orientation.apply(self.image.clone())
    }
}

/// Capability: turn raw bytes into pixels and dimensions.
pub trait ImageDecoder: Send + Sync {
    /// Decode `bytes`. `path` is only used for format hints and error messages.
    fn decode(&self, bytes: &[u8], path: &Path) -> Result<DecodedImage, ImportError>;
}

/// Decoder backed by the `image` crate.
///
/// Format detection looks at the content first and only falls back to the
/// extension, so a PNG saved as `.jpg` still decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8], path: &Path) -> Result<DecodedImage, ImportError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImportError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| ImportError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format".to_string(),
            })?,
        };
        let image = image::load_from_memory_with_format(bytes, format).map_err(|e| {
            ImportError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ImportError::Decode {
                path: path.to_path_buf(),
                message: "Image has no pixels".to_string(),
            });
        }

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            orientation: Orientation::from_bytes(bytes),
        })
    }
}
