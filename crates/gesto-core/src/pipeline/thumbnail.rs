//! Thumbnail generation with JPEG output.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use std::io::Cursor;

use crate::config::ThumbnailConfig;
use crate::error::DerivativeError;

/// Capability: encode thumbnail pixels into the on-disk derivative format.
pub trait ThumbnailEncoder: Send + Sync {
    /// Encode `image` at the given quality (1-100).
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, DerivativeError>;
}

/// Baseline JPEG encoder. Transparent pixels are composited over white.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegThumbnailEncoder;

impl ThumbnailEncoder for JpegThumbnailEncoder {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>, DerivativeError> {
        let rgb = flatten_on_white(image);
        let mut buffer = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|e| DerivativeError::Encode(e.to_string()))?;
        Ok(buffer.into_inner())
    }
}

/// Resizes images down to the configured thumbnail size.
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    /// JPEG quality to encode with.
    pub fn quality(&self) -> u8 {
        self.config.quality
    }

    /// Scale so the longest edge is at most `max_pixel_size`, keeping the
    /// aspect ratio. Smaller images are returned unchanged.
    pub fn render(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        let max = self.config.max_pixel_size;
        if width <= max && height <= max {
            return image.clone();
        }
        image.thumbnail(max, max)
    }

    /// Render and encode in one step.
    pub fn generate_bytes(
        &self,
        image: &DynamicImage,
        encoder: &dyn ThumbnailEncoder,
    ) -> Result<Vec<u8>, DerivativeError> {
        let thumbnail = self.render(image);
        encoder.encode(&thumbnail, self.config.quality)
    }
}

fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}
