//! Image preprocessing for UltraFace inference.
//!
//! The RFB-320 model expects:
//! - Input size: 320×240 pixels (width × height)
//! - Normalization: (pixel - 127) / 128
//! - Channel order: RGB
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::DynamicImage;
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// UltraFace normalization mean.
const NORM_MEAN: f32 = 127.0;

/// UltraFace normalization scale.
const NORM_SCALE: f32 = 128.0;

/// Model input width.
pub const INPUT_WIDTH: u32 = 320;

/// Model input height.
pub const INPUT_HEIGHT: u32 = 240;

/// Resize to the model input, convert to RGB, normalize and lay out as NCHW.
///
/// The aspect ratio is not preserved. Box outputs are normalized to the
/// input frame, which maps straight back onto the source image.
pub fn preprocess(image: &DynamicImage) -> Array4<f32> {
    let resized = image.resize_exact(
        INPUT_WIDTH,
        INPUT_HEIGHT,
        image::imageops::FilterType::Triangle,
    );
    let rgb = resized.to_rgb8();

    let height = INPUT_HEIGHT as usize;
    let width = INPUT_WIDTH as usize;

    Array4::from_shape_fn((1, CHANNELS, height, width), |(_, c, y, x)| {
        let pixel = rgb.get_pixel(x as u32, y as u32);
        (pixel[c] as f32 - NORM_MEAN) / NORM_SCALE
    })
}
