//! Import orchestration - wires together all pipeline stages for one file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{DerivativeError, ImportError};
use crate::face::{load_detector, FaceDetector};
use crate::types::{BoardId, ImportResult};

use super::decode::{DecodedImage, ImageDecoder, RasterDecoder};
use super::focal::{FocalPointEstimator, DEFAULT_FOCAL_Y};
use super::hash::Hasher;
use super::layout::StorageLayout;
use super::thumbnail::{JpegThumbnailEncoder, ThumbnailEncoder, ThumbnailGenerator};

/// Imports single files into a board's storage tree.
///
/// Not synchronized on its own: callers that may run concurrently against
/// the same root go through [`crate::ImageStore`].
pub struct ImageImporter {
    layout: StorageLayout,
    decoder: Arc<dyn ImageDecoder>,
    encoder: Arc<dyn ThumbnailEncoder>,
    thumbnails: ThumbnailGenerator,
    focal: FocalPointEstimator,
    default_extension: String,
}

impl ImageImporter {
    /// Build an importer from configuration, loading the face model if present.
    pub fn new(config: &Config) -> Self {
        let detector = load_detector(&config.focal, &config.face_model_path());
        Self::with_components(
            config,
            StorageLayout::new(config.app_data_root()),
            Arc::new(RasterDecoder),
            Arc::new(JpegThumbnailEncoder),
            detector,
        )
    }

    /// Build an importer with explicit backends.
    pub fn with_components(
        config: &Config,
        layout: StorageLayout,
        decoder: Arc<dyn ImageDecoder>,
        encoder: Arc<dyn ThumbnailEncoder>,
        detector: Arc<dyn FaceDetector>,
    ) -> Self {
        Self {
            layout,
            decoder,
            encoder,
            thumbnails: ThumbnailGenerator::new(config.thumbnail.clone()),
            focal: FocalPointEstimator::new(detector),
            default_extension: config.import.default_extension.to_lowercase(),
        }
    }

    /// The layout this importer writes into.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Import one file into a board.
    ///
    /// Nothing is written unless the bytes decode. An existing original or
    /// thumbnail is never rewritten. Thumbnail and focal-point failures are
    /// logged and the import still succeeds with a centered focal point.
    pub fn import_one(&self, source: &Path, board: BoardId) -> Result<ImportResult, ImportError> {
        let start = Instant::now();
        tracing::debug!("Importing {:?} into board {}", source, board);

        // Read
        let bytes = fs::read(source).map_err(|e| ImportError::read(source, e))?;
        tracing::trace!("  Read {} bytes: {:?}", bytes.len(), start.elapsed());

        // Hash
        let hash_start = Instant::now();
        let content_hash = Hasher::content_hash_from_bytes(&bytes);
        tracing::trace!("  Content hash: {:?}", hash_start.elapsed());

        // Decode
        let decode_start = Instant::now();
        let decoded = self.decoder.decode(&bytes, source)?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        let filename = canonical_filename(&content_hash, source, &self.default_extension);

        // Store original
        let original_dir = self.layout.original_dir(board);
        fs::create_dir_all(&original_dir).map_err(|e| ImportError::io(&original_dir, e))?;
        let original_path = self.layout.original_path(board, &filename);
        let original_written =
            write_if_absent(&original_path, &bytes).map_err(|e| ImportError::io(&original_path, e))?;
        if !original_written {
            tracing::debug!("  Original already stored at {:?}", original_path);
        }

        // Derivatives
        let derive_start = Instant::now();
        let thumbnail_path = self.layout.thumbnail_path(board, &filename);
        let (focal_y, thumbnail_written) = if thumbnail_path.exists() {
            let preview = self.thumbnails.render(&decoded.upright());
            (self.focal.estimate_focal_y(&preview), false)
        } else {
            match self.write_derivatives(&decoded, &thumbnail_path) {
                Ok(written) => written,
                Err(e) => {
                    tracing::warn!("Thumbnail skipped for {:?}: {}", source, e);
                    (DEFAULT_FOCAL_Y, false)
                }
            }
        };
        tracing::trace!("  Derivatives: {:?}", derive_start.elapsed());

        tracing::debug!(
            "Imported {:?} as {} in {:?} ({}x{} {:?}, focal_y {:.3})",
            source,
            filename,
            start.elapsed(),
            decoded.width,
            decoded.height,
            decoded.format,
            focal_y
        );

        Ok(ImportResult {
            filename,
            content_hash,
            width: decoded.width,
            height: decoded.height,
            focal_y,
            original_written,
            thumbnail_written,
        })
    }

    /// Render, encode and store the thumbnail, then estimate the focal point
    /// on the upright preview. Returns the focal point and whether this call
    /// created the thumbnail file.
    fn write_derivatives(
        &self,
        decoded: &DecodedImage,
        thumbnail_path: &Path,
    ) -> Result<(f64, bool), DerivativeError> {
        let preview = self.thumbnails.render(&decoded.upright());
        let encoded = self
            .encoder
            .encode(&preview, self.thumbnails.quality())?;

        if let Some(dir) = thumbnail_path.parent() {
            fs::create_dir_all(dir).map_err(|source| DerivativeError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let written = write_if_absent(thumbnail_path, &encoded).map_err(|source| {
            DerivativeError::Io {
                path: thumbnail_path.to_path_buf(),
                source,
            }
        })?;
        if !written {
            tracing::debug!("  Thumbnail already stored at {:?}", thumbnail_path);
        }

        Ok((self.focal.estimate_focal_y(&preview), written))
    }
}

/// `<hash>.<lowercased source extension>`, or the default extension when the
/// source has none.
pub fn canonical_filename(content_hash: &str, source: &Path, default_extension: &str) -> String {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| default_extension.to_string());
    format!("{content_hash}.{ext}")
}

/// Create `path` with `bytes` unless something is already there.
///
/// Returns `Ok(false)` when the file existed. Uses create-new semantics so a
/// concurrent writer from another process can't be clobbered; a failed write
/// removes its partial file.
pub(crate) fn write_if_absent(path: &Path, bytes: &[u8]) -> io::Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };

    if let Err(e) = file.write_all(bytes).and_then(|_| file.flush()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(e);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_filename_lowercases_extension() {
        let name = canonical_filename("abc", Path::new("/photos/IMG_1.JPEG"), "jpg");
        assert_eq!(name, "abc.jpeg");
    }

    #[test]
    fn test_canonical_filename_defaults_extension() {
        let name = canonical_filename("abc", Path::new("/photos/scan"), "jpg");
        assert_eq!(name, "abc.jpg");
    }

    #[test]
    fn test_canonical_filename_ignores_source_name() {
        let a = canonical_filename("abc", Path::new("/one/cat.png"), "jpg");
        let b = canonical_filename("abc", Path::new("/two/dog.png"), "jpg");
        assert_eq!(a, b);
    }

    fn test_importer(root: &Path) -> ImageImporter {
        ImageImporter::with_components(
            &Config::default(),
            StorageLayout::new(root),
            Arc::new(RasterDecoder),
            Arc::new(JpegThumbnailEncoder),
            Arc::new(crate::face::NoFaceDetector),
        )
    }

    fn decoded_png(path: &Path) -> DecodedImage {
        image::RgbImage::from_pixel(30, 20, image::Rgb([10, 20, 30]))
            .save_with_format(path, image::ImageFormat::Png)
            .unwrap();
        RasterDecoder
            .decode(&fs::read(path).unwrap(), path)
            .unwrap()
    }

    #[test]
    fn test_write_derivatives_reports_thumbnail_created() {
        let dir = tempfile::tempdir().unwrap();
        let importer = test_importer(&dir.path().join("store"));
        let decoded = decoded_png(&dir.path().join("a.png"));
        let thumb = dir.path().join("store").join("Thumbnails").join("t_thumb.jpg");

        let (focal_y, written) = importer.write_derivatives(&decoded, &thumb).unwrap();
        assert!(written);
        assert_eq!(focal_y, DEFAULT_FOCAL_Y);
        assert!(thumb.exists());
    }

    #[test]
    fn test_write_derivatives_keeps_thumbnail_written_by_another_writer() {
        let dir = tempfile::tempdir().unwrap();
        let importer = test_importer(&dir.path().join("store"));
        let decoded = decoded_png(&dir.path().join("a.png"));
        let thumb = dir.path().join("t_thumb.jpg");
        fs::write(&thumb, b"first writer").unwrap();

        let (_, written) = importer.write_derivatives(&decoded, &thumb).unwrap();
        assert!(!written);
        assert_eq!(fs::read(&thumb).unwrap(), b"first writer");
    }

    #[test]
    fn test_write_if_absent_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        assert!(write_if_absent(&path, b"first").unwrap());
        assert!(!write_if_absent(&path, b"second").unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn test_write_if_absent_missing_parent_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("blob");
        let err = write_if_absent(&path, b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!path.exists());
    }
}
