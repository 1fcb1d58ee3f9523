//! End-to-end import behavior against a temporary storage root.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gesto_core::face::{FaceDetector, FaceRegion, NoFaceDetector};
use gesto_core::pipeline::{JpegThumbnailEncoder, RasterDecoder, ThumbnailEncoder};
use gesto_core::{
    BoardId, Config, DerivativeError, FileCollector, Hasher, ImageImporter, ImageStore,
    ImportError, StorageLayout,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

struct FixedDetector(Vec<FaceRegion>);

impl FaceDetector for FixedDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<FaceRegion>, DerivativeError> {
        Ok(self.0.clone())
    }
}

struct FailingEncoder;

impl ThumbnailEncoder for FailingEncoder {
    fn encode(&self, _image: &DynamicImage, _quality: u8) -> Result<Vec<u8>, DerivativeError> {
        Err(DerivativeError::Encode("encoder unavailable".into()))
    }
}

struct Fixture {
    input: TempDir,
    storage: TempDir,
    store: ImageStore,
}

impl Fixture {
    fn new() -> Self {
        Self::with(Arc::new(JpegThumbnailEncoder), Arc::new(NoFaceDetector))
    }

    fn with(encoder: Arc<dyn ThumbnailEncoder>, detector: Arc<dyn FaceDetector>) -> Self {
        let input = tempfile::tempdir().unwrap();
        let storage = tempfile::tempdir().unwrap();
        let config = Config::default();
        let importer = ImageImporter::with_components(
            &config,
            StorageLayout::new(storage.path()),
            Arc::new(RasterDecoder),
            encoder,
            detector,
        );
        let store = ImageStore::from_parts(importer, FileCollector::new(&config.import));
        Self {
            input,
            storage,
            store,
        }
    }

    fn png(&self, name: &str, width: u32, height: u32, shade: u8) -> PathBuf {
        let path = self.input.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        RgbImage::from_pixel(width, height, Rgb([shade, 40, 90]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    fn file(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.input.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, bytes).unwrap();
        path
    }
}

fn dir_entries(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(path)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn import_stores_content_named_original_and_thumbnail() {
    let fx = Fixture::new();
    let board = BoardId::new();
    let source = fx.png("Holiday Snap.PNG", 800, 400, 12);
    let expected_hash = Hasher::content_hash(&source).unwrap();

    let result = fx.store.import_one(&source, board).await.unwrap();

    assert_eq!(result.content_hash, expected_hash);
    assert_eq!(result.filename, format!("{expected_hash}.png"));
    assert_eq!((result.width, result.height), (800, 400));
    assert_eq!(result.focal_y, 0.5);

    let original = fx.storage.path().join("Images").join(board.dir_name()).join(&result.filename);
    let thumbnail = fx
        .storage
        .path()
        .join("Thumbnails")
        .join(board.dir_name())
        .join(format!("{expected_hash}_thumb.jpg"));
    assert_eq!(original, fx.store.original_path(board, &result.filename));
    assert_eq!(thumbnail, fx.store.thumbnail_path(board, &result.filename));

    assert_eq!(fs::read(&original).unwrap(), fs::read(&source).unwrap());
    let thumb = image::open(&thumbnail).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (300, 150));
    assert_eq!(image::guess_format(&fs::read(&thumbnail).unwrap()).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn reimport_is_idempotent_and_leaves_files_untouched() {
    let fx = Fixture::new();
    let board = BoardId::new();
    let source = fx.png("a.png", 120, 90, 1);

    let first = fx.store.import_one(&source, board).await.unwrap();
    let original = fx.store.original_path(board, &first.filename);
    let thumbnail = fx.store.thumbnail_path(board, &first.filename);
    let original_bytes = fs::read(&original).unwrap();
    let thumb_bytes = fs::read(&thumbnail).unwrap();
    let original_mtime = fs::metadata(&original).unwrap().modified().unwrap();
    let thumb_mtime = fs::metadata(&thumbnail).unwrap().modified().unwrap();

    let second = fx.store.import_one(&source, board).await.unwrap();

    assert_eq!(first.filename, second.filename);
    assert_eq!(first.content_hash, second.content_hash);
    assert_eq!(first.focal_y, second.focal_y);
    assert!(first.original_written && first.thumbnail_written);
    assert!(!second.original_written && !second.thumbnail_written);
    assert_eq!(fs::read(&original).unwrap(), original_bytes);
    assert_eq!(fs::read(&thumbnail).unwrap(), thumb_bytes);
    assert_eq!(fs::metadata(&original).unwrap().modified().unwrap(), original_mtime);
    assert_eq!(fs::metadata(&thumbnail).unwrap().modified().unwrap(), thumb_mtime);
    assert_eq!(dir_entries(&fx.store.layout().original_dir(board)).len(), 1);
}

#[tokio::test]
async fn same_bytes_from_different_names_dedupe() {
    let fx = Fixture::new();
    let board = BoardId::new();
    let first = fx.png("first.png", 64, 64, 5);
    let copy = fx.file("elsewhere/second.png", &fs::read(&first).unwrap());

    let a = fx.store.import_one(&first, board).await.unwrap();
    let b = fx.store.import_one(&copy, board).await.unwrap();

    assert_eq!(a.filename, b.filename);
    assert_eq!(dir_entries(&fx.store.layout().original_dir(board)).len(), 1);
}

#[tokio::test]
async fn extension_is_part_of_the_identity() {
    let fx = Fixture::new();
    let board = BoardId::new();
    let png = fx.png("shot.png", 64, 64, 9);
    let renamed = fx.file("shot.jpg", &fs::read(&png).unwrap());

    let a = fx.store.import_one(&png, board).await.unwrap();
    let b = fx.store.import_one(&renamed, board).await.unwrap();

    assert_eq!(a.content_hash, b.content_hash);
    assert_ne!(a.filename, b.filename);
    assert_eq!(dir_entries(&fx.store.layout().original_dir(board)).len(), 2);
    // Both share one thumbnail name and the second import finds it in place.
    assert!(!b.thumbnail_written);
    assert_eq!(dir_entries(&fx.store.layout().thumbnail_dir(board)).len(), 1);
}

#[tokio::test]
async fn boards_are_isolated() {
    let fx = Fixture::new();
    let source = fx.png("a.png", 32, 32, 3);
    let one = BoardId::new();
    let two = BoardId::new();

    let a = fx.store.import_one(&source, one).await.unwrap();
    let b = fx.store.import_one(&source, two).await.unwrap();
    assert!(a.original_written && b.original_written);

    fx.store.delete_board(one).await;
    assert!(!fx.store.original_path(one, &a.filename).exists());
    assert!(fx.store.original_path(two, &b.filename).exists());
    assert!(fx.store.thumbnail_path(two, &b.filename).exists());
}

#[tokio::test]
async fn undecodable_input_fails_without_writing() {
    let fx = Fixture::new();
    let board = BoardId::new();
    let bogus = fx.file("notes.jpg", b"definitely not a jpeg");

    let err = fx.store.import_one(&bogus, board).await.unwrap_err();
    assert!(err.is_decode(), "unexpected error: {err}");

    assert!(!fx.storage.path().join("Images").exists());
    assert!(!fx.storage.path().join("Thumbnails").exists());
}

#[tokio::test]
async fn missing_source_is_reported() {
    let fx = Fixture::new();
    let missing = fx.input.path().join("gone.png");

    let err = fx.store.import_one(&missing, BoardId::new()).await.unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(ref p) if p == &missing));
}

#[tokio::test]
async fn thumbnail_failure_does_not_fail_import() {
    let fx = Fixture::with(Arc::new(FailingEncoder), Arc::new(NoFaceDetector));
    let board = BoardId::new();
    let source = fx.png("a.png", 50, 50, 8);

    let result = fx.store.import_one(&source, board).await.unwrap();

    assert!(result.original_written);
    assert!(!result.thumbnail_written);
    assert_eq!(result.focal_y, 0.5);
    assert!(fx.store.original_path(board, &result.filename).exists());
    assert!(!fx.store.thumbnail_path(board, &result.filename).exists());
}

#[tokio::test]
async fn detected_faces_move_the_focal_point() {
    // Face spans 0.2..0.6 from the top of the frame.
    let face = FaceRegion::new(0.3, 0.2, 0.2, 0.4);
    let fx = Fixture::with(Arc::new(JpegThumbnailEncoder), Arc::new(FixedDetector(vec![face])));
    let board = BoardId::new();
    let source = fx.png("portrait.png", 200, 300, 4);

    let result = fx.store.import_one(&source, board).await.unwrap();
    assert!((result.focal_y - 0.244).abs() < 1e-6);

    // The value is recomputed when the thumbnail already exists.
    let again = fx.store.import_one(&source, board).await.unwrap();
    assert!(!again.thumbnail_written);
    assert!((again.focal_y - 0.244).abs() < 1e-6);
}

#[tokio::test]
async fn small_images_are_not_upscaled_and_alpha_is_flattened() {
    let fx = Fixture::new();
    let board = BoardId::new();
    let path = fx.input.path().join("icon.png");
    RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 0]))
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();

    let result = fx.store.import_one(&path, board).await.unwrap();
    let thumb = image::open(fx.store.thumbnail_path(board, &result.filename)).unwrap();

    assert_eq!((thumb.width(), thumb.height()), (40, 20));
    let pixel = thumb.to_rgb8().get_pixel(10, 10).0;
    assert!(pixel.iter().all(|&c| c > 240), "expected white, got {pixel:?}");
}

#[tokio::test]
async fn collect_then_batch_import_reports_summary() {
    let fx = Fixture::new();
    let board = BoardId::new();
    let a = fx.png("a.png", 30, 30, 1);
    fx.png("nested/b.png", 30, 30, 2);
    fx.file("nested/readme.txt", b"skip me");
    fx.file("broken.gif", b"GIF89a but not really");
    fx.file("copy.png", &fs::read(&a).unwrap());

    let files = fx.store.collect(&[fx.input.path().to_path_buf()]).await;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(!names.contains(&"readme.txt".to_string()));
    assert_eq!(files.len(), 4);

    let mut known = HashSet::new();
    let summary = fx.store.import_batch(&files, board, &mut known, |_| {}).await;

    assert_eq!(summary.total(), 4);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.message(), "2 imported, 1 duplicate skipped, 1 failed");
    assert_eq!(known.len(), 2);
}

#[tokio::test]
async fn concurrent_stores_sharing_a_lock_serialize() {
    let fx = Fixture::new();
    let board = BoardId::new();
    let source = fx.png("same.png", 100, 100, 2);
    let clone = fx.store.clone();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = clone.clone();
            let source = source.clone();
            tokio::spawn(async move { store.import_one(&source, board).await })
        })
        .collect();

    let mut written = 0;
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        if result.original_written {
            written += 1;
        }
    }

    assert_eq!(written, 1);
    assert_eq!(dir_entries(&fx.store.layout().original_dir(board)).len(), 1);
    assert_eq!(dir_entries(&fx.store.layout().thumbnail_dir(board)).len(), 1);
}
