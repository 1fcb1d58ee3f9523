//! The image store: one serialized writer per storage root.
//!
//! Every mutation (import, delete) takes the store's writer lock and runs its
//! blocking filesystem and image work on tokio's blocking pool. The guard
//! moves into the blocking task, so a caller dropping the future mid-import
//! cannot let a second writer in while the first is still touching disk.
//! Path resolution needs neither the lock nor I/O.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::ImportError;
use crate::face::FaceDetector;
use crate::pipeline::cleanup;
use crate::pipeline::{
    FileCollector, ImageDecoder, ImageImporter, StorageLayout, ThumbnailEncoder,
};
use crate::types::{BoardId, ImportResult, ImportSummary};

/// What happened to one file of a batch.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// New logical reference for the board
    Imported(&'a Path, &'a ImportResult),
    /// Content already attached to the board
    Duplicate(&'a Path, &'a ImportResult),
    /// Import failed; the batch continues
    Failed(&'a Path, &'a ImportError),
}

/// Dependency-injected handle to one storage root.
///
/// Clones share the same writer lock.
#[derive(Clone)]
pub struct ImageStore {
    importer: Arc<ImageImporter>,
    collector: FileCollector,
    layout: StorageLayout,
    writer: Arc<Mutex<()>>,
}

impl ImageStore {
    /// Create a store from configuration.
    pub fn new(config: &Config) -> Self {
        Self::from_parts(ImageImporter::new(config), FileCollector::new(&config.import))
    }

    /// Create a store with explicit backends and storage root.
    pub fn with_components(
        config: &Config,
        layout: StorageLayout,
        decoder: Arc<dyn ImageDecoder>,
        encoder: Arc<dyn ThumbnailEncoder>,
        detector: Arc<dyn FaceDetector>,
    ) -> Self {
        let importer = ImageImporter::with_components(config, layout, decoder, encoder, detector);
        Self::from_parts(importer, FileCollector::new(&config.import))
    }

    /// Create a store around an explicitly built importer.
    pub fn from_parts(importer: ImageImporter, collector: FileCollector) -> Self {
        let layout = importer.layout().clone();
        Self {
            importer: Arc::new(importer),
            collector,
            layout,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// The storage layout, for lock-free path resolution.
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Location of a stored original.
    pub fn original_path(&self, board: BoardId, filename: &str) -> PathBuf {
        self.layout.original_path(board, filename)
    }

    /// Location of a stored thumbnail.
    pub fn thumbnail_path(&self, board: BoardId, filename: &str) -> PathBuf {
        self.layout.thumbnail_path(board, filename)
    }

    /// Expand files and folders into candidate image paths.
    pub async fn collect(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let collector = self.collector.clone();
        let inputs = inputs.to_vec();
        match tokio::task::spawn_blocking(move || collector.collect(&inputs)).await {
            Ok(files) => files,
            Err(e) => {
                tracing::error!("File collection task failed: {e}");
                Vec::new()
            }
        }
    }

    /// Import one file into a board.
    pub async fn import_one(
        &self,
        source: &Path,
        board: BoardId,
    ) -> Result<ImportResult, ImportError> {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        let importer = Arc::clone(&self.importer);
        let source_owned = source.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            importer.import_one(&source_owned, board)
        })
        .await
        .map_err(|e| ImportError::Task {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?
    }

    /// Import already-collected files one after another.
    ///
    /// `known_hashes` holds the content hashes already attached to the board;
    /// matches are counted as duplicates instead of new references. Hashes of
    /// newly imported files are added, so repeats inside the batch are caught
    /// too. Failures are counted and logged without stopping the batch.
    pub async fn import_batch<F>(
        &self,
        files: &[PathBuf],
        board: BoardId,
        known_hashes: &mut HashSet<String>,
        mut on_event: F,
    ) -> ImportSummary
    where
        F: FnMut(BatchEvent<'_>),
    {
        let mut summary = ImportSummary::default();

        for file in files {
            match self.import_one(file, board).await {
                Ok(result) => {
                    if known_hashes.contains(&result.content_hash) {
                        summary.duplicates += 1;
                        on_event(BatchEvent::Duplicate(file, &result));
                        continue;
                    }
                    known_hashes.insert(result.content_hash.clone());
                    summary.imported += 1;
                    on_event(BatchEvent::Imported(file, &result));
                    summary.results.push(result);
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!("Failed to import {:?}: {}", file, e);
                    on_event(BatchEvent::Failed(file, &e));
                }
            }
        }

        tracing::info!("Board {}: {}", board, summary.message());
        summary
    }

    /// Remove one image's original and thumbnail. Never fails.
    pub async fn delete_image(&self, board: BoardId, filename: &str) {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        let layout = self.layout.clone();
        let filename = filename.to_string();

        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            cleanup::delete_image(&layout, board, &filename);
        });
        if let Err(e) = task.await {
            tracing::warn!("Image cleanup task failed: {e}");
        }
    }

    /// Remove a board's whole storage subtree. Never fails.
    pub async fn delete_board(&self, board: BoardId) {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        let layout = self.layout.clone();

        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            cleanup::delete_board(&layout, board);
        });
        if let Err(e) = task.await {
            tracing::warn!("Board cleanup task failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::NoFaceDetector;
    use crate::pipeline::{JpegThumbnailEncoder, RasterDecoder};
    use image::{ImageFormat, Rgb, RgbImage};

    fn test_store(root: &Path) -> ImageStore {
        ImageStore::with_components(
            &Config::default(),
            StorageLayout::new(root),
            Arc::new(RasterDecoder),
            Arc::new(JpegThumbnailEncoder),
            Arc::new(NoFaceDetector),
        )
    }

    fn write_png(path: &Path, shade: u8) {
        RgbImage::from_pixel(40, 20, Rgb([shade, 100, 200]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[tokio::test]
    async fn test_import_one_writes_original_and_thumbnail() {
        let input = tempfile::tempdir().unwrap();
        let storage = tempfile::tempdir().unwrap();
        let store = test_store(storage.path());
        let board = BoardId::new();
        let source = input.path().join("photo.png");
        write_png(&source, 10);

        let result = store.import_one(&source, board).await.unwrap();

        assert!(result.original_written);
        assert!(result.thumbnail_written);
        assert_eq!((result.width, result.height), (40, 20));
        assert_eq!(result.focal_y, 0.5);
        assert!(store.original_path(board, &result.filename).exists());
        assert!(store.thumbnail_path(board, &result.filename).exists());
    }

    #[tokio::test]
    async fn test_batch_counts_known_and_in_batch_duplicates() {
        let input = tempfile::tempdir().unwrap();
        let storage = tempfile::tempdir().unwrap();
        let store = test_store(storage.path());
        let board = BoardId::new();

        let a = input.path().join("a.png");
        let a_copy = input.path().join("a_copy.png");
        let b = input.path().join("b.png");
        let broken = input.path().join("broken.png");
        write_png(&a, 1);
        std::fs::copy(&a, &a_copy).unwrap();
        write_png(&b, 2);
        std::fs::write(&broken, b"not an image").unwrap();

        let mut known = HashSet::new();
        let mut events = Vec::new();
        let summary = store
            .import_batch(
                &[a.clone(), a_copy, b, broken],
                board,
                &mut known,
                |event| {
                    events.push(match event {
                        BatchEvent::Imported(..) => "imported",
                        BatchEvent::Duplicate(..) => "duplicate",
                        BatchEvent::Failed(..) => "failed",
                    })
                },
            )
            .await;

        assert_eq!(events, vec!["imported", "duplicate", "imported", "failed"]);
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results.len(), 2);
        assert_eq!(known.len(), 2);

        // Re-running against the now-known set only finds duplicates.
        let again = store.import_batch(&[a], board, &mut known, |_| {}).await;
        assert_eq!(again.imported, 0);
        assert_eq!(again.duplicates, 1);
    }

    #[tokio::test]
    async fn test_concurrent_imports_of_same_content() {
        let input = tempfile::tempdir().unwrap();
        let storage = tempfile::tempdir().unwrap();
        let store = test_store(storage.path());
        let board = BoardId::new();
        let source = input.path().join("same.png");
        write_png(&source, 7);

        let (first, second) = tokio::join!(
            store.import_one(&source, board),
            store.import_one(&source, board)
        );
        let first = first.unwrap();
        let second = second.unwrap();

        assert_eq!(first.filename, second.filename);
        assert!(first.original_written != second.original_written);
        let entries = std::fs::read_dir(store.layout().original_dir(board))
            .unwrap()
            .count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_delete_image_then_board() {
        let input = tempfile::tempdir().unwrap();
        let storage = tempfile::tempdir().unwrap();
        let store = test_store(storage.path());
        let board = BoardId::new();
        let source = input.path().join("photo.png");
        write_png(&source, 3);
        let result = store.import_one(&source, board).await.unwrap();

        store.delete_image(board, &result.filename).await;
        store.delete_image(board, &result.filename).await;
        assert!(!store.original_path(board, &result.filename).exists());
        assert!(!store.thumbnail_path(board, &result.filename).exists());

        store.delete_board(board).await;
        store.delete_board(board).await;
        assert!(!store.layout().original_dir(board).exists());
        assert!(!store.layout().thumbnail_dir(board).exists());
    }

    #[tokio::test]
    async fn test_collect_filters_extensions() {
        let input = tempfile::tempdir().unwrap();
        let storage = tempfile::tempdir().unwrap();
        let store = test_store(storage.path());
        write_png(&input.path().join("a.png"), 1);
        std::fs::write(input.path().join("notes.txt"), b"hi").unwrap();

        let files = store.collect(&[input.path().to_path_buf()]).await;
        assert_eq!(files, vec![input.path().join("a.png")]);
    }
}
