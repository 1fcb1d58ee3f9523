//! Removal of stored artifacts.
//!
//! Cleanup runs from explicit user deletes and again from board teardown, so
//! every operation treats "already gone" as success and never returns an
//! error. Other failures are logged and the remaining targets are still
//! attempted.

use std::fs;
use std::io;
use std::path::Path;

use crate::types::BoardId;

use super::layout::{is_entry_name, StorageLayout};

/// Remove one image's original and thumbnail.
///
/// Names that would resolve outside the board's directories are refused.
pub fn delete_image(layout: &StorageLayout, board: BoardId, filename: &str) {
    if !is_entry_name(filename) {
        tracing::warn!("Refusing to delete {:?}: not a stored image name", filename);
        return;
    }
    remove_file(&layout.original_path(board, filename));
    remove_file(&layout.thumbnail_path(board, filename));
}

/// Remove a board's original and thumbnail subtrees.
pub fn delete_board(layout: &StorageLayout, board: BoardId) {
    remove_dir(&layout.original_dir(board));
    remove_dir(&layout.thumbnail_dir(board));
}

fn remove_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!("Removed {:?}", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {:?}: {}", path, e),
    }
}

fn remove_dir(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!("Removed {:?}", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {:?}: {}", path, e),
    }
}
