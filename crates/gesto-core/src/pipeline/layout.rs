//! Board-scoped storage layout.
//!
//! ```text
//! <root>/Images/<BOARD-UUID>/<sha256>.<ext>
//! <root>/Thumbnails/<BOARD-UUID>/<sha256>_thumb.jpg
//! ```
//!
//! Everything here is pure path arithmetic. Nothing touches the filesystem,
//! so display code can resolve paths without going through the store's writer.

use std::path::{Component, Path, PathBuf};

use crate::types::BoardId;

/// Directory holding board originals, relative to the root.
pub const IMAGES_DIR: &str = "Images";

/// Directory holding board thumbnails, relative to the root.
pub const THUMBNAILS_DIR: &str = "Thumbnails";

/// Suffix appended to the stem of a thumbnail.
pub const THUMBNAIL_SUFFIX: &str = "_thumb";

/// Extension of every thumbnail, whatever the source format.
pub const THUMBNAIL_EXTENSION: &str = "jpg";

/// Resolves on-disk locations for one storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a board's originals.
    pub fn original_dir(&self, board: BoardId) -> PathBuf {
        self.root.join(IMAGES_DIR).join(board.dir_name())
    }

    /// Directory holding a board's thumbnails.
    pub fn thumbnail_dir(&self, board: BoardId) -> PathBuf {
        self.root.join(THUMBNAILS_DIR).join(board.dir_name())
    }

    /// Location of a stored original.
    pub fn original_path(&self, board: BoardId, filename: &str) -> PathBuf {
        self.original_dir(board).join(filename)
    }

    /// Location of the thumbnail derived from a stored original.
    pub fn thumbnail_path(&self, board: BoardId, filename: &str) -> PathBuf {
        self.thumbnail_dir(board).join(thumbnail_name(filename))
    }
}

/// True when `filename` names a single entry inside a board directory.
///
/// Absolute paths, `..`, and anything with a separator are rejected, since
/// joining them would resolve outside the board.
pub fn is_entry_name(filename: &str) -> bool {
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// `abc.png` -> `abc_thumb.jpg`. Only the last extension is stripped.
pub fn thumbnail_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    format!("{stem}{THUMBNAIL_SUFFIX}.{THUMBNAIL_EXTENSION}")
}
