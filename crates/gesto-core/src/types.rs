//! Core data types shared by the import pipeline and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a reference board.
///
/// Displays in the upper-case hyphenated form used for on-disk directory
/// names, so boards created by earlier releases keep resolving to the same
/// subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(Uuid);

impl BoardId {
    /// Generate a fresh random board identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Directory name for this board inside the storage tree.
    pub fn dir_name(&self) -> String {
        self.0.hyphenated().to_string().to_uppercase()
    }
}

impl Default for BoardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name())
    }
}

impl FromStr for BoardId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// The result of importing one file into a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Canonical on-disk name: `<content_hash>.<ext>`
    pub filename: String,

    /// Hex SHA-256 of the original file's bytes
    pub content_hash: String,

    /// Width of the decoded original in pixels
    pub width: u32,

    /// Height of the decoded original in pixels
    pub height: u32,

    /// Vertical focal coordinate in [0, 1], top-left origin
    pub focal_y: f64,

    /// Whether this import created the stored original
    pub original_written: bool,

    /// Whether this import created the thumbnail
    pub thumbnail_written: bool,
}

/// Aggregate outcome of a batch import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Images that produced a new logical reference on the board
    pub imported: usize,

    /// Images whose content was already attached to the board
    pub duplicates: usize,

    /// Images that failed to import
    pub failed: usize,

    /// Results for newly imported images, in submission order
    pub results: Vec<ImportResult>,
}

impl ImportSummary {
    /// Total number of files processed.
    pub fn total(&self) -> usize {
        self.imported + self.duplicates + self.failed
    }

    /// Human readable one-line summary.
    pub fn message(&self) -> String {
        let mut msg = format!("{} imported", self.imported);
        if self.duplicates > 0 {
            let plural = if self.duplicates == 1 { "" } else { "s" };
            msg.push_str(&format!(", {} duplicate{} skipped", self.duplicates, plural));
        }
        if self.failed > 0 {
            msg.push_str(&format!(", {} failed", self.failed));
        }
        msg
    }
}
