//! Collects candidate image files from user-selected files and folders.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ImportConfig;

/// Expands files and directories into a flat list of image paths.
///
/// Best effort: anything that is not a readable file with an allowed
/// extension is skipped without an error.
#[derive(Debug, Clone)]
pub struct FileCollector {
    extensions: Vec<String>,
}

impl FileCollector {
    /// Create a collector using the configured extension allow-list.
    pub fn new(config: &ImportConfig) -> Self {
        Self {
            extensions: config
                .supported_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        }
    }

    /// Collect candidate image files.
    ///
    /// Inputs keep their order. Each directory is walked recursively with
    /// entries sorted by file name, so a given snapshot always yields the
    /// same sequence.
    pub fn collect(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                self.collect_dir(input, &mut files);
            } else if input.is_file() && self.is_supported(input) {
                files.push(input.clone());
            } else {
                tracing::debug!("Skipping {:?}", input);
            }
        }

        files
    }

    fn collect_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry under {:?}: {}", dir, e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.is_supported(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    /// Check if a file has a supported extension (case-insensitive).
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext_lower)
            })
            .unwrap_or(false)
    }
}

impl Default for FileCollector {
    fn default() -> Self {
        Self::new(&ImportConfig::default())
    }
}
