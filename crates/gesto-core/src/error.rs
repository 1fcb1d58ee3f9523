//! Error types for the Gesto image store.
//!
//! Import errors are split into the two categories a caller has to tell apart
//! when reporting a batch: the bytes were not an image, or the filesystem said
//! no. Derivative (thumbnail / focal point) failures have their own type because
//! they never fail an import.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-file import failures.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Source bytes are not a parseable raster image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Reading the source or writing into the store failed
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file does not exist. Missing store paths are `Io`.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The blocking import task panicked or was cancelled by the runtime
    #[error("Import task failed for {path}: {message}")]
    Task { path: PathBuf, message: String },
}

impl ImportError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure to read the source file. A missing source is
    /// reported as [`ImportError::FileNotFound`].
    pub fn read(source_path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = source_path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound(path);
        }
        Self::Io { path, source }
    }

    /// True for failures caused by unreadable image data.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Thumbnail and focal-point failures. Logged, never surfaced as an import failure.
#[derive(Error, Debug)]
pub enum DerivativeError {
    /// Thumbnail encoding failed
    #[error("Thumbnail encoding failed: {0}")]
    Encode(String),

    /// Face detection failed
    #[error("Face detection failed: {0}")]
    Detection(String),

    /// Writing the thumbnail failed
    #[error("Thumbnail write failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
