//! Gesto Core - content-addressed image storage for reference boards.
//!
//! Files dropped onto a board are read, hashed with SHA-256, decoded, and
//! stored under a board-scoped, content-named path. Each stored image gets a
//! small JPEG thumbnail and a vertical focal point derived from detected
//! faces, so crops keep heads in frame.
//!
//! # Architecture
//!
//! ```text
//! Paths → Collect → Read → Hash → Decode → Store original
//!                                        → Thumbnail → Focal point → ImportResult
//! ```
//!
//! On disk, relative to the storage root:
//!
//! ```text
//! Images/<BOARD-UUID>/<sha256>.<ext>
//! Thumbnails/<BOARD-UUID>/<sha256>_thumb.jpg
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use gesto_core::{BoardId, Config, ImageStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let store = ImageStore::new(&config);
//!     let board = BoardId::new();
//!
//!     let result = store.import_one("./pose.jpg".as_ref(), board).await?;
//!     println!("{} focal_y={:.2}", result.filename, result.focal_y);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod face;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, DerivativeError, ImportError};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{FileCollector, Hasher, ImageImporter, StorageLayout};
pub use store::{BatchEvent, ImageStore};
pub use types::{BoardId, ImportResult, ImportSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
