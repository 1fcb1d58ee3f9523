//! Image import pipeline components.
//!
//! - **hash**: SHA-256 content hashing
//! - **layout**: board-scoped storage paths
//! - **discovery**: collect image files from files and folders
//! - **decode**: decode bytes into pixels
//! - **metadata**: EXIF orientation
//! - **thumbnail**: fixed-size JPEG thumbnails
//! - **focal**: focal point from detected faces
//! - **processor**: orchestrates one import
//! - **cleanup**: remove images and boards

pub mod cleanup;
pub mod decode;
pub mod discovery;
pub mod focal;
pub mod hash;
pub mod layout;
pub mod metadata;
pub mod processor;
pub mod thumbnail;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder, RasterDecoder};
pub use discovery::FileCollector;
pub use focal::{focal_y_from_regions, FocalPointEstimator, DEFAULT_FOCAL_Y};
pub use hash::Hasher;
pub use layout::{is_entry_name, StorageLayout};
pub use metadata::Orientation;
pub use processor::{canonical_filename, ImageImporter};
pub use thumbnail::{JpegThumbnailEncoder, ThumbnailEncoder, ThumbnailGenerator};
