//! Content hashing for storage-level deduplication.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// SHA-256 content hasher.
///
/// Digests depend only on the bytes, never on the path or file metadata, so
/// the same picture hashes identically wherever it comes from.
pub struct Hasher;

impl Hasher {
    /// Hash an in-memory byte buffer to 64 lowercase hex characters.
    pub fn content_hash_from_bytes(data: &[u8]) -> String {
        format!("{:x}", Sha256::digest(data))
    }

    /// Hash a file by streaming it in 64 KiB chunks.
    pub fn content_hash(path: &Path) -> std::io::Result<String> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();

        let mut buffer = [0u8; 65536];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}
