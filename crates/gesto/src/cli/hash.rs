//! The `gesto hash` command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use gesto_core::Hasher;

/// Arguments for the `hash` command.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash
    pub file: PathBuf,
}

/// Print the SHA-256 content hash used to name the stored original.
pub fn execute(args: HashArgs) -> anyhow::Result<()> {
    let hash = Hasher::content_hash(&args.file)
        .with_context(|| format!("Failed to hash {}", args.file.display()))?;
    println!("{hash}");
    Ok(())
}
