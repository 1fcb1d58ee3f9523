//! The `gesto collect` command.

use std::path::PathBuf;

use clap::Args;
use gesto_core::{Config, FileCollector};

/// Arguments for the `collect` command.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Files or folders to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Print every supported image path found under the inputs, one per line.
pub fn execute(args: CollectArgs, config: &Config) -> anyhow::Result<()> {
    let files = FileCollector::new(&config.import).collect(&args.paths);
    tracing::info!("Found {} image file(s)", files.len());

    for file in &files {
        println!("{}", file.display());
    }
    Ok(())
}
