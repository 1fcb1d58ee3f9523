//! Gesto CLI - import images into reference boards.
//!
//! Images are stored once per board under a content-derived name, with a
//! small JPEG thumbnail and a face-aware focal point for cropping.
//!
//! # Usage
//!
//! ```bash
//! # Import a folder into a board
//! gesto import --board 1B4E28BA-2FA1-11D2-883F-0016D3CCA427 ./poses/
//!
//! # Where does an image live?
//! gesto path --board 1B4E28BA-2FA1-11D2-883F-0016D3CCA427 <sha256>.jpg
//!
//! # Fetch the face detection model
//! gesto models download
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Gesto - content-addressed image storage for reference boards.
#[derive(Parser, Debug)]
#[command(name = "gesto")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Storage root to use instead of the configured one
    #[arg(long, global = true, env = "GESTO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the image files an import would pick up
    Collect(cli::collect::CollectArgs),

    /// Import images into a board
    Import(cli::import::ImportArgs),

    /// Print the stored locations of an image
    Path(cli::paths::PathArgs),

    /// Print the content hash of a file
    Hash(cli::hash::HashArgs),

    /// Remove an image or a whole board from storage
    Remove(cli::remove::RemoveArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),

    /// Manage the face detection model
    Models(cli::models::ModelsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't up yet, so config warnings go straight to stderr.
    let mut config = match gesto_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `gesto config path`."
            );
            gesto_core::Config::default()
        }
    };
    if let Some(data_dir) = cli.data_dir {
        config.storage.app_data_root = data_dir;
    }

    logging::init(&logging::LogSettings::resolve(
        &config,
        cli.verbose,
        cli.json_logs,
    ));
    tracing::debug!("Gesto v{}", gesto_core::VERSION);

    match cli.command {
        Commands::Collect(args) => cli::collect::execute(args, &config),
        Commands::Import(args) => cli::import::execute(args, &config).await,
        Commands::Path(args) => cli::paths::execute(args, &config),
        Commands::Hash(args) => cli::hash::execute(args),
        Commands::Remove(args) => cli::remove::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config),
        Commands::Models(args) => cli::models::execute(args, &config).await,
    }
}
