//! The `gesto remove` command.

use clap::{Args, Subcommand};
use gesto_core::pipeline::is_entry_name;
use gesto_core::{BoardId, Config, ImageStore};

/// Arguments for the `remove` command.
#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[command(subcommand)]
    pub command: RemoveCommand,
}

/// What to remove.
#[derive(Subcommand, Debug)]
pub enum RemoveCommand {
    /// Remove one image's original and thumbnail
    Image {
        /// Board the image belongs to
        #[arg(long)]
        board: BoardId,

        /// Stored filename, e.g. `<sha256>.jpg`
        filename: String,
    },

    /// Remove everything stored for a board
    Board {
        /// Board to remove
        board: BoardId,
    },
}

/// Execute the remove command. Missing files are not an error.
pub async fn execute(args: RemoveArgs, config: &Config) -> anyhow::Result<()> {
    // Cleanup never touches pixels, so skip loading the face model.
    let mut config = config.clone();
    config.focal.enabled = false;
    let store = ImageStore::new(&config);

    match args.command {
        RemoveCommand::Image { board, filename } => {
            if !is_entry_name(&filename) {
                anyhow::bail!("Not a stored image name: {:?} (expected e.g. <sha256>.jpg)", filename);
            }
            store.delete_image(board, &filename).await;
            tracing::info!("Removed {} from board {}", filename, board);
        }
        RemoveCommand::Board { board } => {
            store.delete_board(board).await;
            tracing::info!("Removed board {}", board);
        }
    }
    Ok(())
}
