//! The `gesto path` command.

use clap::Args;
use gesto_core::pipeline::is_entry_name;
use gesto_core::{BoardId, Config, StorageLayout};

/// Arguments for the `path` command.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Board the image belongs to
    #[arg(long)]
    pub board: BoardId,

    /// Stored filename, e.g. `<sha256>.jpg`
    pub filename: String,

    /// Only print the thumbnail location
    #[arg(long, conflicts_with = "original")]
    pub thumbnail: bool,

    /// Only print the original location
    #[arg(long)]
    pub original: bool,
}

/// Print where an image's original and thumbnail live. Nothing is checked on
/// disk; the paths are derived from the board and filename alone.
pub fn execute(args: PathArgs, config: &Config) -> anyhow::Result<()> {
    if !is_entry_name(&args.filename) {
        anyhow::bail!(
            "Not a stored image name: {:?} (expected e.g. <sha256>.jpg)",
            args.filename
        );
    }
    let layout = StorageLayout::new(config.app_data_root());
    let original = layout.original_path(args.board, &args.filename);
    let thumbnail = layout.thumbnail_path(args.board, &args.filename);

    if args.original {
        println!("{}", original.display());
    } else if args.thumbnail {
        println!("{}", thumbnail.display());
    } else {
        println!("original:  {}", original.display());
        println!("thumbnail: {}", thumbnail.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(filename: &str) -> PathArgs {
        PathArgs {
            board: BoardId::new(),
            filename: filename.to_string(),
            thumbnail: false,
            original: true,
        }
    }

    #[test]
    fn test_rejects_names_outside_the_board() {
        let config = Config::default();
        assert!(execute(args("/etc/passwd"), &config).is_err());
        assert!(execute(args("../../x.jpg"), &config).is_err());
    }

    #[test]
    fn test_accepts_stored_name() {
        assert!(execute(args("abc.jpg"), &Config::default()).is_ok());
    }
}
