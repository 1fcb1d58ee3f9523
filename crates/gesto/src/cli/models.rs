//! The `gesto models` command for the face detection model.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use gesto_core::{Config, Hasher};

/// Published UltraFace RFB-320 model from the ONNX model zoo.
pub const DEFAULT_MODEL_URL: &str = "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/ultraface/models/version-RFB-320.onnx";

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download the face detection model to the configured path
    Download {
        /// Source URL
        #[arg(long, default_value = DEFAULT_MODEL_URL)]
        url: String,

        /// Expected SHA-256 of the file; the download is discarded on mismatch
        #[arg(long)]
        sha256: Option<String>,

        /// Replace an existing model file
        #[arg(long)]
        force: bool,
    },

    /// Show whether the model is installed
    List,

    /// Show the model file path
    Path,
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    let model_path = config.face_model_path();

    match args.command {
        ModelsCommand::Download { url, sha256, force } => {
            if model_path.exists() && !force {
                tracing::info!("Face model already exists at {:?}", model_path);
                return Ok(());
            }
            if let Some(parent) = model_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            tracing::info!("Downloading face detection model...");
            tracing::info!("  Source: {}", url);
            tracing::info!("  Destination: {:?}", model_path);

            let client = reqwest::Client::new();
            download_file(&client, &url, &model_path, sha256.as_deref()).await?;

            let file_size = std::fs::metadata(&model_path)?.len();
            tracing::info!(
                "  Download complete ({:.1} MB)",
                file_size as f64 / (1024.0 * 1024.0)
            );
        }

        ModelsCommand::List => {
            let status = if model_path.exists() {
                "ready"
            } else {
                "not installed"
            };
            let enabled = if config.focal.enabled {
                ""
            } else {
                "  (detection disabled in config)"
            };
            println!("Face detection model:");
            println!("    - {:30} {:14}{}", "ultraface-rfb-320", status, enabled);
            println!("      {}", model_path.display());
            if !model_path.exists() {
                println!("\nRun `gesto models download` to enable face-aware focal points.");
            }
        }

        ModelsCommand::Path => {
            println!("{}", model_path.display());
        }
    }

    Ok(())
}

/// Stream a URL to disk.
///
/// The body lands in a `.part` file next to `dest` and is renamed into place
/// only after the optional checksum matches, so an interrupted or corrupt
/// download never looks like an installed model.
async fn download_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
) -> anyhow::Result<()> {
    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let total_size = response.content_length();
    if let Some(size) = total_size {
        tracing::info!("  Size: {:.1} MB", size as f64 / (1024.0 * 1024.0));
    }

    let partial = partial_path(dest);
    write_stream(response.bytes_stream(), &partial, total_size).await?;

    if let Some(expected) = expected_sha256 {
        verify_sha256(&partial, expected)?;
    }
    tokio::fs::rename(&partial, dest).await?;
    Ok(())
}

/// Write a byte stream to `path`, removing the file again if the stream or
/// any write fails.
async fn write_stream<S, B, E>(
    stream: S,
    path: &Path,
    total_size: Option<u64>,
) -> anyhow::Result<()>
where
    S: futures_util::Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let result = copy_stream(stream, path, total_size).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

async fn copy_stream<S, B, E>(
    mut stream: S,
    path: &Path,
    total_size: Option<u64>,
) -> anyhow::Result<()>
where
    S: futures_util::Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::File::create(path).await?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        file.write_all(chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(total) = total_size {
            if downloaded % (256 * 1024) < chunk.len() as u64 {
                tracing::debug!(
                    "  Progress: {:.0}%",
                    downloaded as f64 / total as f64 * 100.0
                );
            }
        }
    }
    file.flush().await?;
    Ok(())
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Check a file's SHA-256. On mismatch the file is removed.
fn verify_sha256(path: &Path, expected: &str) -> anyhow::Result<()> {
    let actual = Hasher::content_hash(path)
        .map_err(|e| anyhow::anyhow!("Checksum computation failed for {}: {e}", path.display()))?;

    if !actual.eq_ignore_ascii_case(expected.trim()) {
        let _ = std::fs::remove_file(path);
        anyhow::bail!(
            "Checksum mismatch for {}:\n  expected: {}\n  actual:   {}\n\
             Corrupt file removed, try downloading again.",
            path.display(),
            expected,
            actual
        );
    }

    tracing::debug!("  Checksum verified: {}", &actual[..16]);
    Ok(())
}
