//! The `gesto import` command: batch import with progress and summary.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, ValueEnum};
use gesto_core::{
    BatchEvent, BoardId, Config, ImageStore, ImportResult, ImportSummary,
    OutputFormat as CoreOutputFormat, OutputWriter,
};
use serde::{Deserialize, Serialize};

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// One JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `import` command.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Board to import into
    #[arg(long)]
    pub board: BoardId,

    /// Image files or folders
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Hashes already attached to the board: one hex hash per line, or the
    /// JSON/JSONL output of an earlier import
    #[arg(long)]
    pub known_hashes: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

/// One line of import output.
#[derive(Debug, Serialize)]
struct ImportRecord<'a> {
    source: &'a Path,
    board: BoardId,
    #[serde(flatten)]
    result: &'a ImportResult,
}

/// The only field needed from earlier output when loading known hashes.
#[derive(Debug, Deserialize)]
struct HashRecord {
    content_hash: String,
}

/// Execute the import command.
pub async fn execute(args: ImportArgs, config: &Config) -> anyhow::Result<()> {
    let store = ImageStore::new(config);

    let files = store.collect(&args.paths).await;
    if files.is_empty() {
        tracing::warn!("No supported image files found in {:?}", args.paths);
        return Ok(());
    }
    tracing::info!("Importing {} file(s) into board {}", files.len(), args.board);

    let mut known = match &args.known_hashes {
        Some(path) => load_known_hashes(path)?,
        None => HashSet::new(),
    };
    if !known.is_empty() {
        tracing::info!("Loaded {} known hashes", known.len());
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, args.format.into(), true);
    let mut write_error: Option<std::io::Error> = None;

    let progress = create_progress_bar(files.len() as u64);
    let start = Instant::now();

    let summary = store
        .import_batch(&files, args.board, &mut known, |event| {
            match event {
                BatchEvent::Imported(source, result) => {
                    let record = ImportRecord {
                        source,
                        board: args.board,
                        result,
                    };
                    if let Err(e) = writer.push(&record) {
                        write_error.get_or_insert(e);
                    }
                }
                BatchEvent::Duplicate(source, _) => {
                    tracing::debug!("Already on board: {:?}", source);
                }
                BatchEvent::Failed(..) => {}
            }
            progress.inc(1);
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let rate = progress.position() as f64 / elapsed;
                progress.set_message(format!("{:.1} img/sec", rate));
            }
        })
        .await;

    progress.finish_and_clear();

    if let Some(e) = write_error {
        return Err(e).context("Failed to write import output");
    }
    writer.finish().context("Failed to write import output")?;
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    print_summary(&summary, start.elapsed());
    Ok(())
}

/// Read known content hashes from a hash list or earlier import output.
fn load_known_hashes(path: &Path) -> anyhow::Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read known hashes from {}", path.display()))?;

    if let Ok(records) = serde_json::from_str::<Vec<HashRecord>>(&content) {
        return Ok(records
            .into_iter()
            .map(|r| r.content_hash.to_lowercase())
            .collect());
    }

    let mut hashes = HashSet::new();
    let mut skipped_lines = 0u64;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('{') {
            match serde_json::from_str::<HashRecord>(line) {
                Ok(record) => {
                    hashes.insert(record.content_hash.to_lowercase());
                }
                Err(_) => skipped_lines += 1,
            }
        } else if is_sha256_hex(line) {
            hashes.insert(line.to_lowercase());
        } else {
            skipped_lines += 1;
        }
    }
    if skipped_lines > 0 {
        tracing::warn!(
            "{skipped_lines} lines in {:?} are not hashes and were ignored",
            path
        );
    }
    Ok(hashes)
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Create a progress bar for batch imports.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after a batch import.
fn print_summary(summary: &ImportSummary, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Imported:     {:>8}", summary.imported);
    if summary.duplicates > 0 {
        eprintln!("    Duplicates:   {:>8}", summary.duplicates);
    }
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
    eprintln!("  {}", summary.message());
}
