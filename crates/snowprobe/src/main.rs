use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snowprobe_core::outputs::{CleanWriter, CsvWriter, GeoJsonWriter};
use snowprobe_core::record::ResolvedRecord;
use snowprobe_core::{CleanedFile, CleaningConfig, CleaningPipeline, WgsPassthrough};
use snowprobe_reader::read_delimited;

/// Clean raw snow-depth probe exports into analysis-ready CSV and GeoJSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML cleaning configuration; built-in defaults are used when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean a single raw probe file.
    Clean {
        file: PathBuf,
        /// Output stem for the CSV/GeoJSON pair; defaults to the input
        /// path without its extension.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Clean every file in a directory and concatenate the survivors.
    Batch {
        dir: PathBuf,
        /// Output stem for the combined CSV/GeoJSON pair.
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CleaningConfig::from_toml_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CleaningConfig::default(),
    };

    let transform = WgsPassthrough;
    let pipeline = CleaningPipeline::new(&config, &transform)?;

    match cli.command {
        Command::Clean { file, output } => {
            let stem = output.unwrap_or_else(|| file.with_extension(""));
            let cleaned = clean_file(&pipeline, &config, &file)?;
            persist(&config, &stem, &cleaned.records, &cleaned.points)?;
            info!(
                file = %file.display(),
                rows_in = cleaned.counts.before(),
                rows_out = cleaned.counts.after(),
                "cleaning complete"
            );
        }
        Command::Batch { dir, output } => {
            run_batch(&pipeline, &config, &dir, &output)?;
        }
    }

    Ok(())
}

fn clean_file(
    pipeline: &CleaningPipeline<'_>,
    config: &CleaningConfig,
    path: &Path,
) -> Result<CleanedFile> {
    let raw = read_delimited(path, config.header_rows, config.junk_rows)?;
    let cleaned = pipeline.run(&raw)?;
    Ok(cleaned)
}

/// Clean each file independently (calibration windows never cross file
/// boundaries), then concatenate the survivors into one output pair.
fn run_batch(
    pipeline: &CleaningPipeline<'_>,
    config: &CleaningConfig,
    dir: &Path,
    output: &Path,
) -> Result<()> {
    let pattern = dir.join("*");
    let pattern_str = pattern
        .to_str()
        .context("raw data directory path is not valid UTF-8")?;

    let mut combined_records: Vec<ResolvedRecord> = Vec::new();
    let mut combined_points: Vec<(f64, f64)> = Vec::new();
    let mut cleaned_count = 0usize;
    let mut failed_count = 0usize;

    for entry in glob::glob(pattern_str)? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!("unreadable glob entry: {err}");
                failed_count += 1;
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }

        info!(file = %path.display(), "cleaning");
        match clean_file(pipeline, config, &path) {
            Ok(cleaned) => {
                combined_records.extend(cleaned.records);
                combined_points.extend(cleaned.points);
                cleaned_count += 1;
            }
            Err(err) => {
                warn!(file = %path.display(), "skipping file: {err}");
                failed_count += 1;
            }
        }
    }

    if cleaned_count == 0 {
        bail!("no file in {} could be cleaned", dir.display());
    }

    persist(config, output, &combined_records, &combined_points)?;
    info!(
        cleaned = cleaned_count,
        skipped = failed_count,
        rows = combined_records.len(),
        "batch complete"
    );
    Ok(())
}

fn persist(
    config: &CleaningConfig,
    stem: &Path,
    records: &[ResolvedRecord],
    points: &[(f64, f64)],
) -> Result<()> {
    let csv_path = stem.with_extension("csv");
    let geojson_path = stem.with_extension("geojson");

    let csv_writer = CsvWriter::new(&csv_path, &config.columns_to_keep);
    let geojson_writer = GeoJsonWriter::new(&geojson_path);
    let writers: [&dyn CleanWriter; 2] = [&csv_writer, &geojson_writer];
    for writer in writers {
        writer.write(records, points)?;
    }

    info!(csv = %csv_path.display(), geojson = %geojson_path.display(), "outputs written");
    Ok(())
}
