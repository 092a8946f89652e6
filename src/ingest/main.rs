//! Dataset ingest tool.
//!
//! Validates a GeoJSON dataset the way the query server will load it and
//! optionally writes it back reprojected to EPSG:26913, so the server can
//! skip reprojection at startup.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use aurum::loader::{self, properties, Record};
use aurum::models::DatasetKind;
use aurum::projection::TARGET_EPSG;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Validate and reproject a mining dataset")]
struct Args {
    /// GeoJSON FeatureCollection to check
    #[arg(short, long)]
    input: PathBuf,

    /// Collection the file holds: districts, active-claims or inactive-claims
    #[arg(short, long)]
    kind: DatasetKind,

    /// Override the CRS declared in the file
    #[arg(long)]
    source_epsg: Option<u32>,

    /// Write the validated dataset in EPSG:26913 here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Aurum Ingest");
    info!("File: {} ({})", args.input.display(), args.kind);

    let raw = loader::read_dataset(&args.input, args.source_epsg)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    info!(
        "Read {} features in EPSG:{} ({} skipped)",
        raw.records.len(),
        raw.source_epsg,
        raw.skipped
    );

    let pb = ProgressBar::new(raw.records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    for record in &raw.records {
        check_attributes(args.kind, record)?;
        pb.inc(1);
    }
    pb.finish_with_message("Validation complete");

    info!("{} features valid for {}", raw.records.len(), args.kind);

    if let Some(output) = &args.output {
        let collection = loader::to_feature_collection(&raw.records);
        let file = File::create(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &collection).context("Failed to write GeoJSON")?;
        writer.flush()?;

        info!(
            "Wrote {} features in EPSG:{} to {}",
            raw.records.len(),
            TARGET_EPSG,
            output.display()
        );
    } else if raw.source_epsg != TARGET_EPSG {
        warn!(
            "Dataset is in EPSG:{}; pass --output to store a reprojected copy",
            raw.source_epsg
        );
    }

    Ok(())
}

/// Decode the attributes the server will need for this collection.
fn check_attributes(kind: DatasetKind, record: &Record) -> Result<()> {
    match kind {
        DatasetKind::Districts => {
            properties::district(record.id, &record.properties)?;
        }
        DatasetKind::ActiveClaims | DatasetKind::InactiveClaims => {
            let claim = properties::claim(record.id, &record.properties)?;
            if claim.claim_name.is_none() {
                warn!("Claim {} has no claim name", record.id);
            }
        }
    }
    Ok(())
}
