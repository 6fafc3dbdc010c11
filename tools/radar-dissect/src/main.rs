//! Offline dissector: decode a radar capture file and print its records,
//! the way `show_object_details.py` did for ad hoc inspection of a
//! recording, but reusing the core decoder instead of a one-shot script.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use radar_ingest::decoder::{decode_buffer, Record};
use radar_ingest::sink::{CsvSink, RecordSink};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "radar-dissect")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dissect a TI AWR1843BOOST capture file and print its decoded records")]
struct Cli {
    /// Capture file to dissect (raw bytes, as produced by `radar-ingest record`).
    file: PathBuf,

    /// Logical source id to tag decoded records with.
    #[arg(long = "source-id", default_value_t = 0)]
    source_id: u16,

    /// Print at most this many detected-object records in detail (0 = unlimited).
    #[arg(long = "limit", default_value_t = 10)]
    limit: usize,

    /// Also write every decoded record to this CSV path.
    #[arg(long = "csv")]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("reading capture file {}", cli.file.display()))?;

    let records = decode_buffer(cli.source_id, &bytes);

    let mut csv_sink = match &cli.csv {
        Some(path) => Some(CsvSink::create(path).context("opening CSV output")?),
        None => None,
    };

    let mut object_count = 0usize;
    let mut noise_count = 0usize;
    let mut heatmap_count = 0usize;

    println!("{}", "=== DECODED RADAR RECORDS ===".bold());

    for record in &records {
        match record {
            Record::DetectedObject(obj) => {
                object_count += 1;
                if cli.limit == 0 || object_count <= cli.limit {
                    println!();
                    println!("{} {}", "Object".cyan(), object_count);
                    println!("  Frame:    {}", obj.frame_number);
                    println!("  Bearing:  {:.2}°", obj.bearing_deg);
                    println!("  Range:    {:.2} cm", obj.range_cm);
                    println!("  Velocity: {:.2} m/s", obj.velocity_mps);
                    println!("  X:        {:.3} m", obj.x);
                    println!("  Y:        {:.3} m", obj.y);
                    println!("  Z:        {:.3} m", obj.z);
                    println!("  Peak val: {}", obj.peak_val);
                    println!("  Range idx:   {}", obj.range_idx);
                    println!("  Doppler idx: {}", obj.doppler_idx);
                }
            }
            Record::NoiseProfile(_) => noise_count += 1,
            Record::AzimuthHeatmap(_) => heatmap_count += 1,
        }

        if let Some(sink) = &mut csv_sink {
            sink.emit(record).await.context("writing record to CSV")?;
        }
    }

    if let Some(sink) = &mut csv_sink {
        sink.flush().await.context("flushing CSV output")?;
    }

    println!();
    println!("Total detected objects found: {}", object_count);
    println!("Noise profiles found: {}", noise_count);
    println!("Azimuth heatmaps found: {}", heatmap_count);

    Ok(())
}
