//! Z-HUNT-3 command line
//!
//! Originally written by Ping-jung Chou, under the instruction of Pui S. Ho.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zhunt3::zscore::{analyze_zscore, header_for, zscore_path, ZScoreWriter};
use zhunt3::{ModelParams, Sequence, WindowRange, WindowScanner};

/// Z-HUNT: Predicts Z-DNA formation in DNA sequences
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Window size (dinucleotides)
    window_size: usize,

    /// Minimum size
    min_size: usize,

    /// Maximum size
    max_size: usize,

    /// Input sequence file
    filename: PathBuf,

    /// Number of threads to use (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    threads: usize,

    /// Use sequential processing instead of parallel
    #[arg(short, long)]
    sequential: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

fn calculate_zscore(args: &Args, params: &ModelParams) -> Result<()> {
    let range = WindowRange::new(args.window_size, args.min_size, args.max_size);
    if range.to_din != args.max_size || range.from_din != args.min_size {
        warn!(
            from_din = range.from_din,
            to_din = range.to_din,
            "window range clamped to the window size"
        );
    }

    let sequence = Sequence::load(&args.filename, range.nucleotides())
        .with_context(|| format!("Failed to read file: {}", args.filename.display()))?;

    let output_filename = zscore_path(&args.filename);
    info!("opening {}", output_filename.display());
    let output_file = File::create(&output_filename)
        .with_context(|| format!("Failed to create output file: {}", output_filename.display()))?;
    let mut writer = ZScoreWriter::new(
        output_file,
        &header_for(&args.filename, sequence.len(), range),
    )?;

    let scanner = WindowScanner::new(params, range);
    let start_time = Instant::now();
    scanner.scan_chunks(&sequence, !args.sequential, |chunk| writer.write_results(chunk))?;
    writer.finish()?;

    info!("Run time: {} ms", start_time.elapsed().as_millis());
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    info!("dinucleotides {}", args.window_size);
    info!("min/max {} {}", args.min_size, args.max_size);
    info!("operating on {}", args.filename.display());

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .with_context(|| format!("Failed to configure {} threads", args.threads))?;
        info!("Using {} threads", args.threads);
    } else {
        info!("Using {} threads (auto-detected)", rayon::current_num_threads());
    }

    let params = ModelParams::default();
    calculate_zscore(&args, &params)?;
    analyze_zscore(&args.filename, &params)
        .with_context(|| format!("Failed to analyze {}", zscore_path(&args.filename).display()))?;

    Ok(())
}
