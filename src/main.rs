//! station-stats - per-key min/mean/max over delimited text
//!
//! Exit codes:
//!   0 - Success (including inputs with no valid lines)
//!   1 - Input could not be opened, bad arguments, or a pipeline thread died

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use station_stats::{LineSource, Pipeline};
use tracing::{debug, info};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();

    init_logging(&args);

    info!("station-stats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        debug!("Run failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize logging on stderr so stdout carries only the result.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = args.pipeline_config()?;
    let pipeline = Pipeline::new(config).context("Invalid pipeline settings")?;

    let source = LineSource::open(&args.input)?;
    let output = pipeline.run(&source)?;

    println!("{}", output.table);

    if args.summary {
        let stats = &output.stats;
        eprintln!(
            "lines={} records={} dropped={} keys={} queue_high_water={} elapsed={:?}",
            stats.lines,
            stats.records,
            stats.dropped,
            stats.keys,
            stats.queue.high_water,
            stats.elapsed
        );
    }
    Ok(())
}
