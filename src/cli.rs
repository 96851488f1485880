//! Command-line arguments.

use anyhow::{bail, Result};
use clap::Parser;
use station_stats::config::{PipelineConfig, DEFAULT_DELIMITER};
use station_stats::queue::DEFAULT_CAPACITY;
use std::path::PathBuf;
use tracing::Level;

/// Compute min/mean/max per key over a file of `key;value` lines
///
/// Prints `{ key=min/mean/max, ... }` to stdout, keys in sorted order.
/// Lines that do not parse are skipped.
///
/// Examples:
///   station-stats measurements.txt
///   station-stats --shards 4 --queue-capacity 50000 measurements.txt
///   RUST_LOG=debug station-stats data.csv --delimiter ,
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input file to aggregate
    #[arg(
        value_name = "INPUT",
        default_value = "measurements.txt",
        env = "STATION_STATS_INPUT"
    )]
    pub input: PathBuf,

    /// Field delimiter (a single ASCII character)
    #[arg(long, default_value_t = DEFAULT_DELIMITER as char, env = "STATION_STATS_DELIMITER")]
    pub delimiter: char,

    /// Records buffered between parser and each aggregator
    #[arg(
        long,
        default_value_t = DEFAULT_CAPACITY,
        value_name = "RECORDS",
        env = "STATION_STATS_QUEUE_CAPACITY"
    )]
    pub queue_capacity: usize,

    /// Aggregator threads, each owning a hash partition of the keys
    #[arg(long, default_value_t = 1, value_name = "COUNT", env = "STATION_STATS_SHARDS")]
    pub shards: usize,

    /// Print line/record/drop counts to stderr after the result
    #[arg(long)]
    pub summary: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Log level when RUST_LOG is not set
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::WARN
        }
    }

    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter '{}' is not an ASCII character", self.delimiter);
        }
        Ok(PipelineConfig::default()
            .with_delimiter(self.delimiter as u8)
            .with_queue_capacity(self.queue_capacity)
            .with_shards(self.shards))
    }
}
