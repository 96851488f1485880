//! Error types for station-stats
//!
//! Only startup can fail: the input may be missing, the configuration may
//! be unusable, or a pipeline thread may die. Malformed lines are not
//! errors at all, the parser drops them.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the library
#[derive(Error, Debug)]
pub enum StatsError {
    /// The input could not be opened or mapped
    #[error("Cannot open file '{}'", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration rejected before the pipeline starts
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A pipeline thread could not be started
    #[error("Failed to start {stage} thread")]
    Spawn {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline thread panicked before finishing
    #[error("{0} stage terminated abnormally")]
    StageFailed(&'static str),
}

/// Result type alias using StatsError
pub type Result<T> = std::result::Result<T, StatsError>;
