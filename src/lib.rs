//! Per-key min/mean/max over `key;value` lines.
//!
//! A parser thread turns lines into records and pushes them through a
//! bounded queue; an aggregator thread owns the key table and folds every
//! record into it. When the input is exhausted both threads are joined and
//! the finished table is rendered as
//! `{ key=min/mean/max, ... }`.
//!
//! ```
//! use station_stats::{LineSource, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let source = LineSource::from_bytes("CityA;10.0\nCityB;20.0\nCityA;30.0\n");
//! let output = pipeline.run(&source)?;
//! assert_eq!(
//!     output.table.to_string(),
//!     "{ CityA=10.000000/20.000000/30.000000, CityB=20.000000/20.000000/20.000000 }"
//! );
//! # Ok::<(), station_stats::StatsError>(())
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod format;
pub mod parser;
pub mod pipeline;
pub mod queue;
pub mod record;
pub mod source;
pub mod table;

pub use aggregator::aggregate_sequential;
pub use config::PipelineConfig;
pub use error::{Result, StatsError};
pub use parser::{ParseStats, Parser};
pub use pipeline::{Pipeline, PipelineOutput, RunStats};
pub use queue::{bounded_queue, Consumer, Producer, PushError, QueueSnapshot};
pub use record::{parse_line, Record};
pub use source::LineSource;
pub use table::{AggregateState, AggregateTable};
