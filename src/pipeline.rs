//! Orchestration: parser and aggregators on their own threads, joined
//! before the tables are merged and handed back.

use crate::aggregator;
use crate::config::PipelineConfig;
use crate::error::{Result, StatsError};
use crate::parser::{ParseStats, Parser};
use crate::queue::{bounded_queue, QueueSnapshot};
use crate::source::LineSource;
use crate::table::AggregateTable;
use rayon::prelude::*;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Totals for one run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    pub lines: u64,
    pub records: u64,
    pub dropped: u64,
    pub keys: usize,
    pub queue: QueueSnapshot,
    pub elapsed: Duration,
}

/// Result of a completed run
#[derive(Debug)]
pub struct PipelineOutput {
    pub table: AggregateTable,
    pub stats: RunStats,
}

/// Two-stage parse/aggregate pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run to completion over `source`
    ///
    /// The parser and every aggregator are joined before this returns; the
    /// tables only leave their aggregator threads through the join.
    pub fn run(&self, source: &LineSource) -> Result<PipelineOutput> {
        let start = Instant::now();
        info!(
            bytes = source.len(),
            shards = self.config.shards,
            queue_capacity = self.config.queue_capacity,
            "starting pipeline"
        );

        let (parse_stats, tables, queue) = thread::scope(|s| -> Result<_> {
            let mut producers = Vec::with_capacity(self.config.shards);
            let mut queue_stats = Vec::with_capacity(self.config.shards);
            let mut aggregators = Vec::with_capacity(self.config.shards);
            for shard in 0..self.config.shards {
                let (producer, consumer) = bounded_queue(self.config.queue_capacity);
                queue_stats.push(producer.stats());
                producers.push(producer);
                let handle = thread::Builder::new()
                    .name(format!("aggregator-{shard}"))
                    .spawn_scoped(s, move || aggregator::run(consumer))
                    .map_err(|e| StatsError::Spawn {
                        stage: "aggregator",
                        source: e,
                    })?;
                aggregators.push(handle);
            }

            let delimiter = self.config.delimiter;
            let parser = thread::Builder::new()
                .name("parser".to_string())
                .spawn_scoped(s, move || Parser::new(delimiter, producers).run(source.lines()))
                .map_err(|e| StatsError::Spawn {
                    stage: "parser",
                    source: e,
                })?;

            // Join everything before reporting a failure so that no panicked
            // thread is left for the scope to re-raise.
            let parsed = parser.join();
            let joined = aggregators
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>();
            let parse_stats: ParseStats =
                parsed.map_err(|_| StatsError::StageFailed("parser"))?;
            let tables = joined
                .into_iter()
                .map(|joined| joined.map_err(|_| StatsError::StageFailed("aggregator")))
                .collect::<Result<Vec<_>>>()?;
            let queue = queue_stats
                .iter()
                .map(|stats| stats.snapshot())
                .fold(QueueSnapshot::default(), QueueSnapshot::combine);
            Ok((parse_stats, tables, queue))
        })?;

        let table = merge_tables(tables);
        let stats = RunStats {
            lines: parse_stats.lines,
            records: parse_stats.records,
            dropped: parse_stats.dropped,
            keys: table.len(),
            queue,
            elapsed: start.elapsed(),
        };
        info!(
            lines = stats.lines,
            records = stats.records,
            dropped = stats.dropped,
            keys = stats.keys,
            high_water = stats.queue.high_water,
            elapsed = ?stats.elapsed,
            "pipeline finished"
        );
        Ok(PipelineOutput { table, stats })
    }
}

/// Combine per-shard tables into one
pub fn merge_tables(tables: Vec<AggregateTable>) -> AggregateTable {
    if tables.len() <= 1 {
        return tables.into_iter().next().unwrap_or_default();
    }
    debug!(shards = tables.len(), "merging shard tables");
    tables
        .into_par_iter()
        .reduce(AggregateTable::new, AggregateTable::merge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, config: PipelineConfig) -> PipelineOutput {
        Pipeline::new(config)
            .unwrap()
            .run(&LineSource::from_bytes(input))
            .unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let output = run(
            "CityA;10.0\nCityB;20.0\nCityA;30.0\n",
            PipelineConfig::default(),
        );
        let rendered = output.table.to_string();
        assert!(rendered.contains("CityA=10.000000/20.000000/30.000000"));
        assert!(rendered.contains("CityB=20.000000/20.000000/20.000000"));
        assert_eq!(output.stats.records, 3);
        assert_eq!(output.stats.keys, 2);
    }

    #[test]
    fn test_empty_input() {
        let output = run("", PipelineConfig::default());
        assert!(output.table.is_empty());
        assert_eq!(output.table.to_string(), "{  }");
        assert_eq!(
            output.stats,
            RunStats {
                elapsed: output.stats.elapsed,
                ..RunStats::default()
            }
        );
    }

    #[test]
    fn test_only_malformed_lines() {
        let output = run("nope\n;\nx;y\n", PipelineConfig::default());
        assert!(output.table.is_empty());
        assert_eq!(output.stats.lines, 3);
        assert_eq!(output.stats.dropped, 3);
    }

    #[test]
    fn test_sharded_run_matches_single() {
        let input = (0..5_000)
            .map(|i| format!("station{};{}.{}\n", i % 37, i % 91 - 40, i % 10))
            .collect::<String>();
        let single = run(&input, PipelineConfig::default().with_queue_capacity(8));
        let sharded = run(
            &input,
            PipelineConfig::default().with_queue_capacity(8).with_shards(4),
        );

        assert_eq!(single.table.len(), 37);
        assert_eq!(sharded.table.len(), 37);
        for (key, a) in single.table.iter() {
            let b = sharded.table.get(key).unwrap();
            assert_eq!(a.min(), b.min());
            assert_eq!(a.max(), b.max());
            assert_eq!(a.count(), b.count());
            assert!((a.sum() - b.sum()).abs() < 1e-6);
        }
        assert!(sharded.stats.queue.high_water <= 8);
    }

    #[test]
    fn test_merge_tables_of_none_and_one() {
        assert!(merge_tables(Vec::new()).is_empty());
        let mut table = AggregateTable::new();
        table.fold_borrowed("a", 1.0);
        assert_eq!(merge_tables(vec![table]).len(), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let pipeline = Pipeline::new(PipelineConfig::default().with_shards(2)).unwrap();
        assert_eq!(pipeline.config().shards, 2);
        let err = Pipeline::new(PipelineConfig::default().with_shards(0)).unwrap_err();
        assert!(matches!(err, StatsError::InvalidConfig(_)));
    }
}
