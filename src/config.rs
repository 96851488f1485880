//! Pipeline configuration.

use crate::error::{Result, StatsError};
use crate::queue::DEFAULT_CAPACITY;

/// Default field delimiter
pub const DEFAULT_DELIMITER: u8 = b';';

/// Tunables for a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Byte separating key and value on each line
    pub delimiter: u8,

    /// Records buffered per queue before the parser blocks
    pub queue_capacity: usize,

    /// Number of aggregator threads; each owns a hash partition of the keys
    pub shards: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            queue_capacity: DEFAULT_CAPACITY,
            shards: 1,
        }
    }
}

impl PipelineConfig {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(StatsError::InvalidConfig(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        if self.shards == 0 {
            return Err(StatsError::InvalidConfig(
                "shard count must be at least 1".to_string(),
            ));
        }
        if matches!(self.delimiter, b'\n' | b'\r') {
            return Err(StatsError::InvalidConfig(
                "delimiter cannot be a line terminator".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.queue_capacity, 10_000);
        assert_eq!(config.shards, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = PipelineConfig::default()
            .with_delimiter(b',')
            .with_queue_capacity(64)
            .with_shards(4);
        assert_eq!(
            config,
            PipelineConfig {
                delimiter: b',',
                queue_capacity: 64,
                shards: 4
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = PipelineConfig::default();
        assert!(base.with_queue_capacity(0).validate().is_err());
        assert!(base.with_shards(0).validate().is_err());
        assert!(base.with_delimiter(b'\n').validate().is_err());
        assert!(base.with_delimiter(b'\r').validate().is_err());
    }
}
