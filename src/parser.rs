//! Parser stage: raw lines in, records out to one or more queues.

use crate::queue::Producer;
use crate::record::parse_line;
use std::hash::{BuildHasher, Hash, Hasher};
use tracing::{debug, trace};

/// Fixed seeds so a key always lands on the same shard within a run
const SHARD_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Counters reported by the parser when it finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines read from the source
    pub lines: u64,

    /// Lines turned into records and pushed
    pub records: u64,

    /// Lines dropped as malformed
    pub dropped: u64,
}

/// Splits lines into records and routes each record to its shard queue
pub struct Parser {
    delimiter: u8,
    outputs: Vec<Producer>,
    hasher: ahash::RandomState,
}

impl Parser {
    /// Parser feeding `outputs`; with more than one output, records are
    /// routed by a hash of their key so each key has exactly one consumer.
    pub fn new(delimiter: u8, outputs: Vec<Producer>) -> Self {
        assert!(!outputs.is_empty(), "parser needs at least one output queue");
        Self {
            delimiter,
            outputs,
            hasher: ahash::RandomState::with_seeds(
                SHARD_SEEDS[0],
                SHARD_SEEDS[1],
                SHARD_SEEDS[2],
                SHARD_SEEDS[3],
            ),
        }
    }

    #[inline]
    fn shard_of(&self, key: &str) -> usize {
        if self.outputs.len() == 1 {
            return 0;
        }
        let mut hasher = self.hasher.build_hasher();
        key.hash(&mut hasher);
        hasher.finish() as usize % self.outputs.len()
    }

    /// Parse every line and push the records; closes all queues on return
    ///
    /// Malformed lines are counted and skipped. If a consumer disappears
    /// the parser stops early, since nothing would drain its queue.
    pub fn run<'a, I>(mut self, lines: I) -> ParseStats
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut stats = ParseStats::default();
        for line in lines {
            stats.lines += 1;
            let Some(record) = parse_line(line, self.delimiter) else {
                stats.dropped += 1;
                trace!(line = %String::from_utf8_lossy(line), "dropping malformed line");
                continue;
            };
            let shard = self.shard_of(&record.key);
            if let Err(e) = self.outputs[shard].push(record) {
                debug!(shard, error = %e, "aggregator queue unavailable, parser stopping");
                break;
            }
            stats.records += 1;
        }
        for output in &mut self.outputs {
            output.close();
        }
        debug!(
            lines = stats.lines,
            records = stats.records,
            dropped = stats.dropped,
            "parser finished"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::bounded_queue;
    use crate::source::LineSource;

    #[test]
    fn test_parser_pushes_valid_and_counts_dropped() {
        let source = LineSource::from_bytes("a;1.0\ngarbage\nb;2.5\nc;x\n\n");
        let (producer, consumer) = bounded_queue(16);
        let stats = Parser::new(b';', vec![producer]).run(source.lines());

        assert_eq!(
            stats,
            ParseStats {
                lines: 5,
                records: 2,
                dropped: 3
            }
        );
        let keys = consumer.map(|r| r.key).collect::<Vec<_>>();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_parser_closes_queue_at_end() {
        let (producer, consumer) = bounded_queue(4);
        Parser::new(b';', vec![producer]).run(std::iter::empty());
        assert_eq!(consumer.pop(), None);
    }

    #[test]
    fn test_parser_routes_each_key_to_one_shard() {
        let mut producers = Vec::new();
        let mut consumers = Vec::new();
        for _ in 0..4 {
            let (p, c) = bounded_queue(64);
            producers.push(p);
            consumers.push(c);
        }
        let input = (0..40)
            .map(|i| format!("key{};{}\n", i % 10, i))
            .collect::<String>();
        let source = LineSource::from_bytes(input);
        let stats = Parser::new(b';', producers).run(source.lines());
        assert_eq!(stats.records, 40);

        let shards = consumers
            .into_iter()
            .map(|c| c.map(|r| r.key).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(shards.iter().map(Vec::len).sum::<usize>(), 40);
        for key in (0..10).map(|i| format!("key{i}")) {
            let holders = shards.iter().filter(|s| s.contains(&key)).count();
            assert_eq!(holders, 1, "{key} must live on exactly one shard");
        }
    }

    #[test]
    fn test_parser_stops_when_consumer_is_gone() {
        let (producer, consumer) = bounded_queue(1);
        drop(consumer);
        let source = LineSource::from_bytes("a;1\nb;2\nc;3\n");
        let stats = Parser::new(b';', vec![producer]).run(source.lines());
        assert_eq!(stats.records, 0);
        assert_eq!(stats.lines, 1);
    }
}
