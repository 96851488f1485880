//! Aggregator stage: folds records from a queue into its own table.

use crate::queue::Consumer;
use crate::record::split_line;
use crate::table::AggregateTable;
use tracing::debug;

/// Drain `input` until end of stream and return the finished table
///
/// The table never leaves this function until the queue is closed and
/// empty, so no other thread can observe it half-filled.
pub fn run(input: Consumer) -> AggregateTable {
    let mut table = AggregateTable::new();
    let mut folded = 0u64;
    while let Some(record) = input.pop() {
        table.fold(record.key, record.value);
        folded += 1;
    }
    debug!(records = folded, keys = table.len(), "aggregator finished");
    table
}

/// Single-threaded fold straight from lines, without queues
pub fn aggregate_sequential<'a, I>(lines: I, delimiter: u8) -> AggregateTable
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut table = AggregateTable::new();
    for line in lines {
        if let Some((key, value)) = split_line(line, delimiter) {
            table.fold_borrowed(key, value);
        }
    }
    table
}
