//! Bounded record queue between the parser and an aggregator
//!
//! A fixed-capacity FIFO built on a crossbeam bounded channel. `push`
//! blocks while the queue is full, `pop` blocks while it is empty and still
//! open. Closing the producer side (explicitly or by dropping it) lets the
//! consumer drain what is left and then observe end of stream.

use crate::record::Record;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Default number of records buffered between stages
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Why a push did not land in the queue
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    /// `close` was already called on this producer
    #[error("queue is closed")]
    Closed,

    /// The consumer went away, nobody will ever pop
    #[error("queue consumer disconnected")]
    Disconnected,
}

/// Counters shared by both ends of a queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Records accepted by `push`
    pub pushed: AtomicU64,

    /// Records handed out by `pop`
    pub popped: AtomicU64,

    /// Largest queue length observed right after a push
    pub high_water: AtomicUsize,
}

impl QueueStats {
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            pushed: self.pushed.load(Ordering::Relaxed),
            popped: self.popped.load(Ordering::Relaxed),
            high_water: self.high_water.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`QueueStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub pushed: u64,
    pub popped: u64,
    pub high_water: usize,
}

impl QueueSnapshot {
    /// Sum counters of several queues; high water is the largest of them
    pub fn combine(self, other: QueueSnapshot) -> QueueSnapshot {
        QueueSnapshot {
            pushed: self.pushed + other.pushed,
            popped: self.popped + other.popped,
            high_water: self.high_water.max(other.high_water),
        }
    }
}

/// Create a queue holding at most `capacity` records
///
/// # Panics
///
/// Panics if `capacity` is zero; a zero-capacity channel would turn the
/// queue into a rendezvous point with no buffering at all.
pub fn bounded_queue(capacity: usize) -> (Producer, Consumer) {
    assert!(capacity > 0, "queue capacity must be positive");
    let (sender, receiver) = bounded(capacity);
    let stats = Arc::new(QueueStats::default());
    (
        Producer {
            sender: Some(sender),
            capacity,
            stats: Arc::clone(&stats),
        },
        Consumer { receiver, stats },
    )
}

/// Sending half, owned by the parser
#[derive(Debug)]
pub struct Producer {
    sender: Option<Sender<Record>>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl Producer {
    /// Push a record, blocking while the queue is full
    pub fn push(&self, record: Record) -> Result<(), PushError> {
        let sender = self.sender.as_ref().ok_or(PushError::Closed)?;
        sender.send(record).map_err(|_| PushError::Disconnected)?;
        self.stats.pushed.fetch_add(1, Ordering::Relaxed);
        self.stats.high_water.fetch_max(sender.len(), Ordering::Relaxed);
        Ok(())
    }

    /// Signal that no more records will be pushed. Calling it again is a no-op.
    pub fn close(&mut self) {
        self.sender.take();
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_none()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records currently buffered
    pub fn len(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.sender.as_ref().is_some_and(Sender::is_full)
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Receiving half, owned by an aggregator
#[derive(Debug)]
pub struct Consumer {
    receiver: Receiver<Record>,
    stats: Arc<QueueStats>,
}

impl Consumer {
    /// Pop the next record
    ///
    /// Blocks while the queue is empty and the producer is still open.
    /// Returns `None` once the producer has closed and every buffered record
    /// has been taken.
    pub fn pop(&self) -> Option<Record> {
        let record = self.receiver.recv().ok()?;
        self.stats.popped.fetch_add(1, Ordering::Relaxed);
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

impl Iterator for Consumer {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.pop()
    }
}
