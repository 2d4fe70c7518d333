//! Ring buffer counters and status reports

use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::EventRecord;

/// Counters maintained by a ring buffer
#[derive(Debug, Default)]
pub struct BufferCounters {
    /// Times the write cursor returned to the head slot
    pub wrap_count: AtomicU64,
    /// Events dropped because of lock contention
    pub dropped: AtomicU64,
}

impl BufferCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one full cycle of the write cursor
    pub fn record_wrap(&self) {
        self.wrap_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one dropped event
    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Current wrap count
    pub fn wraps(&self) -> u64 {
        self.wrap_count.load(Ordering::Relaxed)
    }

    /// Current drop count
    pub fn drops(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Zero both counters
    pub fn reset(&self) {
        self.wrap_count.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of a ring buffer's bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStatus {
    /// Number of slots
    pub capacity: usize,
    /// Slots holding a readable event
    pub used: usize,
    /// Times the write cursor returned to the head slot
    pub wrap_count: u64,
    /// Events dropped because of lock contention
    pub dropped: u64,
    /// Index of the slot the next write goes to
    pub next_write: usize,
}

impl BufferStatus {
    /// Whether old events have been overwritten at least once
    pub fn has_wrapped(&self) -> bool {
        self.wrap_count > 0
    }

    /// Fraction of slots in use
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.used as f64 / self.capacity as f64
        }
    }
}

/// Events copied out of a buffer, oldest first, with the status at that instant
#[derive(Debug, Clone, Default)]
pub struct BufferSnapshot {
    /// Buffer bookkeeping when the copy was taken
    pub status: BufferStatus,
    /// Readable events in write order
    pub events: Vec<EventRecord>,
}

impl BufferSnapshot {
    /// Number of events captured
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events were captured
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Messages of the captured events in order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|event| event.message.as_str())
    }
}
