//! Fixed-capacity circular event buffer

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    config::WRITER_LOCK_SPINS,
    error::{RingLogError, Result},
    event::{Event, EventSlot},
    ext::RendererRegistry,
    sync::SpinLock,
};

use super::stats::{BufferCounters, BufferSnapshot, BufferStatus};

/// Circular buffer of pre-allocated event slots
///
/// Writers reserve a slot with [`advance_write`](Self::advance_write), which
/// only moves the cursor under the buffer lock, then fill it with
/// [`populate`](Self::populate) outside the lock. The oldest event is
/// overwritten once the cursor wraps.
#[derive(Debug)]
pub struct RingBuffer {
    slots: Box<[EventSlot]>,
    lock: SpinLock,
    next_write: AtomicUsize,
    counters: BufferCounters,
}

impl RingBuffer {
    /// Allocate a buffer with `capacity` empty slots
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RingLogError::invalid_parameter(
                "capacity",
                "Ring buffer capacity must be greater than 0",
            ));
        }

        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|_| {
            RingLogError::memory(format!("Failed to allocate {} event slots", capacity))
        })?;
        slots.resize_with(capacity, EventSlot::new);

        Ok(Self {
            slots: slots.into_boxed_slice(),
            lock: SpinLock::new(),
            next_write: AtomicUsize::new(0),
            counters: BufferCounters::new(),
        })
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Borrow a slot by index
    pub fn slot(&self, index: usize) -> Option<&EventSlot> {
        self.slots.get(index)
    }

    /// Buffer counters
    pub fn counters(&self) -> &BufferCounters {
        &self.counters
    }

    /// Reserve the next slot and advance the cursor
    ///
    /// Spins a bounded number of times for the buffer lock; on failure the
    /// event is counted as dropped and `EventLocked` is returned.
    pub fn advance_write(&self) -> Result<usize> {
        let Some(_guard) = self.lock.guard_bounded(WRITER_LOCK_SPINS) else {
            self.counters.record_drop();
            return Err(RingLogError::EventLocked);
        };

        let index = self.next_write.load(Ordering::Relaxed);
        let next = (index + 1) % self.slots.len();
        self.next_write.store(next, Ordering::Relaxed);
        if next == 0 {
            self.counters.record_wrap();
        }
        Ok(index)
    }

    /// Fill a reserved slot
    ///
    /// Fails with `EventLocked`, counting a drop, when another writer still
    /// holds the slot. The write is never retried.
    pub fn populate(&self, index: usize, event: &Event<'_>, registry: &RendererRegistry) -> Result<()> {
        let slot = self.slots.get(index).ok_or_else(|| {
            RingLogError::invalid_parameter(
                "index",
                format!("Slot {} out of range for capacity {}", index, self.slots.len()),
            )
        })?;

        match slot.try_writer() {
            Some(mut writer) => {
                writer.populate(event, registry);
                Ok(())
            }
            None => {
                self.counters.record_drop();
                Err(RingLogError::EventLocked)
            }
        }
    }

    /// Reserve a slot and fill it
    pub fn append(&self, event: &Event<'_>, registry: &RendererRegistry) -> Result<()> {
        let index = self.advance_write()?;
        self.populate(index, event, registry)
    }

    /// Clear every slot and zero the cursor and counters
    pub fn reset(&self) {
        let _guard = self.lock.guard();
        self.reset_locked();
    }

    /// [`reset`](Self::reset) for a caller already holding the buffer lock
    pub(crate) fn reset_locked(&self) {
        for slot in self.slots.iter() {
            slot.clear();
        }
        self.next_write.store(0, Ordering::Relaxed);
        self.counters.reset();
    }

    /// Current bookkeeping
    pub fn status(&self) -> BufferStatus {
        let _guard = self.lock.guard();
        self.status_locked()
    }

    /// Copy readable events in write order
    ///
    /// Slots mid-write are skipped. Payloads are copied, not rendered, so
    /// the buffer lock is only held for the copy.
    pub fn snapshot(&self) -> BufferSnapshot {
        let _guard = self.lock.guard();
        self.snapshot_locked()
    }

    /// [`snapshot`](Self::snapshot) for a caller already holding the buffer lock
    pub(crate) fn snapshot_locked(&self) -> BufferSnapshot {
        let status = self.status_locked();
        let capacity = self.slots.len();
        let start = if status.has_wrapped() { status.next_write } else { 0 };

        let events = (0..capacity)
            .map(|offset| (start + offset) % capacity)
            .filter_map(|index| self.slots[index].read(index))
            .collect();

        BufferSnapshot { status, events }
    }

    /// Take the buffer lock without a guard; pairs with `unlock_raw`
    pub(crate) fn lock_raw(&self) {
        self.lock.lock();
    }

    /// Release a lock taken with `lock_raw`
    pub(crate) fn unlock_raw(&self) {
        self.lock.unlock();
    }

    /// Whether the buffer lock is held
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub(crate) fn status_locked(&self) -> BufferStatus {
        BufferStatus {
            capacity: self.slots.len(),
            used: self.slots.iter().filter(|slot| slot.is_used()).count(),
            wrap_count: self.counters.wraps(),
            dropped: self.counters.drops(),
            next_write: self.next_write.load(Ordering::Relaxed),
        }
    }
}
