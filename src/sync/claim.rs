//! Per-slot claim flag
//!
//! A slot is claimed exclusively by the single writer populating it, or
//! shared by readers copying it out. The state word packs a writer bit with a
//! reader count:
//!
//! ```text
//!  bit 31          bits 0..31
//! ┌────────┬──────────────────────┐
//! │ WRITER │     reader count     │
//! └────────┴──────────────────────┘
//! ```
//!
//! A writer that finds another writer gives up (the caller drops the event).
//! A writer that finds only readers waits for them: readers hold the claim
//! for a fixed-size copy and never block while holding it.

use std::sync::atomic::{AtomicU32, Ordering};

const WRITER: u32 = 1 << 31;
const FREE: u32 = 0;

/// Claim word guarding one event slot
#[derive(Debug, Default)]
pub struct SlotClaim {
    state: AtomicU32,
}

impl SlotClaim {
    /// Create a free claim
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(FREE),
        }
    }

    /// Claim for writing unless another writer holds the slot
    pub fn try_write(&self) -> Option<WriteClaim<'_>> {
        loop {
            match self
                .state
                .compare_exchange_weak(FREE, WRITER, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) => return Some(WriteClaim { claim: self }),
                Err(current) if current & WRITER != 0 => return None,
                Err(_) => std::hint::spin_loop(),
            }
        }
    }

    /// Claim for writing, waiting out any other writer
    pub fn write(&self) -> WriteClaim<'_> {
        loop {
            if self
                .state
                .compare_exchange_weak(FREE, WRITER, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return WriteClaim { claim: self };
            }
            std::hint::spin_loop();
        }
    }

    /// Claim for reading unless a writer is populating the slot
    pub fn try_read(&self) -> Option<ReadClaim<'_>> {
        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            if current & WRITER != 0 {
                return None;
            }
            match self.state.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(ReadClaim { claim: self }),
                Err(actual) => current = actual,
            }
        }
    }

    /// Whether a writer currently holds the slot
    pub fn is_writing(&self) -> bool {
        self.state.load(Ordering::Acquire) & WRITER != 0
    }

    /// Number of readers currently holding the slot
    pub fn readers(&self) -> u32 {
        self.state.load(Ordering::Acquire) & !WRITER
    }
}

/// Exclusive claim held by a writer
#[derive(Debug)]
pub struct WriteClaim<'a> {
    claim: &'a SlotClaim,
}

impl Drop for WriteClaim<'_> {
    fn drop(&mut self) {
        self.claim.state.store(FREE, Ordering::Release);
    }
}

/// Shared claim held by a reader
#[derive(Debug)]
pub struct ReadClaim<'a> {
    claim: &'a SlotClaim,
}

impl Drop for ReadClaim<'_> {
    fn drop(&mut self) {
        self.claim.state.fetch_sub(1, Ordering::Release);
    }
}
