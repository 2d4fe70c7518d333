//! Global lock state machine
//!
//! ```text
//! UNINITIALIZED --init--> UNLOCKED --lock_global(false)--> SIMPLE_LOCKED
//!                            ^  \---lock_global(true)---> FULLY_LOCKED
//!                            |                                 |
//!                            +-------- guard dropped ----------+
//! ```
//!
//! A simple lock serializes structural changes to the buffer table. A full
//! lock additionally disables logging and holds every buffer's lock, so no
//! cursor moves until it is released.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use crate::{ringbuf::RingBuffer, sync::SpinGuard};

use super::store::LogStore;

/// Lifecycle and lock state of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LockState {
    /// Not initialized, or cleaned up
    Uninitialized = 0,
    /// Initialized, global lock free
    Unlocked = 1,
    /// Global lock held
    SimpleLocked = 2,
    /// Global lock held, logging disabled, every buffer locked
    FullyLocked = 3,
}

impl LockState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Unlocked,
            2 => Self::SimpleLocked,
            3 => Self::FullyLocked,
            _ => Self::Uninitialized,
        }
    }

    /// Whether the store accepts operations
    pub fn is_initialized(self) -> bool {
        self != Self::Uninitialized
    }

    /// Whether the global lock is held in either mode
    pub fn is_locked(self) -> bool {
        matches!(self, Self::SimpleLocked | Self::FullyLocked)
    }
}

/// Atomic cell holding a [`LockState`]
#[derive(Debug)]
pub(crate) struct AtomicLockState(AtomicU8);

impl AtomicLockState {
    pub const fn new(state: LockState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn load(&self) -> LockState {
        LockState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, state: LockState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Holds the global lock of a [`LogStore`] until dropped
///
/// Dropping a full lock releases every buffer it locked and restores the
/// enable flag to what it was before the lock was taken.
#[must_use = "the global lock is released as soon as the guard is dropped"]
pub struct GlobalLockGuard<'a> {
    pub(super) store: &'a LogStore,
    pub(super) held: Vec<Arc<RingBuffer>>,
    pub(super) restore_enabled: Option<bool>,
    pub(super) retired: bool,
    pub(super) _global: SpinGuard<'a>,
}

impl GlobalLockGuard<'_> {
    /// Whether this is a full lock
    pub fn is_full(&self) -> bool {
        self.restore_enabled.is_some()
    }

    /// Leave the store uninitialized when the guard drops
    pub(super) fn retire(&mut self) {
        self.retired = true;
        self.restore_enabled = self.restore_enabled.map(|_| false);
    }
}

impl std::fmt::Debug for GlobalLockGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalLockGuard")
            .field("full", &self.is_full())
            .field("held_buffers", &self.held.len())
            .field("retired", &self.retired)
            .finish()
    }
}

impl Drop for GlobalLockGuard<'_> {
    fn drop(&mut self) {
        for buffer in self.held.drain(..) {
            buffer.unlock_raw();
        }
        self.store.release_global(self.restore_enabled, self.retired);
    }
}
