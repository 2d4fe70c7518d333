//! Spin lock for short pointer/flag critical sections
//!
//! The lock protects no data of its own: the state it guards is kept in
//! atomics next to it and only mutated while the lock is held. This lets the
//! global lock hold every buffer lock across calls (`lock`/`unlock`) while
//! ordinary callers use the scoped [`SpinGuard`].

use std::sync::atomic::{AtomicBool, Ordering};

/// Busy-wait mutual exclusion flag
#[derive(Debug, Default)]
pub struct SpinLock {
    locked: AtomicBool,
}

impl SpinLock {
    /// Create an unlocked spin lock
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Try to take the lock once
    pub fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Spin until the lock is taken
    pub fn lock(&self) {
        loop {
            if self.try_lock() {
                return;
            }
            while self.locked.load(Ordering::Relaxed) {
                std::hint::spin_loop();
            }
        }
    }

    /// Spin at most `max_spins` times; returns whether the lock was taken
    pub fn lock_bounded(&self, max_spins: usize) -> bool {
        let mut spins = 0usize;
        loop {
            if self.try_lock() {
                return true;
            }
            while self.locked.load(Ordering::Relaxed) {
                if spins >= max_spins {
                    return false;
                }
                spins += 1;
                std::hint::spin_loop();
            }
        }
    }

    /// Release the lock
    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    /// Whether someone currently holds the lock
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Take the lock and release it when the guard drops
    pub fn guard(&self) -> SpinGuard<'_> {
        self.lock();
        SpinGuard { lock: self }
    }

    /// Bounded variant of [`SpinLock::guard`]
    pub fn guard_bounded(&self, max_spins: usize) -> Option<SpinGuard<'_>> {
        if self.lock_bounded(max_spins) {
            Some(SpinGuard { lock: self })
        } else {
            None
        }
    }
}

/// Scoped holder of a [`SpinLock`]
#[derive(Debug)]
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::thread;

    #[test]
    fn test_try_lock_and_unlock() {
        let lock = SpinLock::new();
        assert!(lock.try_lock());
        assert!(lock.is_locked());
        assert!(!lock.try_lock());
        lock.unlock();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = SpinLock::new();
        {
            let _guard = lock.guard();
            assert!(lock.is_locked());
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_bounded_lock_gives_up() {
        let lock = SpinLock::new();
        lock.lock();
        assert!(!lock.lock_bounded(64));
        assert!(lock.guard_bounded(64).is_none());
        lock.unlock();
        assert!(lock.guard_bounded(64).is_some());
    }

    #[test]
    fn test_mutual_exclusion() {
        let lock = Arc::new(SpinLock::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let violations = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = lock.clone();
                let inside = inside.clone();
                let violations = violations.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let _guard = lock.guard();
                        if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                            violations.fetch_add(1, Ordering::SeqCst);
                        }
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(violations.load(Ordering::SeqCst), 0);
    }
}
