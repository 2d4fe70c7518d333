//! Buffer registry, global lock and lifecycle
//!
//! [`LogStore`] owns a fixed table of ring buffers, the default buffer
//! index, the enable flag and the renderer registry. Independent stores can
//! be created freely; [`global`] returns the process-wide one.

pub mod config;
pub mod lock;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::StoreConfig;
pub use lock::{GlobalLockGuard, LockState};
pub use store::{global, LogStore, Target};
