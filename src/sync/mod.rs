//! Synchronization primitives for the logging hot path
//!
//! Critical sections in the engine are pointer and flag bookkeeping only, so
//! the locks here are busy-wait flags rather than OS mutexes:
//! - [`SpinLock`] guards a ring buffer's write cursor and the global registry
//! - [`SlotClaim`] guards one slot while it is populated or copied out

pub mod claim;
pub mod spin;

pub use claim::{ReadClaim, SlotClaim, WriteClaim};
pub use spin::{SpinGuard, SpinLock};
