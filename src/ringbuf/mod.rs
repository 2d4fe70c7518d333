//! Circular event buffers
//!
//! A [`RingBuffer`] owns a fixed arena of event slots addressed by index.
//! The write cursor and counters change only under the buffer's spin lock;
//! slot content changes only under the slot's writer claim.

pub mod buffer;
pub mod stats;


pub use buffer::RingBuffer;
pub use stats::{BufferCounters, BufferSnapshot, BufferStatus};
