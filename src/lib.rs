//! # ringlog - in-process ring buffer event log
//!
//! ringlog keeps short structured events in fixed-capacity circular buffers
//! so a running process can be inspected without stopping it. Writers never
//! block on a full buffer: the oldest event is overwritten. A TCP console
//! lists, dumps and resets buffers while they are being written.
//!
//! ## Features
//!
//! - **Bounded memory**: every buffer is a pre-allocated arena of fixed-size slots
//! - **Concurrent writers**: short spin critical sections, contention drops events instead of blocking
//! - **Extended payloads**: hex dumps, backtraces and custom renderers per event
//! - **Live inspection**: line-oriented console protocol over TCP
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   LogStore                       │
//! ├──────────────────────────────────────────────────┤
//! │  Buffer table (default id) │  Renderer registry  │
//! │  Global lock / enable flag │  built-in + custom  │
//! └──────────────────────────────────────────────────┘
//!        │                               │
//!        ▼                               ▼
//! ┌─────────────────────┐     ┌───────────────────────┐
//! │ RingBuffer × N      │     │ Console server        │
//! │  slots, cursor, wrap│ ◀── │  list / dump / reset  │
//! └─────────────────────┘     └───────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use ringlog::{display, LogStore};
//!
//! let store = LogStore::new();
//! store.init(16)?;
//! store.log("service started")?;
//!
//! let mut out = Vec::new();
//! display::write_buffer(&mut out, &store, 0)?;
//! assert!(String::from_utf8_lossy(&out).contains("service started"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod console;
pub mod context;
pub mod display;
pub mod error;
pub mod event;
pub mod ext;
pub mod ringbuf;
pub mod state;
pub mod sync;

pub use console::{ConsoleConfig, ConsoleHandle};
pub use error::{RingLogError, Result};
pub use event::{Event, EventRecord, Payload};
pub use ext::{EventType, RenderFn, Renderer, RendererRef};
pub use ringbuf::{BufferSnapshot, BufferStatus, RingBuffer};
pub use state::{global, GlobalLockGuard, LockState, LogStore, StoreConfig, Target};

/// Index of a buffer in a store's buffer table
pub type BufferId = usize;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration constants
///
/// Bounded text capacities include room for a terminator, so the longest
/// stored text is one byte shorter than the capacity.
pub mod config {
    /// Maximum number of buffers in a store
    pub const MAX_BUFFERS: usize = 5;

    /// Maximum number of events per buffer
    pub const MAX_EVENTS: usize = 128;

    /// Thread name capacity in bytes
    pub const THREAD_NAME_CAPACITY: usize = 32;

    /// Function name capacity in bytes
    pub const FUNCTION_NAME_CAPACITY: usize = 32;

    /// Message capacity in bytes
    pub const MESSAGE_CAPACITY: usize = 256;

    /// Number of entries in the renderer registry
    pub const RENDERER_CAPACITY: usize = 64;

    /// TCP port the console listens on by default
    pub const DEFAULT_CONSOLE_PORT: u16 = 50005;

    /// Spin attempts a writer makes on a buffer lock before dropping its event
    pub const WRITER_LOCK_SPINS: usize = 1 << 14;

    /// Longest console command line accepted, in bytes
    pub const MAX_COMMAND_LINE: usize = 256;
}
