//! Error types and status codes for ringlog

use crate::BufferId;

/// Result type alias for ringlog operations
pub type Result<T> = std::result::Result<T, RingLogError>;

/// Numeric status codes for callers that want the classic return-code view
/// of an operation outcome.
pub mod status {
    /// Operation succeeded
    pub const OK: i32 = 0;
    /// Generic failure (bad argument, allocation failure, lock failure)
    pub const ERR: i32 = -1;
    /// The target slot was being populated by another writer; event dropped
    pub const EVENT_LOCKED: i32 = -2;
    /// `init` was called on an already initialized store
    pub const ALREADY_INITIALIZED: i32 = -3;
}

/// Error types for the event log store
#[derive(Debug, thiserror::Error)]
pub enum RingLogError {
    /// The store has not been initialized (or has been cleaned up)
    #[error("Log store is not initialized")]
    NotInitialized,

    /// `init` called twice
    #[error("Log store is already initialized")]
    AlreadyInitialized,

    /// Logging is globally disabled
    #[error("Logging is disabled")]
    Disabled,

    /// The buffer id is out of range or the buffer does not exist
    #[error("Invalid buffer id: {id}")]
    InvalidBufferId { id: BufferId },

    /// An event targeted the default buffer but none exists
    #[error("No default buffer")]
    NoDefaultBuffer,

    /// The extended event type is not registered
    #[error("Invalid extended event type: {event_type}")]
    InvalidEventType { event_type: u32 },

    /// The slot was claimed by another writer; the event was dropped
    #[error("Event slot locked by another writer, event dropped")]
    EventLocked,

    /// Every entry of the buffer table is in use
    #[error("No free buffer slot (maximum {max} buffers)")]
    NoFreeBuffer { max: usize },

    /// The renderer table is full
    #[error("Renderer registry full (capacity {capacity})")]
    RegistryFull { capacity: usize },

    /// Memory allocation failures
    #[error("Memory error: {message}")]
    Memory { message: String },

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Lock protocol violations
    #[error("Concurrency error: {message}")]
    Concurrency { message: String },

    /// I/O related errors (console sockets, output streams)
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl RingLogError {
    /// Create an I/O error from a standard I/O error
    pub fn from_io(source: std::io::Error, context: &str) -> Self {
        Self::Io {
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }

    /// Create a memory error
    pub fn memory(message: impl Into<String>) -> Self {
        Self::Memory {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an invalid buffer id error
    pub fn invalid_buffer(id: BufferId) -> Self {
        Self::InvalidBufferId { id }
    }

    /// Create a concurrency error
    pub fn concurrency(message: impl Into<String>) -> Self {
        Self::Concurrency {
            message: message.into(),
        }
    }

    /// Map the error onto the status code taxonomy
    pub fn code(&self) -> i32 {
        match self {
            Self::EventLocked => status::EVENT_LOCKED,
            Self::AlreadyInitialized => status::ALREADY_INITIALIZED,
            _ => status::ERR,
        }
    }

    /// Whether the error is the benign contention drop
    pub fn is_event_locked(&self) -> bool {
        matches!(self, Self::EventLocked)
    }
}

impl From<std::io::Error> for RingLogError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io(err, "I/O operation failed")
    }
}

/// Collapse an operation result into its status code
pub fn status_of<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => status::OK,
        Err(err) => err.code(),
    }
}
