//! Event input and owned event records

use std::{io::Write, time::SystemTime};

use crate::ext::{EventType, RendererRef};

/// Extended payload attached to an event being logged
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    /// Kind of payload, selects the renderer
    pub event_type: EventType,
    /// Raw bytes, copied into the slot
    pub data: &'a [u8],
}

impl<'a> Payload<'a> {
    /// Create a payload description
    pub fn new(event_type: EventType, data: &'a [u8]) -> Self {
        Self { event_type, data }
    }

    /// A payload that would actually be stored
    pub fn is_storable(&self) -> bool {
        !self.event_type.is_none() && !self.data.is_empty()
    }
}

/// One event as handed to the write API
///
/// All fields are borrowed; the ring buffer copies what it keeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Event<'a> {
    /// Log message
    pub message: &'a str,
    /// Thread name; the thread's registered name is used when absent
    pub thread: Option<&'a str>,
    /// Function name
    pub function: Option<&'a str>,
    /// Source line
    pub line: Option<u32>,
    /// Indentation level; the thread's call depth is used when absent
    pub indent: Option<u8>,
    /// Extended payload
    pub payload: Option<Payload<'a>>,
}

impl<'a> Event<'a> {
    /// Create an event carrying only a message
    pub fn new(message: &'a str) -> Self {
        Self {
            message,
            ..Default::default()
        }
    }

    /// Set the thread name
    pub fn with_thread(mut self, thread: &'a str) -> Self {
        self.thread = Some(thread);
        self
    }

    /// Set the function name
    pub fn with_function(mut self, function: &'a str) -> Self {
        self.function = Some(function);
        self
    }

    /// Set the source line
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the indentation level
    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = Some(indent);
        self
    }

    /// Attach an extended payload
    pub fn with_payload(mut self, event_type: EventType, data: &'a [u8]) -> Self {
        self.payload = Some(Payload::new(event_type, data));
        self
    }
}

/// Payload copied out of a slot
#[derive(Debug, Clone)]
pub struct PayloadRecord {
    /// Payload kind
    pub event_type: EventType,
    /// Payload bytes
    pub data: Vec<u8>,
    /// Renderer resolved when the event was written
    pub renderer: Option<RendererRef>,
}

impl PayloadRecord {
    /// Render the payload; returns `false` when no renderer is attached
    pub fn render(&self, out: &mut dyn Write) -> std::io::Result<bool> {
        match &self.renderer {
            Some(renderer) => {
                renderer.render(out, &self.data)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Event copied out of a slot for display
#[derive(Debug, Clone)]
pub struct EventRecord {
    /// Slot index the event was read from
    pub slot: usize,
    /// Thread name, if any
    pub thread: Option<String>,
    /// Function name, if any
    pub function: Option<String>,
    /// Message text
    pub message: String,
    /// Source line, if any
    pub line: Option<u32>,
    /// Time the event was written
    pub timestamp: SystemTime,
    /// Indentation level
    pub indent: u8,
    /// Extended payload, if any
    pub payload: Option<PayloadRecord>,
}
