//! Fixed-size event slot
//!
//! Slot content lives in an `UnsafeCell` guarded by a [`SlotClaim`]: only the
//! writer holding the exclusive claim touches it mutably, readers copy it out
//! under a shared claim. A slot being populated is invisible to readers.

use std::{
    cell::UnsafeCell,
    sync::atomic::{AtomicBool, Ordering},
    time::SystemTime,
};

use crate::{
    config::{FUNCTION_NAME_CAPACITY, MESSAGE_CAPACITY, THREAD_NAME_CAPACITY},
    ext::{EventType, RendererRef, RendererRegistry},
    sync::{SlotClaim, WriteClaim},
};

use super::{
    record::{Event, EventRecord, Payload, PayloadRecord},
    text::BoundedText,
};

/// Payload buffers up to this size are reused in place across writes
const PAYLOAD_REUSE_LIMIT: usize = 4096;

#[derive(Debug)]
pub(crate) struct StoredPayload {
    event_type: EventType,
    data: Vec<u8>,
    renderer: Option<RendererRef>,
}

impl StoredPayload {
    fn new(payload: &Payload<'_>, renderer: Option<RendererRef>) -> Self {
        Self {
            event_type: payload.event_type,
            data: payload.data.to_vec(),
            renderer,
        }
    }

    fn replace(&mut self, payload: &Payload<'_>, renderer: Option<RendererRef>) {
        if self.data.capacity() >= payload.data.len()
            && self.data.capacity() <= PAYLOAD_REUSE_LIMIT
        {
            self.data.clear();
            self.data.extend_from_slice(payload.data);
        } else {
            self.data = payload.data.to_vec();
        }
        self.event_type = payload.event_type;
        self.renderer = renderer;
    }

    fn to_record(&self) -> PayloadRecord {
        PayloadRecord {
            event_type: self.event_type,
            data: self.data.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct SlotContent {
    thread: BoundedText<THREAD_NAME_CAPACITY>,
    function: BoundedText<FUNCTION_NAME_CAPACITY>,
    message: BoundedText<MESSAGE_CAPACITY>,
    line: Option<u32>,
    timestamp: SystemTime,
    indent: u8,
    payload: Option<StoredPayload>,
}

impl SlotContent {
    fn new() -> Self {
        Self {
            thread: BoundedText::new(),
            function: BoundedText::new(),
            message: BoundedText::new(),
            line: None,
            timestamp: SystemTime::UNIX_EPOCH,
            indent: 0,
            payload: None,
        }
    }

    fn to_record(&self, slot: usize) -> EventRecord {
        EventRecord {
            slot,
            thread: self.thread.non_empty().map(str::to_owned),
            function: self.function.non_empty().map(str::to_owned),
            message: self.message.as_str().to_owned(),
            line: self.line,
            timestamp: self.timestamp,
            indent: self.indent,
            payload: self.payload.as_ref().map(StoredPayload::to_record),
        }
    }
}

/// One cell of a ring buffer
#[derive(Debug)]
pub struct EventSlot {
    claim: SlotClaim,
    used: AtomicBool,
    content: UnsafeCell<SlotContent>,
}

// SAFETY: `content` is only accessed through `SlotWriter` (exclusive claim)
// or `EventSlot::read` (shared claim), so no unsynchronized aliasing occurs.
unsafe impl Sync for EventSlot {}

impl EventSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            claim: SlotClaim::new(),
            used: AtomicBool::new(false),
            content: UnsafeCell::new(SlotContent::new()),
        }
    }

    /// Whether the slot holds a fully written event
    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Acquire)
    }

    /// Whether a writer is populating the slot right now
    pub fn is_locked(&self) -> bool {
        self.claim.is_writing()
    }

    /// Claim the slot for writing; `None` if another writer holds it
    pub(crate) fn try_writer(&self) -> Option<SlotWriter<'_>> {
        self.claim.try_write().map(|claim| SlotWriter {
            slot: self,
            _claim: claim,
        })
    }

    /// Claim the slot for writing, waiting for a current writer to finish
    pub(crate) fn writer(&self) -> SlotWriter<'_> {
        SlotWriter {
            slot: self,
            _claim: self.claim.write(),
        }
    }

    /// Copy the event out, unless the slot is unused or mid-write
    pub fn read(&self, index: usize) -> Option<EventRecord> {
        if !self.is_used() {
            return None;
        }
        let _claim = self.claim.try_read()?;
        if !self.is_used() {
            return None;
        }
        // SAFETY: the shared claim excludes any writer for its lifetime.
        let content = unsafe { &*self.content.get() };
        Some(content.to_record(index))
    }

    /// Clear content and payload, waiting out an in-flight writer
    pub(crate) fn clear(&self) {
        self.writer().clear();
    }
}

impl Default for EventSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive write access to a slot's content
pub(crate) struct SlotWriter<'a> {
    slot: &'a EventSlot,
    _claim: WriteClaim<'a>,
}

impl SlotWriter<'_> {
    fn content(&mut self) -> &mut SlotContent {
        // SAFETY: `_claim` is the exclusive writer claim on this slot.
        unsafe { &mut *self.slot.content.get() }
    }

    /// Overwrite the slot with `event` and mark it used
    pub fn populate(&mut self, event: &Event<'_>, registry: &RendererRegistry) {
        let content = self.content();
        content.timestamp = SystemTime::now();

        match event.thread {
            Some(thread) => content.thread.set(thread),
            None => content.thread.clear(),
        }
        match event.function {
            Some(function) => content.function.set(function),
            None => content.function.clear(),
        }
        content.message.set(event.message);
        content.line = event.line;
        content.indent = event.indent.unwrap_or(0);

        match event.payload.filter(Payload::is_storable) {
            Some(payload) => {
                let renderer = registry.resolve(payload.event_type);
                match content.payload.as_mut() {
                    Some(stored) => stored.replace(&payload, renderer),
                    None => content.payload = Some(StoredPayload::new(&payload, renderer)),
                }
            }
            None => content.payload = None,
        }

        self.slot.used.store(true, Ordering::Release);
    }

    /// Reset every field and release the payload
    pub fn clear(&mut self) {
        let content = self.content();
        *content = SlotContent::new();
        self.slot.used.store(false, Ordering::Release);
    }
}
