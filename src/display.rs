//! Text rendering of events, buffer lists and buffer status
//!
//! Every function writes to a `dyn Write`, so the same output goes to a
//! console socket, stdout or an in-memory buffer. Buffers are snapshotted
//! first and rendered after their lock is released.

use std::{io, io::Write, time::SystemTime};

use chrono::{DateTime, Local};

use crate::{
    event::EventRecord,
    ringbuf::BufferStatus,
    state::LogStore,
    BufferId,
};

const NONE_MARK: &str = "-";

/// Local time as `%m/%d/%y %H:%M:%S.<microseconds>`
pub fn format_timestamp(timestamp: SystemTime) -> String {
    let local: DateTime<Local> = timestamp.into();
    local.format("%m/%d/%y %H:%M:%S%.6f").to_string()
}

/// One-line rendering of an event, without its payload
///
/// `<timestamp> <indent><thread>:<function>:<line>: <message>` with `-`
/// standing in for missing text and `0` for a missing line.
pub fn format_event_line(event: &EventRecord) -> String {
    format!(
        "{} {}{}:{}:{}: {}",
        format_timestamp(event.timestamp),
        "  ".repeat(event.indent as usize),
        event.thread.as_deref().unwrap_or(NONE_MARK),
        event.function.as_deref().unwrap_or(NONE_MARK),
        event.line.unwrap_or(0),
        if event.message.is_empty() {
            NONE_MARK
        } else {
            event.message.as_str()
        },
    )
}

/// Write an event line followed by its rendered payload, if any
pub fn write_event(out: &mut dyn Write, event: &EventRecord) -> io::Result<()> {
    writeln!(out, "{}", format_event_line(event))?;
    if let Some(payload) = event.payload.as_ref().filter(|p| p.renderer.is_some()) {
        writeln!(out)?;
        payload.render(out)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Write events in order
pub fn write_events(out: &mut dyn Write, events: &[EventRecord]) -> io::Result<()> {
    events.iter().try_for_each(|event| write_event(out, event))
}

/// Write the status block of one buffer
pub fn write_status(out: &mut dyn Write, status: &BufferStatus) -> io::Result<()> {
    writeln!(out, "Buffer status:")?;
    writeln!(out, "  Buffer size         : {}", status.capacity)?;
    writeln!(out, "  Next write index    : {}", status.next_write)?;
    writeln!(out, "  Used slots          : {}", status.used)?;
    writeln!(out, "  Buffer wrapped      : {}", status.wrap_count)?;
    writeln!(out, "  Dropped events      : {}", status.dropped)?;
    writeln!(out)
}

/// Write one line per buffer table entry
pub fn write_buffer_list(out: &mut dyn Write, store: &LogStore) -> io::Result<()> {
    if !store.is_initialized() {
        return writeln!(out, "The log store has not been initialized");
    }
    let present = store.buffer_ids();
    let default = store.default_buffer_id();
    for id in 0..store.max_buffers() {
        let state = if present.contains(&id) {
            "initialized"
        } else {
            "not initialized"
        };
        let marker = if default == Some(id) { " (default)" } else { "" };
        writeln!(out, "Log buffer #{}: {}{}", id, state, marker)?;
    }
    Ok(())
}

/// Write the events of buffer `id`
pub fn write_buffer(out: &mut dyn Write, store: &LogStore, id: BufferId) -> io::Result<()> {
    match store.snapshot(id) {
        Ok(snapshot) => write_events(out, &snapshot.events),
        Err(_) => writeln!(out, "Buffer {} is not initialized.", id),
    }
}

/// Write status and events of every buffer table entry
pub fn write_all_buffers(
    out: &mut dyn Write,
    store: &LogStore,
    with_status: bool,
    with_events: bool,
) -> io::Result<()> {
    if !store.is_initialized() {
        return writeln!(out, "The log store has not been initialized");
    }
    for id in 0..store.max_buffers() {
        writeln!(out, "Buffer index: {}", id)?;
        let Ok(snapshot) = store.snapshot(id) else {
            writeln!(out, "This buffer is not initialized.")?;
            continue;
        };
        if with_status {
            write_status(out, &snapshot.status)?;
        }
        if with_events {
            writeln!(out, "Log messages:")?;
            write_events(out, &snapshot.events)?;
        }
    }
    Ok(())
}
