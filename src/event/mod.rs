//! Event slots and event records

pub mod record;
pub mod slot;
pub mod text;

pub use record::{Event, EventRecord, Payload, PayloadRecord};
pub use slot::EventSlot;
pub use text::BoundedText;
