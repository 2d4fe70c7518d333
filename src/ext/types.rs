//! Extended event type identifiers

use std::fmt;

/// Identifier of an extended payload kind
///
/// Ids below [`EventType::FIRST_DYNAMIC`] are reserved for built-in kinds;
/// custom renderers receive ids from a counter starting there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EventType(u32);

impl EventType {
    /// No extended payload
    pub const NONE: EventType = EventType(0);
    /// Raw bytes rendered as a hex dump
    pub const HEXDUMP: EventType = EventType(1);
    /// Captured backtrace text
    pub const BACKTRACE: EventType = EventType(2);
    /// Highest built-in id in use
    pub const LAST_BUILTIN: EventType = EventType::BACKTRACE;
    /// First id handed out to dynamically registered renderers
    pub const FIRST_DYNAMIC: EventType = EventType(16);

    /// Wrap a raw id
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Raw id value
    pub const fn id(self) -> u32 {
        self.0
    }

    /// The "no payload" sentinel
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// One of the pre-registered kinds
    pub const fn is_builtin(self) -> bool {
        self.0 > Self::NONE.0 && self.0 <= Self::LAST_BUILTIN.0
    }

    /// In the dynamically assigned range
    pub const fn is_dynamic(self) -> bool {
        self.0 >= Self::FIRST_DYNAMIC.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => write!(f, "none"),
            Self::HEXDUMP => write!(f, "hexdump"),
            Self::BACKTRACE => write!(f, "backtrace"),
            Self(id) => write!(f, "custom#{}", id),
        }
    }
}

impl From<EventType> for u32 {
    fn from(event_type: EventType) -> Self {
        event_type.0
    }
}
