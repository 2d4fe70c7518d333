//! Console command parsing

use crate::BufferId;

/// Menu shown before every prompt
pub const MENU: &[&str] = &[
    "[1] List log buffers",
    "[2] Select active buffer",
    "[3] Print logs from the active buffer",
    "[4] Print logs from all buffers",
    "[5] Reset (clear) the active buffer",
    "[6] Reset (clear) all buffers",
    "[7] Close connection\n",
];

/// Prompt written after the menu
pub const PROMPT: &str = "ringlog> ";

/// One console request, selected by the first non-blank character of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `1`
    ListBuffers,
    /// `2`, optionally followed by the buffer id on the same line
    SelectBuffer(Option<String>),
    /// `3`
    DumpActive,
    /// `4`
    DumpAll,
    /// `5`
    ResetActive,
    /// `6`
    ResetAll,
    /// `7` or `q`
    Close,
    /// Anything else; the menu is shown again
    Unknown,
}

impl Command {
    /// Parse a command line
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut chars = line.chars();
        match chars.next() {
            Some('1') => Self::ListBuffers,
            Some('2') => {
                let rest = chars.as_str().trim();
                Self::SelectBuffer((!rest.is_empty()).then(|| rest.to_string()))
            }
            Some('3') => Self::DumpActive,
            Some('4') => Self::DumpAll,
            Some('5') => Self::ResetActive,
            Some('6') => Self::ResetAll,
            Some('7') | Some('q') => Self::Close,
            _ => Self::Unknown,
        }
    }
}

/// Parse a buffer id written in decimal or `0x` hexadecimal
pub fn parse_buffer_id(text: &str) -> Option<BufferId> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => BufferId::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
