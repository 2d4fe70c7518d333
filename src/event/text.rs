//! Fixed-capacity inline text fields

use std::fmt;

/// UTF-8 text stored inline in `N` bytes
///
/// At most `N - 1` bytes are kept, mirroring a terminated fixed-size field;
/// longer input is cut at the last character boundary that fits.
#[derive(Clone, Copy)]
pub struct BoundedText<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> BoundedText<N> {
    /// Maximum number of bytes that are kept
    pub const MAX_LEN: usize = N.saturating_sub(1);

    /// Create an empty field
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Replace the content, truncating to capacity
    pub fn set(&mut self, text: &str) {
        let cut = truncate_at_boundary(text, Self::MAX_LEN);
        self.bytes[..cut.len()].copy_from_slice(cut.as_bytes());
        self.len = cut.len();
    }

    /// Empty the field
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Current content
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the field is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Content, or `None` when empty
    pub fn non_empty(&self) -> Option<&str> {
        if self.is_empty() {
            None
        } else {
            Some(self.as_str())
        }
    }
}

impl<const N: usize> Default for BoundedText<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for BoundedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longest prefix of `text` that is at most `max` bytes and ends on a char boundary
pub fn truncate_at_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
