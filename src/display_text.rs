//! Byte-to-display mapping.
//!
//! Every input byte becomes exactly one display character: printable ASCII
//! (32..=126) passes through, anything else becomes the sentinel. The
//! resulting text has the same length as the buffer, so an offset into one
//! is an offset into the other.

use std::fmt;
use std::ops::Range;

/// Default visible stand-in for non-printable bytes.
pub const DEFAULT_SENTINEL: char = '|';

/// Map a single byte to its display character.
#[inline]
pub fn display_char(byte: u8, sentinel: char) -> char {
    if (32..=126).contains(&byte) { byte as char } else { sentinel }
}

/// Display text of a raw buffer. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct DisplayText {
    text: String,
    sentinel: char,
}

impl DisplayText {
    /// Map `bytes` to display text.
    ///
    /// `sentinel` must be printable ASCII; callers get that guarantee from
    /// [`crate::config::ScanConfig::validate`].
    pub fn from_bytes(bytes: &[u8], sentinel: char) -> Self {
        debug_assert!(sentinel.is_ascii() && !sentinel.is_ascii_control());
        let text: String = bytes.iter().map(|&b| display_char(b, sentinel)).collect();
        Self { text, sentinel }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn sentinel(&self) -> char {
        self.sentinel
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Display text for an absolute offset range, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> &str {
        let end = range.end.min(self.text.len());
        let start = range.start.min(end);
        &self.text[start..end]
    }
}

impl fmt::Debug for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayText")
            .field("len", &self.text.len())
            .field("sentinel", &self.sentinel)
            .finish()
    }
}
