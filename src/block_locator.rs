//! Locates the tab-group block in a raw session buffer.
//!
//! The block spans from just after the first `}` byte up to the first
//! lowercase `http://` or `https://` byte run. Tag scanning only looks inside
//! this range.

use std::ops::Range;

const BLOCK_DELIMITER: u8 = b'}';
const HTTP_SCHEME: &[u8] = b"http://";
const HTTPS_SCHEME: &[u8] = b"https://";

/// Absolute offsets bounding the tab-group block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockBounds {
    /// One past the first `}`, or 0 when there is none
    pub block_start: usize,
    /// First `http://`/`https://` offset, or the buffer length when there is none
    pub first_url_offset: usize,
}

impl BlockBounds {
    /// Find the block bounds in `bytes`.
    pub fn locate(bytes: &[u8]) -> Self {
        let block_start = bytes
            .iter()
            .position(|&b| b == BLOCK_DELIMITER)
            .map_or(0, |pos| pos + 1);
        let first_url_offset = [HTTP_SCHEME, HTTPS_SCHEME]
            .iter()
            .filter_map(|scheme| find_bytes(bytes, scheme))
            .min()
            .unwrap_or(bytes.len());

        Self {
            block_start,
            first_url_offset,
        }
    }

    /// An empty block is a valid outcome: no tags can be found in it.
    pub fn is_empty(&self) -> bool {
        self.block_start >= self.first_url_offset
    }

    /// Absolute range to scan for tags. Empty when the block is empty.
    pub fn range(&self) -> Range<usize> {
        if self.is_empty() {
            self.block_start..self.block_start
        } else {
            self.block_start..self.first_url_offset
        }
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
