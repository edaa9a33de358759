//! Tag detection inside the tab-group block.
//!
//! A tag is a fixed-length run starting with three sentinels that occurs
//! exactly `repeat_count` times (non-overlapping) within the block. Counts
//! above or below that are discarded, never clamped.

use crate::config::ScanConfig;
use crate::display_text::DisplayText;
use crate::utils::search::find_non_overlapping_positions;
use std::collections::HashSet;
use std::ops::Range;

/// A repeated tag found in the block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCandidate {
    /// Tag text, `tag_length` characters long
    pub text: String,
    /// Block-relative offsets of its non-overlapping occurrences, ascending
    pub occurrences_in_block: Vec<usize>,
    /// Absolute offset of the first occurrence
    pub first_occurrence_offset: usize,
}

/// Scan `block` (an absolute range of `display`) for tag candidates.
///
/// Candidates are returned in order of first occurrence.
pub fn detect_tags(display: &DisplayText, block: Range<usize>, scan: &ScanConfig) -> Vec<TagCandidate> {
    let block_start = block.start;
    let block_text = display.slice(block);
    let tag_len = scan.tag_length;
    let prefix = scan.tag_prefix();

    let mut tags = Vec::new();
    if block_text.len() < tag_len {
        log::debug!(
            "Tab-group block ({} chars) is shorter than one tag ({tag_len} chars)",
            block_text.len()
        );
        return tags;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for rel_pos in 0..=(block_text.len() - tag_len) {
        if !block_text[rel_pos..].starts_with(prefix.as_str()) {
            continue;
        }
        let candidate = &block_text[rel_pos..rel_pos + tag_len];
        if !seen.insert(candidate) {
            continue;
        }

        let positions = find_non_overlapping_positions(block_text, candidate);
        if positions.len() != scan.repeat_count {
            log::trace!(
                "Rejecting tag candidate {candidate:?}: {} occurrences, need {}",
                positions.len(),
                scan.repeat_count
            );
            continue;
        }

        log::trace!("Accepted tag candidate {candidate:?} at {}", block_start + positions[0]);
        tags.push(TagCandidate {
            text: candidate.to_string(),
            first_occurrence_offset: block_start + positions[0],
            occurrences_in_block: positions,
        });
    }

    log::debug!("Detected {} tag candidates in block of {} chars", tags.len(), block_text.len());
    tags
}
