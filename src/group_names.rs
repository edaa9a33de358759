//! Group name reconstruction.
//!
//! Tab-group names sit between the first occurrence of a tag and a `$`
//! marker shortly before the tag's second occurrence. They are stored in a
//! wide encoding, so the display text shows the name with a sentinel after
//! every character; taking every other character recovers it.
//!
//! The positional constants below come from observed session files. They are
//! kept exactly as found, including their behavior on malformed input.

use crate::config::ScanConfig;
use crate::display_text::DisplayText;
use crate::tag_detector::TagCandidate;
use crate::utils::search::every_other_char;
use serde::Serialize;

/// Presumed distance from the `$` marker to the tag's second occurrence
pub const MARKER_OFFSET_BEFORE_SECOND_TAG: usize = 44;
/// Window searched backwards for a literal `$` when the presumed marker falls before the block
pub const MARKER_SEARCH_WINDOW: usize = 80;
/// Literal marker character terminating the name region
pub const GROUP_NAME_MARKER: char = '$';

/// A detected tab group with its reconstructed name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    /// Tag text identifying the group
    pub tag: String,
    /// Reconstructed human-readable name
    pub group_name: String,
    /// Raw display text of the name region, sentinels included
    pub group_spaced: String,
    /// Absolute inclusive bounds of the name region
    pub spaced_region: (usize, usize),
    /// Absolute offset of the tag's first occurrence
    pub first_occurrence_offset: usize,
}

/// Reconstruct names for every candidate and return the groups sorted by
/// first occurrence.
///
/// Candidates whose name region cannot be bounded are dropped.
pub fn reconstruct_groups(
    display: &DisplayText,
    block_start: usize,
    candidates: &[TagCandidate],
    scan: &ScanConfig,
) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = candidates
        .iter()
        .filter_map(|candidate| reconstruct_group(display, block_start, candidate, scan))
        .collect();
    groups.sort_by_key(|group| group.first_occurrence_offset);

    log::debug!(
        "Reconstructed {} of {} group names",
        groups.len(),
        candidates.len()
    );
    groups
}

/// Reconstruct one group name, or `None` when the region bounds are invalid.
pub fn reconstruct_group(
    display: &DisplayText,
    block_start: usize,
    candidate: &TagCandidate,
    scan: &ScanConfig,
) -> Option<TagGroup> {
    let second_rel = *candidate.occurrences_in_block.get(1)?;
    let group_start = candidate.first_occurrence_offset + scan.tag_length + scan.advance_after_tag;

    let marker_rel = presumptive_marker_offset(display, block_start, second_rel);
    let marker_abs = block_start + marker_rel;

    let Some(group_end) = last_non_sentinel_before(display, marker_abs) else {
        log::trace!("No name characters before marker for tag {:?}", candidate.text);
        return None;
    };
    if group_start > group_end {
        log::trace!(
            "Empty name region for tag {:?} ({group_start} > {group_end})",
            candidate.text
        );
        return None;
    }

    let group_spaced = display.slice(group_start..group_end + 1).to_string();
    let group_name = every_other_char(&group_spaced).trim().to_string();

    Some(TagGroup {
        tag: candidate.text.clone(),
        group_name,
        group_spaced,
        spaced_region: (group_start, group_end),
        first_occurrence_offset: candidate.first_occurrence_offset,
    })
}

/// Block-relative offset of the `$` marker preceding the second occurrence.
///
/// Normally a fixed distance back from the second occurrence. When that would
/// land before the block, the nearest `$` in the preceding window is used,
/// falling back to the block start.
fn presumptive_marker_offset(display: &DisplayText, block_start: usize, second_rel: usize) -> usize {
    if let Some(rel) = second_rel.checked_sub(MARKER_OFFSET_BEFORE_SECOND_TAG) {
        return rel;
    }

    let window_start = second_rel.saturating_sub(MARKER_SEARCH_WINDOW);
    display
        .slice(block_start + window_start..block_start + second_rel)
        .rfind(GROUP_NAME_MARKER)
        .map_or(0, |found| window_start + found)
}

/// Offset of the last non-sentinel character strictly before `offset` in the
/// full display text.
fn last_non_sentinel_before(display: &DisplayText, offset: usize) -> Option<usize> {
    let sentinel = display.sentinel() as u8;
    let end = offset.min(display.len());
    display.as_str().as_bytes()[..end].iter().rposition(|&b| b != sentinel)
}
