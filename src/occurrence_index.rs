//! Whole-buffer tag occurrence index.
//!
//! Tags are detected inside the block, but their later repeats (one per
//! grouped tab) appear throughout the buffer. This index records every
//! non-overlapping occurrence of every group's tag and answers
//! "first occurrence strictly after offset" with a binary search.

use crate::display_text::DisplayText;
use crate::group_names::TagGroup;
use crate::utils::search::find_non_overlapping_positions;
use itertools::Itertools;

/// Index of a tag within the catalog the occurrence index was built from
pub type TagId = usize;

/// One tag occurrence in the full display text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub offset: usize,
    pub tag: TagId,
}

/// Sorted occurrence lists per tag plus their offset-ordered merge
#[derive(Debug, Clone, Default)]
pub struct TagOccurrenceIndex {
    per_tag: Vec<Vec<usize>>,
    combined: Vec<Occurrence>,
}

impl TagOccurrenceIndex {
    /// Scan the whole display text for each group's tag.
    ///
    /// Tag ids are positions in `groups`.
    pub fn build(display: &DisplayText, groups: &[TagGroup]) -> Self {
        let per_tag: Vec<Vec<usize>> = groups
            .iter()
            .map(|group| find_non_overlapping_positions(display.as_str(), &group.tag))
            .collect();

        let combined: Vec<Occurrence> = per_tag
            .iter()
            .enumerate()
            .map(|(tag, offsets)| offsets.iter().map(move |&offset| Occurrence { offset, tag }))
            .kmerge_by(|a, b| a.offset < b.offset)
            .collect();

        log::debug!(
            "Indexed {} tag occurrences across {} tags",
            combined.len(),
            per_tag.len()
        );
        Self { per_tag, combined }
    }

    /// Every occurrence of every tag, ascending by offset
    pub fn combined(&self) -> &[Occurrence] {
        &self.combined
    }

    /// First occurrence with `offset > position`, if any.
    pub fn first_after(&self, position: usize) -> Option<Occurrence> {
        let idx = self.combined.partition_point(|occ| occ.offset <= position);
        self.combined.get(idx).copied()
    }

    /// Occurrences eligible for row production: for each tag, those at or
    /// after its `from_index`-th occurrence (0-based), merged by offset.
    ///
    /// Tags with fewer occurrences contribute nothing.
    pub fn eligible_from(&self, from_index: usize) -> Vec<Occurrence> {
        self.per_tag
            .iter()
            .enumerate()
            .filter(|(_, offsets)| offsets.len() > from_index)
            .map(|(tag, offsets)| {
                offsets[from_index..]
                    .iter()
                    .map(move |&offset| Occurrence { offset, tag })
            })
            .kmerge_by(|a, b| a.offset < b.offset)
            .collect()
    }
}
