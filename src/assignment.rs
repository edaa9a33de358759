//! Assignment of confirmed URLs to tab groups.
//!
//! Each confirmed URL belongs to the first tag occurrence strictly after its
//! interleaved twin. Tag occurrences are then walked in buffer order:
//!
//! - only occurrences from a tag's fifth one onwards are eligible, the first
//!   four being structural rather than per-tab repeats;
//! - a tag stops contributing after two consecutive eligible occurrences with
//!   no assigned URL;
//! - after the first accepted row, a row is only accepted when its URL starts
//!   after the end of the previously accepted row's tag occurrence. This
//!   tracker is shared by all tags.

use crate::display_text::DisplayText;
use crate::group_names::TagGroup;
use crate::occurrence_index::{Occurrence, TagId, TagOccurrenceIndex};
use crate::tabs_confirm::{TabsConfirmer, TabsVerdict};
use crate::urls::ConfirmedUrl;
use serde::Serialize;
use std::collections::HashMap;

/// 0-based index of the first eligible occurrence of each tag
pub const ELIGIBLE_FROM_OCCURRENCE_INDEX: usize = 4;
/// Consecutive empty eligible occurrences after which a tag is finished
pub const EMPTY_OCCURRENCES_BEFORE_FINISH: usize = 2;

/// One recovered grouped tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub group_name: String,
    pub url: String,
    pub raw_url: String,
    /// Display text from the URL start up to the tag occurrence, truncated
    pub right_context: String,
    pub tag_text: String,
    pub tag_occurrence_offset: usize,
    pub tag_end_offset: usize,
    pub url_start: usize,
    pub url_end: usize,
    /// Tabs-file verdict, when a Tabs file was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tabs_verdict: Option<TabsVerdict>,
}

/// A confirmed URL attached to a tag occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedUrl {
    pub plain_start: usize,
    pub plain_end: usize,
    pub canonical_url: String,
    pub raw_url: String,
}

/// Assigned URLs keyed by `(tag, occurrence offset)`, in confirmation order.
pub type Assignments = HashMap<(TagId, usize), Vec<AssignedUrl>>;

/// Attach every confirmed URL to the first tag occurrence after its twin.
///
/// URLs with no later tag occurrence are dropped.
pub fn assign_to_occurrences(index: &TagOccurrenceIndex, confirmed: &[ConfirmedUrl]) -> Assignments {
    let mut assignments = Assignments::new();
    let mut dropped = 0usize;

    for record in confirmed {
        let Some(Occurrence { offset, tag }) = index.first_after(record.interleaved_end) else {
            dropped += 1;
            continue;
        };
        assignments.entry((tag, offset)).or_default().push(AssignedUrl {
            plain_start: record.plain_start,
            plain_end: record.plain_end,
            canonical_url: record.canonical_url.clone(),
            raw_url: record.raw_url.clone(),
        });
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} confirmed URLs with no tag occurrence after them");
    }
    assignments
}

#[derive(Debug, Clone, Copy, Default)]
struct TagState {
    consecutive_empty: usize,
    finished: bool,
}

/// Inputs shared by the row-producing pass
#[derive(Debug)]
pub struct AssignmentInput<'a> {
    pub display: &'a DisplayText,
    pub groups: &'a [TagGroup],
    pub index: &'a TagOccurrenceIndex,
    pub tabs: Option<&'a TabsConfirmer<'a>>,
    pub right_context_max_chars: usize,
}

/// Walk eligible tag occurrences in buffer order and emit accepted rows.
pub fn produce_rows(input: &AssignmentInput<'_>, assignments: &Assignments) -> Vec<Row> {
    let eligible = input.index.eligible_from(ELIGIBLE_FROM_OCCURRENCE_INDEX);
    let mut states = vec![TagState::default(); input.groups.len()];
    let mut last_accepted_tag_end: Option<usize> = None;
    let mut rows = Vec::new();
    let mut rejected = 0usize;

    for Occurrence { offset, tag } in eligible {
        let state = &mut states[tag];
        if state.finished {
            continue;
        }

        let assigned = match assignments.get(&(tag, offset)) {
            Some(assigned) if !assigned.is_empty() => assigned,
            _ => {
                state.consecutive_empty += 1;
                if state.consecutive_empty >= EMPTY_OCCURRENCES_BEFORE_FINISH {
                    log::trace!("Tag {:?} finished at occurrence {offset}", input.groups[tag].tag);
                    state.finished = true;
                }
                continue;
            }
        };
        state.consecutive_empty = 0;

        let group = &input.groups[tag];
        let tag_end = offset + group.tag.len();
        let mut ordered: Vec<&AssignedUrl> = assigned.iter().collect();
        ordered.sort_by_key(|url| url.plain_start);

        for url in ordered {
            if let Some(previous_end) = last_accepted_tag_end
                && url.plain_start <= previous_end
            {
                rejected += 1;
                log::trace!(
                    "Dropping {:?} at {}: not after previous tag end {previous_end}",
                    url.canonical_url,
                    url.plain_start
                );
                continue;
            }

            rows.push(build_row(input, group, offset, tag_end, url));
            last_accepted_tag_end = Some(tag_end);
        }
    }

    log::debug!(
        "Produced {} rows ({rejected} rejected by the chronological filter)",
        rows.len()
    );
    rows
}

fn build_row(input: &AssignmentInput<'_>, group: &TagGroup, offset: usize, tag_end: usize, url: &AssignedUrl) -> Row {
    let tabs_verdict = input
        .tabs
        .map(|tabs| tabs.classify(&group.group_name, &url.canonical_url));
    let group_name = tabs_verdict
        .map_or(group.group_name.as_str(), |verdict| verdict.group_name(&group.group_name))
        .to_string();

    let context = input.display.slice(url.plain_start..offset);
    let right_context = context[..context.len().min(input.right_context_max_chars)].to_string();

    Row {
        group_name,
        url: url.canonical_url.clone(),
        raw_url: url.raw_url.clone(),
        right_context,
        tag_text: group.tag.clone(),
        tag_occurrence_offset: offset,
        tag_end_offset: tag_end,
        url_start: url.plain_start,
        url_end: url.plain_end,
        tabs_verdict,
    }
}
