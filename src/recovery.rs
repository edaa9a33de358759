//! Recovery pipeline.
//!
//! `Session bytes -> DisplayText -> {group catalog, confirmed URLs} -> occurrence index -> rows`
//!
//! The group catalog and the confirmed URLs only read the display text, so
//! with the `parallel` feature they are built concurrently. Row production is
//! a single ordered pass.

use crate::assignment::{AssignmentInput, Row, assign_to_occurrences, produce_rows};
use crate::block_locator::BlockBounds;
use crate::config::{Config, ConfigError, ScanConfig};
use crate::display_text::DisplayText;
use crate::group_names::{TagGroup, reconstruct_groups};
use crate::occurrence_index::TagOccurrenceIndex;
use crate::tabs_confirm::TabsConfirmer;
use crate::tag_detector::detect_tags;
use crate::urls::{ConfirmedUrl, UrlScanner, confirm_interleaved};
use serde::Serialize;
use std::time::Instant;

/// Everything recovered from one session buffer
#[derive(Debug)]
pub struct Recovery {
    /// Display text of the session buffer
    pub session_text: DisplayText,
    /// Display text of the Tabs buffer, when one was supplied
    pub tabs_text: Option<DisplayText>,
    /// Bounds of the tab-group block
    pub block: BlockBounds,
    /// Detected groups, ordered by first tag occurrence
    pub groups: Vec<TagGroup>,
    /// Accepted rows in emission order
    pub rows: Vec<Row>,
}

/// Serializable view of a [`Recovery`] without the display texts
#[derive(Debug, Serialize)]
pub struct RecoveryReport<'a> {
    pub block_start: usize,
    pub first_url_offset: usize,
    pub groups: &'a [TagGroup],
    pub rows: &'a [Row],
}

impl Recovery {
    pub fn report(&self) -> RecoveryReport<'_> {
        RecoveryReport {
            block_start: self.block.block_start,
            first_url_offset: self.block.first_url_offset,
            groups: &self.groups,
            rows: &self.rows,
        }
    }

    /// Whether nothing was recovered. A valid outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.rows.is_empty()
    }
}

/// Run the full recovery over a session buffer and an optional Tabs buffer.
///
/// Only an invalid scan configuration is an error; buffers lacking the
/// expected structure yield an empty recovery.
pub fn recover(session: &[u8], tabs: Option<&[u8]>, config: &Config) -> Result<Recovery, ConfigError> {
    let scan = &config.scan;
    scan.validate()?;

    let start = Instant::now();

    let session_text = DisplayText::from_bytes(session, scan.sentinel);
    let tabs_text = tabs.map(|bytes| DisplayText::from_bytes(bytes, scan.sentinel));
    let block = BlockBounds::locate(session);
    if block.is_empty() {
        log::warn!(
            "Tab-group block is empty (block start {}, first URL at {}); no groups can be detected",
            block.block_start,
            block.first_url_offset
        );
    }

    let scanner = UrlScanner::new(scan.sentinel);
    let (groups, confirmed) = catalog_and_urls(&session_text, block, scan, &scanner);

    let index = TagOccurrenceIndex::build(&session_text, &groups);
    let assignments = assign_to_occurrences(&index, &confirmed);

    // An empty Tabs buffer carries no evidence either way.
    let confirmer = tabs_text
        .as_ref()
        .filter(|text| !text.is_empty())
        .map(|text| TabsConfirmer::new(text, &scanner));
    let input = AssignmentInput {
        display: &session_text,
        groups: &groups,
        index: &index,
        tabs: confirmer.as_ref(),
        right_context_max_chars: config.output.right_context_max_chars,
    };
    let rows = produce_rows(&input, &assignments);

    log::debug!(
        "Recovered {} groups and {} rows from {} bytes in {:?}",
        groups.len(),
        rows.len(),
        session.len(),
        start.elapsed()
    );

    Ok(Recovery {
        session_text,
        tabs_text,
        block,
        groups,
        rows,
    })
}

/// Detect tags and reconstruct names inside the block.
pub fn build_group_catalog(display: &DisplayText, block: BlockBounds, scan: &ScanConfig) -> Vec<TagGroup> {
    let candidates = detect_tags(display, block.range(), scan);
    reconstruct_groups(display, block.block_start, &candidates, scan)
}

/// Find URL candidates over the whole text and confirm them by twin.
pub fn find_confirmed_urls(display: &DisplayText, scanner: &UrlScanner) -> Vec<ConfirmedUrl> {
    let candidates = scanner.find_candidates(display.as_str());
    log::debug!("Found {} URL candidates", candidates.len());
    confirm_interleaved(display, &candidates)
}

#[cfg(feature = "parallel")]
fn catalog_and_urls(
    display: &DisplayText,
    block: BlockBounds,
    scan: &ScanConfig,
    scanner: &UrlScanner,
) -> (Vec<TagGroup>, Vec<ConfirmedUrl>) {
    rayon::join(
        || build_group_catalog(display, block, scan),
        || find_confirmed_urls(display, scanner),
    )
}

#[cfg(not(feature = "parallel"))]
fn catalog_and_urls(
    display: &DisplayText,
    block: BlockBounds,
    scan: &ScanConfig,
    scanner: &UrlScanner,
) -> (Vec<TagGroup>, Vec<ConfirmedUrl>) {
    (build_group_catalog(display, block, scan), find_confirmed_urls(display, scanner))
}
