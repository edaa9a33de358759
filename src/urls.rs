//! URL candidate discovery and interleaved-twin confirmation.
//!
//! Session files store each tab URL twice: once as plain bytes and once in a
//! wide encoding that shows up as the URL with a sentinel around every
//! character. A plain URL is only trusted when its interleaved twin follows
//! it with no other plain URL starting in between.

use crate::display_text::DisplayText;
use crate::utils::search::interleave;
use regex::Regex;
use serde::Serialize;

/// A plain URL-shaped run in display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCandidate {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// A plain URL whose interleaved twin was located
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedUrl {
    pub plain_start: usize,
    pub plain_end: usize,
    /// URL text that matched the twin, possibly one character shorter than the raw match
    pub canonical_url: String,
    pub interleaved_start: usize,
    pub interleaved_end: usize,
    /// URL text exactly as matched
    pub raw_url: String,
}

/// Compiled URL matcher for one sentinel character.
#[derive(Debug, Clone)]
pub struct UrlScanner {
    pattern: Regex,
}

impl UrlScanner {
    /// Scheme (case-insensitive) followed by a run of characters that are
    /// neither the sentinel nor whitespace.
    pub fn new(sentinel: char) -> Self {
        let class = regex::escape(&sentinel.to_string());
        let pattern = Regex::new(&format!(r"(?i)https?://[^{class}\s]+"))
            .expect("escaped sentinel always forms a valid character class");
        Self { pattern }
    }

    /// All URL candidates in `text`, left to right.
    pub fn find_candidates(&self, text: &str) -> Vec<UrlCandidate> {
        self.pattern
            .find_iter(text)
            .map(|m| UrlCandidate {
                start: m.start(),
                end: m.end(),
                text: m.as_str().to_string(),
            })
            .collect()
    }

    /// Start offset of the last candidate lying entirely within `text`.
    pub fn last_candidate_start(&self, text: &str) -> Option<usize> {
        self.pattern.find_iter(text).last().map(|m| m.start())
    }
}

/// Confirm each candidate against its interleaved twin.
///
/// Tries the full match first, then the match minus its last character.
/// Confirmed records are returned sorted by interleaved start.
pub fn confirm_interleaved(display: &DisplayText, candidates: &[UrlCandidate]) -> Vec<ConfirmedUrl> {
    let mut confirmed: Vec<ConfirmedUrl> = candidates
        .iter()
        .filter_map(|candidate| confirm_candidate(display, candidates, candidate))
        .collect();
    confirmed.sort_by_key(|record| record.interleaved_start);

    log::debug!(
        "Confirmed {} of {} URL candidates by interleaved twin",
        confirmed.len(),
        candidates.len()
    );
    confirmed
}

fn confirm_candidate(
    display: &DisplayText,
    candidates: &[UrlCandidate],
    candidate: &UrlCandidate,
) -> Option<ConfirmedUrl> {
    let raw = candidate.text.as_str();
    let shortened = (raw.len() > 1).then(|| &raw[..raw.len() - 1]);

    for attempt in std::iter::once(raw).chain(shortened) {
        let twin = interleave(attempt, display.sentinel());
        let Some(found) = display.as_str()[candidate.end..].find(&twin) else {
            continue;
        };
        let interleaved_start = candidate.end + found;
        if any_candidate_between(candidates, candidate.end, interleaved_start) {
            log::trace!("URL {attempt:?} has another URL before its twin at {interleaved_start}");
            continue;
        }

        return Some(ConfirmedUrl {
            plain_start: candidate.start,
            plain_end: candidate.end,
            canonical_url: attempt.to_string(),
            interleaved_start,
            interleaved_end: interleaved_start + twin.len(),
            raw_url: raw.to_string(),
        });
    }

    log::trace!("No interleaved twin for URL {raw:?} at {}", candidate.start);
    None
}

/// Whether any candidate starts strictly between `after` and `before`.
/// `candidates` must be sorted by start, as [`UrlScanner::find_candidates`] returns them.
fn any_candidate_between(candidates: &[UrlCandidate], after: usize, before: usize) -> bool {
    let idx = candidates.partition_point(|c| c.start <= after);
    candidates.get(idx).is_some_and(|c| c.start < before)
}
