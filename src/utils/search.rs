//! Substring search primitives over display text.
//!
//! All display text is ASCII, so byte offsets returned here are also
//! character offsets and buffer offsets.

/// Find all non-overlapping start offsets of `needle` within `haystack`.
///
/// After each hit the search resumes at `hit + needle.len()`, so two returned
/// offsets `a < b` always satisfy `b >= a + needle.len()`. The result is sorted
/// ascending. An empty needle yields no positions.
pub fn find_non_overlapping_positions(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }

    let mut positions = Vec::new();
    let mut start = 0;
    while let Some(found) = haystack[start..].find(needle) {
        let abs = start + found;
        positions.push(abs);
        start = abs + needle.len();
    }
    positions
}

/// Build the interleaved form of `text`: the sentinel before, between and
/// after every character.
///
/// `interleave("a/b", '|')` is `"|a|/|b|"`. Empty input gives an empty string.
pub fn interleave(text: &str, sentinel: char) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len() * 2 + 1);
    out.push(sentinel);
    for ch in text.chars() {
        out.push(ch);
        out.push(sentinel);
    }
    out
}

/// Take the characters at even relative indices (0, 2, 4, ...).
///
/// Undoes a wide encoding where every other byte was a filler that the
/// display mapper turned into the sentinel.
pub fn every_other_char(text: &str) -> String {
    text.chars().step_by(2).collect()
}
