//! Recovery of tab groups and grouped tab URLs from browser session files.
//!
//! Session files are binary. The library maps them to printable text
//! ([`display_text`]), finds the tab-group tags and names near the start of
//! the file, confirms each URL by its wide-encoded twin, and assigns URLs to
//! groups by the tag occurrence that follows them ([`recovery::recover`]).

pub mod assignment;
pub mod block_locator;
pub mod config;
pub mod display_text;
pub mod exit_codes;
pub mod group_names;
pub mod input;
pub mod occurrence_index;
pub mod output;
pub mod recovery;
pub mod tabs_confirm;
pub mod tag_detector;
pub mod urls;
pub mod utils;

pub use crate::assignment::Row;
pub use crate::group_names::TagGroup;
pub use crate::recovery::{Recovery, RecoveryReport, recover};
