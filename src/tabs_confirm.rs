//! Cross-check of session-inferred groups against a Tabs file.
//!
//! In the Tabs file a grouped tab's URL is preceded by its group name in
//! wide encoding. If another URL sits between the nearest preceding group
//! name and the tab's URL, the tab is not in that group.

use crate::display_text::DisplayText;
use crate::urls::UrlScanner;
use crate::utils::search::interleave;
use serde::Serialize;

/// Group name assigned to tabs the Tabs file shows outside any group
pub const UNGROUPED: &str = "Ungrouped";

/// Outcome of checking one row against the Tabs file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabsVerdict {
    /// The interleaved group name precedes the URL with no URL in between
    Confirmed,
    /// Another URL precedes the URL after the last group-name occurrence
    Ungrouped,
    /// The URL is absent from the Tabs file
    UrlNotFound,
    /// Neither a group name nor another URL precedes the URL
    Unconfirmed,
}

impl TabsVerdict {
    /// Final group name for a row with tentative name `group`
    pub fn group_name<'a>(self, group: &'a str) -> &'a str {
        match self {
            TabsVerdict::Ungrouped => UNGROUPED,
            TabsVerdict::Confirmed | TabsVerdict::UrlNotFound | TabsVerdict::Unconfirmed => group,
        }
    }
}

/// Display text of a Tabs file with its URL matcher.
#[derive(Debug)]
pub struct TabsConfirmer<'a> {
    tabs: &'a DisplayText,
    scanner: &'a UrlScanner,
}

impl<'a> TabsConfirmer<'a> {
    pub fn new(tabs: &'a DisplayText, scanner: &'a UrlScanner) -> Self {
        Self { tabs, scanner }
    }

    /// Classify a row with tentative group `group` and canonical URL `url`.
    pub fn classify(&self, group: &str, url: &str) -> TabsVerdict {
        let text = self.tabs.as_str();
        let Some(url_pos) = text.find(url) else {
            return TabsVerdict::UrlNotFound;
        };

        let before = &text[..url_pos];
        let last_url_before = self.scanner.last_candidate_start(before);
        // An empty name matches everywhere, including right at the URL.
        let last_group_before = if group.is_empty() {
            Some(url_pos)
        } else {
            before.rfind(&interleave(group, self.tabs.sentinel()))
        };

        match (last_group_before, last_url_before) {
            (Some(_), None) => TabsVerdict::Confirmed,
            (Some(group_pos), Some(other_url)) if group_pos > other_url => TabsVerdict::Confirmed,
            (Some(_), Some(_)) | (None, Some(_)) => TabsVerdict::Ungrouped,
            (None, None) => TabsVerdict::Unconfirmed,
        }
    }
}
