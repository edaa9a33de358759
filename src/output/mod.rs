//! Report writers: CSV summary and Netscape bookmarks.

pub mod bookmarks;
pub mod csv;

/// Names shown in the CSV metadata header
#[derive(Debug, Clone, Default)]
pub struct ReportMeta {
    /// Tool name and version, e.g. `tabsalvage 0.1.0`
    pub tool_version: String,
    pub session_file: Option<String>,
    pub tabs_file: Option<String>,
    /// File the session display text was written to, when written
    pub session_replaced_file: Option<String>,
    /// File the tabs display text was written to, when written
    pub tabs_replaced_file: Option<String>,
}

/// Placeholder for absent file names in reports
pub const NO_FILE_SPECIFIED: &str = "No file specified";
