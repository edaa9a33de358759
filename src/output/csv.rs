//! CSV summary report.
//!
//! Layout: metadata rows, a blank row, the tags-and-groups table, a blank
//! row, then the grouped-tabs table. Fields are quoted per RFC 4180 and
//! rows end with CRLF.

use super::{NO_FILE_SPECIFIED, ReportMeta};
use crate::assignment::Row;
use crate::group_names::TagGroup;
use std::borrow::Cow;
use std::io::{self, Write};

const LINE_END: &str = "\r\n";

/// Quote a field when it contains a comma, quote, CR or LF.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_record<W: Write>(out: &mut W, fields: &[&str]) -> io::Result<()> {
    let line = fields.iter().map(|f| escape_field(f)).collect::<Vec<_>>().join(",");
    out.write_all(line.as_bytes())?;
    out.write_all(LINE_END.as_bytes())
}

/// Write the full report.
pub fn write_report<W: Write>(out: &mut W, meta: &ReportMeta, groups: &[TagGroup], rows: &[Row]) -> io::Result<()> {
    let name_or_placeholder = |name: &Option<String>| name.clone().unwrap_or_else(|| NO_FILE_SPECIFIED.to_string());

    write_record(out, &[&format!("Tool version: {}", meta.tool_version)])?;
    write_record(out, &[&format!("Session file name: {}", name_or_placeholder(&meta.session_file))])?;
    write_record(out, &[&format!("Tabs file name: {}", name_or_placeholder(&meta.tabs_file))])?;
    write_record(out, &[])?;

    write_record(
        out,
        &[&format!(
            "Session file contents written to {}",
            name_or_placeholder(&meta.session_replaced_file)
        )],
    )?;
    write_record(
        out,
        &[&format!(
            "Tabs file contents written to {}",
            name_or_placeholder(&meta.tabs_replaced_file)
        )],
    )?;
    write_record(out, &[])?;

    write_record(out, &["SessionTagsAndGroupsTable"])?;
    write_record(
        out,
        &["The SessionTabGroupTag column contains fixed-length sequences (tags) starting with three \
           replacement characters that occur exactly the required number of times (non-overlapping) \
           in the session tab-group block (the area between the first '}' and the first http(s) URL)."],
    )?;
    write_record(
        out,
        &["The SessionTabGroup column contains the reconstructed human-readable group name."],
    )?;
    write_record(out, &["SessionTabGroupTag", "GroupSpaced", "SessionTabGroup"])?;
    for group in groups {
        write_record(out, &[&group.tag, &group.group_spaced, &group.group_name])?;
    }
    write_record(out, &[])?;

    write_record(out, &["SessionGroupedTabsTable"])?;
    write_record(
        out,
        &["Each URL is assigned by locating the interleaved copy of the same URL to its right in the \
           Session text, then taking the first tag occurrence after that copy and assigning the URL to \
           that tag's group. If a Tabs file is provided, the text left of the first occurrence of the URL \
           in the Tabs file is checked: an interleaved group name with no intervening URL confirms the \
           group; another URL between the group name and the URL classifies the tab as 'Ungrouped'. If \
           the URL is not found in the Tabs file, the Session-inferred group is used."],
    )?;
    write_record(out, &["SessionTabGroup", "URL", "URL_Raw", "URL_RightContext"])?;
    for row in rows {
        write_record(out, &[&row.group_name, &row.url, &row.raw_url, &row.right_context])?;
    }
    Ok(())
}
