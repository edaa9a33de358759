//! Netscape bookmark file with one folder per recovered group.

use crate::assignment::Row;
use crate::tabs_confirm::UNGROUPED;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static URL_PARTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^https?://([^/]+)(/.*)?$").unwrap());

/// Escape text for HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Short bookmark title: host, plus `/last-segment` when that segment is
/// longer than one character. Falls back to the URL itself.
pub fn bookmark_title(url: &str) -> String {
    let Some(caps) = URL_PARTS.captures(url) else {
        return url.to_string();
    };
    let host = caps.get(1).map_or("", |m| m.as_str());
    let last_segment = caps
        .get(2)
        .and_then(|path| path.as_str().trim_end_matches('/').rsplit('/').next())
        .unwrap_or("");
    if last_segment.chars().count() > 1 {
        format!("{host}/{last_segment}")
    } else {
        host.to_string()
    }
}

/// URLs per folder, folders sorted by name, URLs de-duplicated in first-seen order.
/// Rows with an empty group name go to the ungrouped folder, which always exists.
pub fn group_urls(rows: &[Row]) -> BTreeMap<&str, Vec<&str>> {
    let mut folders: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();
    folders.entry(UNGROUPED).or_default();

    for row in rows {
        let folder = if row.group_name.is_empty() {
            UNGROUPED
        } else {
            row.group_name.as_str()
        };
        if seen.insert((folder, row.url.as_str())) {
            folders.entry(folder).or_default().push(row.url.as_str());
        }
    }
    folders
}

/// Render the bookmark file. `generated_at` is shown in the header comment.
pub fn render_bookmarks(top_folder: &str, rows: &[Row], generated_at: &str) -> String {
    let mut lines = vec![
        "<!DOCTYPE NETSCAPE-Bookmark-file-1>".to_string(),
        format!(
            "<!-- Generated by {} {} on {} -->",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            escape_html(generated_at)
        ),
        r#"<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">"#.to_string(),
        "<TITLE>Bookmarks</TITLE>".to_string(),
        "<H1>Bookmarks</H1>".to_string(),
        "<DL><p>".to_string(),
        format!("    <DT><H3>{}</H3>", escape_html(top_folder)),
        "    <DL><p>".to_string(),
    ];

    for (folder, urls) in group_urls(rows) {
        lines.push(format!("        <DT><H3>{}</H3>", escape_html(folder)));
        lines.push("        <DL><p>".to_string());
        lines.extend(urls.into_iter().map(|url| {
            format!(
                r#"            <DT><A HREF="{}">{}</A>"#,
                escape_html(url),
                escape_html(&bookmark_title(url))
            )
        }));
        lines.push("        </DL><p>".to_string());
    }

    lines.push("    </DL><p>".to_string());
    lines.push("</DL><p>".to_string());

    let mut html = lines.join("\n");
    html.push('\n');
    html
}
