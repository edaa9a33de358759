//! Output folder layout and writing of recovery results.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::*;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tabsalvage_lib::config::Config;
use tabsalvage_lib::display_text::DisplayText;
use tabsalvage_lib::output::bookmarks::render_bookmarks;
use tabsalvage_lib::output::csv::write_report;
use tabsalvage_lib::output::{NO_FILE_SPECIFIED, ReportMeta};
use tabsalvage_lib::recovery::Recovery;

const OUTPUT_STEM: &str = "Recovered_Edge_Tabs";
const MAX_FILENAME_COMPONENT_CHARS: usize = 200;

static FORBIDDEN_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\n\r\t]+"#).unwrap());

/// `YYYY-MM-DD` of the session file's modification time, else today.
pub fn date_prefix(session_path: Option<&Path>) -> String {
    let modified = session_path
        .and_then(|path| fs::metadata(path).ok())
        .and_then(|meta| meta.modified().ok());
    let date: DateTime<Local> = match modified {
        Some(time) => time.into(),
        None => {
            log::debug!("No session modification time available; using today's date");
            Local::now()
        }
    };
    date.format("%Y-%m-%d").to_string()
}

/// Collapse runs of characters that are unsafe in file names into `_`.
pub fn sanitize_filename_component(name: &str) -> String {
    let replaced = FORBIDDEN_RUN.replace_all(name, "_");
    let truncated: String = replaced.chars().take(MAX_FILENAME_COMPONENT_CHARS).collect();
    if truncated.is_empty() {
        "empty".to_string()
    } else {
        truncated
    }
}

fn file_basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Every path a run may write
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub folder: PathBuf,
    pub csv: PathBuf,
    pub bookmarks: PathBuf,
    pub session_text: Option<PathBuf>,
    pub tabs_text: Option<PathBuf>,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, date: &str, session: Option<&Path>, tabs: Option<&Path>) -> Self {
        let folder = output_dir.join(format!("{date}_{OUTPUT_STEM}"));
        let replaced_text_path = |input: &Path| {
            folder.join(format!(
                "{date}_{}_non-printables_replaced_with_pipe_char.txt",
                sanitize_filename_component(&file_basename(input))
            ))
        };

        Self {
            csv: folder.join(format!("{date}_{OUTPUT_STEM}.csv")),
            bookmarks: folder.join(format!("{date}_{OUTPUT_STEM}_Saved_As_Bookmarks.html")),
            session_text: session.map(replaced_text_path),
            tabs_text: tabs.map(replaced_text_path),
            folder,
        }
    }

    /// Name of the output folder, used as the top bookmark folder
    pub fn folder_name(&self) -> String {
        file_basename(&self.folder)
    }
}

/// Input file paths of a run
#[derive(Debug, Clone, Copy)]
pub struct RunInputs<'a> {
    pub session: Option<&'a Path>,
    pub tabs: Option<&'a Path>,
}

/// Files actually written by [`write_outputs`]
#[derive(Debug, Default)]
pub struct WrittenFiles {
    pub files: Vec<PathBuf>,
}

fn write_display_text(path: &Path, text: &DisplayText) -> Result<()> {
    fs::write(path, text.as_str()).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the CSV report, bookmarks and replaced-text files for a recovery.
pub fn write_outputs(
    recovery: &Recovery,
    inputs: RunInputs<'_>,
    paths: &OutputPaths,
    config: &Config,
) -> Result<WrittenFiles> {
    fs::create_dir_all(&paths.folder)
        .with_context(|| format!("Failed to create output folder {}", paths.folder.display()))?;
    let mut written = WrittenFiles::default();

    let mut session_written = None;
    let mut tabs_written = None;
    if config.output.write_replaced_text {
        if let Some(path) = &paths.session_text
            && !recovery.session_text.is_empty()
        {
            write_display_text(path, &recovery.session_text)?;
            written.files.push(path.clone());
            session_written = Some(file_basename(path));
        }
        if let (Some(path), Some(text)) = (&paths.tabs_text, &recovery.tabs_text)
            && !text.is_empty()
        {
            write_display_text(path, text)?;
            written.files.push(path.clone());
            tabs_written = Some(file_basename(path));
        }
    }

    let meta = ReportMeta {
        tool_version: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        session_file: inputs.session.map(|p| p.display().to_string()),
        tabs_file: inputs.tabs.map(|p| p.display().to_string()),
        session_replaced_file: session_written,
        tabs_replaced_file: tabs_written,
    };
    let mut csv = Vec::new();
    write_report(&mut csv, &meta, &recovery.groups, &recovery.rows)
        .context("Failed to render CSV report")?;
    fs::write(&paths.csv, csv).with_context(|| format!("Failed to write {}", paths.csv.display()))?;
    written.files.push(paths.csv.clone());

    if config.output.write_bookmarks {
        let generated_at = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        let html = render_bookmarks(&paths.folder_name(), &recovery.rows, &generated_at);
        fs::write(&paths.bookmarks, html)
            .with_context(|| format!("Failed to write {}", paths.bookmarks.display()))?;
        written.files.push(paths.bookmarks.clone());
    }

    log::debug!("Wrote {} output files to {}", written.files.len(), paths.folder.display());
    Ok(written)
}

/// Print the human-readable run summary.
pub fn print_summary(recovery: &Recovery, inputs: RunInputs<'_>, written: &WrittenFiles) {
    let describe = |path: Option<&Path>| path.map_or_else(|| NO_FILE_SPECIFIED.to_string(), |p| p.display().to_string());
    println!("Session file: {}", describe(inputs.session));
    println!("Tabs file: {}", describe(inputs.tabs));

    for file in &written.files {
        println!("  {} {}", "Wrote".green(), file.display());
    }

    if recovery.is_empty() {
        println!("{}", "No tab groups or grouped tabs were recovered.".yellow());
    }
    println!(
        "Detected {} tab groups and {} grouped tabs.",
        recovery.groups.len().to_string().bold(),
        recovery.rows.len().to_string().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsalvage_lib::recover;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_collapses_runs() {
        assert_eq!(sanitize_filename_component("a<>b"), "a_b");
        assert_eq!(sanitize_filename_component("Session_1"), "Session_1");
        assert_eq!(sanitize_filename_component("x:\r\n\ty"), "x_y");
        assert_eq!(sanitize_filename_component("|a|"), "_a_");
        assert_eq!(sanitize_filename_component("a\\\"/?*b"), "a_b");
        assert_eq!(sanitize_filename_component(""), "empty");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "a".repeat(300);
        assert_eq!(sanitize_filename_component(&long).len(), MAX_FILENAME_COMPONENT_CHARS);
    }

    #[test]
    fn test_date_prefix_shape() {
        let date = date_prefix(None);
        assert_eq!(date.len(), 10);
        assert_eq!(date.as_bytes()[4], b'-');
        assert_eq!(date.as_bytes()[7], b'-');
    }

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new(
            Path::new("/out"),
            "2024-05-06",
            Some(Path::new("/in/Session_123")),
            None,
        );
        assert_eq!(paths.folder, Path::new("/out/2024-05-06_Recovered_Edge_Tabs"));
        assert_eq!(paths.folder_name(), "2024-05-06_Recovered_Edge_Tabs");
        assert_eq!(
            paths.csv,
            Path::new("/out/2024-05-06_Recovered_Edge_Tabs/2024-05-06_Recovered_Edge_Tabs.csv")
        );
        assert_eq!(
            paths.session_text.as_deref(),
            Some(Path::new(
                "/out/2024-05-06_Recovered_Edge_Tabs/2024-05-06_Session_123_non-printables_replaced_with_pipe_char.txt"
            ))
        );
        assert!(paths.tabs_text.is_none());
    }

    #[test]
    fn test_write_outputs_respects_toggles() {
        let dir = tempdir().unwrap();
        let recovery = recover(b"}\x00abc", None, &Config::default()).unwrap();
        let session = dir.path().join("Session_1");
        let paths = OutputPaths::new(dir.path(), "2024-01-01", Some(&session), None);
        let inputs = RunInputs {
            session: Some(&session),
            tabs: None,
        };

        let mut config = Config::default();
        config.output.write_bookmarks = false;
        config.output.write_replaced_text = false;
        let written = write_outputs(&recovery, inputs, &paths, &config).unwrap();
        assert_eq!(written.files, vec![paths.csv.clone()]);
        assert!(!paths.bookmarks.exists());

        let written = write_outputs(&recovery, inputs, &paths, &Config::default()).unwrap();
        assert_eq!(written.files.len(), 3);
        let replaced = fs::read_to_string(paths.session_text.as_ref().unwrap()).unwrap();
        assert_eq!(replaced, "}|abc");
        let csv = fs::read_to_string(&paths.csv).unwrap();
        assert!(csv.contains("Session file contents written to 2024-01-01_Session_1_non-printables"));
        assert!(csv.contains(&format!("Session file name: {}", session.display())));
    }

    #[test]
    fn test_empty_inputs_skip_replaced_text() {
        let dir = tempdir().unwrap();
        let recovery = recover(b"", Some(&b""[..]), &Config::default()).unwrap();
        let session = dir.path().join("Session_1");
        let tabs = dir.path().join("Tabs_1");
        let paths = OutputPaths::new(dir.path(), "2024-01-01", Some(&session), Some(&tabs));
        let inputs = RunInputs {
            session: Some(&session),
            tabs: Some(&tabs),
        };

        let written = write_outputs(&recovery, inputs, &paths, &Config::default()).unwrap();
        assert_eq!(written.files, vec![paths.csv.clone(), paths.bookmarks.clone()]);
        assert!(!paths.session_text.as_ref().unwrap().exists());
        assert!(!paths.tabs_text.as_ref().unwrap().exists());

        let csv = fs::read_to_string(&paths.csv).unwrap();
        assert!(csv.contains("Session file contents written to No file specified"));
        assert!(csv.contains("Tabs file contents written to No file specified"));
    }
}
